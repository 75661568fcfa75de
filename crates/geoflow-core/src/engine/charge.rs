use super::error::EngineError;
use crate::core::models::atom::AtomSet;
use crate::core::models::grid::GridFrame;
use itertools::iproduct;
use nalgebra::Point3;
use std::collections::HashMap;
use tracing::debug;

/// Number of grid nodes that receive a share of each point charge.
pub const CORNERS: usize = 8;

/// Share of one atom's charge assigned to one grid node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeEntry {
    /// 1-based node indices.
    pub node: [usize; 3],
    pub position: Point3<f64>,
    pub charge: f64,
}

/// Which of an atom's offsets from the lower corner of its cell are exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetCase {
    /// No offset is zero; all eight corners receive charge.
    General,
    /// The offset along `normal` is zero; the four corners of the lower face share the charge.
    Planar { normal: usize },
    /// Only the offset along `axis` is non-zero; the two corners on that edge share the charge.
    Linear { axis: usize },
    /// The atom sits on a node, which receives the full charge.
    OnNode,
}

impl OffsetCase {
    pub fn classify(offset: [f64; 3]) -> Self {
        let nonzero = offset.map(|o| o != 0.0);
        match nonzero {
            [true, true, true] => Self::General,
            [false, true, true] => Self::Planar { normal: 0 },
            [true, false, true] => Self::Planar { normal: 1 },
            [true, true, false] => Self::Planar { normal: 2 },
            [true, false, false] => Self::Linear { axis: 0 },
            [false, true, false] => Self::Linear { axis: 1 },
            [false, false, true] => Self::Linear { axis: 2 },
            [false, false, false] => Self::OnNode,
        }
    }

    /// Unnormalized inverse-distance weight of the corner at `corner` (each 0 or 1).
    ///
    /// `dist[d]` is the signed distance from the atom to that corner along axis `d`.
    fn weight(self, corner: [usize; 3], dist: [f64; 3]) -> f64 {
        match self {
            Self::General => 1.0 / (dist[0] * dist[1] * dist[2]).abs(),
            Self::Planar { normal } => {
                if corner[normal] != 0 {
                    return 0.0;
                }
                let (u, v) = match normal {
                    0 => (1, 2),
                    1 => (0, 2),
                    _ => (0, 1),
                };
                1.0 / (dist[u] * dist[v]).abs()
            }
            Self::Linear { axis } => {
                if (0..3).any(|d| d != axis && corner[d] != 0) {
                    return 0.0;
                }
                1.0 / dist[axis].abs()
            }
            Self::OnNode => {
                if corner == [0, 0, 0] {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Per-atom discretization of the point charges onto the grid.
///
/// Corner `c` of an atom's table has offsets `(c & 1, (c >> 1) & 1, c >> 2)`
/// relative to the lower corner of the atom's cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeTable {
    entries: Vec<[ChargeEntry; CORNERS]>,
    node_charges: HashMap<[usize; 3], f64>,
}

impl ChargeTable {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn atom(&self, index: usize) -> Option<&[ChargeEntry; CORNERS]> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChargeEntry> {
        self.entries.iter().flatten()
    }

    /// Total charge deposited on node `(i, j, k)` by all atoms.
    #[inline]
    pub fn node_charge(&self, i: usize, j: usize, k: usize) -> f64 {
        self.node_charges.get(&[i, j, k]).copied().unwrap_or(0.0)
    }

    pub fn charged_nodes(&self) -> impl Iterator<Item = ([usize; 3], f64)> + '_ {
        self.node_charges.iter().map(|(&node, &q)| (node, q))
    }

    /// Sum over entries of `charge * potential(node)`.
    ///
    /// Zero-weight corners are skipped; they may lie past the last grid node.
    pub fn weighted_sum<F>(&self, mut potential: F) -> f64
    where
        F: FnMut([usize; 3]) -> f64,
    {
        self.entries()
            .filter(|e| e.charge != 0.0)
            .map(|e| e.charge * potential(e.node))
            .sum()
    }
}

pub struct ChargeDistributor<'a> {
    frame: &'a GridFrame,
}

impl<'a> ChargeDistributor<'a> {
    pub fn new(frame: &'a GridFrame) -> Self {
        Self { frame }
    }

    pub fn distribute(&self, atoms: &AtomSet) -> Result<ChargeTable, EngineError> {
        let mut entries = Vec::with_capacity(atoms.len());
        let mut node_charges: HashMap<[usize; 3], f64> = HashMap::new();

        for (index, atom) in atoms.iter().enumerate() {
            let cell = self.frame.cell_of(&atom.position);
            if !self.frame.contains_node(cell) {
                return Err(EngineError::ChargeOutsideGrid { atom: index });
            }
            let offset: [f64; 3] =
                [0, 1, 2].map(|d| atom.position[d] - self.frame.axis(d).value(cell[d]));
            let spacing = self.frame.spacing();
            let case = OffsetCase::classify(offset);

            let mut weights = [0.0; CORNERS];
            let mut nodes = [[0usize; 3]; CORNERS];
            for (c, (k, j, i)) in iproduct!(0..2usize, 0..2usize, 0..2usize).enumerate() {
                let corner = [i, j, k];
                let dist = [0, 1, 2].map(|d| corner[d] as f64 * spacing[d] - offset[d]);
                weights[c] = case.weight(corner, dist);
                nodes[c] = [cell[0] + i, cell[1] + j, cell[2] + k];
            }
            let norm: f64 = weights.iter().sum();

            let mut table = [ChargeEntry {
                node: cell,
                position: atom.position,
                charge: 0.0,
            }; CORNERS];
            for c in 0..CORNERS {
                let node = nodes[c];
                let charge = atom.charge * weights[c] / norm;
                if charge != 0.0 && !self.frame.contains_node(node) {
                    return Err(EngineError::ChargeOutsideGrid { atom: index });
                }
                table[c] = ChargeEntry {
                    node,
                    position: self.frame.position(node[0], node[1], node[2]),
                    charge,
                };
                if charge != 0.0 {
                    *node_charges.entry(node).or_insert(0.0) += charge;
                }
            }

            debug!(atom = index, ?case, node = ?cell, "Distributed atom charge");
            entries.push(table);
        }

        Ok(ChargeTable {
            entries,
            node_charges,
        })
    }
}
