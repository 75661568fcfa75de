use super::atom::AtomSet;
use nalgebra::{Point3, Vector3};

/// One rectilinear axis of the computational grid.
///
/// Nodes are addressed with 1-based indices; node `i` sits at
/// `left + (i - 1) * spacing` and the last node sits exactly at `right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub left: f64,
    pub right: f64,
    pub spacing: f64,
    pub count: usize,
}

impl Axis {
    /// Builds an axis with `count` nodes starting at `left`.
    pub fn new(left: f64, spacing: f64, count: usize) -> Self {
        Self {
            left,
            right: left + spacing * (count as f64 - 1.0),
            spacing,
            count,
        }
    }

    /// Fits an axis around the closed interval `[lo, hi]`.
    ///
    /// The low bound is padded, rounded down to a multiple of the spacing and then
    /// padded once more; the high bound is handled symmetrically. The node count is
    /// the rounded span plus one and `right` is snapped so the axis stays rectilinear.
    pub fn fit(lo: f64, hi: f64, spacing: f64, margin: f64) -> Self {
        let left = ((lo - margin) / spacing).floor() * spacing - margin;
        let right = ((hi + margin) / spacing).ceil() * spacing + margin;
        let count = ((right - left) / spacing).round() as usize + 1;
        Self::new(left, spacing, count)
    }

    #[inline]
    pub fn value(&self, index: usize) -> f64 {
        self.left + (index as f64 - 1.0) * self.spacing
    }

    /// Index of the node at or immediately below `coord`.
    ///
    /// Coordinates left of the axis map to index 0, which is never a valid node.
    #[inline]
    pub fn cell_index(&self, coord: f64) -> usize {
        let offset = ((coord - self.left) / self.spacing).floor();
        if offset < 0.0 { 0 } else { offset as usize + 1 }
    }
}

/// Geometry of the uniform grid on which every field of a run lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    axes: [Axis; 3],
}

impl GridFrame {
    pub fn from_axes(x: Axis, y: Axis, z: Axis) -> Self {
        Self { axes: [x, y, z] }
    }

    /// Computes the grid that covers every atomic sphere plus a padding margin.
    ///
    /// Returns `None` for an empty atom set, which has no extent.
    pub fn from_atoms(atoms: &AtomSet, spacing: Vector3<f64>, margin: f64) -> Option<Self> {
        if atoms.is_empty() {
            return None;
        }

        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for atom in atoms {
            for d in 0..3 {
                lo[d] = lo[d].min(atom.position[d] - atom.radius);
                hi[d] = hi[d].max(atom.position[d] + atom.radius);
            }
        }

        Some(Self {
            axes: [0, 1, 2].map(|d| Axis::fit(lo[d], hi[d], spacing[d], margin)),
        })
    }

    #[inline]
    pub fn x(&self) -> &Axis {
        &self.axes[0]
    }

    #[inline]
    pub fn y(&self) -> &Axis {
        &self.axes[1]
    }

    #[inline]
    pub fn z(&self) -> &Axis {
        &self.axes[2]
    }

    #[inline]
    pub fn axis(&self, dim: usize) -> &Axis {
        &self.axes[dim]
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.axes.map(|a| a.count)
    }

    #[inline]
    pub fn spacing(&self) -> Vector3<f64> {
        Vector3::new(
            self.axes[0].spacing,
            self.axes[1].spacing,
            self.axes[2].spacing,
        )
    }

    /// Number of grid nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.count).product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.axes.iter().map(|a| a.spacing).product()
    }

    #[inline]
    pub fn position(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        Point3::new(
            self.axes[0].value(i),
            self.axes[1].value(j),
            self.axes[2].value(k),
        )
    }

    /// 1-based indices of the lower corner of the cell that contains `point`.
    #[inline]
    pub fn cell_of(&self, point: &Point3<f64>) -> [usize; 3] {
        [0, 1, 2].map(|d| self.axes[d].cell_index(point[d]))
    }

    #[inline]
    pub fn contains_node(&self, node: [usize; 3]) -> bool {
        (0..3).all(|d| (1..=self.axes[d].count).contains(&node[d]))
    }

    /// True for nodes on any face of the grid.
    #[inline]
    pub fn is_boundary(&self, i: usize, j: usize, k: usize) -> bool {
        let [nx, ny, nz] = self.dims();
        i <= 1 || i >= nx || j <= 1 || j >= ny || k <= 1 || k >= nz
    }
}
