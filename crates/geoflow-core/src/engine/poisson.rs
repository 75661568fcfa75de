use super::charge::ChargeTable;
use super::config::BoundaryCondition;
use super::error::EngineError;
use crate::core::forcefield::potentials::coulomb_potential;
use crate::core::integration::SURFACE_SCALE;
use crate::core::models::atom::AtomSet;
use crate::core::models::field::GridField;
use crate::core::models::grid::GridFrame;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::f64::consts::PI;
use tracing::debug;

/// Dielectric coefficient at every node: the solute value where the surface field is
/// at its scale, the solvent value where it is zero, linear in between.
pub fn dielectric_field(
    surface: &GridField<f64>,
    solute_dielectric: f64,
    solvent_dielectric: f64,
) -> GridField<f64> {
    surface.map(|s| {
        let s = s.clamp(0.0, SURFACE_SCALE);
        solute_dielectric + (solvent_dielectric - solute_dielectric) * (SURFACE_SCALE - s) / SURFACE_SCALE
    })
}

/// Discretizes `div(eps grad phi) = -4 pi rho` with a 7-point stencil.
///
/// Unknowns follow the storage order of [`GridField`]. Rows of boundary nodes are
/// identity rows, so the boundary potential is whatever the right-hand side holds.
pub struct PoissonAssembler<'a> {
    frame: &'a GridFrame,
}

impl<'a> PoissonAssembler<'a> {
    pub fn new(frame: &'a GridFrame) -> Self {
        Self { frame }
    }

    pub fn matrix(&self, dielectric: &GridField<f64>) -> CsrMatrix<f64> {
        let n = dielectric.len();
        let h = self.frame.spacing();
        let mut coo = CooMatrix::new(n, n);

        for (i, j, k) in dielectric.indices() {
            let row = dielectric.flat_index(i, j, k);
            if self.frame.is_boundary(i, j, k) {
                coo.push(row, row, 1.0);
                continue;
            }

            let eps = dielectric.get(i, j, k);
            let neighbors = [
                ((i - 1, j, k), h.x),
                ((i + 1, j, k), h.x),
                ((i, j - 1, k), h.y),
                ((i, j + 1, k), h.y),
                ((i, j, k - 1), h.z),
                ((i, j, k + 1), h.z),
            ];
            let mut diagonal = 0.0;
            for ((ni, nj, nk), step) in neighbors {
                let face = 0.5 * (eps + dielectric.get(ni, nj, nk)) / (step * step);
                coo.push(row, dielectric.flat_index(ni, nj, nk), face);
                diagonal -= face;
            }
            coo.push(row, row, diagonal);
        }

        let matrix = CsrMatrix::from(&coo);
        debug!(rows = n, nnz = matrix.nnz(), "Assembled Poisson matrix");
        matrix
    }

    /// Right-hand side for the given charges and boundary condition.
    ///
    /// Only multiple-sphere Debye-Huckel boundaries are supported.
    pub fn rhs(
        &self,
        atoms: &AtomSet,
        charges: &ChargeTable,
        solvent_dielectric: f64,
        boundary: BoundaryCondition,
    ) -> Result<DVector<f64>, EngineError> {
        if boundary != BoundaryCondition::MultipleDebyeHuckel {
            return Err(EngineError::unimplemented(format!(
                "boundary condition '{boundary}'"
            )));
        }

        let dims = self.frame.dims();
        let cell_volume = self.frame.cell_volume();
        let values = GridField::from_fn(dims, |i, j, k| {
            if self.frame.is_boundary(i, j, k) {
                let point = self.frame.position(i, j, k);
                atoms
                    .iter()
                    .map(|atom| {
                        coulomb_potential(
                            atom.charge,
                            nalgebra::distance(&point, &atom.position),
                            solvent_dielectric,
                        )
                    })
                    .sum::<f64>()
            } else {
                -4.0 * PI * charges.node_charge(i, j, k) / cell_volume
            }
        });
        Ok(DVector::from_vec(values.into_vec()))
    }
}
