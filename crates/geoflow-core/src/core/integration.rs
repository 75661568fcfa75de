use crate::core::models::field::GridField;
use crate::core::models::grid::GridFrame;

/// Scale of the surface field: `SURFACE_SCALE` marks solute, zero marks solvent.
pub const SURFACE_SCALE: f64 = 1000.0;

/// Quadrature over the grid: the node sum of a field divided by [`SURFACE_SCALE`]
/// and multiplied by the cell volume.
///
/// Every integrand of the model carries one factor of the surface scale, so the
/// division keeps the results in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeIntegrator {
    cell_volume: f64,
}

impl VolumeIntegrator {
    pub fn new(frame: &GridFrame) -> Self {
        Self {
            cell_volume: frame.cell_volume(),
        }
    }

    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.cell_volume
    }

    pub fn integrate(&self, field: &GridField<f64>) -> f64 {
        field.sum() / SURFACE_SCALE * self.cell_volume
    }

    /// Integrates `f` evaluated at every node without materializing a field.
    pub fn integrate_with<F>(&self, field: &GridField<f64>, f: F) -> f64
    where
        F: Fn(usize, usize, usize) -> f64,
    {
        field.indices().map(|(i, j, k)| f(i, j, k)).sum::<f64>() / SURFACE_SCALE
            * self.cell_volume
    }
}
