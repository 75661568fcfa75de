use serde::Serialize;

/// Solvation free energy split into its physical contributions, in kcal/mol.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnergyTerm {
    /// Change of the electrostatic energy on moving from solute to solvent dielectric.
    pub electrostatic: f64,
    /// Surface tension times molecular surface area.
    pub surface: f64,
    /// Pressure times excluded volume.
    pub pressure_volume: f64,
    /// Bulk solvent density times the attractive dispersion integral.
    pub dispersion: f64,
}

impl EnergyTerm {
    pub fn new(electrostatic: f64, surface: f64, pressure_volume: f64, dispersion: f64) -> Self {
        Self {
            electrostatic,
            surface,
            pressure_volume,
            dispersion,
        }
    }

    #[inline]
    pub fn nonpolar(&self) -> f64 {
        self.surface + self.pressure_volume + self.dispersion
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.electrostatic + self.nonpolar()
    }
}
