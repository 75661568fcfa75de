use super::potentials::{SplitPotential, lennard_jones_split, sigma_ratio, wca_split};
use crate::core::models::atom::{AtomSet, ForceFieldModel};
use nalgebra::Point3;

/// Solvent-side settings that determine the solute-solvent dispersion potential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolventModel {
    pub force_field: ForceFieldModel,
    /// Enables the van der Waals dispersion term; when off every well depth is zero.
    pub vdw_dispersion: bool,
    /// Solvent radius added to (ZAP-9) or combined with (OPLS) each atomic radius.
    pub solvent_radius: f64,
    /// Probe radius added to every atom-node distance.
    pub probe_radius: f64,
    /// Lennard-Jones well depth of water, used by OPLS mixing.
    pub water_well_depth: f64,
    /// Splits each atom's potential at its minimum (Weeks-Chandler-Andersen).
    pub wca_split: bool,
}

/// Lennard-Jones parameters of one atom interacting with the solvent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolventInteraction {
    pub sigma: f64,
    pub epsilon: f64,
    pub seta12: f64,
    pub seta6: f64,
}

/// Per-atom solute-solvent parameters together with the model's cutoff factor.
#[derive(Debug, Clone, PartialEq)]
pub struct DispersionParams {
    rcfactor: f64,
    probe_radius: f64,
    wca_split: bool,
    interactions: Vec<SolventInteraction>,
}

impl DispersionParams {
    pub fn derive(atoms: &AtomSet, model: &SolventModel) -> Self {
        let rcfactor = match model.force_field {
            ForceFieldModel::Zap9 => 1.0,
            ForceFieldModel::Opls => 2.0f64.powf(1.0 / 6.0),
        };

        let interactions = atoms
            .iter()
            .map(|atom| match model.force_field {
                ForceFieldModel::Zap9 => {
                    let sigma = atom.radius + model.solvent_radius;
                    if !model.vdw_dispersion {
                        return SolventInteraction {
                            sigma,
                            ..Default::default()
                        };
                    }
                    let se = sigma / (atom.radius + model.probe_radius);
                    let epsilon = 1.0 / (se.powi(12) - 2.0 * se.powi(6));
                    SolventInteraction {
                        sigma,
                        epsilon,
                        seta12: epsilon,
                        seta6: 2.0 * epsilon,
                    }
                }
                ForceFieldModel::Opls => {
                    let sigma = (4.0 * atom.radius * model.solvent_radius).sqrt();
                    if !model.vdw_dispersion {
                        return SolventInteraction {
                            sigma,
                            ..Default::default()
                        };
                    }
                    let epsilon = (atom.lj_epsilon * model.water_well_depth).sqrt();
                    SolventInteraction {
                        sigma,
                        epsilon,
                        seta12: 4.0 * epsilon,
                        seta6: 4.0 * epsilon,
                    }
                }
            })
            .collect();

        Self {
            rcfactor,
            probe_radius: model.probe_radius,
            wca_split: model.wca_split,
            interactions,
        }
    }

    #[inline]
    pub fn rcfactor(&self) -> f64 {
        self.rcfactor
    }

    #[inline]
    pub fn interactions(&self) -> &[SolventInteraction] {
        &self.interactions
    }

    #[inline]
    pub fn uses_wca_split(&self) -> bool {
        self.wca_split
    }

    /// Sums the split potential of every atom at `point`.
    pub fn potential_at(&self, atoms: &AtomSet, point: &Point3<f64>) -> SplitPotential {
        let mut total = SplitPotential::default();
        for (atom, p) in atoms.iter().zip(&self.interactions) {
            let dist = nalgebra::distance(point, &atom.position) + self.probe_radius;
            let ratio = sigma_ratio(p.sigma, dist);
            total += if self.wca_split {
                wca_split(ratio, self.rcfactor, p.seta12, p.seta6, p.epsilon)
            } else {
                lennard_jones_split(ratio, p.seta12, p.seta6)
            };
        }
        total
    }
}
