/// Unit conversion from `e^2/Angstrom` to kcal/mol used for electrostatic energies.
pub const ELECTROSTATIC_ENERGY_UNIT: f64 = 332.06364;

/// Repulsive and attractive parts of a solute-solvent dispersion potential at a point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplitPotential {
    pub repulsive: f64,
    pub attractive: f64,
}

impl std::ops::AddAssign for SplitPotential {
    fn add_assign(&mut self, rhs: Self) {
        self.repulsive += rhs.repulsive;
        self.attractive += rhs.attractive;
    }
}

/// Ratio `sigma / dist`, defined as one at zero distance.
#[inline]
pub fn sigma_ratio(sigma: f64, dist: f64) -> f64 {
    if dist == 0.0 { 1.0 } else { sigma / dist }
}

/// Plain 12-6 split: the `r^-12` term is repulsive and the `r^-6` term attractive.
#[inline]
pub fn lennard_jones_split(ratio: f64, seta12: f64, seta6: f64) -> SplitPotential {
    let ratio6 = ratio.powi(6);
    let ratio12 = ratio6 * ratio6;
    SplitPotential {
        repulsive: seta12 * ratio12,
        attractive: -seta6 * ratio6,
    }
}

/// Weeks-Chandler-Andersen split at the cutoff `ratio * rcfactor == 1`.
///
/// Inside the cutoff the shifted potential is repulsive and the attractive part is
/// the constant `-epsilon`; outside, the whole potential is attractive.
#[inline]
pub fn wca_split(ratio: f64, rcfactor: f64, seta12: f64, seta6: f64, epsilon: f64) -> SplitPotential {
    let ratio6 = ratio.powi(6);
    let ratio12 = ratio6 * ratio6;
    let full = seta12 * ratio12 - seta6 * ratio6;
    if ratio * rcfactor > 1.0 {
        SplitPotential {
            repulsive: full + epsilon,
            attractive: -epsilon,
        }
    } else {
        SplitPotential {
            repulsive: 0.0,
            attractive: full,
        }
    }
}

/// Coulomb potential of a point charge in a uniform dielectric, in `e/Angstrom`.
#[inline]
pub fn coulomb_potential(charge: f64, dist: f64, dielectric: f64) -> f64 {
    charge / (dielectric * dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn sigma_ratio_is_one_at_zero_distance() {
        assert_eq!(sigma_ratio(3.0, 0.0), 1.0);
        assert!(f64_approx_equal(sigma_ratio(3.0, 2.0), 1.5));
    }

    #[test]
    fn lennard_jones_split_separates_powers() {
        let split = lennard_jones_split(0.5, 2.0, 3.0);
        assert!(f64_approx_equal(split.repulsive, 2.0 * 0.5f64.powi(12)));
        assert!(f64_approx_equal(split.attractive, -3.0 * 0.5f64.powi(6)));
    }

    #[test]
    fn wca_split_inside_cutoff_is_shifted_repulsion() {
        let split = wca_split(1.2, 1.0, 1.0, 2.0, 0.5);
        let full = 1.2f64.powi(12) - 2.0 * 1.2f64.powi(6);
        assert!(f64_approx_equal(split.repulsive, full + 0.5));
        assert!(f64_approx_equal(split.attractive, -0.5));
    }

    #[test]
    fn wca_split_outside_cutoff_is_purely_attractive() {
        let split = wca_split(0.8, 1.0, 1.0, 2.0, 0.5);
        let full = 0.8f64.powi(12) - 2.0 * 0.8f64.powi(6);
        assert_eq!(split.repulsive, 0.0);
        assert!(f64_approx_equal(split.attractive, full));
    }

    #[test]
    fn wca_split_cutoff_uses_rcfactor() {
        let rcfactor = 2.0f64.powf(1.0 / 6.0);
        let inside = wca_split(0.95, rcfactor, 4.0, 4.0, 1.0);
        let outside = wca_split(0.85, rcfactor, 4.0, 4.0, 1.0);
        assert!(f64_approx_equal(inside.attractive, -1.0));
        assert_eq!(outside.repulsive, 0.0);
    }

    #[test]
    fn wca_split_sums_to_full_potential_everywhere() {
        for &ratio in &[0.5_f64, 0.9, 1.0, 1.1, 1.4] {
            let split = wca_split(ratio, 1.0, 1.5, 3.0, 0.7);
            let full = 1.5 * ratio.powi(12) - 3.0 * ratio.powi(6);
            assert!((split.repulsive + split.attractive - full).abs() < 1e-9);
        }
    }

    #[test]
    fn coulomb_potential_scales_with_inverse_distance_and_dielectric() {
        assert!(f64_approx_equal(coulomb_potential(1.0, 2.0, 80.0), 1.0 / 160.0));
        assert!(f64_approx_equal(coulomb_potential(-0.5, 1.0, 1.0), -0.5));
    }
}
