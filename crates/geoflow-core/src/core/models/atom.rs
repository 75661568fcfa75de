use nalgebra::Point3;
use std::str::FromStr;

/// Radius substituted for vanishing radii under the ZAP-9 model, in Angstroms.
pub const ZAP9_DEFAULT_RADIUS: f64 = 1.21;

const VANISHING_RADIUS: f64 = 1e-6;

/// Selects the force-field convention used to interpret atomic radii and to
/// derive solute-solvent Lennard-Jones parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForceFieldModel {
    /// ZAP-9 radii with AM1-BCC charges. Hydrogens without a radius receive a default one.
    #[default]
    Zap9,
    /// OPLS/AA radii and well depths, combined with the water well depth by geometric mean.
    Opls,
}

impl ForceFieldModel {
    /// Applies the model's radius rule to a raw (already scaled) radius.
    ///
    /// Under ZAP-9 a radius below `1e-6` is replaced by [`ZAP9_DEFAULT_RADIUS`];
    /// every other radius is returned unmodified.
    #[inline]
    pub fn adjust_radius(self, raw_radius: f64) -> f64 {
        match self {
            ForceFieldModel::Zap9 if raw_radius < VANISHING_RADIUS => ZAP9_DEFAULT_RADIUS,
            _ => raw_radius,
        }
    }
}

impl FromStr for ForceFieldModel {
    type Err = ();

    /// Parses a model selector.
    ///
    /// Accepts the names `zap9`/`zap-9` and `opls`/`opls-aa` (case-insensitive),
    /// as well as the legacy numeric selectors `1` and `2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "1" | "zap9" | "zap-9" => Ok(ForceFieldModel::Zap9),
            "2" | "opls" | "opls-aa" | "oplsaa" => Ok(ForceFieldModel::Opls),
            _ => Err(()),
        }
    }
}

/// A point charge with a van der Waals sphere, as seen by the solvation model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    /// Center of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Radius of the atomic sphere in Angstroms.
    pub radius: f64,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Lennard-Jones well depth in kcal/mol. Only consulted by the OPLS model.
    pub lj_epsilon: f64,
}

impl Atom {
    pub fn new(position: Point3<f64>, radius: f64, charge: f64) -> Self {
        Self {
            position,
            radius,
            charge,
            lj_epsilon: 0.0,
        }
    }

    pub fn with_lj_epsilon(mut self, lj_epsilon: f64) -> Self {
        self.lj_epsilon = lj_epsilon;
        self
    }
}

/// An ordered collection of atoms; order is the order of insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomSet {
    atoms: Vec<Atom>,
}

impl AtomSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn total_charge(&self) -> f64 {
        self.atoms.iter().map(|a| a.charge).sum()
    }

    /// Returns a copy whose radii are multiplied by `radius_scale` and then passed
    /// through the radius rule of `model`.
    pub fn with_model_radii(&self, model: ForceFieldModel, radius_scale: f64) -> Self {
        self.atoms
            .iter()
            .map(|atom| Atom {
                radius: model.adjust_radius(atom.radius * radius_scale),
                ..*atom
            })
            .collect()
    }
}

impl FromIterator<Atom> for AtomSet {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self {
            atoms: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AtomSet {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zap9_substitutes_default_radius_for_vanishing_radius() {
        assert_eq!(ForceFieldModel::Zap9.adjust_radius(0.0), ZAP9_DEFAULT_RADIUS);
        assert_eq!(ForceFieldModel::Zap9.adjust_radius(5e-7), ZAP9_DEFAULT_RADIUS);
    }

    #[test]
    fn zap9_keeps_regular_radius() {
        assert_eq!(ForceFieldModel::Zap9.adjust_radius(1.87), 1.87);
    }

    #[test]
    fn opls_never_substitutes_radius() {
        assert_eq!(ForceFieldModel::Opls.adjust_radius(0.0), 0.0);
    }

    #[test]
    fn force_field_model_parses_names_and_legacy_selectors() {
        assert_eq!("1".parse(), Ok(ForceFieldModel::Zap9));
        assert_eq!("ZAP-9".parse(), Ok(ForceFieldModel::Zap9));
        assert_eq!("zap9".parse(), Ok(ForceFieldModel::Zap9));
        assert_eq!("2".parse(), Ok(ForceFieldModel::Opls));
        assert_eq!("OPLS_AA".parse(), Ok(ForceFieldModel::Opls));
        assert_eq!("amber".parse::<ForceFieldModel>(), Err(()));
    }

    #[test]
    fn atom_set_preserves_insertion_order() {
        let mut atoms = AtomSet::new();
        atoms.push(Atom::new(Point3::new(1.0, 0.0, 0.0), 1.0, 0.1));
        atoms.push(Atom::new(Point3::new(2.0, 0.0, 0.0), 1.0, 0.2));

        let xs: Vec<f64> = atoms.iter().map(|a| a.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0]);
        assert_eq!(atoms.len(), 2);
    }

    #[test]
    fn with_model_radii_scales_then_adjusts() {
        let atoms: AtomSet = [
            Atom::new(Point3::origin(), 2.0, 0.0),
            Atom::new(Point3::origin(), 0.0, 0.0),
        ]
        .into_iter()
        .collect();

        let adjusted = atoms.with_model_radii(ForceFieldModel::Zap9, 0.5);

        assert_eq!(adjusted.get(0).unwrap().radius, 1.0);
        assert_eq!(adjusted.get(1).unwrap().radius, ZAP9_DEFAULT_RADIUS);
        assert_eq!(atoms.get(0).unwrap().radius, 2.0);
    }

    #[test]
    fn total_charge_sums_all_atoms() {
        let atoms: AtomSet = [
            Atom::new(Point3::origin(), 1.0, -0.257),
            Atom::new(Point3::origin(), 1.0, 0.398),
        ]
        .into_iter()
        .collect();
        assert!((atoms.total_charge() - 0.141).abs() < 1e-12);
    }
}
