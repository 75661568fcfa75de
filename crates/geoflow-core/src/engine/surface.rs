use super::config::PhysicsConfig;
use crate::core::forcefield::params::DispersionParams;
use crate::core::forcefield::potentials::SplitPotential;
use crate::core::integration::{SURFACE_SCALE, VolumeIntegrator};
use crate::core::models::atom::AtomSet;
use crate::core::models::field::GridField;
use crate::core::models::grid::{Axis, GridFrame};
use nalgebra::Vector3;
use std::ops::RangeInclusive;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Nodes whose accessibility does not exceed this value never move.
const MOBILE_THRESHOLD: f64 = 2e-2;

/// Integrated geometric quantities of a surface field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceDiagnostics {
    pub volume: f64,
    pub area: f64,
    pub attractive_integral: f64,
}

/// Level-set evolution of the solute-solvent boundary.
///
/// The surface field takes values in `[0, SURFACE_SCALE]`: the scale marks solute,
/// zero marks solvent. Nodes inside an atomic sphere are pinned at the scale for the
/// whole run; all other interior nodes follow a mean-curvature flow driven by the
/// pressure, dispersion and electrostatic terms.
pub struct SurfaceEvolver<'a> {
    frame: &'a GridFrame,
    accessibility: GridField<f64>,
    indicator: GridField<f64>,
    repulsive: GridField<f64>,
    attractive: GridField<f64>,
    wca_split: bool,
    integrator: VolumeIntegrator,
}

impl<'a> SurfaceEvolver<'a> {
    pub fn new(frame: &'a GridFrame, atoms: &AtomSet, params: &DispersionParams) -> Self {
        let (accessibility, indicator) = rasterize_spheres(frame, atoms);
        let (repulsive, attractive) = dispersion_fields(frame, atoms, params, &accessibility);
        debug!(
            solute_nodes = accessibility.as_slice().iter().filter(|&&g| g == 0.0).count(),
            "Rasterized atomic spheres"
        );
        Self {
            frame,
            accessibility,
            indicator,
            repulsive,
            attractive,
            wca_split: params.uses_wca_split(),
            integrator: VolumeIntegrator::new(frame),
        }
    }

    /// 1 at nodes outside every atom, 0 inside.
    #[inline]
    pub fn accessibility(&self) -> &GridField<f64> {
        &self.accessibility
    }

    /// Exact union-of-spheres surface: the scale inside any atom, zero elsewhere.
    #[inline]
    pub fn indicator(&self) -> &GridField<f64> {
        &self.indicator
    }

    #[inline]
    pub fn repulsive_potential(&self) -> &GridField<f64> {
        &self.repulsive
    }

    #[inline]
    pub fn attractive_potential(&self) -> &GridField<f64> {
        &self.attractive
    }

    /// Explicit time step of the flow for the frame's spacing.
    pub fn time_step(&self) -> f64 {
        self.frame.cell_volume().powf(2.0 / 3.0) / 4.5
    }

    /// Normal velocity of the surface at every node.
    ///
    /// With the WCA split the repulsive part of the dispersion potential is left out.
    pub fn driving_field(
        &self,
        physics: &PhysicsConfig,
        electrostatic_force: Option<&GridField<f64>>,
    ) -> GridField<f64> {
        let pressure = physics.pressure / physics.gamma;
        let density = physics.bulk_density / physics.gamma;
        GridField::from_fn(self.frame.dims(), |i, j, k| {
            let force = electrostatic_force.map_or(0.0, |f| f.get(i, j, k));
            let mut dispersion = self.attractive.get(i, j, k);
            if !self.wca_split {
                dispersion += self.repulsive.get(i, j, k);
            }
            -pressure - force + density * dispersion
        })
    }

    /// Advances `surface` through `ceil(time / dt) + 1` explicit steps and returns the step count.
    pub fn evolve(&self, surface: &mut GridField<f64>, driving: &GridField<f64>, time: f64) -> usize {
        let dt = self.time_step();
        let steps = (time / dt).ceil() as usize + 1;
        let spacing = self.frame.spacing();
        let mobile: Vec<(usize, usize, usize)> = surface
            .interior_indices()
            .filter(|&(i, j, k)| self.accessibility.get(i, j, k) > MOBILE_THRESHOLD)
            .collect();

        // Frozen nodes hold the same value in both buffers, so a swap suffices.
        let mut next = surface.clone();
        for _ in 0..steps {
            for &(i, j, k) in &mobile {
                let rate = flow_rate(surface, driving, &spacing, i, j, k);
                next.set(
                    i,
                    j,
                    k,
                    (surface.get(i, j, k) + dt * rate).clamp(0.0, SURFACE_SCALE),
                );
            }
            std::mem::swap(surface, &mut next);
        }

        debug!(steps, dt, mobile_nodes = mobile.len(), "Evolved surface");
        steps
    }

    pub fn diagnostics(&self, surface: &GridField<f64>) -> SurfaceDiagnostics {
        let spacing = self.frame.spacing();
        let volume = self.integrator.integrate(surface);
        let gradient_sum: f64 = surface
            .interior_indices()
            .map(|(i, j, k)| central_gradient(surface, &spacing, i, j, k).norm())
            .sum();
        let area = gradient_sum / SURFACE_SCALE * self.integrator.cell_volume();
        let attractive_integral = self.integrator.integrate_with(surface, |i, j, k| {
            let mut potential = self.attractive.get(i, j, k);
            if !self.wca_split {
                potential += self.repulsive.get(i, j, k);
            }
            potential * (SURFACE_SCALE - surface.get(i, j, k))
        });
        SurfaceDiagnostics {
            volume,
            area,
            attractive_integral,
        }
    }
}

/// Blends two surfaces: `alpha * previous + (1 - alpha) * current`.
pub fn relax(previous: &GridField<f64>, current: &GridField<f64>, alpha: f64) -> GridField<f64> {
    GridField::from_fn(current.dims(), |i, j, k| {
        alpha * previous.get(i, j, k) + (1.0 - alpha) * current.get(i, j, k)
    })
}

/// Electrostatic normal force `0.5 (eps_s - eps_p) |grad phi|^2 / gamma` on interior nodes.
pub fn electrostatic_force(
    frame: &GridFrame,
    potential: &GridField<f64>,
    solute_dielectric: f64,
    solvent_dielectric: f64,
    gamma: f64,
) -> GridField<f64> {
    let spacing = frame.spacing();
    let factor = 0.5 * (solvent_dielectric - solute_dielectric) / gamma;
    let mut force = GridField::filled(potential.dims(), 0.0);
    for (i, j, k) in potential.interior_indices() {
        let grad = central_gradient(potential, &spacing, i, j, k);
        force.set(i, j, k, factor * grad.norm_squared());
    }
    force
}

fn central_gradient(
    field: &GridField<f64>,
    spacing: &Vector3<f64>,
    i: usize,
    j: usize,
    k: usize,
) -> Vector3<f64> {
    Vector3::new(
        (field.get(i + 1, j, k) - field.get(i - 1, j, k)) / (2.0 * spacing.x),
        (field.get(i, j + 1, k) - field.get(i, j - 1, k)) / (2.0 * spacing.y),
        (field.get(i, j, k + 1) - field.get(i, j, k - 1)) / (2.0 * spacing.z),
    )
}

/// Regularized mean-curvature term plus upwind advection at an interior node.
fn flow_rate(
    s: &GridField<f64>,
    v: &GridField<f64>,
    h: &Vector3<f64>,
    i: usize,
    j: usize,
    k: usize,
) -> f64 {
    let c = s.get(i, j, k);
    let (xp, xm) = (s.get(i + 1, j, k), s.get(i - 1, j, k));
    let (yp, ym) = (s.get(i, j + 1, k), s.get(i, j - 1, k));
    let (zp, zm) = (s.get(i, j, k + 1), s.get(i, j, k - 1));

    let sx = (xp - xm) / (2.0 * h.x);
    let sy = (yp - ym) / (2.0 * h.y);
    let sz = (zp - zm) / (2.0 * h.z);
    let sxx = (xp - 2.0 * c + xm) / (h.x * h.x);
    let syy = (yp - 2.0 * c + ym) / (h.y * h.y);
    let szz = (zp - 2.0 * c + zm) / (h.z * h.z);
    let sxy = (s.get(i + 1, j + 1, k) - s.get(i + 1, j - 1, k) - s.get(i - 1, j + 1, k)
        + s.get(i - 1, j - 1, k))
        / (4.0 * h.x * h.y);
    let sxz = (s.get(i + 1, j, k + 1) - s.get(i + 1, j, k - 1) - s.get(i - 1, j, k + 1)
        + s.get(i - 1, j, k - 1))
        / (4.0 * h.x * h.z);
    let syz = (s.get(i, j + 1, k + 1) - s.get(i, j + 1, k - 1) - s.get(i, j - 1, k + 1)
        + s.get(i, j - 1, k - 1))
        / (4.0 * h.y * h.z);

    let (sx2, sy2, sz2) = (sx * sx, sy * sy, sz * sz);
    let curvature = (sxx * (1.0 + sy2 + sz2) + syy * (1.0 + sx2 + sz2) + szz * (1.0 + sx2 + sy2)
        - 2.0 * (sx * sy * sxy + sx * sz * sxz + sy * sz * syz))
        / (1.0 + sx2 + sy2 + sz2);

    // One-sided difference against the direction in which the driving field grows.
    let upwind = |plus: f64, minus: f64, v_plus: f64, v_minus: f64, step: f64| {
        if v_plus - v_minus >= 0.0 {
            (c - minus) / step
        } else {
            (plus - c) / step
        }
    };
    let ux = upwind(xp, xm, v.get(i + 1, j, k), v.get(i - 1, j, k), h.x);
    let uy = upwind(yp, ym, v.get(i, j + 1, k), v.get(i, j - 1, k), h.y);
    let uz = upwind(zp, zm, v.get(i, j, k + 1), v.get(i, j, k - 1), h.z);

    curvature + v.get(i, j, k) * (1.0 + ux * ux + uy * uy + uz * uz).sqrt()
}

/// Nodes of `axis` within `radius` of `center`, clamped to the axis.
fn node_range(axis: &Axis, center: f64, radius: f64) -> RangeInclusive<usize> {
    let lo = ((center - axis.left - radius) / axis.spacing + 1.0).ceil();
    let hi = ((center - axis.left + radius) / axis.spacing + 1.0).floor();
    let lo = lo.max(1.0) as usize;
    let hi = hi.min(axis.count as f64);
    if hi < 1.0 {
        return 1..=0;
    }
    lo..=hi as usize
}

fn rasterize_spheres(frame: &GridFrame, atoms: &AtomSet) -> (GridField<f64>, GridField<f64>) {
    let mut accessibility = GridField::filled(frame.dims(), 1.0);
    let mut indicator = GridField::filled(frame.dims(), 0.0);

    for atom in atoms {
        let center = atom.position;
        let r2 = atom.radius * atom.radius;
        for k in node_range(frame.z(), center.z, atom.radius) {
            let dz = frame.z().value(k) - center.z;
            let rxy2 = (r2 - dz * dz).abs();
            for j in node_range(frame.y(), center.y, rxy2.sqrt()) {
                let dy = frame.y().value(j) - center.y;
                let rx = (rxy2 - dy * dy).abs().sqrt();
                for i in node_range(frame.x(), center.x, rx) {
                    accessibility.set(i, j, k, 0.0);
                    indicator.set(i, j, k, SURFACE_SCALE);
                }
            }
        }
    }

    (accessibility, indicator)
}

fn dispersion_fields(
    frame: &GridFrame,
    atoms: &AtomSet,
    params: &DispersionParams,
    accessibility: &GridField<f64>,
) -> (GridField<f64>, GridField<f64>) {
    let nodes: Vec<(usize, usize, usize)> = accessibility.indices().collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = nodes.iter();

    #[cfg(feature = "parallel")]
    let iterator = nodes.par_iter();

    let potentials: Vec<SplitPotential> = iterator
        .map(|&(i, j, k)| {
            if frame.is_boundary(i, j, k) || accessibility.get(i, j, k) == 0.0 {
                SplitPotential::default()
            } else {
                params.potential_at(atoms, &frame.position(i, j, k))
            }
        })
        .collect();

    // `potentials` follows the storage order of `accessibility`.
    let dims = accessibility.dims();
    let at = |i, j, k| potentials[accessibility.flat_index(i, j, k)];
    let repulsive = GridField::from_fn(dims, |i, j, k| at(i, j, k).repulsive);
    let attractive = GridField::from_fn(dims, |i, j, k| at(i, j, k).attractive);
    (repulsive, attractive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::SolventModel;
    use crate::core::models::atom::{Atom, ForceFieldModel};
    use crate::engine::config::GeoflowConfig;
    use nalgebra::Point3;

    const TOLERANCE: f64 = 1e-10;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn cube_frame(left: f64, spacing: f64, count: usize) -> GridFrame {
        GridFrame::from_axes(
            Axis::new(left, spacing, count),
            Axis::new(left, spacing, count),
            Axis::new(left, spacing, count),
        )
    }

    fn solvent(vdw_dispersion: bool, wca_split: bool) -> SolventModel {
        SolventModel {
            force_field: ForceFieldModel::Zap9,
            vdw_dispersion,
            solvent_radius: 1.5828,
            probe_radius: 0.0,
            water_well_depth: 0.1554,
            wca_split,
        }
    }

    fn single_atom(radius: f64) -> AtomSet {
        [Atom::new(Point3::origin(), radius, 0.0)].into_iter().collect()
    }

    fn evolver_for<'a>(frame: &'a GridFrame, atoms: &AtomSet, model: SolventModel) -> SurfaceEvolver<'a> {
        SurfaceEvolver::new(frame, atoms, &DispersionParams::derive(atoms, &model))
    }

    #[test]
    fn indicator_matches_brute_force_sphere_membership() {
        let frame = cube_frame(-3.0, 0.5, 13);
        let atoms = single_atom(1.2);
        let evolver = evolver_for(&frame, &atoms, solvent(false, true));

        for (i, j, k) in evolver.indicator().indices() {
            let inside = frame.position(i, j, k).coords.norm_squared() <= 1.44;
            let expected = if inside { SURFACE_SCALE } else { 0.0 };
            assert_eq!(evolver.indicator().get(i, j, k), expected, "node ({i}, {j}, {k})");
            assert_eq!(
                evolver.accessibility().get(i, j, k),
                if inside { 0.0 } else { 1.0 }
            );
        }
    }

    #[test]
    fn spheres_crossing_the_grid_edge_are_clamped() {
        let frame = cube_frame(0.0, 0.5, 5);
        let atoms: AtomSet = [Atom::new(Point3::new(0.0, 0.0, 0.0), 0.6, 0.0)]
            .into_iter()
            .collect();
        let evolver = evolver_for(&frame, &atoms, solvent(false, true));
        assert_eq!(evolver.indicator().get(1, 1, 1), SURFACE_SCALE);
        assert_eq!(evolver.indicator().get(2, 1, 1), SURFACE_SCALE);
        assert_eq!(evolver.indicator().get(2, 2, 1), 0.0);
    }

    #[test]
    fn time_step_follows_cell_volume() {
        let frame = cube_frame(0.0, 0.5, 5);
        let evolver = evolver_for(&frame, &single_atom(0.5), solvent(false, true));
        assert!(f64_approx_equal(evolver.time_step(), 0.25 / 4.5));
    }

    #[test]
    fn driving_field_without_dispersion_is_uniform_pressure() {
        let frame = cube_frame(-3.0, 0.5, 13);
        let evolver = evolver_for(&frame, &single_atom(1.2), solvent(false, true));
        let physics = GeoflowConfig::default().physics;
        let field = evolver.driving_field(&physics, None);
        let expected = -physics.pressure / physics.gamma;
        assert!(field.as_slice().iter().all(|&v| f64_approx_equal(v, expected)));
    }

    #[test]
    fn driving_field_subtracts_electrostatic_force() {
        let frame = cube_frame(-3.0, 0.5, 13);
        let evolver = evolver_for(&frame, &single_atom(1.2), solvent(false, true));
        let physics = GeoflowConfig::default().physics;
        let force = GridField::filled(frame.dims(), 5.0);
        let field = evolver.driving_field(&physics, Some(&force));
        let expected = -physics.pressure / physics.gamma - 5.0;
        assert!(f64_approx_equal(field.get(4, 5, 6), expected));
    }

    #[test]
    fn dispersion_potentials_vanish_inside_atoms_and_on_faces() {
        let frame = cube_frame(-4.0, 0.5, 17);
        let atoms = single_atom(1.5);
        let evolver = evolver_for(&frame, &atoms, solvent(true, true));

        assert_eq!(evolver.attractive_potential().get(9, 9, 9), 0.0);
        assert_eq!(evolver.attractive_potential().get(1, 9, 9), 0.0);
        assert!(evolver.attractive_potential().get(9, 9, 14) < 0.0);
    }

    #[test]
    fn dispersion_fields_match_the_pointwise_potential_at_accessible_nodes() {
        let frame = cube_frame(-4.0, 0.5, 17);
        let atoms = single_atom(1.5);
        let model = solvent(true, false);
        let params = DispersionParams::derive(&atoms, &model);
        let evolver = evolver_for(&frame, &atoms, model);

        for node in [(9, 9, 14), (9, 13, 12), (15, 9, 9), (2, 2, 2)] {
            let (i, j, k) = node;
            let expected = params.potential_at(&atoms, &frame.position(i, j, k));
            assert_eq!(evolver.repulsive_potential()[node], expected.repulsive);
            assert_eq!(evolver.attractive_potential()[node], expected.attractive);
        }
        assert!(evolver.attractive_potential().get(15, 9, 9) < 0.0);
        assert!(
            evolver
                .repulsive_potential()
                .as_slice()
                .iter()
                .any(|&v| v != 0.0)
        );
    }

    #[test]
    fn wca_driving_field_ignores_repulsion() {
        let frame = cube_frame(-4.0, 0.5, 17);
        let atoms = single_atom(1.5);
        let physics = GeoflowConfig::default().physics;
        let wca = evolver_for(&frame, &atoms, solvent(true, true));
        let plain = evolver_for(&frame, &atoms, solvent(true, false));

        let node = (9, 9, 13);
        let base = -physics.pressure / physics.gamma;
        let density = physics.bulk_density / physics.gamma;
        assert!(f64_approx_equal(
            wca.driving_field(&physics, None).get(9, 9, 13),
            base + density * wca.attractive_potential()[node]
        ));
        assert!(f64_approx_equal(
            plain.driving_field(&physics, None).get(9, 9, 13),
            base + density * (plain.attractive_potential()[node] + plain.repulsive_potential()[node])
        ));
    }

    #[test]
    fn evolution_keeps_solute_pinned_and_values_bounded() {
        let frame = cube_frame(-3.0, 0.5, 13);
        let atoms = single_atom(1.2);
        let evolver = evolver_for(&frame, &atoms, solvent(false, true));
        let physics = GeoflowConfig::default().physics;
        let driving = evolver.driving_field(&physics, None);

        let mut surface = evolver.indicator().clone();
        let steps = evolver.evolve(&mut surface, &driving, 1.0);

        assert_eq!(steps, (1.0 / evolver.time_step()).ceil() as usize + 1);
        for (i, j, k) in surface.indices() {
            let value = surface.get(i, j, k);
            assert!((0.0..=SURFACE_SCALE).contains(&value));
            if evolver.accessibility().get(i, j, k) == 0.0 {
                assert_eq!(value, SURFACE_SCALE);
            }
            if frame.is_boundary(i, j, k) {
                assert_eq!(value, 0.0);
            }
        }
    }

    #[test]
    fn curvature_fills_nodes_adjacent_to_the_sphere() {
        let frame = cube_frame(-3.0, 0.5, 13);
        let atoms = single_atom(1.2);
        let evolver = evolver_for(&frame, &atoms, solvent(false, true));
        let driving = GridField::filled(frame.dims(), 0.0);

        let mut surface = evolver.indicator().clone();
        evolver.evolve(&mut surface, &driving, 0.5);

        // (1.5, 0, 0) lies just outside the sphere.
        assert!(surface.get(10, 7, 7) > 0.0);
    }

    #[test]
    fn diagnostics_of_indicator_count_solute_nodes() {
        let frame = cube_frame(-3.0, 0.5, 13);
        let atoms = single_atom(1.2);
        let evolver = evolver_for(&frame, &atoms, solvent(false, true));
        let solute = evolver
            .indicator()
            .as_slice()
            .iter()
            .filter(|&&v| v == SURFACE_SCALE)
            .count();

        let diag = evolver.diagnostics(evolver.indicator());
        assert!(f64_approx_equal(diag.volume, solute as f64 * 0.125));
        assert!(diag.area > 0.0);
        assert_eq!(diag.attractive_integral, 0.0);
    }

    #[test]
    fn relax_blends_previous_and_current() {
        let previous = GridField::filled([2, 2, 2], 1000.0);
        let current = GridField::filled([2, 2, 2], 0.0);
        let blended = relax(&previous, &current, 0.25);
        assert!(blended.as_slice().iter().all(|&v| f64_approx_equal(v, 250.0)));
        assert_eq!(relax(&previous, &current, 0.0), current);
    }

    #[test]
    fn electrostatic_force_of_linear_potential_is_uniform_inside() {
        let frame = cube_frame(0.0, 0.5, 5);
        let potential = GridField::from_fn(frame.dims(), |i, _, _| frame.x().value(i) * 2.0);
        let force = electrostatic_force(&frame, &potential, 1.0, 3.0, 0.5);
        assert!(f64_approx_equal(force.get(3, 3, 3), 0.5 * 2.0 * 4.0 / 0.5));
        assert_eq!(force.get(1, 3, 3), 0.0);
    }
}
