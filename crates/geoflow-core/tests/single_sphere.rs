use geoflow::core::io::traits::AtomFile;
use geoflow::core::io::xyzr::XyzrFile;
use geoflow::core::models::atom::{Atom, AtomSet};
use geoflow::engine::config::GeoflowConfig;
use geoflow::engine::progress::ProgressReporter;
use geoflow::workflows::solvation::{self, SolvationResult};
use nalgebra::Point3;
use std::f64::consts::PI;
use std::io::Write;

const RADIUS: f64 = 2.0;

fn sphere_volume() -> f64 {
    4.0 / 3.0 * PI * RADIUS.powi(3)
}

fn solvate_neutral_sphere(spacing: f64) -> SolvationResult {
    let atoms: AtomSet = [Atom::new(Point3::origin(), RADIUS, 0.0)].into_iter().collect();
    let config = GeoflowConfig::builder()
        .uniform_spacing(spacing)
        .build()
        .unwrap();
    solvation::run(&atoms, &config, &ProgressReporter::new()).unwrap()
}

fn relative_volume_error(result: &SolvationResult) -> f64 {
    (result.volume - sphere_volume()).abs() / sphere_volume()
}

#[test]
fn neutral_sphere_volume_converges_to_the_exact_volume() {
    let coarse = solvate_neutral_sphere(0.5);
    let fine = solvate_neutral_sphere(0.25);

    assert!(coarse.converged);
    assert!(fine.converged);

    let coarse_error = relative_volume_error(&coarse);
    let fine_error = relative_volume_error(&fine);
    assert!(coarse_error < 0.05, "coarse relative error {coarse_error}");
    assert!(fine_error < 0.02, "fine relative error {fine_error}");
    assert!(fine_error < coarse_error);
}

#[test]
fn neutral_sphere_energy_is_purely_nonpolar() {
    let result = solvate_neutral_sphere(0.5);
    let config = GeoflowConfig::default();

    assert_eq!(result.electrostatic, 0.0);
    let expected = config.physics.gamma * result.area + config.physics.pressure * result.volume;
    assert!((result.nonpolar - expected).abs() < 1e-12);
    assert!((result.total - result.nonpolar).abs() < 1e-12);
    assert!(result.area > 0.8 * 4.0 * PI * RADIUS * RADIUS);
}

#[test]
fn atoms_read_from_file_give_the_same_result_as_in_memory_atoms() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "0.0 0.0 0.0 {RADIUS} 0.0").unwrap();
    file.flush().unwrap();

    let atoms = XyzrFile::read_from_path(file.path()).unwrap();
    let config = GeoflowConfig::builder().uniform_spacing(0.5).build().unwrap();
    let from_file = solvation::run(&atoms, &config, &ProgressReporter::new()).unwrap();

    assert_eq!(from_file, solvate_neutral_sphere(0.5));
}
