use crate::cli::RunArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use geoflow::{
    core::io::{traits::AtomFile, xyzr::XyzrFile},
    engine::progress::ProgressReporter,
    workflows::{self, solvation::SolvationResult},
};
use std::path::Path;
use tracing::{info, warn};

pub async fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args)?;

    info!("Loading atoms from {:?}", &app_config.input_path);
    let atoms =
        XyzrFile::read_from_path(&app_config.input_path).map_err(|e| CliError::FileParsing {
            path: app_config.input_path.clone(),
            source: e.into(),
        })?;
    info!(
        "Loaded {} atom(s) with total charge {:.4}.",
        atoms.len(),
        atoms.total_charge()
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting geometric-flow solvation...");
    info!("Invoking the core solvation workflow...");

    let result = tokio::task::block_in_place(|| {
        workflows::solvation::run(&atoms, &app_config.core_config, &reporter)
    })?;

    if !result.converged {
        warn!(
            "Solvation energy did not converge within {} iteration(s).",
            result.iterations
        );
        println!(
            "Warning: solvation did not converge within {} iteration(s); reporting the last iterate.",
            result.iterations
        );
    }

    print_summary(&result);

    if let Some(output_path) = &app_config.output_path {
        write_result(&result, output_path)?;
        println!("✓ Result written to: {}", output_path.display());
    }

    Ok(())
}

fn print_summary(result: &SolvationResult) {
    let [nx, ny, nz] = result.grid_dimensions;
    println!("Grid: {nx} x {ny} x {nz} nodes, {} iteration(s)", result.iterations);
    println!("  Electrostatic energy:  {:>14.6} kcal/mol", result.electrostatic);
    println!("  Nonpolar energy:       {:>14.6} kcal/mol", result.nonpolar);
    println!("    Surface term:        {:>14.6} kcal/mol", result.energy.surface);
    println!(
        "    Pressure-volume:     {:>14.6} kcal/mol",
        result.energy.pressure_volume
    );
    println!("    Dispersion:          {:>14.6} kcal/mol", result.energy.dispersion);
    println!("  Total solvation:       {:>14.6} kcal/mol", result.total);
    println!("  Area: {:.4} A^2, Volume: {:.4} A^3", result.area, result.volume);
}

fn write_result(result: &SolvationResult, path: &Path) -> Result<()> {
    info!("Writing result to {:?}", path);
    let content = toml::to_string(result).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, content)?;
    Ok(())
}
