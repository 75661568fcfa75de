use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSpacing};
use super::models::AppConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use geoflow::core::models::atom::ForceFieldModel;
use geoflow::engine::config::{BoundaryCondition, GeoflowConfig, TimeIntegration};
use geoflow::engine::error::EngineError;
use std::str::FromStr;
use tracing::debug;

pub fn build_config(args: &RunArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let grid_file = file_config.grid.take().unwrap_or_default();
    let spacing = args
        .grid_spacing
        .map(|h| [h; 3])
        .or(grid_file.spacing.map(FileSpacing::to_array))
        .unwrap_or(defaults.grid.spacing);
    let padding = grid_file.padding.unwrap_or(defaults.grid.padding);

    let model_file = file_config.model.take().unwrap_or_default();
    let force_field = match args.force_field.as_deref().or(model_file.force_field.as_deref()) {
        Some(name) => parse_selector::<ForceFieldModel>("model.force-field", name)?,
        None => defaults.model.force_field,
    };
    let vdw_dispersion = args.vdw_dispersion
        || model_file
            .vdw_dispersion
            .unwrap_or(defaults.model.vdw_dispersion);

    let physics_file = file_config.physics.take().unwrap_or_default();
    let boundary_condition = match physics_file.boundary_condition.as_deref() {
        Some(name) => parse_selector::<BoundaryCondition>("physics.boundary-condition", name)?,
        None => defaults.physics.boundary_condition,
    };

    let flow_file = file_config.flow.take().unwrap_or_default();
    let time_integration = match flow_file.time_integration.as_deref() {
        Some(name) => parse_selector::<TimeIntegration>("flow.time-integration", name)?,
        None => defaults.flow.time_integration,
    };

    let convergence_file = file_config.convergence.take().unwrap_or_default();
    let max_iterations = args
        .max_iterations
        .or(convergence_file.max_iterations)
        .unwrap_or(defaults.convergence.max_iterations);

    let core_config = GeoflowConfig::builder()
        .spacing(spacing)
        .padding(padding)
        .force_field(force_field)
        .vdw_dispersion(vdw_dispersion)
        .probe_radius(model_file.probe_radius.unwrap_or(defaults.model.probe_radius))
        .radius_scale(model_file.radius_scale.unwrap_or(defaults.model.radius_scale))
        .solvent_radius(
            model_file
                .solvent_radius
                .unwrap_or(defaults.model.solvent_radius),
        )
        .water_well_depth(
            model_file
                .water_well_depth
                .unwrap_or(defaults.model.water_well_depth),
        )
        .wca_split(model_file.wca_split.unwrap_or(defaults.model.wca_split))
        .gamma(physics_file.gamma.unwrap_or(defaults.physics.gamma))
        .pressure(physics_file.pressure.unwrap_or(defaults.physics.pressure))
        .bulk_density(
            physics_file
                .bulk_density
                .unwrap_or(defaults.physics.bulk_density),
        )
        .solute_dielectric(
            physics_file
                .solute_dielectric
                .unwrap_or(defaults.physics.solute_dielectric),
        )
        .solvent_dielectric(
            physics_file
                .solvent_dielectric
                .unwrap_or(defaults.physics.solvent_dielectric),
        )
        .boundary_condition(boundary_condition)
        .total_time(flow_file.total_time.unwrap_or(defaults.flow.total_time))
        .relaxation(flow_file.relaxation.unwrap_or(defaults.flow.relaxation))
        .inherit_surface(
            flow_file
                .inherit_surface
                .unwrap_or(defaults.flow.inherit_surface),
        )
        .time_integration(time_integration)
        .max_iterations(max_iterations)
        .solvation_tolerance(
            convergence_file
                .solvation_tolerance
                .unwrap_or(defaults.convergence.solvation_tolerance),
        )
        .solver_tolerance(
            convergence_file
                .solver_tolerance
                .unwrap_or(defaults.convergence.solver_tolerance),
        )
        .solver_max_iterations(
            convergence_file
                .solver_max_iterations
                .unwrap_or(defaults.convergence.solver_max_iterations),
        )
        .build()
        .map_err(EngineError::from)?;

    debug!("Resolved configuration: {:?}", core_config);

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_path: args.output.clone(),
        core_config,
    })
}

fn parse_selector<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| CliError::Config(format!("Unknown value for {}: {}", key, value)))
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn float(key: &str, value: &str) -> Result<Option<f64>> {
    parse_value(key, value, "float").map(Some)
}

fn integer(key: &str, value: &str) -> Result<Option<usize>> {
    parse_value(key, value, "integer").map(Some)
}

fn boolean(key: &str, value: &str) -> Result<Option<bool>> {
    parse_value(key, value, "boolean").map(Some)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        }
        let key = parts[0].trim();
        let value_str = parts[1];

        let (section, name) = key.split_once('.').unwrap_or((key, ""));
        match section {
            "grid" => {
                let grid = config.grid.get_or_insert_with(Default::default);
                match name {
                    "spacing" => {
                        grid.spacing = float(key, value_str)?.map(FileSpacing::Uniform)
                    }
                    "padding" => grid.padding = float(key, value_str)?,
                    _ => return Err(unsupported_key(key)),
                }
            }
            "model" => {
                let model = config.model.get_or_insert_with(Default::default);
                match name {
                    "force-field" => model.force_field = Some(value_str.trim().to_string()),
                    "vdw-dispersion" => model.vdw_dispersion = boolean(key, value_str)?,
                    "probe-radius" => model.probe_radius = float(key, value_str)?,
                    "radius-scale" => model.radius_scale = float(key, value_str)?,
                    "solvent-radius" => model.solvent_radius = float(key, value_str)?,
                    "water-well-depth" => model.water_well_depth = float(key, value_str)?,
                    "wca-split" => model.wca_split = boolean(key, value_str)?,
                    _ => return Err(unsupported_key(key)),
                }
            }
            "physics" => {
                let physics = config.physics.get_or_insert_with(Default::default);
                match name {
                    "gamma" => physics.gamma = float(key, value_str)?,
                    "pressure" => physics.pressure = float(key, value_str)?,
                    "bulk-density" => physics.bulk_density = float(key, value_str)?,
                    "solute-dielectric" => physics.solute_dielectric = float(key, value_str)?,
                    "solvent-dielectric" => physics.solvent_dielectric = float(key, value_str)?,
                    "boundary-condition" => {
                        physics.boundary_condition = Some(value_str.trim().to_string())
                    }
                    _ => return Err(unsupported_key(key)),
                }
            }
            "flow" => {
                let flow = config.flow.get_or_insert_with(Default::default);
                match name {
                    "total-time" => flow.total_time = float(key, value_str)?,
                    "relaxation" => flow.relaxation = float(key, value_str)?,
                    "inherit-surface" => flow.inherit_surface = boolean(key, value_str)?,
                    "time-integration" => {
                        flow.time_integration = Some(value_str.trim().to_string())
                    }
                    _ => return Err(unsupported_key(key)),
                }
            }
            "convergence" => {
                let convergence = config.convergence.get_or_insert_with(Default::default);
                match name {
                    "max-iterations" => convergence.max_iterations = integer(key, value_str)?,
                    "solvation-tolerance" => {
                        convergence.solvation_tolerance = float(key, value_str)?
                    }
                    "solver-tolerance" => convergence.solver_tolerance = float(key, value_str)?,
                    "solver-max-iterations" => {
                        convergence.solver_max_iterations = integer(key, value_str)?
                    }
                    _ => return Err(unsupported_key(key)),
                }
            }
            _ => return Err(unsupported_key(key)),
        }
    }
    Ok(config)
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: {}", key))
}
