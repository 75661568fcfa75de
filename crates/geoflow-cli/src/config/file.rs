use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Grid spacing given either as one value for all axes or as `[hx, hy, hz]`.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum FileSpacing {
    Uniform(f64),
    PerAxis([f64; 3]),
}

impl FileSpacing {
    pub fn to_array(self) -> [f64; 3] {
        match self {
            FileSpacing::Uniform(h) => [h; 3],
            FileSpacing::PerAxis(spacing) => spacing,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileGridConfig {
    pub spacing: Option<FileSpacing>,
    pub padding: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileModelConfig {
    pub force_field: Option<String>,
    pub vdw_dispersion: Option<bool>,
    pub probe_radius: Option<f64>,
    pub radius_scale: Option<f64>,
    pub solvent_radius: Option<f64>,
    pub water_well_depth: Option<f64>,
    pub wca_split: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePhysicsConfig {
    pub gamma: Option<f64>,
    pub pressure: Option<f64>,
    pub bulk_density: Option<f64>,
    pub solute_dielectric: Option<f64>,
    pub solvent_dielectric: Option<f64>,
    pub boundary_condition: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileFlowConfig {
    pub total_time: Option<f64>,
    pub relaxation: Option<f64>,
    pub inherit_surface: Option<bool>,
    pub time_integration: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConvergenceConfig {
    pub max_iterations: Option<usize>,
    pub solvation_tolerance: Option<f64>,
    pub solver_tolerance: Option<f64>,
    pub solver_max_iterations: Option<usize>,
}

/// A partially specified run configuration as read from TOML.
///
/// Every section and key is optional; anything left out falls back to the
/// library defaults when the final configuration is built.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub grid: Option<FileGridConfig>,
    pub model: Option<FileModelConfig>,
    pub physics: Option<FilePhysicsConfig>,
    pub flow: Option<FileFlowConfig>,
    pub convergence: Option<FileConvergenceConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_all_sections_with_kebab_case_keys() {
        let config = FileConfig::from_toml_str(
            r#"
            [grid]
            spacing = 0.5
            padding = 2.0

            [model]
            force-field = "opls"
            vdw-dispersion = true
            wca-split = false

            [physics]
            gamma = 0.0002
            boundary-condition = "mdh"

            [flow]
            total-time = 4.0
            inherit-surface = false

            [convergence]
            max-iterations = 12
            solver-tolerance = 1e-6
            "#,
        )
        .unwrap();

        let grid = config.grid.unwrap();
        assert_eq!(grid.spacing, Some(FileSpacing::Uniform(0.5)));
        assert_eq!(grid.padding, Some(2.0));
        let model = config.model.unwrap();
        assert_eq!(model.force_field.as_deref(), Some("opls"));
        assert_eq!(model.vdw_dispersion, Some(true));
        assert_eq!(model.wca_split, Some(false));
        assert_eq!(model.probe_radius, None);
        let physics = config.physics.unwrap();
        assert_eq!(physics.gamma, Some(0.0002));
        assert_eq!(physics.boundary_condition.as_deref(), Some("mdh"));
        let flow = config.flow.unwrap();
        assert_eq!(flow.total_time, Some(4.0));
        assert_eq!(flow.inherit_surface, Some(false));
        let convergence = config.convergence.unwrap();
        assert_eq!(convergence.max_iterations, Some(12));
        assert_eq!(convergence.solver_tolerance, Some(1e-6));
    }

    #[test]
    fn spacing_accepts_per_axis_arrays() {
        let config = FileConfig::from_toml_str("[grid]\nspacing = [0.25, 0.3, 0.35]\n").unwrap();
        let spacing = config.grid.unwrap().spacing.unwrap();
        assert_eq!(spacing.to_array(), [0.25, 0.3, 0.35]);
        assert_eq!(FileSpacing::Uniform(0.4).to_array(), [0.4; 3]);
    }

    #[test]
    fn empty_document_yields_no_sections() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert!(config.grid.is_none());
        assert!(config.convergence.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml_str("[grid]\nspacingg = 0.5\n").is_err());
        assert!(FileConfig::from_toml_str("[solver]\ntolerance = 0.1\n").is_err());
    }

    #[test]
    fn from_file_wraps_parse_errors_with_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[physics]\ngamma = \"not a number\"\n").unwrap();

        match FileConfig::from_file(&path) {
            Err(CliError::FileParsing { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected FileParsing error, got {other:?}"),
        }
    }

    #[test]
    fn from_file_reports_missing_files_as_io_errors() {
        let dir = tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
