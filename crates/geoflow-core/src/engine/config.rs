use crate::core::forcefield::params::SolventModel;
use crate::core::models::atom::ForceFieldModel;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Potential assigned to the outer faces of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    Zero,
    SingleDebyeHuckel,
    /// Superposition of one Debye-Huckel sphere per atom.
    #[default]
    MultipleDebyeHuckel,
    Focus,
    Membrane,
    Map,
}

impl FromStr for BoundaryCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "zero" => Ok(Self::Zero),
            "1" | "sdh" => Ok(Self::SingleDebyeHuckel),
            "2" | "mdh" => Ok(Self::MultipleDebyeHuckel),
            "4" | "focus" => Ok(Self::Focus),
            "5" | "mem" | "membrane" => Ok(Self::Membrane),
            "6" | "map" => Ok(Self::Map),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Zero => "zero",
            Self::SingleDebyeHuckel => "sdh",
            Self::MultipleDebyeHuckel => "mdh",
            Self::Focus => "focus",
            Self::Membrane => "mem",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// Time-stepping scheme of the surface evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeIntegration {
    #[default]
    ExplicitUpwind,
    Adi,
}

impl FromStr for TimeIntegration {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "explicit" | "explicit-upwind" | "upwind" => Ok(Self::ExplicitUpwind),
            "adi" => Ok(Self::Adi),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TimeIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitUpwind => f.write_str("explicit-upwind"),
            Self::Adi => f.write_str("adi"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Node spacing along x, y and z in Angstrom.
    pub spacing: [f64; 3],
    /// Distance kept between the atom spheres and the grid faces.
    pub padding: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConfig {
    pub force_field: ForceFieldModel,
    pub vdw_dispersion: bool,
    pub probe_radius: f64,
    pub radius_scale: f64,
    pub solvent_radius: f64,
    pub water_well_depth: f64,
    pub wca_split: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Surface tension in kcal/(mol Angstrom^2).
    pub gamma: f64,
    pub pressure: f64,
    pub bulk_density: f64,
    pub solute_dielectric: f64,
    pub solvent_dielectric: f64,
    pub boundary_condition: BoundaryCondition,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowConfig {
    pub total_time: f64,
    /// Weight of the previous surface when blending successive iterations.
    pub relaxation: f64,
    pub inherit_surface: bool,
    pub time_integration: TimeIntegration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceConfig {
    pub max_iterations: usize,
    pub solvation_tolerance: f64,
    pub solver_tolerance: f64,
    pub solver_max_iterations: usize,
}

/// Complete, validated parameter set of a solvation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoflowConfig {
    pub grid: GridConfig,
    pub model: ModelConfig,
    pub physics: PhysicsConfig,
    pub flow: FlowConfig,
    pub convergence: ConvergenceConfig,
}

impl Default for GeoflowConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig {
                spacing: [0.25; 3],
                padding: 1.90,
            },
            model: ModelConfig {
                force_field: ForceFieldModel::Zap9,
                vdw_dispersion: false,
                probe_radius: 0.0,
                radius_scale: 1.0,
                solvent_radius: 1.5828,
                water_well_depth: 0.1554,
                wca_split: true,
            },
            physics: PhysicsConfig {
                gamma: 1e-4,
                pressure: 0.008,
                bulk_density: 0.03347,
                solute_dielectric: 1.5,
                solvent_dielectric: 80.0,
                boundary_condition: BoundaryCondition::MultipleDebyeHuckel,
            },
            flow: FlowConfig {
                total_time: 3.5,
                relaxation: 0.5,
                inherit_surface: true,
                time_integration: TimeIntegration::ExplicitUpwind,
            },
            convergence: ConvergenceConfig {
                max_iterations: 20,
                solvation_tolerance: 0.01,
                solver_tolerance: 1e-4,
                solver_max_iterations: 1000,
            },
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl GeoflowConfig {
    pub fn builder() -> GeoflowConfigBuilder {
        GeoflowConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(h) = self.grid.spacing.iter().find(|h| !(**h > 0.0 && h.is_finite())) {
            return Err(invalid("grid.spacing", format!("must be positive, got {h}")));
        }
        if self.grid.padding < 0.0 {
            return Err(invalid("grid.padding", "must not be negative"));
        }
        if self.physics.gamma == 0.0 || !self.physics.gamma.is_finite() {
            return Err(invalid("physics.gamma", "must be a non-zero finite number"));
        }
        if !(self.physics.solute_dielectric > 0.0) {
            return Err(invalid("physics.solute-dielectric", "must be positive"));
        }
        if !(self.physics.solvent_dielectric > 0.0) {
            return Err(invalid("physics.solvent-dielectric", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.flow.relaxation) {
            return Err(invalid(
                "flow.relaxation",
                format!("must lie in [0, 1], got {}", self.flow.relaxation),
            ));
        }
        if !(self.model.radius_scale > 0.0) {
            return Err(invalid("model.radius-scale", "must be positive"));
        }
        if self.convergence.max_iterations == 0 {
            return Err(invalid("convergence.max-iterations", "must be at least 1"));
        }
        if self.convergence.solver_max_iterations == 0 {
            return Err(invalid("convergence.solver-max-iterations", "must be at least 1"));
        }
        Ok(())
    }

    pub fn solvent_model(&self) -> SolventModel {
        SolventModel {
            force_field: self.model.force_field,
            vdw_dispersion: self.model.vdw_dispersion,
            solvent_radius: self.model.solvent_radius,
            probe_radius: self.model.probe_radius,
            water_well_depth: self.model.water_well_depth,
            wca_split: self.model.wca_split,
        }
    }
}

/// Collects overrides on top of [`GeoflowConfig::default`].
#[derive(Debug, Default, Clone)]
pub struct GeoflowConfigBuilder {
    spacing: Option<[f64; 3]>,
    padding: Option<f64>,
    force_field: Option<ForceFieldModel>,
    vdw_dispersion: Option<bool>,
    probe_radius: Option<f64>,
    radius_scale: Option<f64>,
    solvent_radius: Option<f64>,
    water_well_depth: Option<f64>,
    wca_split: Option<bool>,
    gamma: Option<f64>,
    pressure: Option<f64>,
    bulk_density: Option<f64>,
    solute_dielectric: Option<f64>,
    solvent_dielectric: Option<f64>,
    boundary_condition: Option<BoundaryCondition>,
    total_time: Option<f64>,
    relaxation: Option<f64>,
    inherit_surface: Option<bool>,
    time_integration: Option<TimeIntegration>,
    max_iterations: Option<usize>,
    solvation_tolerance: Option<f64>,
    solver_tolerance: Option<f64>,
    solver_max_iterations: Option<usize>,
}

impl GeoflowConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spacing(mut self, spacing: [f64; 3]) -> Self {
        self.spacing = Some(spacing);
        self
    }
    pub fn uniform_spacing(self, h: f64) -> Self {
        self.spacing([h; 3])
    }
    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }
    pub fn force_field(mut self, model: ForceFieldModel) -> Self {
        self.force_field = Some(model);
        self
    }
    pub fn vdw_dispersion(mut self, enabled: bool) -> Self {
        self.vdw_dispersion = Some(enabled);
        self
    }
    pub fn probe_radius(mut self, radius: f64) -> Self {
        self.probe_radius = Some(radius);
        self
    }
    pub fn radius_scale(mut self, scale: f64) -> Self {
        self.radius_scale = Some(scale);
        self
    }
    pub fn solvent_radius(mut self, radius: f64) -> Self {
        self.solvent_radius = Some(radius);
        self
    }
    pub fn water_well_depth(mut self, depth: f64) -> Self {
        self.water_well_depth = Some(depth);
        self
    }
    pub fn wca_split(mut self, enabled: bool) -> Self {
        self.wca_split = Some(enabled);
        self
    }
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }
    pub fn pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }
    pub fn bulk_density(mut self, density: f64) -> Self {
        self.bulk_density = Some(density);
        self
    }
    pub fn solute_dielectric(mut self, eps: f64) -> Self {
        self.solute_dielectric = Some(eps);
        self
    }
    pub fn solvent_dielectric(mut self, eps: f64) -> Self {
        self.solvent_dielectric = Some(eps);
        self
    }
    pub fn boundary_condition(mut self, bc: BoundaryCondition) -> Self {
        self.boundary_condition = Some(bc);
        self
    }
    pub fn total_time(mut self, time: f64) -> Self {
        self.total_time = Some(time);
        self
    }
    pub fn relaxation(mut self, alpha: f64) -> Self {
        self.relaxation = Some(alpha);
        self
    }
    pub fn inherit_surface(mut self, inherit: bool) -> Self {
        self.inherit_surface = Some(inherit);
        self
    }
    pub fn time_integration(mut self, scheme: TimeIntegration) -> Self {
        self.time_integration = Some(scheme);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn solvation_tolerance(mut self, tol: f64) -> Self {
        self.solvation_tolerance = Some(tol);
        self
    }
    pub fn solver_tolerance(mut self, tol: f64) -> Self {
        self.solver_tolerance = Some(tol);
        self
    }
    pub fn solver_max_iterations(mut self, iterations: usize) -> Self {
        self.solver_max_iterations = Some(iterations);
        self
    }

    pub fn build(self) -> Result<GeoflowConfig, ConfigError> {
        let d = GeoflowConfig::default();
        let config = GeoflowConfig {
            grid: GridConfig {
                spacing: self.spacing.unwrap_or(d.grid.spacing),
                padding: self.padding.unwrap_or(d.grid.padding),
            },
            model: ModelConfig {
                force_field: self.force_field.unwrap_or(d.model.force_field),
                vdw_dispersion: self.vdw_dispersion.unwrap_or(d.model.vdw_dispersion),
                probe_radius: self.probe_radius.unwrap_or(d.model.probe_radius),
                radius_scale: self.radius_scale.unwrap_or(d.model.radius_scale),
                solvent_radius: self.solvent_radius.unwrap_or(d.model.solvent_radius),
                water_well_depth: self.water_well_depth.unwrap_or(d.model.water_well_depth),
                wca_split: self.wca_split.unwrap_or(d.model.wca_split),
            },
            physics: PhysicsConfig {
                gamma: self.gamma.unwrap_or(d.physics.gamma),
                pressure: self.pressure.unwrap_or(d.physics.pressure),
                bulk_density: self.bulk_density.unwrap_or(d.physics.bulk_density),
                solute_dielectric: self.solute_dielectric.unwrap_or(d.physics.solute_dielectric),
                solvent_dielectric: self
                    .solvent_dielectric
                    .unwrap_or(d.physics.solvent_dielectric),
                boundary_condition: self
                    .boundary_condition
                    .unwrap_or(d.physics.boundary_condition),
            },
            flow: FlowConfig {
                total_time: self.total_time.unwrap_or(d.flow.total_time),
                relaxation: self.relaxation.unwrap_or(d.flow.relaxation),
                inherit_surface: self.inherit_surface.unwrap_or(d.flow.inherit_surface),
                time_integration: self.time_integration.unwrap_or(d.flow.time_integration),
            },
            convergence: ConvergenceConfig {
                max_iterations: self.max_iterations.unwrap_or(d.convergence.max_iterations),
                solvation_tolerance: self
                    .solvation_tolerance
                    .unwrap_or(d.convergence.solvation_tolerance),
                solver_tolerance: self
                    .solver_tolerance
                    .unwrap_or(d.convergence.solver_tolerance),
                solver_max_iterations: self
                    .solver_max_iterations
                    .unwrap_or(d.convergence.solver_max_iterations),
            },
        };
        config.validate()?;
        Ok(config)
    }
}
