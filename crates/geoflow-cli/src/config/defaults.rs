use geoflow::engine::config::{
    ConvergenceConfig, FlowConfig, GeoflowConfig, GridConfig, ModelConfig, PhysicsConfig,
};

/// Values used for every key that neither the command line nor the
/// configuration file provides.
pub struct DefaultsConfig {
    pub grid: GridConfig,
    pub model: ModelConfig,
    pub physics: PhysicsConfig,
    pub flow: FlowConfig,
    pub convergence: ConvergenceConfig,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let GeoflowConfig {
            grid,
            model,
            physics,
            flow,
            convergence,
        } = GeoflowConfig::default();
        Self {
            grid,
            model,
            physics,
            flow,
            convergence,
        }
    }
}
