use thiserror::Error;

use super::config::ConfigError;
use super::solver::SolverError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Not implemented: {feature}")]
    Unimplemented { feature: String },

    #[error("Atom set is empty; nothing to solvate")]
    EmptyAtomSet,

    #[error("Charge of atom {atom} falls outside the grid")]
    ChargeOutsideGrid { atom: usize },

    #[error("Linear solve failed: {0}")]
    Solver(#[from] SolverError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn unimplemented(feature: impl Into<String>) -> Self {
        Self::Unimplemented {
            feature: feature.into(),
        }
    }
}
