//! Error types for building systems, integrators and scenarios.
//!
//! Step rejection is not an error; it is reported through
//! [`StepOutcome`](crate::simulation::integrator::StepOutcome).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Too few bodies: need at least {needed}, found {found}")]
    TooFewBodies { needed: usize, found: usize },

    #[error("Invalid body {index}: {reason}")]
    InvalidBody { index: usize, reason: String },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
