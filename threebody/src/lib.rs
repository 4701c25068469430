pub mod simulation;
pub mod configuration;
pub mod error;

pub use simulation::states::{Body, System, NVec3};
pub use simulation::diagnostics::{plot_bodies, shape_and_size, Shape};
pub use simulation::integrator::{build_integrator, Ias15, Integrator, Leapfrog, StepOutcome};
pub use simulation::params::{IntegratorParams, RunParameters};
pub use simulation::presets::Preset;
pub use simulation::scenario::Scenario;
pub use simulation::driver::{FrameReport, Simulation};

pub use configuration::config::{IntegratorConfig, EngineConfig, ParametersConfig, BodyConfig, ScenarioConfig};

pub use error::{ConfigError, Result};
