//! High-level runtime engine settings
//!
//! Selects the integrator and carries its control parameters into
//! [`Simulation`](crate::Simulation).

use crate::configuration::config::IntegratorConfig;
use crate::simulation::params::IntegratorParams;

#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub integrator: IntegratorConfig, // ias15 or leapfrog
    pub params: IntegratorParams, // tolerance, safety factor, step bounds
}
