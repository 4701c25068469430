//! Time integrators for the N-body system
//!
//! Provides the adaptive 15th-order Gauss-Radau integrator (`Ias15`) and a
//! fixed-step kick-drift-kick leapfrog (`Leapfrog`), both driven through the
//! [`Integrator`] trait. Each integrator owns its clock and scratch state and
//! works on one [`System`] of fixed size for its whole lifetime.

pub mod ias15;
pub mod leapfrog;
pub(crate) mod radau;

pub use ias15::{CorrectorStop, Ias15, Ias15Stats, StepHook, StepReport};
pub use leapfrog::Leapfrog;

use crate::configuration::config::IntegratorConfig;
use crate::error::{ConfigError, Result};
use crate::simulation::params::IntegratorParams;
use crate::simulation::states::System;

/// Result of one call to [`Integrator::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step was committed and time advanced
    Accepted,
    /// The trial was undone; time is unchanged and `dt` was reduced
    Rejected,
}

impl StepOutcome {
    pub fn is_accepted(self) -> bool {
        self == StepOutcome::Accepted
    }
}

/// Common surface of the integrators.
///
/// A driver calls `step` repeatedly; rejection is a normal outcome and the
/// caller simply calls again.
pub trait Integrator {
    /// Advance `sys` by one step.
    ///
    /// Panics if `sys` does not hold the number of bodies the integrator
    /// was built for.
    fn step(&mut self, sys: &mut System) -> StepOutcome;

    /// Zero all history and scratch state, set time back to 0 and restore the
    /// initial trial step. Call whenever the initial conditions change.
    fn reset(&mut self);

    /// Simulation time
    fn time(&self) -> f64;

    /// Current trial step
    fn dt(&self) -> f64;

    /// Size of the last accepted step, 0 before the first one
    fn last_successful_dt(&self) -> f64;

    /// Set the trial step used by the next call to `step`.
    ///
    /// Side effects: the value is clamped to the `max_dt` ceiling, and an
    /// integrator that carries step history rescales it to the new step.
    fn set_dt(&mut self, dt: f64) -> Result<()>;

    fn max_dt(&self) -> f64;

    /// Set the step ceiling.
    ///
    /// Side effect: a current trial step above the new ceiling is lowered
    /// to it immediately.
    fn set_max_dt(&mut self, max_dt: f64) -> Result<()>;
}

/// Build the integrator selected by `kind` for `sys`
pub fn build_integrator(
    kind: &IntegratorConfig,
    sys: &System,
    params: IntegratorParams,
) -> Result<Box<dyn Integrator + Send>> {
    Ok(match kind {
        IntegratorConfig::Ias15 => Box::new(Ias15::new(sys, params)?),
        IntegratorConfig::Leapfrog => Box::new(Leapfrog::new(sys, params)?),
    })
}

/// Integrators need at least one interacting pair
pub(crate) fn check_body_count(sys: &System) -> Result<()> {
    if sys.len() < 2 {
        return Err(ConfigError::TooFewBodies {
            needed: 2,
            found: sys.len(),
        });
    }
    Ok(())
}
