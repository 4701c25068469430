//! Numerical parameters for the integrators
//!
//! `IntegratorParams` holds runtime settings:
//! - error tolerance `epsilon` (0 turns step-size control off),
//! - safety factor bounding how fast the step may shrink or grow,
//! - step floor, ceiling and the initial trial step
//!
//! `RunParameters` holds the driver's pacing: run length, animation rate and
//! the per-frame substep budget

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorParams {
    pub epsilon: f64, // error tolerance, 0 disables adaptivity
    pub safety_factor: f64, // in (0, 1)
    pub min_dt: f64, // step floor
    pub max_dt: f64, // step ceiling
    pub dt: f64, // initial trial step after a reset
}

impl Default for IntegratorParams {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            safety_factor: 0.25,
            min_dt: 1e-12,
            max_dt: 1e300,
            dt: 0.01,
        }
    }
}

impl IntegratorParams {
    /// Check every field; the first violation is reported
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if !(self.safety_factor > 0.0 && self.safety_factor < 1.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "safety_factor must lie in (0, 1), got {}",
                self.safety_factor
            )));
        }
        check_positive("min_dt", self.min_dt)?;
        check_positive("max_dt", self.max_dt)?;
        check_positive("dt", self.dt)?;
        if self.min_dt > self.max_dt {
            return Err(ConfigError::InvalidParameter(format!(
                "min_dt ({}) exceeds max_dt ({})",
                self.min_dt, self.max_dt
            )));
        }
        Ok(())
    }

    /// Whether step-size control is active
    pub fn adaptive(&self) -> bool {
        self.epsilon > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub t_end: f64, // run length in dynamical timescales
    pub seconds_per_timescale: f64, // wall seconds per timescale
    pub fps: f64, // frames per wall second
    pub max_substeps: usize, // integrator calls allowed per frame
    pub center: bool, // move to the center-of-momentum frame first
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            t_end: 100.0,
            seconds_per_timescale: 5.0,
            fps: 24.0,
            max_substeps: 10_000,
            center: true,
        }
    }
}

impl RunParameters {
    pub fn validate(&self) -> Result<()> {
        check_positive("t_end", self.t_end)?;
        check_positive("seconds_per_timescale", self.seconds_per_timescale)?;
        check_positive("fps", self.fps)?;
        if self.max_substeps == 0 {
            return Err(ConfigError::InvalidParameter(
                "max_substeps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}
