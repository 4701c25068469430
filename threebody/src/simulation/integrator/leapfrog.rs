//! Fixed-step kick-drift-kick leapfrog.
//!
//! Cheap and symplectic but only second order; no error estimate, every step
//! is accepted.

use log::debug;

use super::{check_body_count, Integrator, StepOutcome};
use crate::error::Result;
use crate::simulation::params::{check_positive, IntegratorParams};
use crate::simulation::states::System;

#[derive(Debug, Clone)]
pub struct Leapfrog {
    n: usize, // body count the integrator was built for
    time: f64,
    dt: f64,
    initial_dt: f64,
    max_dt: f64,
    last_successful_dt: f64,
    primed: bool, // body accelerations match the current positions
}

impl Leapfrog {
    /// Uses `params.dt` as the fixed step and `params.max_dt` as its ceiling
    pub fn new(sys: &System, params: IntegratorParams) -> Result<Self> {
        params.validate()?;
        check_body_count(sys)?;
        let mut lf = Self {
            n: sys.len(),
            time: 0.0,
            dt: params.dt,
            initial_dt: params.dt,
            max_dt: params.max_dt,
            last_successful_dt: 0.0,
            primed: false,
        };
        lf.reset();
        Ok(lf)
    }

    /// v += a * dt
    fn kick(sys: &mut System, dt: f64) {
        for b in sys.bodies.iter_mut() {
            b.vel += b.acc * dt;
        }
    }

    /// x += v * dt
    fn drift(sys: &mut System, dt: f64) {
        for b in sys.bodies.iter_mut() {
            b.pos += b.vel * dt;
        }
    }
}

impl Integrator for Leapfrog {
    fn step(&mut self, sys: &mut System) -> StepOutcome {
        assert_eq!(sys.len(), self.n, "leapfrog built for {} bodies", self.n);

        // a_n is reused from the previous step unless the state was reset
        if !self.primed {
            sys.compute_accelerations();
            self.primed = true;
        }
        sys.snapshot_last();

        let dt = self.dt;
        let half_dt = 0.5 * dt;

        // Kick: v_n+1/2 = v_n + (dt/2) a_n
        Self::kick(sys, half_dt);
        // Drift: x_n+1 = x_n + dt v_n+1/2
        Self::drift(sys, dt);
        // a_n+1 from x_n+1
        sys.compute_accelerations();
        // Kick: v_n+1 = v_n+1/2 + (dt/2) a_n+1
        Self::kick(sys, half_dt);

        self.time += dt;
        self.last_successful_dt = dt;
        StepOutcome::Accepted
    }

    fn reset(&mut self) {
        self.time = 0.0;
        self.last_successful_dt = 0.0;
        self.dt = self.initial_dt.min(self.max_dt);
        self.primed = false;
        debug!("leapfrog reset, dt = {}", self.dt);
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn last_successful_dt(&self) -> f64 {
        self.last_successful_dt
    }

    fn set_dt(&mut self, dt: f64) -> Result<()> {
        check_positive("dt", dt)?;
        self.dt = dt.min(self.max_dt);
        Ok(())
    }

    fn max_dt(&self) -> f64 {
        self.max_dt
    }

    fn set_max_dt(&mut self, max_dt: f64) -> Result<()> {
        check_positive("max_dt", max_dt)?;
        self.max_dt = max_dt;
        if self.dt > max_dt {
            self.dt = max_dt;
        }
        Ok(())
    }
}
