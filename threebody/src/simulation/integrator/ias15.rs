//! # IAS15: adaptive Gauss-Radau integrator
//!
//! Implicit predictor-corrector scheme on the 7 non-trivial Gauss-Radau
//! nodes of each step (plus the step start), giving a method of order 15 in
//! position with an embedded error estimate driving the step size.
//!
//! ## One step
//!
//! 1. Accelerations at the step start are evaluated and the state is copied
//!    into flat `3N` buffers (`pos0`, `vel0`, `acc0`), indexed `3*i + axis`.
//! 2. The divided differences `g` are rebuilt from the polynomial
//!    coefficients `b` carried over from the previous step.
//! 3. Predictor-corrector loop: every sweep visits the nodes `n = 1..=7`,
//!    predicts positions there from `b`, evaluates accelerations, updates
//!    `g[n-1]` and pushes the change into `b[0..n]`. The loop stops once the
//!    change in `b[6]` is below 1e-16 relative to the accelerations, when
//!    it stops improving after the third sweep, or after 12 sweeps.
//! 4. When `epsilon > 0` the size of `b[6]` relative to the accelerations
//!    sets the next step, `dt (epsilon / error)^(1/7)`. A step that would
//!    shrink below `safety_factor` of the current one is rejected and undone.
//! 5. Accepted steps are finalized with compensated summation, committed to
//!    the system, and `b` is extrapolated to the next step size to warm-start
//!    the next corrector loop.
//!
//! The arithmetic of the recurrences keeps the order of the reference
//! scheme so results are reproducible bit for bit.

use log::{debug, trace};

use super::radau::{c_offset, r_offset, C, D, H, R};
use super::{check_body_count, Integrator, StepOutcome};
use crate::error::{ConfigError, Result};
use crate::simulation::params::{check_positive, IntegratorParams};
use crate::simulation::states::System;

/// Predictor-corrector convergence target
const CORRECTOR_TOLERANCE: f64 = 1e-16;
/// Hard cap on predictor-corrector sweeps per step
const MAX_CORRECTOR_ITERATIONS: usize = 12;
/// Bodies with |v|² dt² / r² at or below this are left out of the step error
const STATIONARY_THRESHOLD: f64 = 1e-16;

/// Callback invoked once at the end of every step, accepted or rejected
pub type StepHook = Box<dyn FnMut(&StepReport) + Send>;

/// Why the predictor-corrector loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectorStop {
    Converged,
    Oscillating,
    IterationCap,
}

/// Summary of one step handed to the [`StepHook`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub outcome: StepOutcome,
    pub time: f64, // simulation time after the step
    pub dt_tried: f64, // step attempted
    pub dt_next: f64, // trial step for the next call
    pub iterations: usize, // predictor-corrector sweeps
    pub stop: CorrectorStop,
    pub corrector_error: f64, // last change of b[6] relative to the accelerations
    pub integrator_error: Option<f64>, // None when step-size control is off
}

/// Running counters since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ias15Stats {
    pub accepted: usize,
    pub rejected: usize,
    pub corrector_iterations: usize,
    pub converged: usize,
    pub oscillating: usize,
    pub iteration_cap: usize,
}

pub struct Ias15 {
    n: usize, // bodies
    n3: usize, // 3 * bodies
    params: IntegratorParams,

    time: f64,
    dt: f64, // trial step
    last_successful_dt: f64,

    // flat state at the step start, 3*i + axis
    pos0: Vec<f64>,
    vel0: Vec<f64>,
    acc0: Vec<f64>,
    acc1: Vec<f64>, // accelerations at the current node
    // compensated summation carries
    cspos: Vec<f64>,
    csvel: Vec<f64>,

    g: [Vec<f64>; 7], // divided differences
    b: [Vec<f64>; 7], // polynomial coefficients
    e: [Vec<f64>; 7], // predicted part of b
    b_reset: [Vec<f64>; 7], // b at the last accepted step
    e_reset: [Vec<f64>; 7],

    stats: Ias15Stats,
    hook: Option<StepHook>,
}

fn zeroed7(len: usize) -> [Vec<f64>; 7] {
    std::array::from_fn(|_| vec![0.0; len])
}

impl Ias15 {
    /// Build an integrator sized for `sys`.
    ///
    /// Fails on invalid parameters or fewer than two bodies.
    pub fn new(sys: &System, params: IntegratorParams) -> Result<Self> {
        params.validate()?;
        check_body_count(sys)?;
        let n = sys.len();
        let n3 = 3 * n;
        let mut integrator = Self {
            n,
            n3,
            time: 0.0,
            dt: params.dt,
            last_successful_dt: 0.0,
            params,
            pos0: vec![0.0; n3],
            vel0: vec![0.0; n3],
            acc0: vec![0.0; n3],
            acc1: vec![0.0; n3],
            cspos: vec![0.0; n3],
            csvel: vec![0.0; n3],
            g: zeroed7(n3),
            b: zeroed7(n3),
            e: zeroed7(n3),
            b_reset: zeroed7(n3),
            e_reset: zeroed7(n3),
            stats: Ias15Stats::default(),
            hook: None,
        };
        integrator.reset();
        Ok(integrator)
    }

    pub fn params(&self) -> &IntegratorParams {
        &self.params
    }

    /// Replace the control parameters.
    ///
    /// History is kept; the trial step is clamped to the new ceiling.
    pub fn set_params(&mut self, params: IntegratorParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        if self.dt > self.params.max_dt {
            self.change_trial_step(self.params.max_dt);
        }
        Ok(())
    }

    pub fn stats(&self) -> &Ias15Stats {
        &self.stats
    }

    /// Install a callback run at the end of every step
    pub fn set_hook(&mut self, hook: StepHook) {
        self.hook = Some(hook);
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    /// Switch to a new trial step and re-expand the `b`/`e` history of the
    /// last accepted step for it. Before the first accepted step there is
    /// nothing to re-expand.
    fn change_trial_step(&mut self, dt: f64) {
        if dt == self.dt {
            return;
        }
        self.dt = dt;
        if self.last_successful_dt != 0.0 {
            let ratio = self.dt / self.last_successful_dt;
            self.predict_next_b_and_e(ratio);
        }
    }

    /// Copy body state into the flat start-of-step buffers
    fn load_state(&mut self, sys: &System) {
        for (i, body) in sys.bodies.iter().enumerate() {
            for axis in 0..3 {
                let k = 3 * i + axis;
                self.pos0[k] = body.pos[axis];
                self.vel0[k] = body.vel[axis];
                self.acc0[k] = body.acc[axis];
            }
        }
    }

    /// Write `pos0`/`vel0` back into the bodies
    fn store_state(&self, sys: &mut System) {
        for (i, body) in sys.bodies.iter_mut().enumerate() {
            for axis in 0..3 {
                let k = 3 * i + axis;
                body.pos[axis] = self.pos0[k];
                body.vel[axis] = self.vel0[k];
            }
        }
    }

    /// Divided differences from the current `b`
    fn set_g_from_b(&mut self) {
        let b = &self.b;
        for k in 0..self.n3 {
            self.g[0][k] = b[6][k] * D[15] + b[5][k] * D[10] + b[4][k] * D[6] + b[3][k] * D[3]
                + b[2][k] * D[1] + b[1][k] * D[0] + b[0][k];
            self.g[1][k] = b[6][k] * D[16] + b[5][k] * D[11] + b[4][k] * D[7] + b[3][k] * D[4]
                + b[2][k] * D[2] + b[1][k];
            self.g[2][k] =
                b[6][k] * D[17] + b[5][k] * D[12] + b[4][k] * D[8] + b[3][k] * D[5] + b[2][k];
            self.g[3][k] = b[6][k] * D[18] + b[5][k] * D[13] + b[4][k] * D[9] + b[3][k];
            self.g[4][k] = b[6][k] * D[19] + b[5][k] * D[14] + b[4][k];
            self.g[5][k] = b[6][k] * D[20] + b[5][k];
            self.g[6][k] = b[6][k];
        }
    }

    /// Predict body positions at node `n` from the start state and `b`
    fn predict_positions(&self, n: usize, sys: &mut System) {
        let h = H[n];
        let mut s = [0.0; 9];
        s[0] = self.dt * h;
        s[1] = s[0] * s[0] / 2.0;
        s[2] = s[1] * h / 3.0;
        s[3] = s[2] * h / 2.0;
        s[4] = 3.0 * s[3] * h / 5.0;
        s[5] = 2.0 * s[4] * h / 3.0;
        s[6] = 5.0 * s[5] * h / 7.0;
        s[7] = 3.0 * s[6] * h / 4.0;
        s[8] = 7.0 * s[7] * h / 9.0;

        let b = &self.b;
        for (i, body) in sys.bodies.iter_mut().enumerate() {
            for axis in 0..3 {
                let k = 3 * i + axis;
                let xk = self.cspos[k]
                    + (s[8] * b[6][k]
                        + s[7] * b[5][k]
                        + s[6] * b[4][k]
                        + s[5] * b[3][k]
                        + s[4] * b[2][k]
                        + s[3] * b[1][k]
                        + s[2] * b[0][k]
                        + s[1] * self.acc0[k]
                        + s[0] * self.vel0[k]);
                body.pos[axis] = self.pos0[k] + xk;
            }
        }
    }

    /// One predictor-corrector sweep over the nodes.
    ///
    /// Returns the convergence error: max |Δb[6]| over max |acc1|, both
    /// maxima ignoring exact zeros.
    fn sweep_nodes(&mut self, sys: &mut System) -> f64 {
        let mut corrector_error = 0.0;

        for n in 1..8 {
            self.predict_positions(n, sys);
            sys.compute_accelerations();
            for (i, body) in sys.bodies.iter().enumerate() {
                self.acc1[3 * i] = body.acc[0];
                self.acc1[3 * i + 1] = body.acc[1];
                self.acc1[3 * i + 2] = body.acc[2];
            }

            let ro = r_offset(n);
            let co = if n > 1 { c_offset(n) } else { 0 };
            let mut max_ak = 0.0_f64;
            let mut max_db6 = 0.0_f64;

            for k in 0..self.n3 {
                let previous = self.g[n - 1][k];
                let gk = self.acc1[k] - self.acc0[k];

                // ((gk/r0 - g0)/r1 - g1)/r2 ... nested in node order
                let mut value = gk / R[ro];
                for j in 0..n - 1 {
                    value = (value - self.g[j][k]) / R[ro + 1 + j];
                }
                self.g[n - 1][k] = value;

                let tmp = value - previous;
                for j in 0..n - 1 {
                    self.b[j][k] += tmp * C[co + j];
                }
                self.b[n - 1][k] += tmp;

                if n == 7 {
                    let ak = self.acc1[k].abs();
                    if ak != 0.0 {
                        max_ak = max_ak.max(ak);
                    }
                    let db6 = tmp.abs();
                    if db6 != 0.0 {
                        max_db6 = max_db6.max(db6);
                    }
                }
            }

            if n == 7 {
                corrector_error = max_db6 / max_ak;
            }
        }

        corrector_error
    }

    /// Truncation error estimate driving the step size: max |b[6]| over
    /// max |acc1|, skipping bodies whose motion over the step is negligible
    fn integrator_error(&self, sys: &System) -> f64 {
        let mut max_ak = 0.0_f64;
        let mut max_b6 = 0.0_f64;

        for (i, body) in sys.bodies.iter().enumerate() {
            let r2 = body.pos.norm_squared();
            let v2 = body.vel.norm_squared();

            // NaN (a body at rest at the origin) also falls through
            if (v2 * self.dt * self.dt / r2).abs() > STATIONARY_THRESHOLD {
                for k in 3 * i..3 * i + 3 {
                    let ak = self.acc1[k].abs();
                    if ak != 0.0 {
                        max_ak = max_ak.max(ak);
                    }
                    let b6k = self.b[6][k].abs();
                    if b6k != 0.0 {
                        max_b6 = max_b6.max(b6k);
                    }
                }
            }
        }

        max_b6 / max_ak
    }

    /// Final positions and velocities at the end of the step, with
    /// compensated summation against the start state
    fn finalize(&mut self, dt: f64) {
        let dt2 = dt * dt;
        let b = &self.b;

        for k in 0..self.n3 {
            let tmp = self.pos0[k];
            self.cspos[k] += (b[6][k] / 72.0
                + b[5][k] / 56.0
                + b[4][k] / 42.0
                + b[3][k] / 30.0
                + b[2][k] / 20.0
                + b[1][k] / 12.0
                + b[0][k] / 6.0
                + self.acc0[k] / 2.0)
                * dt2
                + self.vel0[k] * dt;
            self.pos0[k] = tmp + self.cspos[k];
            self.cspos[k] += tmp - self.pos0[k];

            let tmp = self.vel0[k];
            self.csvel[k] += (b[6][k] / 8.0
                + b[5][k] / 7.0
                + b[4][k] / 6.0
                + b[3][k] / 5.0
                + b[2][k] / 4.0
                + b[1][k] / 3.0
                + b[0][k] / 2.0
                + self.acc0[k])
                * dt;
            self.vel0[k] = tmp + self.csvel[k];
            self.csvel[k] += tmp - self.vel0[k];
        }
    }

    fn update_reset_arrays(&mut self) {
        for i in 0..7 {
            self.b_reset[i].clone_from(&self.b[i]);
            self.e_reset[i].clone_from(&self.e[i]);
        }
    }

    /// Re-expand the last accepted `b` for a step `ratio` times as long,
    /// keeping the correction accumulated on top of the previous prediction
    fn predict_next_b_and_e(&mut self, ratio: f64) {
        let q1 = ratio;
        let q2 = q1 * q1;
        let q3 = q1 * q2;
        let q4 = q2 * q2;
        let q5 = q2 * q3;
        let q6 = q3 * q3;
        let q7 = q3 * q4;

        let br = &self.b_reset;
        let er = &self.e_reset;

        for k in 0..self.n3 {
            let be: [f64; 7] = std::array::from_fn(|i| br[i][k] - er[i][k]);

            self.e[0][k] = q1
                * (br[6][k] * 7.0
                    + br[5][k] * 6.0
                    + br[4][k] * 5.0
                    + br[3][k] * 4.0
                    + br[2][k] * 3.0
                    + br[1][k] * 2.0
                    + br[0][k]);
            self.e[1][k] = q2
                * (br[6][k] * 21.0
                    + br[5][k] * 15.0
                    + br[4][k] * 10.0
                    + br[3][k] * 6.0
                    + br[2][k] * 3.0
                    + br[1][k]);
            self.e[2][k] =
                q3 * (br[6][k] * 35.0 + br[5][k] * 20.0 + br[4][k] * 10.0 + br[3][k] * 4.0 + br[2][k]);
            self.e[3][k] = q4 * (br[6][k] * 35.0 + br[5][k] * 15.0 + br[4][k] * 5.0 + br[3][k]);
            self.e[4][k] = q5 * (br[6][k] * 21.0 + br[5][k] * 6.0 + br[4][k]);
            self.e[5][k] = q6 * (br[6][k] * 7.0 + br[5][k]);
            self.e[6][k] = q7 * br[6][k];

            for i in 0..7 {
                self.b[i][k] = self.e[i][k] + be[i];
            }
        }
    }

    fn corrector_stop(iterations: usize, error: f64, error_last: f64) -> Option<CorrectorStop> {
        if error < CORRECTOR_TOLERANCE {
            Some(CorrectorStop::Converged)
        } else if iterations > 2 && error_last <= error {
            Some(CorrectorStop::Oscillating)
        } else if iterations >= MAX_CORRECTOR_ITERATIONS {
            Some(CorrectorStop::IterationCap)
        } else {
            None
        }
    }

    fn finish(&mut self, report: StepReport) -> StepOutcome {
        match report.outcome {
            StepOutcome::Accepted => self.stats.accepted += 1,
            StepOutcome::Rejected => self.stats.rejected += 1,
        }
        match report.stop {
            CorrectorStop::Converged => self.stats.converged += 1,
            CorrectorStop::Oscillating => self.stats.oscillating += 1,
            CorrectorStop::IterationCap => self.stats.iteration_cap += 1,
        }
        self.stats.corrector_iterations += report.iterations;

        trace!(
            "ias15 {:?} t = {:.6e} dt = {:.6e} next = {:.6e} iterations = {} ({:?})",
            report.outcome,
            report.time,
            report.dt_tried,
            report.dt_next,
            report.iterations,
            report.stop
        );
        if let Some(hook) = self.hook.as_mut() {
            hook(&report);
        }
        report.outcome
    }
}

impl Integrator for Ias15 {
    fn step(&mut self, sys: &mut System) -> StepOutcome {
        assert_eq!(sys.len(), self.n, "ias15 built for {} bodies", self.n);

        sys.compute_accelerations();
        sys.snapshot_last();
        self.load_state(sys);
        self.set_g_from_b();

        let mut corrector_error = 1e300;
        let mut corrector_error_last = 2.0;
        let mut iterations = 0;
        let mut stop = Self::corrector_stop(iterations, corrector_error, corrector_error_last);
        while stop.is_none() {
            corrector_error_last = corrector_error;
            iterations += 1;
            corrector_error = self.sweep_nodes(sys);
            stop = Self::corrector_stop(iterations, corrector_error, corrector_error_last);
        }
        let stop = stop.unwrap_or(CorrectorStop::IterationCap);

        let dt_last = self.dt;
        let mut integrator_error = None;

        if self.params.adaptive() {
            let error = self.integrator_error(sys);
            integrator_error = Some(error);
            let safety = self.params.safety_factor;

            // zero or undefined error: grow as fast as allowed
            let mut dt_new = if error != 0.0 && !error.is_nan() {
                (self.params.epsilon / error).powf(1.0 / 7.0) * dt_last
            } else {
                dt_last / safety
            };

            if dt_new < self.params.min_dt {
                dt_new = self.params.min_dt;
            }

            if (dt_new / dt_last).abs() < safety {
                // undo the trial and retry with the smaller step
                self.store_state(sys);
                self.change_trial_step(dt_new);
                return self.finish(StepReport {
                    outcome: StepOutcome::Rejected,
                    time: self.time,
                    dt_tried: dt_last,
                    dt_next: self.dt,
                    iterations,
                    stop,
                    corrector_error,
                    integrator_error,
                });
            }

            if dt_new / dt_last > 1.0 / safety {
                dt_new = dt_last / safety;
            }
            self.dt = dt_new;
        }

        self.finalize(dt_last);
        self.time += dt_last;
        self.store_state(sys);
        self.last_successful_dt = dt_last;

        self.update_reset_arrays();
        let ratio = self.dt / dt_last;
        self.predict_next_b_and_e(ratio);

        self.finish(StepReport {
            outcome: StepOutcome::Accepted,
            time: self.time,
            dt_tried: dt_last,
            dt_next: self.dt,
            iterations,
            stop,
            corrector_error,
            integrator_error,
        })
    }

    fn reset(&mut self) {
        self.time = 0.0;
        self.last_successful_dt = 0.0;
        self.dt = self.params.dt.min(self.params.max_dt);

        for buf in [
            &mut self.pos0,
            &mut self.vel0,
            &mut self.acc0,
            &mut self.acc1,
            &mut self.cspos,
            &mut self.csvel,
        ] {
            buf.fill(0.0);
        }
        for set in [
            &mut self.g,
            &mut self.b,
            &mut self.e,
            &mut self.b_reset,
            &mut self.e_reset,
        ] {
            for v in set.iter_mut() {
                v.fill(0.0);
            }
        }
        self.stats = Ias15Stats::default();
        debug!("ias15 reset: {} bodies, dt = {}", self.n, self.dt);
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
        self.change_trial_step(dt.min(self.params.max_dt));
        Ok(())
    }

    fn max_dt(&self) -> f64 {
        self.params.max_dt
    }

    fn set_max_dt(&mut self, max_dt: f64) -> Result<()> {
        check_positive("max_dt", max_dt)?;
        if max_dt < self.params.min_dt {
            return Err(ConfigError::InvalidParameter(format!(
                "max_dt ({}) below min_dt ({})",
                max_dt, self.params.min_dt
            )));
        }
        self.params.max_dt = max_dt;
        if self.dt > max_dt {
            self.change_trial_step(max_dt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    fn circular_binary() -> System {
        System::from_arrays(
            &[0.5, 0.5],
            &[[-0.5, 0.0, 0.0], [0.5, 0.0, 0.0]],
            &[[0.0, -0.5, 0.0], [0.0, 0.5, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn corrector_stop_rules() {
        assert_eq!(Ias15::corrector_stop(0, 1e300, 2.0), None);
        assert_eq!(Ias15::corrector_stop(1, 1e-17, 1.0), Some(CorrectorStop::Converged));
        // not improving, but only after the third sweep
        assert_eq!(Ias15::corrector_stop(2, 1e-10, 1e-11), None);
        assert_eq!(Ias15::corrector_stop(3, 1e-10, 1e-11), Some(CorrectorStop::Oscillating));
        assert_eq!(Ias15::corrector_stop(12, 1e-10, 1e-9), Some(CorrectorStop::IterationCap));
        assert_eq!(Ias15::corrector_stop(12, f64::NAN, f64::NAN), Some(CorrectorStop::IterationCap));
    }

    #[test]
    fn first_step_is_accepted_and_advances_time() {
        let mut sys = circular_binary();
        let mut ias = Ias15::new(&sys, IntegratorParams::default()).unwrap();
        assert_eq!(ias.step(&mut sys), StepOutcome::Accepted);
        assert_relative_eq!(ias.time(), 0.01);
        assert_eq!(ias.last_successful_dt(), 0.01);
        // growth is capped at 1 / safety_factor
        assert!(ias.dt() <= 0.04 + 1e-15);
        assert!(ias.dt() > 0.0);
    }

    #[test]
    fn fixed_step_when_epsilon_is_zero() {
        let mut sys = circular_binary();
        let params = IntegratorParams { epsilon: 0.0, dt: 0.05, ..Default::default() };
        let mut ias = Ias15::new(&sys, params).unwrap();
        for _ in 0..20 {
            assert_eq!(ias.step(&mut sys), StepOutcome::Accepted);
            assert_eq!(ias.dt(), 0.05);
        }
        assert_relative_eq!(ias.time(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn max_dt_setter_clamps_trial_step() {
        let sys = circular_binary();
        let mut ias = Ias15::new(&sys, IntegratorParams::default()).unwrap();
        ias.set_max_dt(1e-3).unwrap();
        assert_eq!(ias.dt(), 1e-3);
        ias.set_max_dt(1.0).unwrap();
        assert_eq!(ias.dt(), 1e-3);
        assert!(ias.set_max_dt(1e-13).is_err());
        assert!(ias.set_max_dt(-1.0).is_err());
    }

    #[test]
    fn reset_clears_history() {
        let mut sys = circular_binary();
        let mut ias = Ias15::new(&sys, IntegratorParams::default()).unwrap();
        for _ in 0..5 {
            ias.step(&mut sys);
        }
        assert!(ias.b[6].iter().any(|&v| v != 0.0));
        ias.reset();
        assert_eq!(ias.time(), 0.0);
        assert_eq!(ias.last_successful_dt(), 0.0);
        assert_eq!(ias.dt(), 0.01);
        assert_eq!(*ias.stats(), Ias15Stats::default());
        for set in [&ias.b, &ias.e, &ias.g, &ias.b_reset, &ias.e_reset] {
            assert!(set.iter().all(|v| v.iter().all(|&x| x == 0.0)));
        }
        assert!(ias.cspos.iter().chain(ias.csvel.iter()).all(|&x| x == 0.0));
    }

    #[test]
    fn hook_sees_every_step() {
        let mut sys = circular_binary();
        let mut ias = Ias15::new(&sys, IntegratorParams::default()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ias.set_hook(Box::new(move |r: &StepReport| sink.lock().unwrap().push(*r)));
        for _ in 0..3 {
            ias.step(&mut sys);
        }
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|r| r.iterations >= 1 && r.iterations <= 12));
        assert!(seen.iter().all(|r| r.integrator_error.is_some()));
        assert_relative_eq!(seen[2].time, ias.time());
        assert_eq!(ias.stats().accepted + ias.stats().rejected, 3);
    }

    #[test]
    fn cleared_hook_stops_callbacks() {
        let mut sys = circular_binary();
        let mut ias = Ias15::new(&sys, IntegratorParams::default()).unwrap();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        ias.set_hook(Box::new(move |_: &StepReport| *sink.lock().unwrap() += 1));
        ias.step(&mut sys);
        ias.clear_hook();
        ias.step(&mut sys);
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(ias.stats().accepted + ias.stats().rejected, 2);
    }

    #[test]
    fn set_params_clamps_trial_step() {
        let mut sys = circular_binary();
        let mut ias = Ias15::new(&sys, IntegratorParams::default()).unwrap();
        ias.step(&mut sys);
        let time = ias.time();

        let tighter = IntegratorParams { epsilon: 1e-12, max_dt: 1e-3, ..Default::default() };
        ias.set_params(tighter.clone()).unwrap();
        assert_eq!(ias.params(), &tighter);
        assert_eq!(ias.dt(), 1e-3);
        // history and clock are kept
        assert_eq!(ias.time(), time);
        assert_eq!(ias.last_successful_dt(), 0.01);

        let bad = IntegratorParams { safety_factor: 2.0, ..Default::default() };
        assert!(ias.set_params(bad).is_err());
        assert_eq!(ias.params(), &tighter);
    }

    #[test]
    fn new_trial_step_rescales_history() {
        let mut sys = circular_binary();
        let mut ias = Ias15::new(&sys, IntegratorParams::default()).unwrap();
        for _ in 0..3 {
            ias.step(&mut sys);
        }
        let b6 = ias.b_reset[6].clone();
        let e6 = ias.e_reset[6].clone();

        let dt = 0.5 * ias.last_successful_dt();
        ias.set_dt(dt).unwrap();
        let q7 = (dt / ias.last_successful_dt()).powi(7);
        for k in 0..ias.n3 {
            assert_relative_eq!(ias.e[6][k], q7 * b6[k], max_relative = 1e-12);
            assert_relative_eq!(ias.b[6][k], ias.e[6][k] + (b6[k] - e6[k]), max_relative = 1e-12);
        }

        // same step again leaves the history alone
        let b = ias.b.clone();
        ias.set_dt(dt).unwrap();
        assert_eq!(ias.b, b);
    }

    #[test]
    fn wrong_body_count_is_rejected() {
        let sys = System::from_arrays(&[1.0], &[[0.0; 3]], &[[0.0; 3]]).unwrap();
        assert!(matches!(
            Ias15::new(&sys, IntegratorParams::default()),
            Err(ConfigError::TooFewBodies { .. })
        ));
        let bad = IntegratorParams { min_dt: 1.0, max_dt: 0.1, ..Default::default() };
        assert!(Ias15::new(&circular_binary(), bad).is_err());
    }
}
