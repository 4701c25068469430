//! Frame-paced driver around a system and its integrator
//!
//! The driver owns both halves: the `System` and the boxed `Integrator`
//! bound to it. A display consumer calls `advance_frame` once per animation
//! frame and reads positions back through `plot_bodies`. Animation time per
//! frame is `timescale / (seconds_per_timescale * fps)`, and the same value
//! is used as the integrator's step ceiling.

use log::{debug, info, warn};

use crate::error::{ConfigError, Result};
use crate::simulation::diagnostics::{self, Shape};
use crate::simulation::engine::Engine;
use crate::simulation::integrator::{build_integrator, Integrator, StepOutcome};
use crate::simulation::params::{check_positive, RunParameters};
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{Body, System};

/// What happened while advancing to a target time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub target: f64, // simulation time aimed for
    pub time: f64, // integrator time afterwards
    pub accepted: usize,
    pub rejected: usize,
    pub reached: bool, // false if the substep budget ran out first
}

pub struct Simulation {
    system: System,
    integrator: Box<dyn Integrator + Send>,
    engine: Engine,
    run: RunParameters,
    initial_energy: f64,
    timescale: f64,
    dt_animate: f64,
    time_next_animate: f64,
    time_last: f64, // integrator time at the start of the latest step
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Result<Self> {
        let Scenario {
            engine,
            parameters,
            mut system,
        } = scenario;
        parameters.validate()?;

        if parameters.center {
            system.move_to_center_of_momentum();
        }
        system.snapshot_last();

        let integrator = build_integrator(&engine.integrator, &system, engine.params.clone())?;

        let mut sim = Self {
            system,
            integrator,
            engine,
            run: parameters,
            initial_energy: 0.0,
            timescale: 0.0,
            dt_animate: 0.0,
            time_next_animate: 0.0,
            time_last: 0.0,
        };
        sim.refresh_derived()?;
        sim.time_next_animate = sim.dt_animate;

        info!(
            "simulation ready: E0 = {:.12e}, timescale = {:.6e}, dt_animate = {:.6e}",
            sim.initial_energy, sim.timescale, sim.dt_animate
        );
        Ok(sim)
    }

    /// Energy, timescale and animation step for the current bodies
    fn refresh_derived(&mut self) -> Result<()> {
        self.initial_energy = self.system.total_energy();
        self.timescale = self.system.estimate_timescale();
        check_positive("timescale", self.timescale)?;
        self.apply_speed()
    }

    fn apply_speed(&mut self) -> Result<()> {
        self.dt_animate = self.timescale / (self.run.seconds_per_timescale * self.run.fps);
        self.integrator.set_max_dt(self.dt_animate)
    }

    /// One integrator call, keeping track of where the last step started
    fn step_once(&mut self, report: &mut FrameReport) {
        self.time_last = self.integrator.time();
        match self.integrator.step(&mut self.system) {
            StepOutcome::Accepted => report.accepted += 1,
            StepOutcome::Rejected => report.rejected += 1,
        }
    }

    /// Step until integrator time passes the next frame time.
    ///
    /// The last step usually overshoots; use [`plot_bodies`](Self::plot_bodies)
    /// with `report.target` to draw the frame.
    pub fn advance_frame(&mut self) -> FrameReport {
        let target = self.time_next_animate;
        let mut report = FrameReport {
            target,
            time: self.integrator.time(),
            accepted: 0,
            rejected: 0,
            reached: false,
        };

        while self.integrator.time() < target && report.accepted + report.rejected < self.run.max_substeps {
            self.step_once(&mut report);
        }

        report.time = self.integrator.time();
        report.reached = report.time >= target;
        if report.reached {
            self.time_next_animate += self.dt_animate;
        } else {
            warn!(
                "substep budget of {} spent at t = {:.6e}, frame target {:.6e}, dt = {:.3e}",
                self.run.max_substeps,
                report.time,
                target,
                self.integrator.dt()
            );
        }
        report
    }

    /// Step until integrator time is exactly `target`.
    ///
    /// The final step is shortened to land on `target`; the trial step in
    /// use before it is restored afterwards. Both changes go through
    /// [`Integrator::set_dt`], so the integrator's step history follows them.
    /// Stops early when the substep budget runs out.
    pub fn advance_to(&mut self, target: f64) -> Result<FrameReport> {
        if !target.is_finite() {
            return Err(ConfigError::InvalidParameter(format!(
                "target time must be finite, got {target}"
            )));
        }
        let mut report = FrameReport {
            target,
            time: self.integrator.time(),
            accepted: 0,
            rejected: 0,
            reached: false,
        };

        while self.integrator.time() < target && report.accepted + report.rejected < self.run.max_substeps {
            let remaining = target - self.integrator.time();
            let dt = self.integrator.dt();
            if dt >= remaining {
                self.integrator.set_dt(remaining)?;
                self.step_once(&mut report);
                if self.integrator.time() >= target {
                    self.integrator.set_dt(dt)?;
                }
            } else {
                self.step_once(&mut report);
            }
        }

        report.time = self.integrator.time();
        report.reached = report.time >= target;
        Ok(report)
    }

    /// Replace the bodies and start over from t = 0
    pub fn reset_initial_conditions(&mut self, bodies: Vec<Body>) -> Result<()> {
        if bodies.len() != self.system.len() {
            return Err(ConfigError::InvalidParameter(format!(
                "expected {} bodies, got {}",
                self.system.len(),
                bodies.len()
            )));
        }
        let mut system = System::new(bodies)?;
        if self.run.center {
            system.move_to_center_of_momentum();
        }
        system.snapshot_last();
        self.system = system;

        self.integrator.reset();
        self.time_last = 0.0;
        self.refresh_derived()?;
        self.time_next_animate = self.dt_animate;
        debug!("initial conditions reset, E0 = {:.12e}", self.initial_energy);
        Ok(())
    }

    /// Change the animation pace; also moves the integrator's step ceiling
    pub fn set_speed(&mut self, seconds_per_timescale: f64) -> Result<()> {
        check_positive("seconds_per_timescale", seconds_per_timescale)?;
        self.run.seconds_per_timescale = seconds_per_timescale;
        self.apply_speed()
    }

    /// Bodies extrapolated to `t_target` from the nearer of the last two states
    pub fn plot_bodies(&self, t_target: f64) -> Vec<Body> {
        diagnostics::plot_bodies(
            self.integrator.time(),
            self.time_last,
            t_target,
            &self.system.bodies,
            &self.system.bodies_last,
        )
    }

    /// Relative energy drift `(E0 - E) / E0`
    pub fn energy_error(&self) -> f64 {
        (self.initial_energy - self.system.total_energy()) / self.initial_energy
    }

    pub fn shape(&self) -> Option<Shape> {
        self.system.shape_and_size()
    }

    pub fn time(&self) -> f64 {
        self.integrator.time()
    }

    /// End of the run, `t_end` timescales
    pub fn t_final(&self) -> f64 {
        self.run.t_end * self.timescale
    }

    pub fn finished(&self) -> bool {
        self.time() >= self.t_final()
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn integrator(&self) -> &(dyn Integrator + Send) {
        self.integrator.as_ref()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn initial_energy(&self) -> f64 {
        self.initial_energy
    }

    pub fn timescale(&self) -> f64 {
        self.timescale
    }

    pub fn dt_animate(&self) -> f64 {
        self.dt_animate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::config::ScenarioConfig;
    use crate::simulation::presets::Preset;
    use approx::assert_relative_eq;

    fn figure_eight() -> Simulation {
        Simulation::new(Scenario::from_preset(Preset::FigureEight).unwrap()).unwrap()
    }

    #[test]
    fn pacing_follows_timescale() {
        let sim = figure_eight();
        assert_relative_eq!(sim.dt_animate(), sim.timescale() / (6.0 * 24.0));
        assert_relative_eq!(sim.integrator().max_dt(), sim.dt_animate());
        assert!(sim.integrator().dt() <= sim.dt_animate());
    }

    #[test]
    fn frames_advance_past_their_target() {
        let mut sim = figure_eight();
        let mut last_target = 0.0;
        for _ in 0..10 {
            let report = sim.advance_frame();
            assert!(report.reached);
            assert!(report.time >= report.target);
            assert!(report.target > last_target);
            last_target = report.target;
        }
        assert!(sim.energy_error().abs() < 1e-9);
    }

    #[test]
    fn advance_to_lands_exactly() {
        let mut sim = figure_eight();
        let report = sim.advance_to(0.37).unwrap();
        assert!(report.reached);
        assert_relative_eq!(sim.time(), 0.37, epsilon = 1e-14);
    }

    #[test]
    fn plot_bodies_at_current_time_is_current_state() {
        let mut sim = figure_eight();
        sim.advance_frame();
        let t = sim.time();
        let plotted = sim.plot_bodies(t);
        for (p, b) in plotted.iter().zip(sim.system().bodies.iter()) {
            assert_eq!(p.pos, b.pos);
        }
    }

    #[test]
    fn reset_requires_same_body_count() {
        let mut sim = figure_eight();
        let two = Preset::FigureEight.system().unwrap().bodies[..2].to_vec();
        assert!(sim.reset_initial_conditions(two).is_err());

        sim.advance_frame();
        let moth = Preset::Moth.system().unwrap().bodies;
        sim.reset_initial_conditions(moth).unwrap();
        assert_eq!(sim.time(), 0.0);
        assert_relative_eq!(sim.energy_error(), 0.0);
    }

    #[test]
    fn substep_budget_stops_short() {
        let cfg = ScenarioConfig::from_yaml_str(
            "preset: pythagorean\nengine:\n  dt: 1.0e-6\nparameters:\n  max_substeps: 1\n",
        )
        .unwrap();
        let mut sim = Simulation::new(Scenario::build_scenario(cfg).unwrap()).unwrap();

        let first = sim.advance_frame();
        assert!(!first.reached);
        assert_eq!(first.accepted + first.rejected, 1);
        assert!(first.time < first.target);

        // frame target is not advanced until it is reached
        let second = sim.advance_frame();
        assert!(!second.reached);
        assert_eq!(second.target, first.target);
        assert_eq!(second.accepted + second.rejected, 1);

        let report = sim.advance_to(1.0).unwrap();
        assert!(!report.reached);
        assert_eq!(report.accepted + report.rejected, 1);
        assert!(sim.time() < 1.0);
    }

    #[test]
    fn set_speed_moves_ceiling() {
        let mut sim = figure_eight();
        let before = sim.dt_animate();
        sim.set_speed(12.0).unwrap();
        assert_relative_eq!(sim.dt_animate(), before / 2.0);
        assert_relative_eq!(sim.integrator().max_dt(), sim.dt_animate());
        assert!(sim.set_speed(0.0).is_err());
    }
}
