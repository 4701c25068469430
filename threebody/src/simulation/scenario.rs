//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! (`Scenario`) containing:
//! - engine settings (`Engine`: integrator choice and control parameters)
//! - run pacing (`RunParameters`)
//! - system state (`System` with bodies at t = 0)
//!
//! Everything is validated here so a `Scenario` can always be run.

use log::debug;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{ConfigError, Result};
use crate::simulation::engine::Engine;
use crate::simulation::params::RunParameters;
use crate::simulation::presets::Preset;
use crate::simulation::states::{Body, NVec3, System};

/// Validated runtime bundle, consumed by [`Simulation`](crate::Simulation)
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: RunParameters,
    pub system: System,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Bodies: either a preset or the explicit list, never both
        let preset = match cfg.preset.as_deref() {
            Some(name) if !cfg.bodies.is_empty() => {
                return Err(ConfigError::InvalidParameter(format!(
                    "scenario names preset '{name}' and also lists bodies"
                )))
            }
            Some(name) => Some(name.parse::<Preset>()?),
            None => None,
        };

        let system = match preset {
            Some(p) => p.system()?,
            None => {
                let bodies = cfg
                    .bodies
                    .iter()
                    .enumerate()
                    .map(|(i, bc)| body_from_config(i, bc))
                    .collect::<Result<Vec<Body>>>()?;
                System::new(bodies)?
            }
        };

        // Run pacing, preset pace unless the file overrides it
        let p_cfg = cfg.parameters;
        let seconds_per_timescale = p_cfg
            .seconds_per_timescale
            .or(preset.map(Preset::seconds_per_timescale))
            .unwrap_or(RunParameters::default().seconds_per_timescale);
        let parameters = RunParameters {
            t_end: p_cfg.t_end,
            seconds_per_timescale,
            fps: p_cfg.fps,
            max_substeps: p_cfg.max_substeps,
            center: p_cfg.center,
        };
        parameters.validate()?;

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            integrator: cfg.engine.integrator,
            params: cfg.engine.params(),
        };
        engine.params.validate()?;

        debug!(
            "scenario built: {} bodies, {:?}, preset {:?}",
            system.len(),
            engine.integrator,
            preset.map(Preset::name)
        );

        Ok(Self {
            engine,
            parameters,
            system,
        })
    }

    /// Scenario for a preset with default engine and pacing
    pub fn from_preset(preset: Preset) -> Result<Self> {
        Self::build_scenario(ScenarioConfig {
            preset: Some(preset.name().to_string()),
            ..Default::default()
        })
    }
}

/// Map `BodyConfig` -> runtime `Body` using nalgebra vectors
fn body_from_config(index: usize, bc: &BodyConfig) -> Result<Body> {
    let vec3 = |name: &str, v: &[f64]| -> Result<NVec3> {
        match v {
            [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
            _ => Err(ConfigError::InvalidBody {
                index,
                reason: format!("{name} needs 3 components, got {}", v.len()),
            }),
        }
    };
    Ok(Body::new(index, bc.m, vec3("x", &bc.x)?, vec3("v", &bc.v)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::config::IntegratorConfig;

    #[test]
    fn preset_supplies_pace() {
        let sc = Scenario::from_preset(Preset::BrouckeHenon).unwrap();
        assert_eq!(sc.parameters.seconds_per_timescale, 14.0);
        assert_eq!(sc.engine.integrator, IntegratorConfig::Ias15);
        assert_eq!(sc.system.len(), 3);
    }

    #[test]
    fn explicit_pace_wins() {
        let cfg = ScenarioConfig::from_yaml_str(
            "preset: moth\nparameters:\n  seconds_per_timescale: 2.0\n",
        )
        .unwrap();
        let sc = Scenario::build_scenario(cfg).unwrap();
        assert_eq!(sc.parameters.seconds_per_timescale, 2.0);
    }

    #[test]
    fn rejects_short_vectors() {
        let cfg = ScenarioConfig::from_yaml_str(
            "bodies:\n  - m: 1.0\n    x: [0.0, 1.0]\n    v: [0.0, 0.0, 0.0]\n",
        )
        .unwrap();
        assert!(matches!(
            Scenario::build_scenario(cfg),
            Err(ConfigError::InvalidBody { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_preset_and_bodies_together() {
        let cfg = ScenarioConfig::from_yaml_str(
            "preset: moth\nbodies:\n  - m: 1.0\n    x: [0.0, 1.0, 0.0]\n    v: [0.0, 0.0, 0.0]\n",
        )
        .unwrap();
        assert!(matches!(
            Scenario::build_scenario(cfg),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_bad_engine_parameters() {
        let cfg = ScenarioConfig::from_yaml_str("preset: moth\nengine:\n  epsilon: -1.0\n").unwrap();
        assert!(matches!(
            Scenario::build_scenario(cfg),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_scenario_has_no_bodies() {
        let cfg = ScenarioConfig::default();
        assert!(matches!(
            Scenario::build_scenario(cfg),
            Err(ConfigError::TooFewBodies { .. })
        ));
    }
}
