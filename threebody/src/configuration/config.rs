//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator choice and its control parameters
//! - [`ParametersConfig`] – run length and animation pacing
//! - a preset name or a list of [`BodyConfig`] initial states
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A scenario matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "ias15"     # or "leapfrog"
//!   epsilon: 1.0e-9         # error tolerance, 0 -> fixed step
//!   safety_factor: 0.25
//!   min_dt: 1.0e-12
//!   dt: 0.01                # initial trial step
//!
//! parameters:
//!   t_end: 100.0            # run length in dynamical timescales
//!   seconds_per_timescale: 6.0
//!   fps: 24.0
//!   max_substeps: 10000     # integrator calls allowed per frame
//!   center: true            # shift to the center-of-momentum frame
//!
//! bodies:
//!   - m: 1.0
//!     x: [ 0.97000436, -0.24308753, 0.0 ]
//!     v: [ 0.466203685, 0.43236573, 0.0 ]
//!   - m: 1.0
//!     x: [ -0.97000436, 0.24308753, 0.0 ]
//!     v: [ 0.466203685, 0.43236573, 0.0 ]
//!   - m: 1.0
//!     x: [ 0.0, 0.0, 0.0 ]
//!     v: [ -0.93240737, -0.86473146, 0.0 ]
//! ```
//!
//! `bodies` may be replaced by `preset: "figure_eight"` (see
//! [`Preset`](crate::simulation::presets::Preset)). Every field of `engine`
//! and `parameters` is optional.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::params::IntegratorParams;

/// Which integrator the engine runs
/// integrator: "ias15" or integrator: "leapfrog"
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[serde(rename = "ias15")] // adaptive Gauss-Radau, 15th order, error controlled
    #[default]
    Ias15,

    #[serde(rename = "leapfrog")] // kick-drift-kick, 2nd order, fixed step
    Leapfrog,
}

/// Integrator configuration; unset fields take the [`IntegratorParams`] defaults
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig,
    pub epsilon: Option<f64>,
    pub safety_factor: Option<f64>,
    pub min_dt: Option<f64>,
    pub max_dt: Option<f64>,
    pub dt: Option<f64>,
}

impl EngineConfig {
    pub fn params(&self) -> IntegratorParams {
        let d = IntegratorParams::default();
        IntegratorParams {
            epsilon: self.epsilon.unwrap_or(d.epsilon),
            safety_factor: self.safety_factor.unwrap_or(d.safety_factor),
            min_dt: self.min_dt.unwrap_or(d.min_dt),
            max_dt: self.max_dt.unwrap_or(d.max_dt),
            dt: self.dt.unwrap_or(d.dt),
        }
    }
}

/// Run length and animation pacing
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub t_end: f64, // run length, in dynamical timescales
    pub seconds_per_timescale: Option<f64>, // falls back to the preset's pace, then 5
    pub fps: f64, // frames per second of wall time
    pub max_substeps: usize, // integrator calls allowed per frame
    pub center: bool, // move to the center-of-momentum frame before running
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            t_end: 100.0,
            seconds_per_timescale: None,
            fps: 24.0,
            max_substeps: 10_000,
            center: true,
        }
    }
}

/// Initial state of a single body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub m: f64, // mass
    pub x: Vec<f64>, // position, three components
    pub v: Vec<f64>, // velocity, three components
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}
