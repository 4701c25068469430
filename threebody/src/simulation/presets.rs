//! Named three-body initial conditions
//!
//! Each preset also suggests an animation pace in wall seconds per
//! dynamical timescale.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Result};
use crate::simulation::states::{NVec3, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    FigureEight,
    BrouckeHenon,
    EquilateralStable,
    EquilateralUnstable,
    Pythagorean,
    SunJupiterEarth,
    TransferringPlanet,
    ChenRetrograde,
    Moth,
    EscapingPlanet,
}

impl Preset {
    pub const ALL: [Preset; 10] = [
        Preset::FigureEight,
        Preset::BrouckeHenon,
        Preset::EquilateralStable,
        Preset::EquilateralUnstable,
        Preset::Pythagorean,
        Preset::SunJupiterEarth,
        Preset::TransferringPlanet,
        Preset::ChenRetrograde,
        Preset::Moth,
        Preset::EscapingPlanet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::FigureEight => "figure_eight",
            Preset::BrouckeHenon => "broucke_henon",
            Preset::EquilateralStable => "equilateral_stable",
            Preset::EquilateralUnstable => "equilateral_unstable",
            Preset::Pythagorean => "pythagorean",
            Preset::SunJupiterEarth => "sun_jupiter_earth",
            Preset::TransferringPlanet => "transferring_planet",
            Preset::ChenRetrograde => "chen_retrograde",
            Preset::Moth => "moth",
            Preset::EscapingPlanet => "escaping_planet",
        }
    }

    /// Suggested wall seconds per dynamical timescale
    pub fn seconds_per_timescale(self) -> f64 {
        match self {
            Preset::FigureEight => 6.0,
            Preset::BrouckeHenon => 14.0,
            Preset::EquilateralStable => 6.0,
            Preset::EquilateralUnstable => 4.0,
            Preset::Pythagorean => 7.5,
            Preset::SunJupiterEarth => 40.0,
            Preset::TransferringPlanet => 6.0,
            Preset::ChenRetrograde => 10.0,
            Preset::Moth => 8.0,
            Preset::EscapingPlanet => 1.2,
        }
    }

    /// Build the initial system
    pub fn system(self) -> Result<System> {
        match self {
            // Chenciner & Montgomery choreography
            Preset::FigureEight => System::from_arrays(
                &[1.0, 1.0, 1.0],
                &[[0.97000436, -0.24308753, 0.0], [-0.97000436, 0.24308753, 0.0], [0.0; 3]],
                &[
                    [0.466203685, 0.43236573, 0.0],
                    [0.466203685, 0.43236573, 0.0],
                    [-0.93240737, -0.86473146, 0.0],
                ],
            ),
            Preset::BrouckeHenon => System::from_arrays(
                &[1.0 / 3.0; 3],
                &[[-0.685916, 0.0, 0.0], [1.53206, 0.0, 0.0], [-0.846147, 0.0, 0.0]],
                &[[0.0, 1.32912, 0.0], [0.0, 0.132451, 0.0], [0.0, -1.46157, 0.0]],
            ),
            // dominant mass keeps the Lagrange configuration stable
            Preset::EquilateralStable => rotating_triangle([50.0, 1.0, 0.1], 3.0),
            Preset::EquilateralUnstable => rotating_triangle([1.0, 1.0, 1.0], 0.5),
            // Burrau's problem, bodies start at rest on a 3-4-5 triangle
            Preset::Pythagorean => System::from_arrays(
                &[3.0, 4.0, 5.0],
                &[[1.0, 3.0, 0.0], [-2.0, -1.0, 0.0], [1.0, -1.0, 0.0]],
                &[[0.0; 3]; 3],
            ),
            Preset::SunJupiterEarth => System::from_arrays(
                &[1.0, 0.001, 3.0e-6],
                &[[0.0; 3], [0.0, 5.2, 0.0], [1.0, 0.0, 0.0]],
                &[[0.0; 3], [-0.4385, 0.0, 0.0], [0.0, 1.0, 0.0]],
            ),
            Preset::TransferringPlanet => System::from_arrays(
                &[1.0, 1.0, 1.0e-3],
                &[[-0.5, 0.0, 0.0], [0.5, 0.0, 0.0], [0.2, 0.0, 0.0]],
                &[[0.0, 0.707, 0.0], [0.0, -0.707, 0.0], [0.7, 0.8, 0.0]],
            ),
            Preset::ChenRetrograde => System::from_arrays(
                &[2.0, 0.01, 1.0],
                &[[0.2209, 0.0, 0.0], [0.7934, 0.0, 0.0], [-0.4498, 0.0, 0.0]],
                &[[0.0, 0.7127, 0.0], [0.0, -1.0786, 0.0], [0.0, -1.4146, 0.0]],
            ),
            // Suvakov & Dmitrasinovic
            Preset::Moth => System::from_arrays(
                &[1.0, 1.0, 1.0],
                &[[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0; 3]],
                &[
                    [0.46444, 0.39606, 0.0],
                    [0.46444, 0.39606, 0.0],
                    [-2.0 * 0.46444, -2.0 * 0.39606, 0.0],
                ],
            ),
            Preset::EscapingPlanet => System::from_arrays(
                &[1.0, 1.0, 1.0e-3],
                &[[-0.5, 0.0, 0.0], [0.5, 0.0, 0.0], [-0.1, 0.0, 0.0]],
                &[[0.0, 0.707, 0.0], [0.0, -0.707, 0.0], [1.25, 0.5, 0.0]],
            ),
        }
    }
}

/// Bodies on the unit equilateral triangle, shifted to their center of mass
/// and set in rigid rotation `v = scale * (-y, x, 0)`
fn rotating_triangle(masses: [f64; 3], scale: f64) -> Result<System> {
    let corner = |angle: f64| [angle.cos(), angle.sin(), 0.0];
    let mut sys = System::from_arrays(
        &masses,
        &[corner(0.0), corner(2.0 * PI / 3.0), corner(-2.0 * PI / 3.0)],
        &[[0.0; 3]; 3],
    )?;
    sys.move_to_center_of_momentum();
    for b in sys.bodies.iter_mut() {
        b.vel = NVec3::new(-scale * b.pos.y, scale * b.pos.x, 0.0);
    }
    Ok(sys)
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == key)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
