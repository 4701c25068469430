//! Core state types for the N-body simulation.
//!
//! Defines the 3D body/system structs:
//! - `Body`   one point mass with position, velocity and scratch acceleration
//! - `System` the ordered collection of bodies plus the snapshot taken at the
//!   start of the last integration step
//!
//! Simulation time is owned by the integrator, not by the system.

use nalgebra::Vector3;

use crate::error::{ConfigError, Result};

pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: usize, // identity tag, index at construction
    pub mass: f64, // mass (> 0)
    pub pos: NVec3, // position
    pub vel: NVec3, // velocity
    pub acc: NVec3, // acceleration, recomputed on every force evaluation
}

impl Body {
    pub fn new(id: usize, mass: f64, pos: NVec3, vel: NVec3) -> Self {
        Self {
            id,
            mass,
            pos,
            vel,
            acc: NVec3::zeros(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // primary state, read and written by the integrators
    pub bodies_last: Vec<Body>, // state at the start of the last step
}

impl System {
    /// Build a system from explicit bodies.
    ///
    /// Rejects an empty list and any body with a non-positive or non-finite
    /// mass or a non-finite position/velocity. Body ids are rewritten to their
    /// index so they stay unique.
    pub fn new(mut bodies: Vec<Body>) -> Result<Self> {
        if bodies.is_empty() {
            return Err(ConfigError::TooFewBodies { needed: 1, found: 0 });
        }
        for (i, b) in bodies.iter_mut().enumerate() {
            if !(b.mass.is_finite() && b.mass > 0.0) {
                return Err(ConfigError::InvalidBody {
                    index: i,
                    reason: format!("mass must be positive and finite, got {}", b.mass),
                });
            }
            if !b.pos.iter().chain(b.vel.iter()).all(|c| c.is_finite()) {
                return Err(ConfigError::InvalidBody {
                    index: i,
                    reason: "position and velocity must be finite".to_string(),
                });
            }
            b.id = i;
            b.acc = NVec3::zeros();
        }
        let bodies_last = bodies.clone();
        Ok(Self { bodies, bodies_last })
    }

    /// Build a system from parallel mass/position/velocity arrays
    pub fn from_arrays(masses: &[f64], pos: &[[f64; 3]], vel: &[[f64; 3]]) -> Result<Self> {
        if masses.len() != pos.len() || masses.len() != vel.len() {
            return Err(ConfigError::InvalidParameter(format!(
                "mismatched array lengths: {} masses, {} positions, {} velocities",
                masses.len(),
                pos.len(),
                vel.len()
            )));
        }
        let bodies = masses
            .iter()
            .zip(pos.iter().zip(vel.iter()))
            .enumerate()
            .map(|(i, (&m, (x, v)))| Body::new(i, m, NVec3::from(*x), NVec3::from(*v)))
            .collect();
        Self::new(bodies)
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    /// Copy the current bodies into `bodies_last`
    pub fn snapshot_last(&mut self) {
        self.bodies_last.clone_from(&self.bodies);
    }

    /// Mass-weighted mean position and velocity, returned as `(position, velocity)`
    pub fn center_of_momentum(&self) -> (NVec3, NVec3) {
        let total_mass = self.total_mass();
        let mut cm_pos = NVec3::zeros();
        let mut cm_vel = NVec3::zeros();
        for b in &self.bodies {
            cm_pos += b.mass * b.pos / total_mass;
            cm_vel += b.mass * b.vel / total_mass;
        }
        (cm_pos, cm_vel)
    }

    /// Shift every body into the center-of-momentum frame.
    ///
    /// One-time normalization; nothing re-applies it as the bodies move.
    pub fn move_to_center_of_momentum(&mut self) {
        let (cm_pos, cm_vel) = self.center_of_momentum();
        for b in self.bodies.iter_mut() {
            b.pos -= cm_pos;
            b.vel -= cm_vel;
        }
    }

    /// Σ ½ m |v|²
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies
            .iter()
            .map(|b| 0.5 * b.mass * b.vel.norm_squared())
            .sum()
    }

    /// Σ m (r × v)
    pub fn angular_momentum(&self) -> NVec3 {
        self.bodies
            .iter()
            .fold(NVec3::zeros(), |l, b| l + b.mass * b.pos.cross(&b.vel))
    }

    /// Σ m v
    pub fn linear_momentum(&self) -> NVec3 {
        self.bodies.iter().fold(NVec3::zeros(), |p, b| p + b.mass * b.vel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pair() -> System {
        System::from_arrays(
            &[1.0, 3.0],
            &[[1.0, 0.0, 0.0], [-1.0, 2.0, 0.0]],
            &[[0.0, 1.0, 0.0], [0.5, 0.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_system() {
        assert!(matches!(
            System::new(Vec::new()),
            Err(ConfigError::TooFewBodies { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = System::from_arrays(&[1.0, 0.0], &[[0.0; 3], [1.0, 0.0, 0.0]], &[[0.0; 3]; 2]);
        assert!(matches!(err, Err(ConfigError::InvalidBody { index: 1, .. })));
    }

    #[test]
    fn rejects_mismatched_arrays() {
        let err = System::from_arrays(&[1.0, 1.0], &[[0.0; 3]], &[[0.0; 3]; 2]);
        assert!(matches!(err, Err(ConfigError::InvalidParameter(_))));
    }

    #[test]
    fn ids_follow_order() {
        let sys = pair();
        assert_eq!(sys.bodies[0].id, 0);
        assert_eq!(sys.bodies[1].id, 1);
    }

    #[test]
    fn center_of_momentum_is_mass_weighted() {
        let sys = pair();
        let (p, v) = sys.center_of_momentum();
        assert_relative_eq!(p.x, -0.5);
        assert_relative_eq!(p.y, 1.5);
        assert_relative_eq!(v.x, 0.375);
        assert_relative_eq!(v.y, 0.25);
    }

    #[test]
    fn kinetic_energy_and_angular_momentum() {
        let sys = pair();
        // 0.5*1*1 + 0.5*3*0.25
        assert_relative_eq!(sys.kinetic_energy(), 0.875);
        // body 0: (1,0,0) x (0,1,0) = (0,0,1); body 1: 3 * (-1,2,0) x (0.5,0,0) = 3 * (0,0,-1)
        let l = sys.angular_momentum();
        assert_relative_eq!(l.z, -2.0);
        assert_relative_eq!(l.x, 0.0);
    }

    #[test]
    fn snapshot_copies_current_state() {
        let mut sys = pair();
        sys.bodies[0].pos.x = 7.0;
        sys.snapshot_last();
        assert_eq!(sys.bodies_last[0].pos.x, 7.0);
    }
}
