//! Newtonian gravity for the N-body system
//!
//! Direct O(N²) pairwise sums with G = 1 and no softening. Two bodies at the
//! same position give infinite/NaN accelerations; that case is left to the
//! caller, the adaptive integrator reacts to it by shrinking its step.

use crate::simulation::states::{NVec3, System};

impl System {
    /// Recompute every body's acceleration from the current positions.
    ///
    /// Each unordered pair (i, j) is visited once and the pull is applied
    /// to both bodies, so Σ m_i a_i vanishes up to round-off.
    pub fn compute_accelerations(&mut self) {
        let n = self.bodies.len();

        for b in self.bodies.iter_mut() {
            b.acc = NVec3::zeros();
        }

        for i in 0..n {
            for j in (i + 1)..n {
                // displacement from i to j, i is pulled along +dr
                let dr = self.bodies[j].pos - self.bodies[i].pos;
                let r2 = dr.norm_squared();
                let r3 = r2 * r2.sqrt();

                let mfaci = self.bodies[i].mass / r3;
                let mfacj = self.bodies[j].mass / r3;

                self.bodies[i].acc += mfacj * dr;
                self.bodies[j].acc -= mfaci * dr;
            }
        }
    }

    /// −Σ_{i<j} m_i m_j / |r_i − r_j|
    pub fn potential_energy(&self) -> f64 {
        let n = self.bodies.len();
        let mut pot = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let r = (self.bodies[j].pos - self.bodies[i].pos).norm();
                pot -= self.bodies[i].mass * self.bodies[j].mass / r;
            }
        }
        pot
    }

    /// Kinetic plus potential energy
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::states::System;
    use approx::assert_relative_eq;

    fn two_body(dist: f64, m1: f64, m2: f64) -> System {
        System::from_arrays(
            &[m1, m2],
            &[[-dist / 2.0, 0.0, 0.0], [dist / 2.0, 0.0, 0.0]],
            &[[0.0; 3]; 2],
        )
        .unwrap()
    }

    #[test]
    fn gravity_points_toward_other_body() {
        let mut sys = two_body(2.0, 1.0, 1.0);
        sys.compute_accelerations();
        assert!(sys.bodies[0].acc.x > 0.0);
        assert!(sys.bodies[1].acc.x < 0.0);
    }

    #[test]
    fn gravity_scales_with_partner_mass() {
        let mut sys = two_body(1.0, 2.0, 3.0);
        sys.compute_accelerations();
        // |a_0| = m_1 / r², |a_1| = m_0 / r²
        assert_relative_eq!(sys.bodies[0].acc.x, 3.0);
        assert_relative_eq!(sys.bodies[1].acc.x, -2.0);
    }

    #[test]
    fn gravity_inverse_square_law() {
        let mut near = two_body(1.0, 1.0, 1.0);
        let mut far = two_body(2.0, 1.0, 1.0);
        near.compute_accelerations();
        far.compute_accelerations();
        let ratio = near.bodies[0].acc.norm() / far.bodies[0].acc.norm();
        assert_relative_eq!(ratio, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn accelerations_are_reset_between_calls() {
        let mut sys = two_body(1.0, 1.0, 1.0);
        sys.compute_accelerations();
        let first = sys.bodies[0].acc;
        sys.compute_accelerations();
        assert_eq!(first, sys.bodies[0].acc);
    }

    #[test]
    fn potential_energy_of_pair() {
        let sys = two_body(2.0, 3.0, 4.0);
        assert_relative_eq!(sys.potential_energy(), -6.0);
        assert_relative_eq!(sys.total_energy(), -6.0);
    }

    #[test]
    fn coincident_bodies_are_not_trapped() {
        let mut sys = two_body(0.0, 1.0, 1.0);
        sys.compute_accelerations();
        assert!(!sys.bodies[0].acc.x.is_finite());
    }
}
