//! Derived quantities for display
//!
//! - dynamical timescale heuristic used to pick animation rates
//! - shape-sphere coordinates and size of a three-body triangle
//! - plot-time extrapolation between two committed states
//!
//! None of these feed back into the integrators.

use crate::simulation::states::{Body, System};

/// Point on the shape sphere plus the mass-weighted size of the triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub x: f64,
    pub y: f64,
    pub size: f64, // ρ, mass-weighted root of the squared separations
}

impl System {
    /// Dynamical time estimate `5 / sqrt(M / r_max³)`, with `r_max` the largest
    /// body distance from the origin.
    ///
    /// A display-scaling heuristic, not a physical quantity.
    pub fn estimate_timescale(&self) -> f64 {
        let r_max = self
            .bodies
            .iter()
            .map(|b| b.pos.norm())
            .fold(0.0_f64, f64::max);
        5.0 / (self.total_mass() / (r_max * r_max * r_max)).sqrt()
    }

    /// Shape and size of the system; `None` unless it holds exactly three bodies
    pub fn shape_and_size(&self) -> Option<Shape> {
        shape_and_size(&self.bodies)
    }
}

/// Rotation-invariant shape descriptor of a triad.
///
/// With `a = r10²`, `b = r20²`, `c = r21²`:
/// `x = (b + c − 2a) / (a + b + c)`, `y = √3 (c − b) / (a + b + c)` and
/// `ρ = sqrt((m1 m0 a + m2 m0 b + m2 m1 c) / (m0 + m1 + m2))`.
///
/// `x² + y² ≤ 1` for every triangle, with equality only when the bodies are
/// collinear; the equilateral triangle sits at the origin. Writing
/// `z = x + iy`, relabeling acts as a symmetry of the disk:
/// - swapping bodies 0 and 1 maps `z` to `conj(z)` (y flips sign),
/// - the cyclic relabeling `0 → 1 → 2 → 0` rotates `z` by 120°,
/// - `ρ` is unchanged by any relabeling that carries the masses along.
///
/// Returns `None` unless exactly three bodies are given.
pub fn shape_and_size(triad: &[Body]) -> Option<Shape> {
    let [b0, b1, b2] = triad else {
        return None;
    };

    let r10 = (b1.pos - b0.pos).norm_squared();
    let r20 = (b2.pos - b0.pos).norm_squared();
    let r21 = (b2.pos - b1.pos).norm_squared();

    let (m0, m1, m2) = (b0.mass, b1.mass, b2.mass);
    let size = ((m1 * m0 * r10 + m2 * m0 * r20 + m2 * m1 * r21) / (m0 + m1 + m2)).sqrt();

    let sum = r10 + r20 + r21;
    let x = (r20 + r21 - 2.0 * r10) / sum;
    let y = 3.0_f64.sqrt() * (r21 - r20) / sum;

    Some(Shape { x, y, size })
}

/// Bodies extrapolated to a display time.
///
/// `current` was committed at `t_new`, `last` at `t_old`. Whichever snapshot is
/// nearer to `t_target` is pushed forward (or back) with its own velocity and
/// acceleration: `x + v h + a h²/2`, `v + a h`.
pub fn plot_bodies(
    t_new: f64,
    t_old: f64,
    t_target: f64,
    current: &[Body],
    last: &[Body],
) -> Vec<Body> {
    let (base, t_base) = if (t_target - t_new).abs() <= (t_target - t_old).abs() {
        (current, t_new)
    } else {
        (last, t_old)
    };
    let h = t_target - t_base;

    base.iter()
        .map(|b| Body {
            pos: b.pos + b.vel * h + b.acc * (0.5 * h * h),
            vel: b.vel + b.acc * h,
            ..b.clone()
        })
        .collect()
}
