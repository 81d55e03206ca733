//! Force terms and integration.

use flock_core::{Agent, ForceCoefficients, MAX_RADIUS, MAX_SPEED, Vec3, normalize_or_keep};

/// Containment magnitude numerator: force is `1.5 / distance_from_edge`.
const CONTAINMENT_STRENGTH: f32 = 1.5;

/// Multiplier applied to `delta` before the summed force hits velocity.
pub const FORCE_GAIN: f32 = 10.0;

/// Distance floor for the separation weighting.
pub const SEPARATION_EPSILON: f32 = 1e-6;

/// Pull toward the origin, growing without bound as the agent nears the
/// containment sphere.  Zero at the origin itself.
pub fn containment(position: Vec3, scale: f32) -> Vec3 {
    let edge = (MAX_RADIUS - position.length()).max(f32::EPSILON);
    let magnitude = CONTAINMENT_STRENGTH / edge;
    normalize_or_keep(-position) * (magnitude * scale)
}

/// Heading of the summed neighbor velocities.  Magnitude is discarded.
pub fn alignment(neighbors: &[Agent], scale: f32) -> Vec3 {
    let heading: Vec3 = neighbors.iter().map(|n| n.velocity).sum();
    normalize_or_keep(heading) * scale
}

/// Steer toward the neighbors' mean *velocity*, taken as a point and
/// measured from the agent's position.  Exactly zero with no neighbors.
pub fn cohesion(main: &Agent, neighbors: &[Agent], scale: f32) -> Vec3 {
    if neighbors.is_empty() {
        return Vec3::ZERO;
    }
    let sum: Vec3 = neighbors.iter().map(|n| n.velocity).sum();
    let center = sum / neighbors.len() as f32;
    normalize_or_keep(center - main.position()) * scale
}

/// Push away from each neighbor.  Each offset is divided by its own length
/// (floored at [`SEPARATION_EPSILON`]); the direction is left unnormalized.
pub fn separation(main: &Agent, neighbors: &[Agent], scale: f32) -> Vec3 {
    let origin = main.position();
    let push: Vec3 = neighbors
        .iter()
        .map(|n| {
            let away = origin - n.position();
            away / away.length().max(SEPARATION_EPSILON)
        })
        .sum();
    push * scale
}

/// The four terms summed with their coefficients.
pub fn accumulate(main: &Agent, neighbors: &[Agent], coeffs: &ForceCoefficients) -> Vec3 {
    containment(main.position(), coeffs.outer_bounds)
        + alignment(neighbors, coeffs.alignment)
        + cohesion(main, neighbors, coeffs.cohesion)
        + separation(main, neighbors, coeffs.separation)
}

/// Clamp the magnitude of `v` to `max`; the result never exceeds `max`.
pub fn clamp_speed(v: Vec3, max: f32) -> Vec3 {
    let len = v.length();
    if len <= max {
        return v;
    }
    let mut out = if len.is_finite() {
        v * (max / len)
    } else {
        // Length overflowed: recover the direction from the bounded components.
        let bounded = v.clamp(Vec3::splat(-f32::MAX), Vec3::splat(f32::MAX)) / f32::MAX;
        normalize_or_keep(bounded) * max
    };
    // Rounding can leave the rescaled length one ulp above `max`.
    for _ in 0..4 {
        if out.length() <= max {
            break;
        }
        out *= 1.0 - f32::EPSILON;
    }
    out
}

/// Advance one agent by `delta` seconds given snapshots of its neighbors.
///
/// Neither input is modified; the updated agent is returned.
pub fn compute_step(
    main:      &Agent,
    neighbors: &[Agent],
    coeffs:    &ForceCoefficients,
    delta:     f32,
) -> Agent {
    let force = accumulate(main, neighbors, coeffs) * (delta * FORCE_GAIN);
    let velocity = clamp_speed(main.velocity + force, MAX_SPEED);

    let mut pose = main.pose;
    pose.translate(velocity * delta);
    pose.look_at(pose.position - velocity);

    Agent { velocity, pose }
}
