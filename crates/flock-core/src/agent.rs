//! The simulated agent (one boid).

use crate::math::{Pose, Vec3};

/// Upper bound on an agent's speed, enforced after every integration step.
pub const MAX_SPEED: f32 = 10.0;

/// Radius of the containment sphere centered at the origin.
pub const MAX_RADIUS: f32 = 100.0;

/// One flocking agent: a velocity and a pose.
///
/// Agents are plain `Copy` values.  Execution units always receive copies,
/// so no agent is ever aliased across threads.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub velocity: Vec3,
    pub pose: Pose,
}

impl Agent {
    /// An agent at `position` moving with `velocity`, oriented to look back
    /// along its direction of travel.
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        let mut pose = Pose::at(position);
        pose.look_at(position - velocity);
        Self { velocity, pose }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}
