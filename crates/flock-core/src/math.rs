//! Vector and pose primitives.
//!
//! `Vec3` and `Quat` are re-exported from `glam`.  The one policy decision
//! layered on top is how a zero-length vector normalizes: see
//! [`normalize_or_keep`].

pub use glam::{Mat3, Mat4, Quat, Vec3};

/// Normalize `v`, or return it unchanged when its length is zero (or so small
/// that the reciprocal length is not finite).
///
/// Every force term in the simulation normalizes through this function so a
/// fully converged flock (zero relative velocity) stays deterministic.
#[inline]
pub fn normalize_or_keep(v: Vec3) -> Vec3 {
    let recip = v.length_recip();
    if recip.is_finite() && recip > 0.0 {
        v * recip
    } else {
        v
    }
}

/// World up axis used when orienting a pose.
const UP: Vec3 = Vec3::Y;

/// Position plus orientation of one agent.
///
/// Orientation is never set directly by simulation code; it is derived from
/// the agent's motion each step via [`Pose::look_at`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Pose {
    /// A pose at `position` with the identity rotation.
    #[inline]
    pub fn at(position: Vec3) -> Self {
        Self { position, rotation: Quat::IDENTITY }
    }

    /// Move the pose by `offset` without changing its orientation.
    #[inline]
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate so the local +Z axis points at `target`.
    ///
    /// Leaves the rotation untouched when `target` coincides with the
    /// position.  When the look direction is parallel to world up the
    /// direction is nudged off-axis so a basis can still be built.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() <= f32::EPSILON * f32::EPSILON {
            return;
        }
        let mut z = forward.normalize();
        let mut x = UP.cross(z);
        if x.length_squared() < 1e-12 {
            // Looking straight up or down.
            z.z += 1e-4_f32.copysign(z.z);
            z = z.normalize();
            x = UP.cross(z);
        }
        let x = x.normalize();
        let y = z.cross(x);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    }

    /// Local +Z axis in world space.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Column-major 4×4 transform, the layout instanced renderers consume.
    pub fn matrix(&self) -> [f32; 16] {
        Mat4::from_rotation_translation(self.rotation, self.position).to_cols_array()
    }
}
