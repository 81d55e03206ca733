//! Unit tests for flock-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, TaskId, UnitId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(TaskId(0) < TaskId(1));
        assert!(UnitId(9) > UnitId(3));
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
        assert_eq!(UnitId(2).to_string(), "UnitId(2)");
    }
}

#[cfg(test)]
mod math {
    use crate::{Pose, Vec3, normalize_or_keep};

    #[test]
    fn normalize_zero_is_noop() {
        assert_eq!(normalize_or_keep(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn normalize_regular_vector() {
        let n = normalize_or_keep(Vec3::new(3.0, 0.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn look_at_points_forward_axis_at_target() {
        let mut pose = Pose::at(Vec3::new(1.0, 2.0, 3.0));
        pose.look_at(Vec3::new(4.0, 2.0, 3.0));
        let f = pose.forward();
        assert!((f - Vec3::X).length() < 1e-5, "forward = {f:?}");
    }

    #[test]
    fn look_at_self_keeps_rotation() {
        let mut pose = Pose::at(Vec3::ONE);
        pose.look_at(Vec3::new(0.0, 0.0, 10.0));
        let before = pose.rotation;
        pose.look_at(pose.position);
        assert_eq!(pose.rotation, before);
    }

    #[test]
    fn look_at_straight_up_is_finite() {
        let mut pose = Pose::at(Vec3::ZERO);
        pose.look_at(Vec3::new(0.0, 5.0, 0.0));
        assert!(pose.rotation.is_finite());
        assert!(pose.forward().y > 0.99);
    }

    #[test]
    fn translate_moves_position_only() {
        let mut pose = Pose::at(Vec3::ZERO);
        pose.look_at(Vec3::Z);
        let rot = pose.rotation;
        pose.translate(Vec3::new(1.0, -1.0, 2.0));
        assert_eq!(pose.position, Vec3::new(1.0, -1.0, 2.0));
        assert_eq!(pose.rotation, rot);
    }

    #[test]
    fn matrix_carries_translation() {
        let pose = Pose::at(Vec3::new(5.0, 6.0, 7.0));
        let m = pose.matrix();
        assert_eq!(&m[12..15], &[5.0, 6.0, 7.0]);
        assert_eq!(m[15], 1.0);
    }
}

#[cfg(test)]
mod agent {
    use crate::{Agent, Vec3};

    #[test]
    fn new_agent_faces_back_along_velocity() {
        let a = Agent::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
        assert!((a.pose.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(a.speed(), 10.0);
    }
}

#[cfg(test)]
mod config {
    use std::time::Duration;

    use crate::{DeltaPolicy, FlockConfig};

    #[test]
    fn default_is_valid() {
        FlockConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let cfg = FlockConfig { chunk_size: 0, ..FlockConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn nan_radius_rejected() {
        let cfg = FlockConfig { neighbor_radius: f32::NAN, ..FlockConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_units_rejected() {
        let cfg = FlockConfig { unit_count: Some(0), ..FlockConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = FlockConfig { unit_count: Some(3), ..FlockConfig::default() };
        assert_eq!(cfg.resolved_unit_count(), 3);
    }

    #[test]
    fn seconds_policy_caps_long_frames() {
        let p = DeltaPolicy::Seconds { cap: 0.5 };
        assert!((p.apply(Duration::from_millis(16)) - 0.016).abs() < 1e-6);
        assert_eq!(p.apply(Duration::from_secs(3)), 0.5);
    }

    #[test]
    fn legacy_policy_compares_milliseconds() {
        let p = DeltaPolicy::LegacyMilliseconds { cap: 0.5 };
        // 16 ms is "16" which the cap clamps to 0.5.
        assert_eq!(p.apply(Duration::from_millis(16)), 0.5);
        assert_eq!(p.apply(Duration::ZERO), 0.0);
    }
}

#[cfg(test)]
mod time {
    use std::time::{Duration, Instant};

    use crate::{DeltaPolicy, StepClock};

    #[test]
    fn tick_measures_since_anchor() {
        let t0 = Instant::now();
        let mut clock = StepClock::starting_at(t0, DeltaPolicy::Seconds { cap: 0.5 });
        let d = clock.tick(t0 + Duration::from_millis(100));
        assert!((d - 0.1).abs() < 1e-6);
        assert_eq!(clock.steps, 1);
        let d = clock.tick(t0 + Duration::from_millis(150));
        assert!((d - 0.05).abs() < 1e-6);
    }

    #[test]
    fn reset_moves_anchor() {
        let t0 = Instant::now();
        let mut clock = StepClock::starting_at(t0, DeltaPolicy::Seconds { cap: 10.0 });
        clock.reset(t0 + Duration::from_secs(2));
        let d = clock.tick(t0 + Duration::from_secs(3));
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn earlier_instant_gives_zero() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = StepClock::starting_at(t0, DeltaPolicy::default());
        assert_eq!(clock.tick(t0 - Duration::from_millis(500)), 0.0);
    }
}

#[cfg(test)]
mod rng {
    use crate::FlockRng;

    #[test]
    fn directions_are_unit_length() {
        let mut rng = FlockRng::new(7);
        for _ in 0..1000 {
            let d = rng.random_direction();
            assert!((d.length() - 1.0).abs() < 1e-4, "{d:?}");
        }
    }

    #[test]
    fn same_seed_same_directions() {
        let mut a = FlockRng::new(99);
        let mut b = FlockRng::new(99);
        for _ in 0..50 {
            assert_eq!(a.random_direction(), b.random_direction());
        }
    }
}
