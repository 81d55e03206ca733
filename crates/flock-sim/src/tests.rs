//! Unit tests for flock-sim.

#[cfg(test)]
mod helpers {
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use flock_core::{Agent, FlockConfig, Pose, UnitId};
    use flock_forces::StepChunk;
    use flock_schedule::{ExecutionUnit, Outcome, Reporter, ScheduleResult, Ticket, Work};

    use crate::FlockObserver;

    pub fn config(units: usize, chunk_size: usize) -> FlockConfig {
        FlockConfig {
            unit_count: Some(units),
            chunk_size,
            seed: Some(7),
            ..FlockConfig::default()
        }
    }

    /// Records every hook invocation.
    #[derive(Default)]
    pub struct Recorder {
        pub frames:    Vec<(u64, Vec<Pose>)>,
        pub completed: Vec<(u64, usize)>,
        pub dropped:   Vec<u64>,
    }

    impl FlockObserver for Recorder {
        fn on_poses(&mut self, step: u64, poses: &[Pose]) {
            self.frames.push((step, poses.to_vec()));
        }

        fn on_step_complete(&mut self, step: u64, agents: usize, _elapsed: Duration) {
            self.completed.push((step, agents));
        }

        fn on_step_dropped(&mut self, step: u64) {
            self.dropped.push(step);
        }
    }

    /// Returns one agent too few per chunk.
    pub struct Truncating;

    impl Work for Truncating {
        type Input = StepChunk;
        type Output = Vec<Agent>;

        fn process(&self, chunk: StepChunk) -> Vec<Agent> {
            let mut out = chunk.process();
            out.pop();
            out
        }
    }

    /// Sleeps before computing, long enough to trip a short unit timeout.
    pub struct Dawdling(pub Duration);

    impl Work for Dawdling {
        type Input = StepChunk;
        type Output = Vec<Agent>;

        fn process(&self, chunk: StepChunk) -> Vec<Agent> {
            thread::sleep(self.0);
            chunk.process()
        }
    }

    pub type HeldTasks = Arc<Mutex<Vec<(Reporter<Vec<Agent>>, Ticket, StepChunk)>>>;

    /// Holds every dispatched chunk until the test calls [`release_all`].
    pub struct Held {
        pub id:       UnitId,
        pub reporter: Reporter<Vec<Agent>>,
        pub tasks:    HeldTasks,
    }

    impl ExecutionUnit for Held {
        type Input = StepChunk;
        type Output = Vec<Agent>;

        fn id(&self) -> UnitId {
            self.id
        }

        fn dispatch(&mut self, ticket: Ticket, payload: StepChunk) -> ScheduleResult<()> {
            self.tasks.lock().unwrap().push((self.reporter.clone(), ticket, payload));
            Ok(())
        }
    }

    /// Complete every held chunk. Returns how many were released.
    pub fn release_all(tasks: &HeldTasks) -> usize {
        let held: Vec<_> = tasks.lock().unwrap().drain(..).collect();
        for (reporter, ticket, chunk) in &held {
            reporter.report(*ticket, Outcome::Done(chunk.process()));
        }
        held.len()
    }

    pub struct Exploding;

    impl Work for Exploding {
        type Input = StepChunk;
        type Output = Vec<Agent>;

        fn process(&self, _chunk: StepChunk) -> Vec<Agent> {
            panic!("force model blew up")
        }
    }
}

// ── Population ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod population {
    use flock_core::{AgentId, FlockError, MAX_SPEED, Vec3};

    use super::helpers::config;
    use crate::{FlockBuilder, MAX_POPULATION, NoopObserver};

    #[test]
    fn resize_builds_centered_grid() {
        let flock = FlockBuilder::new(config(1, 30)).inline().population(3).build(NoopObserver).unwrap();
        assert_eq!(flock.len(), 27);

        let centroid: Vec3 = flock.agents().iter().map(|a| a.position()).sum::<Vec3>() / 27.0;
        assert!(centroid.length() < 1e-5, "centroid = {centroid:?}");

        // Spacing 2, side 3: corners at ±2 on every axis.
        assert_eq!(flock.agents()[0].position(), Vec3::new(-2.0, -2.0, -2.0));
        assert_eq!(flock.agents()[26].position(), Vec3::new(2.0, 2.0, 2.0));
        for a in flock.agents() {
            assert!((a.speed() - MAX_SPEED).abs() < 1e-4);
        }
    }

    #[test]
    fn resize_replaces_population() {
        let mut flock = FlockBuilder::new(config(1, 30)).inline().population(2).build(NoopObserver).unwrap();
        assert_eq!(flock.len(), 8);
        flock.resize(4).unwrap();
        assert_eq!(flock.len(), 64);
        flock.resize(0).unwrap();
        assert!(flock.is_empty());
    }

    #[test]
    fn oversized_population_rejected() {
        let mut flock = FlockBuilder::new(config(1, 30)).inline().build(NoopObserver).unwrap();
        match flock.resize(2_000) {
            Err(FlockError::PopulationTooLarge { requested, limit }) => {
                assert!(requested > limit);
                assert_eq!(limit, MAX_POPULATION);
            }
            other => panic!("expected PopulationTooLarge, got {other:?}"),
        }
        assert!(flock.resize(usize::MAX).is_err());
        assert!(flock.is_empty());
    }

    #[test]
    fn agent_lookup() {
        let flock = FlockBuilder::new(config(1, 30)).inline().population(2).build(NoopObserver).unwrap();
        assert!(flock.agent(AgentId(7)).is_ok());
        assert!(matches!(flock.agent(AgentId(8)), Err(FlockError::AgentNotFound(AgentId(8)))));
    }

    #[test]
    fn seeded_runs_repeat() {
        let a = FlockBuilder::new(config(1, 30)).inline().population(3).build(NoopObserver).unwrap();
        let b = FlockBuilder::new(config(1, 30)).inline().population(3).build(NoopObserver).unwrap();
        assert_eq!(a.agents(), b.agents());
    }
}

// ── Stepping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stepping {
    use std::sync::Arc;

    use flock_core::{AgentId, ForceCoefficients, MAX_SPEED};
    use flock_forces::compute_step;
    use flock_spatial::NeighborGraph;

    use super::helpers::{Held, HeldTasks, Recorder, config, release_all};
    use crate::{Advance, ControlMessage, FlockBuilder, NoopObserver, UnitKind};

    #[test]
    fn empty_flock_step_completes_immediately() {
        let mut flock = FlockBuilder::new(config(2, 30)).inline().build(Recorder::default()).unwrap();
        let outcome = flock.advance_with_delta(0.1).unwrap();
        assert_eq!(outcome, Advance::Dispatched { step: 1, chunks: 0 });
        assert!(!flock.is_busy());
        assert_eq!(flock.observer().completed, vec![(1, 0)]);
    }

    #[test]
    fn advance_while_busy_is_dropped() {
        let tasks = HeldTasks::default();
        let mut flock = FlockBuilder::new(config(2, 4))
            .population(2)
            .build_with_units(Recorder::default(), |id, reporter| {
                Ok(Held { id, reporter, tasks: Arc::clone(&tasks) })
            })
            .unwrap();

        assert_eq!(flock.advance_with_delta(0.1).unwrap(), Advance::Dispatched { step: 1, chunks: 2 });
        assert!(flock.is_busy());
        assert_eq!(flock.advance().unwrap(), Advance::Dropped);
        assert_eq!(flock.handle(ControlMessage::Advance).unwrap(), Some(Advance::Dropped));
        assert_eq!(flock.observer().dropped, vec![1, 1]);
        assert_eq!(flock.observer().frames.len(), 1);

        // Finished work is picked up by the next advance itself.
        assert_eq!(release_all(&tasks), 2);
        assert!(matches!(
            flock.handle(ControlMessage::Advance).unwrap(),
            Some(Advance::Dispatched { step: 2, .. })
        ));
        assert_eq!(flock.observer().completed, vec![(1, 8)]);
        assert_eq!(flock.observer().dropped, vec![1, 1]);
        assert!(flock.is_busy());
    }

    #[test]
    fn control_messages_alone_keep_stepping() {
        let mut flock = FlockBuilder::new(config(2, 4))
            .inline()
            .population(2)
            .build(Recorder::default())
            .unwrap();

        for step in 1..=3 {
            assert!(matches!(
                flock.handle(ControlMessage::Advance).unwrap(),
                Some(Advance::Dispatched { step: s, .. }) if s == step
            ));
        }
        assert_eq!(flock.observer().completed, vec![(1, 8), (2, 8)]);
        assert!(flock.observer().dropped.is_empty());
        assert!(flock.poll().unwrap());
        assert_eq!(flock.steps(), 3);
    }

    #[test]
    fn poses_are_emitted_before_the_step() {
        let mut flock = FlockBuilder::new(config(1, 30))
            .inline()
            .coefficients(ForceCoefficients::classic())
            .population(2)
            .build(Recorder::default())
            .unwrap();
        let before: Vec<_> = flock.agents().iter().map(|a| a.pose).collect();
        flock.step_blocking(0.1).unwrap();
        let (step, poses) = &flock.observer().frames[0];
        assert_eq!(*step, 1);
        assert_eq!(poses, &before);
        assert_ne!(flock.agents()[0].pose, before[0]);
        assert_eq!(flock.observer().completed, vec![(1, 8)]);
    }

    #[test]
    fn results_match_direct_computation_in_order() {
        for kind in [UnitKind::Inline, UnitKind::Threads] {
            let coeffs = ForceCoefficients::classic();
            let mut flock = FlockBuilder::new(config(3, 4))
                .units(kind)
                .coefficients(coeffs)
                .population(3)
                .build(NoopObserver)
                .unwrap();

            let before = flock.agents().to_vec();
            let graph = NeighborGraph::build(&before, flock.config().neighbor_radius);
            let expected: Vec<_> = (0..before.len())
                .map(|i| {
                    let nearby: Vec<_> = graph
                        .neighbors(AgentId(i as u32))
                        .iter()
                        .map(|n| before[n.index()])
                        .collect();
                    compute_step(&before[i], &nearby, &coeffs, 0.05)
                })
                .collect();

            flock.step_blocking(0.05).unwrap();
            assert_eq!(flock.agents(), expected.as_slice(), "{kind:?}");
        }
    }

    #[test]
    fn containment_only_pulls_toward_origin() {
        let mut flock = FlockBuilder::new(config(2, 3))
            .inline()
            .coefficients(ForceCoefficients::new(1.0, 0.0, 0.0, 0.0))
            .population(2)
            .build(NoopObserver)
            .unwrap();
        let before = flock.agents().to_vec();
        flock.step_blocking(0.1).unwrap();

        for (old, new) in before.iter().zip(flock.agents()) {
            let change = new.velocity - old.velocity;
            assert!(change.dot(-old.position()) > 0.0, "change {change:?} at {:?}", old.position());
            assert!(new.speed() <= MAX_SPEED);
        }
    }

    #[test]
    fn coefficients_apply_from_next_step() {
        let mut flock = FlockBuilder::new(config(1, 30)).inline().population(2).build(NoopObserver).unwrap();
        assert_eq!(flock.coefficients(), ForceCoefficients::ZERO);
        flock.handle(ControlMessage::SetCoefficients(ForceCoefficients::classic())).unwrap();
        assert_eq!(flock.coefficients(), ForceCoefficients::classic());

        // Zero coefficients coast; classic ones do not.
        let mut coasting = FlockBuilder::new(config(1, 30)).inline().population(2).build(NoopObserver).unwrap();
        coasting.step_blocking(0.1).unwrap();
        flock.step_blocking(0.1).unwrap();
        assert_ne!(coasting.agents()[0].velocity, flock.agents()[0].velocity);
    }

    #[test]
    fn resize_mid_step_discards_stale_results() {
        let mut flock = FlockBuilder::new(config(2, 4))
            .inline()
            .population(2)
            .build(Recorder::default())
            .unwrap();
        flock.advance_with_delta(0.1).unwrap();
        flock.handle(ControlMessage::Resize(3)).unwrap();
        let fresh = flock.agents().to_vec();

        assert!(!flock.poll().unwrap());
        assert!(!flock.is_busy());
        assert_eq!(flock.agents(), fresh.as_slice());
        assert!(flock.observer().completed.is_empty());

        assert!(matches!(flock.advance_with_delta(0.1).unwrap(), Advance::Dispatched { step: 2, .. }));
        assert!(flock.poll().unwrap());
        assert_eq!(flock.len(), 27);
    }

    #[test]
    fn wait_without_step_is_noop() {
        let mut flock = FlockBuilder::new(config(1, 30)).inline().build(NoopObserver).unwrap();
        assert!(!flock.wait().unwrap());
        assert!(!flock.poll().unwrap());
    }
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use flock_core::{FlockConfig, FlockError};
    use flock_schedule::{InlineUnit, ScheduleError, ThreadUnit};

    use super::helpers::{Dawdling, Exploding, Truncating, config};
    use crate::{FlockBuilder, NoopObserver, SimError};

    #[test]
    fn invalid_config_rejected() {
        let bad = FlockConfig { chunk_size: 0, ..config(1, 30) };
        assert!(matches!(
            FlockBuilder::new(bad).inline().build(NoopObserver),
            Err(SimError::Flock(FlockError::Config(_)))
        ));
    }

    #[test]
    fn short_results_are_a_contract_violation() {
        let mut flock = FlockBuilder::new(config(2, 4))
            .population(2)
            .build_with_units(NoopObserver, |_, reporter| {
                Ok(InlineUnit::new(Arc::new(Truncating), reporter))
            })
            .unwrap();
        let before = flock.agents().to_vec();
        flock.advance_with_delta(0.1).unwrap();
        assert!(matches!(
            flock.poll(),
            Err(SimError::ResultCountMismatch { step: 1, expected: 8, got: 6 })
        ));
        assert!(!flock.is_busy());
        assert_eq!(flock.agents(), before.as_slice());
    }

    #[test]
    fn unit_panic_fails_the_step() {
        let mut flock = FlockBuilder::new(config(2, 4))
            .population(2)
            .build_with_units(NoopObserver, |_, reporter| {
                Ok(InlineUnit::new(Arc::new(Exploding), reporter))
            })
            .unwrap();
        let before = flock.agents().to_vec();
        flock.advance_with_delta(0.1).unwrap();
        assert!(matches!(
            flock.poll(),
            Err(SimError::Schedule(ScheduleError::UnitPanicked { .. }))
        ));
        assert!(!flock.is_busy());
        assert_eq!(flock.agents(), before.as_slice());
    }

    #[test]
    fn polling_a_stalled_step_fails_it() {
        let work = Arc::new(Dawdling(Duration::from_secs(2)));
        let cfg = FlockConfig { unit_timeout_ms: Some(50), ..config(2, 4) };
        let mut flock = FlockBuilder::new(cfg)
            .population(2)
            .build_with_units(NoopObserver, |_, reporter| {
                ThreadUnit::spawn(Arc::clone(&work), reporter)
            })
            .unwrap();
        let before = flock.agents().to_vec();
        flock.advance_with_delta(0.1).unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        let err = loop {
            match flock.poll() {
                Err(err) => break err,
                Ok(done) => assert!(!done, "a dawdling step cannot finish this early"),
            }
            assert!(Instant::now() < deadline, "poll never reported the stall");
            thread::sleep(Duration::from_millis(10));
        };
        assert!(matches!(err, SimError::Schedule(ScheduleError::Stalled { .. })), "{err:?}");
        assert!(!flock.is_busy());
        assert_eq!(flock.agents(), before.as_slice());
    }
}

// ── Observers and service ─────────────────────────────────────────────────────

#[cfg(test)]
mod service {
    use std::sync::mpsc;
    use std::time::Duration;

    use flock_core::{ForceCoefficients, Pose, Vec3};

    use super::helpers::config;
    use crate::{ChannelObserver, FlockBuilder, FlockObserver, FlockService, PoseFrame};

    #[test]
    fn channel_observer_forwards_frames() {
        let (tx, rx) = mpsc::channel();
        let mut obs = ChannelObserver::new(tx);
        let poses = [Pose::at(Vec3::X), Pose::at(Vec3::Y)];
        obs.on_poses(4, &poses);
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame, PoseFrame { step: 4, poses: poses.to_vec() });
        assert_eq!(frame.matrices()[1][13], 1.0);

        drop(rx);
        obs.on_poses(5, &poses);
        assert!(obs.is_closed());
    }

    #[test]
    fn service_streams_poses() {
        let builder = FlockBuilder::new(config(2, 4)).inline();
        let (service, frames) = FlockService::spawn(builder).unwrap();
        service.resize(2).unwrap();
        service.set_coefficients(ForceCoefficients::classic()).unwrap();
        service.advance().unwrap();

        let first = frames.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.step, 1);
        assert_eq!(first.poses.len(), 8);

        // Keep asking until the second step is accepted.
        let second = loop {
            service.advance().unwrap();
            if let Ok(frame) = frames.recv_timeout(Duration::from_millis(50)) {
                break frame;
            }
        };
        assert_eq!(second.step, 2);
        assert_ne!(second.poses, first.poses);
        service.shutdown();
    }

    #[test]
    fn service_stops_on_drop() {
        let (service, frames) = FlockService::spawn(FlockBuilder::new(config(1, 30)).inline()).unwrap();
        drop(service);
        assert!(frames.recv_timeout(Duration::from_secs(1)).is_err());
    }
}
