//! Step timing.
//!
//! The simulation has no fixed tick.  Each accepted step integrates over the
//! wall-clock time since the previous accepted step, shaped by a
//! [`DeltaPolicy`].

use std::time::Instant;

use crate::DeltaPolicy;

/// Tracks the anchor instant for delta computation and counts steps.
#[derive(Clone, Debug)]
pub struct StepClock {
    anchor: Instant,
    policy: DeltaPolicy,
    /// Accepted steps since construction (not reset by `reset`).
    pub steps: u64,
}

impl StepClock {
    pub fn new(policy: DeltaPolicy) -> Self {
        Self::starting_at(Instant::now(), policy)
    }

    pub fn starting_at(anchor: Instant, policy: DeltaPolicy) -> Self {
        Self { anchor, policy, steps: 0 }
    }

    /// Move the anchor to `now` without producing a delta.  Called when the
    /// population is rebuilt.
    pub fn reset(&mut self, now: Instant) {
        self.anchor = now;
    }

    /// Delta for a step accepted at `now`, advancing the anchor.
    ///
    /// A `now` earlier than the anchor yields zero rather than panicking.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.anchor);
        self.anchor = now;
        self.steps += 1;
        self.policy.apply(elapsed)
    }

    /// Count a step whose delta was supplied by the caller.
    pub fn tick_fixed(&mut self, now: Instant) {
        self.anchor = now;
        self.steps += 1;
    }
}
