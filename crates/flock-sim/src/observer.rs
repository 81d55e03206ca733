//! Observer hooks: the seam between the simulation and whatever draws it.

use std::sync::mpsc::Sender;
use std::time::Duration;

use flock_core::Pose;

/// Callbacks invoked by [`Flock`][crate::Flock] as steps are accepted,
/// dropped, and completed.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — frame counter
///
/// ```rust,ignore
/// struct Frames(u64);
///
/// impl FlockObserver for Frames {
///     fn on_poses(&mut self, _step: u64, _poses: &[Pose]) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait FlockObserver {
    /// Called once per accepted advance with the poses as they stood
    /// *before* the step runs.  What a renderer shows therefore trails the
    /// simulation by one step.
    fn on_poses(&mut self, _step: u64, _poses: &[Pose]) {}

    /// Called when a step's results have replaced the agent array.
    ///
    /// `elapsed` runs from dispatch to integration.
    fn on_step_complete(&mut self, _step: u64, _agents: usize, _elapsed: Duration) {}

    /// Called when an advance is ignored because a step is still in flight.
    /// `step` is the in-flight step.
    fn on_step_dropped(&mut self, _step: u64) {}
}

/// A [`FlockObserver`] that does nothing.
pub struct NoopObserver;

impl FlockObserver for NoopObserver {}

impl<O: FlockObserver + ?Sized> FlockObserver for &mut O {
    fn on_poses(&mut self, step: u64, poses: &[Pose]) {
        (**self).on_poses(step, poses);
    }

    fn on_step_complete(&mut self, step: u64, agents: usize, elapsed: Duration) {
        (**self).on_step_complete(step, agents, elapsed);
    }

    fn on_step_dropped(&mut self, step: u64) {
        (**self).on_step_dropped(step);
    }
}

// ── ChannelObserver ───────────────────────────────────────────────────────────

/// One batch of poses, as emitted at the start of a step.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseFrame {
    pub step:  u64,
    pub poses: Vec<Pose>,
}

impl PoseFrame {
    /// Column-major transforms, one per agent, for instanced drawing.
    pub fn matrices(&self) -> Vec<[f32; 16]> {
        self.poses.iter().map(Pose::matrix).collect()
    }
}

/// Forwards every pose batch over an mpsc channel.
///
/// Sending never blocks.  Once the receiver is gone, frames are discarded.
pub struct ChannelObserver {
    tx:     Sender<PoseFrame>,
    closed: bool,
}

impl ChannelObserver {
    pub fn new(tx: Sender<PoseFrame>) -> Self {
        Self { tx, closed: false }
    }

    /// `true` once a send has failed because the receiver was dropped.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FlockObserver for ChannelObserver {
    fn on_poses(&mut self, step: u64, poses: &[Pose]) {
        if self.closed {
            return;
        }
        let frame = PoseFrame { step, poses: poses.to_vec() };
        if self.tx.send(frame).is_err() {
            tracing::debug!(step, "pose receiver dropped; frames discarded from now on");
            self.closed = true;
        }
    }
}
