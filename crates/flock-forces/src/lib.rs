//! `flock-forces` — the per-agent boid force model.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`forces`] | The four force terms, speed clamp, `compute_step`          |
//! | [`chunk`]  | `Job`, `StepChunk`, `ForceWorker` (the unit-side `Work`)   |
//!
//! # Step (summary)
//!
//! ```text
//! force    = containment + alignment + cohesion + separation
//! velocity = clamp(velocity + force * delta * 10, MAX_SPEED)
//! position = position + velocity * delta
//! facing   = position - velocity      (look back along travel)
//! ```
//!
//! Everything here is a pure function of its arguments.  There is no shared
//! scratch state, so the model can run on any number of threads at once.

pub mod chunk;
pub mod forces;


pub use chunk::{ForceWorker, Job, StepChunk};
pub use forces::{
    FORCE_GAIN, SEPARATION_EPSILON, accumulate, alignment, clamp_speed, cohesion, compute_step,
    containment, separation,
};
