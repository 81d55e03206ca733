//! `flock-sim` — step orchestrator for the rust_flock simulation.
//!
//! # One step
//!
//! ```text
//! advance():
//!   busy?      → Advance::Dropped (observer.on_step_dropped)
//!   ① Delta   — wall clock since the last accepted step, capped per
//!                DeltaPolicy.
//!   ② Emit    — observer.on_poses(current poses); the renderer trails by
//!                one step.
//!   ③ Graph   — NeighborGraph over the current agent array.
//!   ④ Chunk   — one Job per agent (copies of it and its neighbors), split
//!                into StepChunks of config.chunk_size.
//!   ⑤ Dispatch — Scheduler::schedule; returns immediately.
//! poll() / wait():
//!   ⑥ Integrate — flatten chunk results in order, replace the agent
//!                  array, clear the in-flight flag.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Builds neighbor graph rows on Rayon's thread pool.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use flock_core::{FlockConfig, ForceCoefficients};
//! use flock_sim::{FlockBuilder, NoopObserver};
//!
//! let mut flock = FlockBuilder::new(FlockConfig::default())
//!     .coefficients(ForceCoefficients::classic())
//!     .population(10)
//!     .build(NoopObserver)?;
//! flock.advance()?;
//! flock.wait()?;
//! ```

pub mod builder;
pub mod error;
pub mod flock;
pub mod message;
pub mod observer;
pub mod service;

#[cfg(test)]
mod tests;

pub use builder::{DynUnit, FlockBuilder, UnitKind};
pub use error::{SimError, SimResult};
pub use flock::{Advance, Flock, MAX_POPULATION};
pub use message::ControlMessage;
pub use observer::{ChannelObserver, FlockObserver, NoopObserver, PoseFrame};
pub use service::FlockService;
