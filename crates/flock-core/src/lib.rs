//! `flock-core` — foundational types for the `rust_flock` simulation.
//!
//! This crate is a dependency of every other `flock-*` crate.  It has no
//! `flock-*` dependencies and few external ones (`glam`, `rand`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module            | Contents                                            |
//! |-------------------|-----------------------------------------------------|
//! | [`math`]          | `Vec3`, `Quat`, `Pose`, `normalize_or_keep`         |
//! | [`ids`]           | `AgentId`, `UnitId`, `TaskId`                       |
//! | [`agent`]         | `Agent`, `MAX_SPEED`, `MAX_RADIUS`                  |
//! | [`coefficients`]  | `ForceCoefficients`                                 |
//! | [`config`]        | `FlockConfig`, `DeltaPolicy`, `GraphStrategy`       |
//! | [`time`]          | `StepClock`                                         |
//! | [`rng`]           | `FlockRng`                                          |
//! | [`error`]         | `FlockError`, `FlockResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod agent;
pub mod coefficients;
pub mod config;
pub mod error;
pub mod ids;
pub mod math;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{Agent, MAX_RADIUS, MAX_SPEED};
pub use coefficients::ForceCoefficients;
pub use config::{DeltaPolicy, FlockConfig, GraphStrategy};
pub use error::{FlockError, FlockResult};
pub use ids::{AgentId, TaskId, UnitId};
pub use math::{Pose, Quat, Vec3, normalize_or_keep};
pub use rng::FlockRng;
pub use time::StepClock;
