//! `flock-schedule` — bounded execution-unit pool and batch scheduler.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`work`]        | `Work` trait — the computation an execution unit runs    |
//! | [`unit`]        | `ExecutionUnit` trait, `Ticket`, `Completion`, `Reporter` |
//! | [`thread_unit`] | `ThreadUnit` — one long-lived worker thread per unit     |
//! | [`inline_unit`] | `InlineUnit` — runs on the caller's thread               |
//! | [`batch`]       | `Batch` — greedy-refill state machine for one dispatch   |
//! | [`scheduler`]   | `Scheduler` — owns the units and the active batch        |
//! | [`partition`]   | `partition` — split jobs into fixed-size chunks          |
//! | [`error`]       | `ScheduleError`, `ScheduleResult<T>`                     |
//!
//! # Dispatch model (summary)
//!
//! ```text
//! schedule(jobs, on_finished)
//!   jobs empty            → on_finished([]) immediately
//!   else                  → start min(units, jobs) tasks on distinct units
//! completion(unit, task)  → record result
//!                           next pending task → same unit, right away
//!                           all done → on_finished(results in input order)
//! ```
//!
//! Dispatch never blocks.  Completions arrive on a channel and are applied
//! by [`Scheduler::poll`] (non-blocking) or [`Scheduler::wait`] (blocking,
//! bounded by the stall timeout).

pub mod batch;
pub mod error;
pub mod inline_unit;
pub mod partition;
pub mod scheduler;
pub mod thread_unit;
pub mod unit;
pub mod work;


pub use batch::{Assignment, Batch, BatchState, Transition};
pub use error::{ScheduleError, ScheduleResult};
pub use inline_unit::InlineUnit;
pub use partition::partition;
pub use scheduler::Scheduler;
pub use thread_unit::ThreadUnit;
pub use unit::{Completion, ExecutionUnit, Outcome, Reporter, Ticket};
pub use work::Work;
