use std::time::Duration;

use thiserror::Error;

use flock_core::{TaskId, UnitId};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("a pool needs at least one execution unit")]
    NoUnits,

    #[error("a batch is already in flight")]
    Busy,

    #[error("failed to spawn {unit}: {reason}")]
    Spawn { unit: UnitId, reason: String },

    #[error("{0} is no longer accepting work")]
    UnitDisconnected(UnitId),

    #[error("every execution unit has shut down")]
    PoolDisconnected,

    #[error("{unit} panicked while running {task}: {message}")]
    UnitPanicked {
        unit:    UnitId,
        task:    TaskId,
        message: String,
    },

    #[error("no unit completed within {waited:?}; {outstanding} task(s) outstanding")]
    Stalled {
        outstanding: usize,
        waited:      Duration,
    },

    #[error("scheduling protocol violation: {0}")]
    Protocol(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
