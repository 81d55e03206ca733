use flock_core::FlockError;
use flock_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("step {step} returned {got} agents, expected {expected}")]
    ResultCountMismatch {
        step:     u64,
        expected: usize,
        got:      usize,
    },

    #[error("flock service is no longer running")]
    ServiceStopped,

    #[error("failed to spawn flock service thread: {0}")]
    Spawn(std::io::Error),

    #[error(transparent)]
    Flock(#[from] FlockError),

    #[error("scheduler error: {0}")]
    Schedule(#[from] ScheduleError),
}

pub type SimResult<T> = Result<T, SimError>;
