//! Execution-unit seam: dispatch tickets, completion messages, reporters.

use std::fmt;
use std::sync::mpsc::Sender;

use flock_core::{TaskId, UnitId};

use crate::ScheduleResult;

// ── Ticket ────────────────────────────────────────────────────────────────────

/// Tag carried by every dispatch and echoed by its completion.
///
/// `batch` is a generation counter, so a completion that arrives after its
/// batch was abandoned can be recognised and dropped.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Ticket {
    pub batch: u64,
    pub task:  TaskId,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch {} / {}", self.batch, self.task)
    }
}

// ── Completion ────────────────────────────────────────────────────────────────

/// What came back from running one payload.
#[derive(Debug)]
pub enum Outcome<T> {
    Done(T),
    /// The computation panicked; the payload is lost.
    Panicked(String),
}

/// Message sent from a unit to the scheduler when a payload finishes.
#[derive(Debug)]
pub struct Completion<T> {
    pub unit:    UnitId,
    pub ticket:  Ticket,
    pub outcome: Outcome<T>,
}

// ── Reporter ──────────────────────────────────────────────────────────────────

/// A unit's handle on the scheduler's completion channel.
pub struct Reporter<T> {
    unit: UnitId,
    tx:   Sender<Completion<T>>,
}

impl<T> Clone for Reporter<T> {
    fn clone(&self) -> Self {
        Self { unit: self.unit, tx: self.tx.clone() }
    }
}

impl<T> Reporter<T> {
    pub(crate) fn new(unit: UnitId, tx: Sender<Completion<T>>) -> Self {
        Self { unit, tx }
    }

    #[inline]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Send a completion.  Returns `false` once the scheduler is gone.
    pub fn report(&self, ticket: Ticket, outcome: Outcome<T>) -> bool {
        self.tx
            .send(Completion { unit: self.unit, ticket, outcome })
            .is_ok()
    }
}

// ── ExecutionUnit ─────────────────────────────────────────────────────────────

/// An isolated worker that runs one payload at a time.
///
/// `dispatch` must return promptly: the result is delivered later through
/// the unit's [`Reporter`], tagged with the same [`Ticket`].
///
/// Within one batch a unit is never handed a second task before it reports
/// the first.  After a batch is abandoned, units still running its tasks may
/// be handed work from the next batch; they must queue it and run payloads
/// in dispatch order.  Completions for the abandoned batch are recognised by
/// their ticket and dropped.
pub trait ExecutionUnit: Send {
    type Input: Send + 'static;
    type Output: Send + 'static;

    fn id(&self) -> UnitId;

    fn dispatch(&mut self, ticket: Ticket, payload: Self::Input) -> ScheduleResult<()>;
}

impl<U: ExecutionUnit + ?Sized> ExecutionUnit for Box<U> {
    type Input = U::Input;
    type Output = U::Output;

    fn id(&self) -> UnitId {
        (**self).id()
    }

    fn dispatch(&mut self, ticket: Ticket, payload: Self::Input) -> ScheduleResult<()> {
        (**self).dispatch(ticket, payload)
    }
}

/// Render a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
