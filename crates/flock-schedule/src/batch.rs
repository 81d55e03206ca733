//! `Batch` — the greedy-refill state machine for one dispatch batch.
//!
//! # States
//!
//! ```text
//! Running ──(last completion)──▶ Finished
//! ```
//!
//! The only transition input is a unit completion ([`Batch::complete`]).
//! Each completion frees exactly one unit, which is immediately handed the
//! next pending task in input order.  Results are stored by task index, so
//! the order of the final `Vec` is the input order no matter which unit
//! finished first.

use std::collections::VecDeque;

use flock_core::{TaskId, UnitId};

use crate::{ScheduleError, ScheduleResult, Ticket};

/// Lifecycle of a [`Batch`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BatchState {
    Running,
    Finished,
}

/// One task record: the payload until it starts, the result once it ends.
struct Task<I, O> {
    payload: Option<I>,
    result:  Option<O>,
    started: bool,
}

/// A task handed to a specific unit.
#[derive(Debug)]
pub struct Assignment<I> {
    pub unit:    UnitId,
    pub ticket:  Ticket,
    pub payload: I,
}

/// What the scheduler must do after a completion.
#[derive(Debug)]
pub enum Transition<I, O> {
    /// Batch still running.  `Some` carries the refill for the freed unit.
    Continue(Option<Assignment<I>>),
    /// Every task finished; results in input order.
    Finished(Vec<O>),
}

pub struct Batch<I, O> {
    id:        u64,
    tasks:     Vec<Task<I, O>>,
    pending:   VecDeque<TaskId>,
    /// Task currently running on each unit, indexed by `UnitId`.
    in_flight: Vec<Option<TaskId>>,
    done:      usize,
    state:     BatchState,
}

impl<I, O> Batch<I, O> {
    /// Create a batch of `jobs` for a pool of `unit_count` units.
    pub fn new(id: u64, jobs: Vec<I>, unit_count: usize) -> Self {
        let pending = (0..jobs.len() as u32).map(TaskId).collect();
        let tasks = jobs
            .into_iter()
            .map(|payload| Task { payload: Some(payload), result: None, started: false })
            .collect();
        Self {
            id,
            tasks,
            pending,
            in_flight: vec![None; unit_count],
            done: 0,
            state: BatchState::Running,
        }
    }

    /// Assign the first `min(units, jobs)` tasks to distinct units.
    pub fn start(&mut self) -> Vec<Assignment<I>> {
        let mut out = Vec::with_capacity(self.in_flight.len().min(self.tasks.len()));
        for unit in 0..self.in_flight.len() {
            match self.assign_next(UnitId(unit as u32)) {
                Some(a) => out.push(a),
                None => break,
            }
        }
        out
    }

    /// Record a unit's result and decide what that unit does next.
    ///
    /// Fails if the completion does not match what this batch dispatched to
    /// that unit (wrong batch, idle unit, or a different task).
    pub fn complete(
        &mut self,
        unit:   UnitId,
        ticket: Ticket,
        output: O,
    ) -> ScheduleResult<Transition<I, O>> {
        if self.state != BatchState::Running {
            return Err(ScheduleError::Protocol(format!(
                "completion for {ticket} after batch {} finished",
                self.id
            )));
        }
        if ticket.batch != self.id {
            return Err(ScheduleError::Protocol(format!(
                "completion for {ticket} delivered to batch {}",
                self.id
            )));
        }
        let slot = self.in_flight.get_mut(unit.index()).ok_or_else(|| {
            ScheduleError::Protocol(format!("completion from unknown {unit}"))
        })?;
        if *slot != Some(ticket.task) {
            return Err(ScheduleError::Protocol(format!(
                "{unit} reported {} but was running {:?}",
                ticket.task, slot
            )));
        }
        *slot = None;

        self.tasks[ticket.task.index()].result = Some(output);
        self.done += 1;

        if let Some(next) = self.assign_next(unit) {
            return Ok(Transition::Continue(Some(next)));
        }
        if self.done < self.tasks.len() {
            return Ok(Transition::Continue(None));
        }

        self.state = BatchState::Finished;
        let results = std::mem::take(&mut self.tasks)
            .into_iter()
            .map(|t| t.result)
            .collect::<Option<Vec<O>>>()
            .ok_or_else(|| {
                ScheduleError::Protocol(format!("batch {} finished with a missing result", self.id))
            })?;
        Ok(Transition::Finished(results))
    }

    fn assign_next(&mut self, unit: UnitId) -> Option<Assignment<I>> {
        let task = self.pending.pop_front()?;
        let record = &mut self.tasks[task.index()];
        record.started = true;
        let payload = record.payload.take()?;
        self.in_flight[unit.index()] = Some(task);
        Some(Assignment {
            unit,
            ticket: Ticket { batch: self.id, task },
            payload,
        })
    }

    // ── Introspection ─────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Tasks handed to a unit and not yet reported.
    pub fn in_flight(&self) -> usize {
        self.in_flight.iter().filter(|t| t.is_some()).count()
    }

    /// Tasks not yet started.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn completed(&self) -> usize {
        self.done
    }

    /// Total tasks in the batch (0 once finished and drained).
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks that have been handed to a unit at least once.
    pub fn started(&self) -> usize {
        self.tasks.iter().filter(|t| t.started).count()
    }
}
