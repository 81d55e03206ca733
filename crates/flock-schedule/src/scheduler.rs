//! `Scheduler` — owns a fixed pool of execution units and at most one batch.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use flock_core::UnitId;

use crate::{
    Batch, Completion, ExecutionUnit, Outcome, Reporter, ScheduleError, ScheduleResult,
    Transition,
};

type FinishFn<O> = Box<dyn FnOnce(Vec<O>) + Send>;

/// The batch currently in flight plus the callback it owes.
struct ActiveBatch<I, O> {
    batch:         Batch<I, O>,
    on_finished:   FinishFn<O>,
    /// Dispatch time, then the time of the latest accepted completion.
    last_progress: Instant,
}

/// Greedy-refill scheduler over a fixed pool of units.
///
/// ```rust,ignore
/// let mut sched = Scheduler::with_units(4, |_, reporter| {
///     ThreadUnit::spawn(Arc::clone(&work), reporter)
/// })?;
/// sched.schedule(chunks, move |results| { /* results in input order */ })?;
/// sched.wait()?;
/// ```
pub struct Scheduler<U: ExecutionUnit> {
    units:       Vec<U>,
    completions: Receiver<Completion<U::Output>>,
    active:      Option<ActiveBatch<U::Input, U::Output>>,
    next_batch:  u64,
    /// How long `wait` tolerates no completions before declaring a stall.
    timeout:     Option<Duration>,
}

impl<U: ExecutionUnit> Scheduler<U> {
    /// Build a pool of `count` units.  `factory` receives each unit's id and
    /// the [`Reporter`] it must deliver completions through.
    pub fn with_units<F>(count: usize, mut factory: F) -> ScheduleResult<Self>
    where
        F: FnMut(UnitId, Reporter<U::Output>) -> ScheduleResult<U>,
    {
        if count == 0 {
            return Err(ScheduleError::NoUnits);
        }
        let (tx, completions) = mpsc::channel();
        let units = (0..count as u32)
            .map(|i| factory(UnitId(i), Reporter::new(UnitId(i), tx.clone())))
            .collect::<ScheduleResult<Vec<U>>>()?;
        debug!(units = count, "scheduler pool ready");
        Ok(Self {
            units,
            completions,
            active: None,
            next_batch: 0,
            timeout: None,
        })
    }

    /// Bound how long [`wait`][Self::wait] blocks without progress.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Start a batch.  Returns as soon as the first tasks are dispatched.
    ///
    /// `on_finished` fires exactly once, with results in the order of
    /// `jobs`.  An empty `jobs` fires it before this call returns without
    /// touching any unit.  Fails with [`ScheduleError::Busy`] while another
    /// batch is in flight.
    pub fn schedule<F>(&mut self, jobs: Vec<U::Input>, on_finished: F) -> ScheduleResult<()>
    where
        F: FnOnce(Vec<U::Output>) + Send + 'static,
    {
        if self.active.is_some() {
            return Err(ScheduleError::Busy);
        }
        if jobs.is_empty() {
            on_finished(Vec::new());
            return Ok(());
        }

        let id = self.next_batch;
        self.next_batch += 1;
        let mut batch = Batch::new(id, jobs, self.units.len());
        debug!(batch = id, tasks = batch.len(), units = self.units.len(), "batch started");

        for a in batch.start() {
            self.units[a.unit.index()].dispatch(a.ticket, a.payload)?;
        }
        self.active = Some(ActiveBatch {
            batch,
            on_finished: Box::new(on_finished),
            last_progress: Instant::now(),
        });
        Ok(())
    }

    // ── Completion handling ───────────────────────────────────────────────

    /// Apply every completion already waiting, without blocking.
    ///
    /// Returns `true` if the active batch finished (and its callback ran)
    /// during this call.  With a timeout set, fails with
    /// [`ScheduleError::Stalled`] once no unit has reported for that long;
    /// the batch is then abandoned.
    pub fn poll(&mut self) -> ScheduleResult<bool> {
        let mut finished = false;
        loop {
            match self.completions.try_recv() {
                Ok(completion) => finished |= self.handle(completion)?,
                Err(TryRecvError::Empty) => {
                    self.check_stall()?;
                    return Ok(finished);
                }
                Err(TryRecvError::Disconnected) => {
                    if self.active.is_some() {
                        self.abandon();
                        return Err(ScheduleError::PoolDisconnected);
                    }
                    return Ok(finished);
                }
            }
        }
    }

    /// Block until the active batch finishes.
    ///
    /// With a timeout set, gives up with [`ScheduleError::Stalled`] when no
    /// unit reports for that long; the batch is then abandoned.
    pub fn wait(&mut self) -> ScheduleResult<()> {
        while self.active.is_some() {
            let completion = match self.timeout {
                Some(limit) => match self.completions.recv_timeout(limit) {
                    Ok(c) => c,
                    Err(RecvTimeoutError::Timeout) => {
                        let outstanding = self.abandon().unwrap_or(0);
                        return Err(ScheduleError::Stalled { outstanding, waited: limit });
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        self.abandon();
                        return Err(ScheduleError::PoolDisconnected);
                    }
                },
                None => match self.completions.recv() {
                    Ok(c) => c,
                    Err(_) => {
                        self.abandon();
                        return Err(ScheduleError::PoolDisconnected);
                    }
                },
            };
            self.handle(completion)?;
        }
        Ok(())
    }

    fn check_stall(&mut self) -> ScheduleResult<()> {
        let (Some(limit), Some(active)) = (self.timeout, self.active.as_ref()) else {
            return Ok(());
        };
        if active.last_progress.elapsed() < limit {
            return Ok(());
        }
        let outstanding = self.abandon().unwrap_or(0);
        Err(ScheduleError::Stalled { outstanding, waited: limit })
    }

    /// Drop the active batch without firing its callback.
    ///
    /// Returns the number of tasks that had not completed.  Units already
    /// running a task finish it; their late completions are ignored.
    pub fn abandon(&mut self) -> Option<usize> {
        let active = self.active.take()?;
        let outstanding = active.batch.len() - active.batch.completed();
        warn!(batch = active.batch.id(), outstanding, "batch abandoned");
        Some(outstanding)
    }

    fn handle(&mut self, completion: Completion<U::Output>) -> ScheduleResult<bool> {
        let Completion { unit, ticket, outcome } = completion;

        let Some(active) = self.active.as_mut() else {
            warn!(unit = unit.0, %ticket, "completion with no batch in flight; ignored");
            return Ok(false);
        };
        if ticket.batch != active.batch.id() {
            warn!(unit = unit.0, %ticket, "completion from an abandoned batch; ignored");
            return Ok(false);
        }

        active.last_progress = Instant::now();

        let output = match outcome {
            Outcome::Done(output) => output,
            Outcome::Panicked(message) => {
                self.abandon();
                return Err(ScheduleError::UnitPanicked { unit, task: ticket.task, message });
            }
        };

        let transition = match active.batch.complete(unit, ticket, output) {
            Ok(t) => t,
            Err(err) => {
                self.abandon();
                return Err(err);
            }
        };

        match transition {
            Transition::Continue(None) => Ok(false),
            Transition::Continue(Some(next)) => {
                if let Err(err) = self.units[next.unit.index()].dispatch(next.ticket, next.payload) {
                    self.abandon();
                    return Err(err);
                }
                Ok(false)
            }
            Transition::Finished(results) => {
                if let Some(active) = self.active.take() {
                    debug!(batch = active.batch.id(), tasks = results.len(), "batch finished");
                    (active.on_finished)(results);
                }
                Ok(true)
            }
        }
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// `true` when no batch is in flight.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Tasks currently running on some unit.
    pub fn in_flight(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.batch.in_flight())
    }

    /// Tasks of the active batch not yet started.
    pub fn pending(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.batch.pending())
    }

    pub fn units(&self) -> &[U] {
        &self.units
    }
}
