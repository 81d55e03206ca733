//! `ThreadUnit` — an execution unit backed by one long-lived OS thread.
//!
//! The thread is spawned once and reused for every dispatch; it exits when
//! the unit is dropped.  Payloads reach it over an mpsc channel and results
//! go back through the unit's [`Reporter`].  Nothing is shared with the
//! coordinator except the `Arc<W>` computation itself.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use flock_core::UnitId;

use crate::unit::panic_message;
use crate::{ExecutionUnit, Outcome, Reporter, ScheduleError, ScheduleResult, Ticket, Work};

enum UnitCommand<I> {
    Run { ticket: Ticket, payload: I },
    Shutdown,
}

pub struct ThreadUnit<W: Work> {
    id:      UnitId,
    tx:      Sender<UnitCommand<W::Input>>,
    handle:  Option<JoinHandle<()>>,
    /// Payloads dispatched and not yet finished by the worker.
    backlog: Arc<AtomicUsize>,
}

impl<W: Work> ThreadUnit<W> {
    /// Spawn the worker thread for unit `reporter.unit()`.
    pub fn spawn(work: Arc<W>, reporter: Reporter<W::Output>) -> ScheduleResult<Self> {
        let id = reporter.unit();
        let (tx, rx) = mpsc::channel::<UnitCommand<W::Input>>();
        let backlog = Arc::new(AtomicUsize::new(0));
        let worker_backlog = Arc::clone(&backlog);
        let handle = thread::Builder::new()
            .name(format!("flock-unit-{}", id.0))
            .spawn(move || {
                while let Ok(command) = rx.recv() {
                    match command {
                        UnitCommand::Run { ticket, payload } => {
                            let outcome = match catch_unwind(AssertUnwindSafe(|| work.process(payload))) {
                                Ok(output) => Outcome::Done(output),
                                Err(panic) => Outcome::Panicked(panic_message(panic.as_ref())),
                            };
                            worker_backlog.fetch_sub(1, Ordering::AcqRel);
                            if !reporter.report(ticket, outcome) {
                                debug!(unit = id.0, "scheduler gone; unit exiting");
                                break;
                            }
                        }
                        UnitCommand::Shutdown => break,
                    }
                }
            })
            .map_err(|err| ScheduleError::Spawn { unit: id, reason: err.to_string() })?;

        debug!(unit = id.0, "execution unit started");
        Ok(Self { id, tx, handle: Some(handle), backlog })
    }

    /// `true` while the worker thread is still running.
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Payloads dispatched to this unit that it has not finished yet.
    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::Acquire)
    }
}

impl<W: Work> ExecutionUnit for ThreadUnit<W> {
    type Input = W::Input;
    type Output = W::Output;

    fn id(&self) -> UnitId {
        self.id
    }

    fn dispatch(&mut self, ticket: Ticket, payload: W::Input) -> ScheduleResult<()> {
        self.backlog.fetch_add(1, Ordering::AcqRel);
        self.tx.send(UnitCommand::Run { ticket, payload }).map_err(|_| {
            self.backlog.fetch_sub(1, Ordering::AcqRel);
            ScheduleError::UnitDisconnected(self.id)
        })
    }
}

impl<W: Work> Drop for ThreadUnit<W> {
    fn drop(&mut self) {
        let _ = self.tx.send(UnitCommand::Shutdown);
        let Some(handle) = self.handle.take() else {
            return;
        };
        // A busy worker only sees `Shutdown` after its queued payloads; do not
        // wait on a task that may never finish.
        let backlog = self.backlog();
        if backlog > 0 && !handle.is_finished() {
            warn!(unit = self.id.0, backlog, "execution unit still busy; detaching its thread");
            return;
        }
        if handle.join().is_err() {
            warn!(unit = self.id.0, "execution unit thread panicked outside a task");
        }
    }
}
