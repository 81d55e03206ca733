//! A unit that runs its payload on the dispatching thread.
//!
//! The result is still delivered through the completion channel, so the
//! scheduler's bookkeeping is identical to the threaded case.  Used for
//! single-threaded runs and deterministic tests.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use flock_core::UnitId;

use crate::unit::panic_message;
use crate::{ExecutionUnit, Outcome, Reporter, ScheduleError, ScheduleResult, Ticket, Work};

pub struct InlineUnit<W: Work> {
    work:     Arc<W>,
    reporter: Reporter<W::Output>,
}

impl<W: Work> InlineUnit<W> {
    pub fn new(work: Arc<W>, reporter: Reporter<W::Output>) -> Self {
        Self { work, reporter }
    }
}

impl<W: Work> ExecutionUnit for InlineUnit<W> {
    type Input = W::Input;
    type Output = W::Output;

    fn id(&self) -> UnitId {
        self.reporter.unit()
    }

    fn dispatch(&mut self, ticket: Ticket, payload: W::Input) -> ScheduleResult<()> {
        let work = &self.work;
        let outcome = match catch_unwind(AssertUnwindSafe(|| work.process(payload))) {
            Ok(output) => Outcome::Done(output),
            Err(panic) => Outcome::Panicked(panic_message(panic.as_ref())),
        };
        if self.reporter.report(ticket, outcome) {
            Ok(())
        } else {
            Err(ScheduleError::UnitDisconnected(self.reporter.unit()))
        }
    }
}
