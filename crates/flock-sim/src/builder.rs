//! Fluent builder for constructing a [`Flock`].

use std::sync::Arc;

use tracing::info;

use flock_core::{Agent, FlockConfig, ForceCoefficients, UnitId};
use flock_forces::{ForceWorker, StepChunk};
use flock_schedule::{
    ExecutionUnit, InlineUnit, Reporter, ScheduleResult, Scheduler, ThreadUnit,
};

use crate::{Flock, FlockObserver, SimResult};

/// A type-erased execution unit running the force model.
pub type DynUnit = Box<dyn ExecutionUnit<Input = StepChunk, Output = Vec<Agent>>>;

/// Where chunks run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UnitKind {
    /// One long-lived worker thread per unit.
    #[default]
    Threads,
    /// On the calling thread, inside `dispatch`.  Deterministic; useful for
    /// tests and single-core targets.
    Inline,
}

/// Fluent builder for [`Flock<DynUnit, O>`].
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                             |
/// |----------------------|-------------------------------------|
/// | `.coefficients(c)`   | `ForceCoefficients::ZERO`           |
/// | `.population(n)`     | Empty flock                         |
/// | `.units(kind)`       | `UnitKind::Threads`                 |
///
/// # Example
///
/// ```rust,ignore
/// let mut flock = FlockBuilder::new(config)
///     .coefficients(ForceCoefficients::classic())
///     .population(16)
///     .build(NoopObserver)?;
/// flock.step_blocking(1.0 / 60.0)?;
/// ```
pub struct FlockBuilder {
    config:       FlockConfig,
    coefficients: ForceCoefficients,
    population:   Option<usize>,
    units:        UnitKind,
}

impl FlockBuilder {
    pub fn new(config: FlockConfig) -> Self {
        Self {
            config,
            coefficients: ForceCoefficients::ZERO,
            population:   None,
            units:        UnitKind::default(),
        }
    }

    pub fn coefficients(mut self, coefficients: ForceCoefficients) -> Self {
        self.coefficients = coefficients;
        self
    }

    /// Start with an `n×n×n` grid instead of an empty flock.
    pub fn population(mut self, n: usize) -> Self {
        self.population = Some(n);
        self
    }

    pub fn units(mut self, kind: UnitKind) -> Self {
        self.units = kind;
        self
    }

    /// Shorthand for `.units(UnitKind::Inline)`.
    pub fn inline(self) -> Self {
        self.units(UnitKind::Inline)
    }

    /// Spawn the unit pool and return a ready flock.
    pub fn build<O: FlockObserver>(self, observer: O) -> SimResult<Flock<DynUnit, O>> {
        let work = Arc::new(ForceWorker);
        let kind = self.units;
        self.build_with_units(observer, move |_, reporter| {
            let unit: DynUnit = match kind {
                UnitKind::Threads => Box::new(ThreadUnit::spawn(Arc::clone(&work), reporter)?),
                UnitKind::Inline => Box::new(InlineUnit::new(Arc::clone(&work), reporter)),
            };
            Ok(unit)
        })
    }

    /// Build over caller-supplied units.  `factory` is called once per unit
    /// with its id and the reporter it must deliver completions through.
    pub fn build_with_units<U, O, F>(self, observer: O, factory: F) -> SimResult<Flock<U, O>>
    where
        U: ExecutionUnit<Input = StepChunk, Output = Vec<Agent>>,
        O: FlockObserver,
        F: FnMut(UnitId, Reporter<Vec<Agent>>) -> ScheduleResult<U>,
    {
        self.config.validate()?;
        let unit_count = self.config.resolved_unit_count();
        let scheduler = Scheduler::with_units(unit_count, factory)?;

        let mut flock = Flock::new(self.config, scheduler, observer)?;
        flock.set_coefficients(self.coefficients);
        if let Some(n) = self.population {
            flock.resize(n)?;
        }
        info!(
            units = unit_count,
            kind = ?self.units,
            agents = flock.len(),
            "flock ready"
        );
        Ok(flock)
    }
}
