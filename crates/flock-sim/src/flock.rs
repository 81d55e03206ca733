//! The orchestrator: owns the agents and drives one step at a time.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Instant;

use tracing::{debug, info, warn};

use flock_core::{
    Agent, AgentId, FlockConfig, FlockError, FlockResult, FlockRng, ForceCoefficients, MAX_SPEED,
    Pose, StepClock, Vec3,
};
use flock_forces::{Job, StepChunk};
use flock_schedule::{ExecutionUnit, ScheduleError, Scheduler, partition};
use flock_spatial::NeighborGraph;

use crate::{ControlMessage, FlockObserver, NoopObserver, SimError, SimResult};

/// Largest population addressable by [`AgentId`].
pub const MAX_POPULATION: usize = u32::MAX as usize;

/// What [`Flock::advance`] did with the request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// A step was started.  Its results land through `poll` or `wait`.
    Dispatched { step: u64, chunks: usize },
    /// A step was already in flight; the request was ignored.
    Dropped,
}

/// Results of one batch, tagged with the population they were computed for.
struct StepResult {
    step:       u64,
    generation: u64,
    chunks:     Vec<Vec<Agent>>,
}

/// The step currently being computed.
struct InFlight {
    step:    u64,
    started: Instant,
}

/// Owns the agent array and runs the build → dispatch → integrate cycle.
///
/// At most one step is in flight.  [`advance`](Self::advance) while busy is
/// a no-op, not a queued request.  Results are applied by
/// [`poll`](Self::poll) (never blocks) or [`wait`](Self::wait).
pub struct Flock<U, O = NoopObserver>
where
    U: ExecutionUnit<Input = StepChunk, Output = Vec<Agent>>,
    O: FlockObserver,
{
    config:       FlockConfig,
    agents:       Vec<Agent>,
    coefficients: ForceCoefficients,
    clock:        StepClock,
    rng:          FlockRng,
    scheduler:    Scheduler<U>,
    observer:     O,

    /// Bumped on every resize; results for an older generation are dropped.
    generation: u64,
    in_flight:  Option<InFlight>,
    results_tx: Sender<StepResult>,
    results_rx: Receiver<StepResult>,
}

impl<U, O> Flock<U, O>
where
    U: ExecutionUnit<Input = StepChunk, Output = Vec<Agent>>,
    O: FlockObserver,
{
    /// An empty flock driving `scheduler`.  Use [`resize`](Self::resize) to
    /// populate it.
    pub fn new(config: FlockConfig, mut scheduler: Scheduler<U>, observer: O) -> SimResult<Self> {
        config.validate()?;
        scheduler.set_timeout(config.unit_timeout());
        let (results_tx, results_rx) = mpsc::channel();
        Ok(Self {
            clock: StepClock::new(config.delta_policy),
            rng: FlockRng::from_seed(config.seed),
            config,
            agents: Vec::new(),
            coefficients: ForceCoefficients::default(),
            scheduler,
            observer,
            generation: 0,
            in_flight: None,
            results_tx,
            results_rx,
        })
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Apply one control message.  Returns the advance outcome for
    /// [`ControlMessage::Advance`], `None` otherwise.
    pub fn handle(&mut self, message: ControlMessage) -> SimResult<Option<Advance>> {
        match message {
            ControlMessage::Resize(n) => {
                self.resize(n)?;
                Ok(None)
            }
            ControlMessage::SetCoefficients(c) => {
                self.set_coefficients(c);
                Ok(None)
            }
            ControlMessage::Advance => self.advance().map(Some),
        }
    }

    /// Rebuild the population as an `n×n×n` grid centered at the origin,
    /// `grid_spacing` apart, each moving at `MAX_SPEED` in a random
    /// direction.
    ///
    /// The delta anchor is reset.  A step already in flight keeps running,
    /// but its results are discarded when they land.
    pub fn resize(&mut self, n: usize) -> FlockResult<()> {
        let count = n
            .checked_pow(3)
            .filter(|&c| c <= MAX_POPULATION)
            .ok_or(FlockError::PopulationTooLarge {
                requested: n.saturating_pow(3),
                limit:     MAX_POPULATION,
            })?;

        let spacing = self.config.grid_spacing;
        let center = (n as f32 - 1.0) * 0.5;
        let mut agents = Vec::with_capacity(count);
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    let cell = Vec3::new(x as f32, y as f32, z as f32) - center;
                    let velocity = self.rng.random_direction() * MAX_SPEED;
                    agents.push(Agent::new(cell * spacing, velocity));
                }
            }
        }

        self.agents = agents;
        self.generation += 1;
        self.clock.reset(Instant::now());
        info!(side = n, agents = count, generation = self.generation, "population rebuilt");
        Ok(())
    }

    /// Replace the coefficients.  Takes effect from the next dispatched step.
    pub fn set_coefficients(&mut self, coefficients: ForceCoefficients) {
        debug!(?coefficients, "coefficients updated");
        self.coefficients = coefficients;
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Start one step with the wall-clock delta since the last accepted one.
    ///
    /// Completions already waiting are applied first, so a step that has
    /// finished never blocks the next one.
    pub fn advance(&mut self) -> SimResult<Advance> {
        if let Some(dropped) = self.guard()? {
            return Ok(dropped);
        }
        let delta = self.clock.tick(Instant::now());
        self.dispatch(delta)
    }

    /// Start one step with a caller-chosen delta (seconds).  Subject to the
    /// same in-flight guard as [`advance`](Self::advance).
    pub fn advance_with_delta(&mut self, delta: f32) -> SimResult<Advance> {
        if let Some(dropped) = self.guard()? {
            return Ok(dropped);
        }
        self.clock.tick_fixed(Instant::now());
        self.dispatch(delta)
    }

    /// Advance with a fixed delta and block until the step lands.
    pub fn step_blocking(&mut self, delta: f32) -> SimResult<()> {
        self.wait()?;
        self.advance_with_delta(delta)?;
        self.wait()?;
        Ok(())
    }

    fn guard(&mut self) -> SimResult<Option<Advance>> {
        self.poll()?;
        let Some(busy) = self.in_flight.as_ref() else {
            return Ok(None);
        };
        debug!(step = busy.step, "advance ignored; step in flight");
        self.observer.on_step_dropped(busy.step);
        Ok(Some(Advance::Dropped))
    }

    fn dispatch(&mut self, delta: f32) -> SimResult<Advance> {
        let step = self.clock.steps;
        let started = Instant::now();

        let poses: Vec<Pose> = self.agents.iter().map(|a| a.pose).collect();
        self.observer.on_poses(step, &poses);

        let graph = NeighborGraph::build_with(
            self.config.graph_strategy,
            &self.agents,
            self.config.neighbor_radius,
        );
        let jobs: Vec<Job> = graph
            .rows()
            .map(|(id, row)| Job {
                main:   self.agents[id.index()],
                nearby: row.iter().map(|n| self.agents[n.index()]).collect(),
            })
            .collect();
        let chunks: Vec<StepChunk> = partition(jobs, self.config.chunk_size)
            .into_iter()
            .map(|jobs| StepChunk { coefficients: self.coefficients, delta, jobs })
            .collect();
        let chunk_count = chunks.len();
        debug!(
            step,
            delta,
            agents = self.agents.len(),
            edges = graph.edge_count(),
            chunks = chunk_count,
            "step dispatched"
        );

        let tx = self.results_tx.clone();
        let generation = self.generation;
        self.scheduler.schedule(chunks, move |chunks| {
            // The receiver lives as long as the flock that owns the scheduler.
            let _ = tx.send(StepResult { step, generation, chunks });
        })?;
        self.in_flight = Some(InFlight { step, started });

        // An empty flock finishes inside `schedule`.
        self.drain_results()?;
        Ok(Advance::Dispatched { step, chunks: chunk_count })
    }

    /// Apply whatever has completed, without blocking.
    ///
    /// Returns `true` if a step's results replaced the agent array.
    pub fn poll(&mut self) -> SimResult<bool> {
        if let Err(err) = self.scheduler.poll() {
            self.fail(&err);
            return Err(err.into());
        }
        self.drain_results()
    }

    /// Block until the in-flight step (if any) lands.
    ///
    /// Bounded by the configured unit timeout.  Returns `true` if results
    /// were integrated.
    pub fn wait(&mut self) -> SimResult<bool> {
        if self.in_flight.is_none() {
            return Ok(false);
        }
        if let Err(err) = self.scheduler.wait() {
            self.fail(&err);
            return Err(err.into());
        }
        self.drain_results()
    }

    fn fail(&mut self, err: &ScheduleError) {
        if let Some(lost) = self.in_flight.take() {
            warn!(step = lost.step, error = %err, "step failed; agents left unchanged");
        }
    }

    fn drain_results(&mut self) -> SimResult<bool> {
        let mut integrated = false;
        loop {
            match self.results_rx.try_recv() {
                Ok(result) => integrated |= self.integrate(result)?,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(integrated),
            }
        }
    }

    fn integrate(&mut self, result: StepResult) -> SimResult<bool> {
        let Some(flight) = self.in_flight.take() else {
            warn!(step = result.step, "results with no step in flight; ignored");
            return Ok(false);
        };
        if result.generation != self.generation {
            debug!(step = result.step, "population changed mid-step; results discarded");
            return Ok(false);
        }

        let agents: Vec<Agent> = result.chunks.into_iter().flatten().collect();
        if agents.len() != self.agents.len() {
            return Err(SimError::ResultCountMismatch {
                step:     result.step,
                expected: self.agents.len(),
                got:      agents.len(),
            });
        }
        self.agents = agents;

        let elapsed = flight.started.elapsed();
        debug!(step = result.step, ?elapsed, "step integrated");
        self.observer.on_step_complete(result.step, self.agents.len(), elapsed);
        Ok(true)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> FlockResult<&Agent> {
        self.agents.get(id.index()).ok_or(FlockError::AgentNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn coefficients(&self) -> ForceCoefficients {
        self.coefficients
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Accepted steps so far, including one still in flight.
    pub fn steps(&self) -> u64 {
        self.clock.steps
    }

    /// `true` while a step is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn scheduler(&self) -> &Scheduler<U> {
        &self.scheduler
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}
