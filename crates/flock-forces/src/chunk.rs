//! Work items shipped to execution units.

use flock_core::{Agent, ForceCoefficients};
use flock_schedule::Work;

use crate::compute_step;

/// One agent's update: a snapshot of the agent and of every neighbor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Job {
    pub main:   Agent,
    pub nearby: Vec<Agent>,
}

/// An ordered run of jobs plus the step parameters they share.
///
/// Self-contained: a unit needs nothing but this value to produce the
/// chunk's results.
#[derive(Clone, Debug, PartialEq)]
pub struct StepChunk {
    pub coefficients: ForceCoefficients,
    pub delta:        f32,
    pub jobs:         Vec<Job>,
}

impl StepChunk {
    /// Updated agents, one per job, in job order.
    pub fn process(&self) -> Vec<Agent> {
        self.jobs
            .iter()
            .map(|job| compute_step(&job.main, &job.nearby, &self.coefficients, self.delta))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// The unit-side computation: run the force model over a chunk.
#[derive(Copy, Clone, Debug, Default)]
pub struct ForceWorker;

impl Work for ForceWorker {
    type Input = StepChunk;
    type Output = Vec<Agent>;

    fn process(&self, chunk: StepChunk) -> Vec<Agent> {
        chunk.process()
    }
}
