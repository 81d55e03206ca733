//! Simulation configuration.

use std::time::Duration;

use crate::{FlockError, FlockResult};

// ── DeltaPolicy ───────────────────────────────────────────────────────────────

/// How wall-clock time between accepted steps becomes the integration delta.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum DeltaPolicy {
    /// Delta is elapsed seconds, capped at `cap` seconds so a stalled frame
    /// (tab switch, debugger pause) does not produce one huge jump.
    Seconds { cap: f32 },

    /// Delta is the elapsed *millisecond* count, capped at `cap`.
    ///
    /// This reproduces the legacy frontend, which compared a millisecond
    /// delta against a cap meant for seconds.  Any frame longer than 1 ms
    /// therefore integrates with exactly `cap`.
    LegacyMilliseconds { cap: f32 },
}

impl Default for DeltaPolicy {
    fn default() -> Self {
        DeltaPolicy::Seconds { cap: 0.5 }
    }
}

impl DeltaPolicy {
    /// Convert an elapsed wall-clock duration into a delta.
    pub fn apply(self, elapsed: Duration) -> f32 {
        match self {
            DeltaPolicy::Seconds { cap } => elapsed.as_secs_f32().min(cap),
            DeltaPolicy::LegacyMilliseconds { cap } => {
                (elapsed.as_millis() as f32).min(cap)
            }
        }
    }
}

// ── GraphStrategy ─────────────────────────────────────────────────────────────

/// Which neighbor-graph builder the orchestrator uses.  Both produce the
/// same neighbor sets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GraphStrategy {
    /// O(n²) pairwise distance check.
    BruteForce,
    /// R-tree radius queries; far cheaper for large flocks.
    #[default]
    RTree,
}

// ── FlockConfig ───────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON file by the application and passed to the
/// orchestrator builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlockConfig {
    /// Agents strictly closer than this are neighbors.  Default: 5.
    pub neighbor_radius: f32,

    /// Jobs per dispatched chunk.  Default: 30.
    pub chunk_size: usize,

    /// Execution units in the pool.  `None` uses all logical cores.
    pub unit_count: Option<usize>,

    /// Distance between adjacent agents in the initial grid.  Default: 2.
    pub grid_spacing: f32,

    pub delta_policy: DeltaPolicy,

    pub graph_strategy: GraphStrategy,

    /// Give up on a batch after this long without any unit completing.
    /// `None` waits forever.  Default: 5000 ms.
    pub unit_timeout_ms: Option<u64>,

    /// RNG seed for the initial velocities.  `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            neighbor_radius: 5.0,
            chunk_size:      30,
            unit_count:      None,
            grid_spacing:    2.0,
            delta_policy:    DeltaPolicy::default(),
            graph_strategy:  GraphStrategy::default(),
            unit_timeout_ms: Some(5_000),
            seed:            None,
        }
    }
}

impl FlockConfig {
    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> FlockResult<()> {
        if !(self.neighbor_radius > 0.0) {
            return Err(FlockError::Config(format!(
                "neighbor_radius must be positive, got {}",
                self.neighbor_radius
            )));
        }
        if self.chunk_size == 0 {
            return Err(FlockError::Config("chunk_size must be at least 1".into()));
        }
        if self.unit_count == Some(0) {
            return Err(FlockError::Config("unit_count must be at least 1".into()));
        }
        if !(self.grid_spacing > 0.0) {
            return Err(FlockError::Config(format!(
                "grid_spacing must be positive, got {}",
                self.grid_spacing
            )));
        }
        Ok(())
    }

    /// Resolved pool size: the configured count or the machine's parallelism.
    pub fn resolved_unit_count(&self) -> usize {
        self.unit_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn unit_timeout(&self) -> Option<Duration> {
        self.unit_timeout_ms.map(Duration::from_millis)
    }
}
