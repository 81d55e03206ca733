//! Neighbor graph representation and builders.
//!
//! # Data layout
//!
//! Rows are stored in **Compressed Sparse Row (CSR)** form.  The neighbors
//! of agent `i` occupy
//!
//! ```text
//! targets[ offsets[i] .. offsets[i+1] ]
//! ```
//!
//! so reading a row is one contiguous slice, and the whole graph is two
//! allocations regardless of flock size.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use flock_core::{Agent, AgentId, GraphStrategy, Vec3};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 3-D position with the agent's index.
#[derive(Clone)]
struct AgentEntry {
    point: [f32; 3],
    id:    AgentId,
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    /// Squared distance computed exactly as the brute-force builder does.
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        distance_2(Vec3::from_array(self.point), Vec3::from_array(*point))
    }
}

#[inline]
fn distance_2(a: Vec3, b: Vec3) -> f32 {
    (a - b).length_squared()
}

// ── NeighborGraph ─────────────────────────────────────────────────────────────

/// For every agent, the indices of the other agents within the radius.
///
/// Rebuilt from scratch every step; it has no identity beyond the agent
/// array it was built from.  Not guaranteed symmetric in general, since each
/// direction is evaluated independently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborGraph {
    offsets: Vec<usize>,
    targets: Vec<AgentId>,
}

impl NeighborGraph {
    /// Brute-force O(n²) build.
    pub fn build(agents: &[Agent], radius: f32) -> Self {
        let positions: Vec<Vec3> = agents.iter().map(Agent::position).collect();
        let r2 = radius * radius;
        let row = |i: usize| -> Vec<AgentId> {
            let origin = positions[i];
            positions
                .iter()
                .enumerate()
                .filter(|&(j, &p)| j != i && distance_2(origin, p) < r2)
                .map(|(j, _)| AgentId(j as u32))
                .collect()
        };
        Self::from_rows(collect_rows(positions.len(), row))
    }

    /// R-tree backed build.  Same neighbor sets as [`build`](Self::build).
    ///
    /// Time complexity: O(n log n) bulk load plus one radius query per agent.
    pub fn build_indexed(agents: &[Agent], radius: f32) -> Self {
        let entries: Vec<AgentEntry> = agents
            .iter()
            .enumerate()
            .map(|(i, a)| AgentEntry { point: a.position().to_array(), id: AgentId(i as u32) })
            .collect();
        let tree = RTree::bulk_load(entries);
        let r2 = radius * radius;
        let row = |i: usize| -> Vec<AgentId> {
            let query = agents[i].position().to_array();
            let mut ids: Vec<AgentId> = tree
                .locate_within_distance(query, r2)
                // The query is inclusive; the neighbor rule is strict.
                .filter(|e| e.id.index() != i && e.distance_2(&query) < r2)
                .map(|e| e.id)
                .collect();
            ids.sort_unstable();
            ids
        };
        Self::from_rows(collect_rows(agents.len(), row))
    }

    /// Build with the chosen strategy.
    pub fn build_with(strategy: GraphStrategy, agents: &[Agent], radius: f32) -> Self {
        match strategy {
            GraphStrategy::BruteForce => Self::build(agents, radius),
            GraphStrategy::RTree => Self::build_indexed(agents, radius),
        }
    }

    fn from_rows(rows: Vec<Vec<AgentId>>) -> Self {
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        offsets.push(0);
        let total: usize = rows.iter().map(Vec::len).sum();
        let mut targets = Vec::with_capacity(total);
        for row in rows {
            targets.extend(row);
            offsets.push(targets.len());
        }
        Self { offsets, targets }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Number of agents (rows).
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total directed neighbor entries across all rows.
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Neighbors of `agent`, ascending.
    ///
    /// # Panics
    /// Panics if `agent` is not a row of this graph.
    pub fn neighbors(&self, agent: AgentId) -> &[AgentId] {
        let i = agent.index();
        let start = self.offsets[i];
        let end = self.offsets[i + 1];
        &self.targets[start..end]
    }

    /// Like [`neighbors`](Self::neighbors) but `None` for unknown agents.
    pub fn get(&self, agent: AgentId) -> Option<&[AgentId]> {
        (agent.index() < self.len()).then(|| self.neighbors(agent))
    }

    /// Iterate rows in agent order.
    pub fn rows(&self) -> impl Iterator<Item = (AgentId, &[AgentId])> + '_ {
        (0..self.len()).map(move |i| {
            let id = AgentId(i as u32);
            (id, self.neighbors(id))
        })
    }
}

#[cfg(not(feature = "parallel"))]
fn collect_rows<F>(n: usize, row: F) -> Vec<Vec<AgentId>>
where
    F: Fn(usize) -> Vec<AgentId>,
{
    (0..n).map(row).collect()
}

#[cfg(feature = "parallel")]
fn collect_rows<F>(n: usize, row: F) -> Vec<Vec<AgentId>>
where
    F: Fn(usize) -> Vec<AgentId> + Sync + Send,
{
    (0..n).into_par_iter().map(row).collect()
}
