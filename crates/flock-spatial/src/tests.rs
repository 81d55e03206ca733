//! Unit tests for flock-spatial.

#[cfg(test)]
mod helpers {
    use flock_core::{Agent, FlockRng, Vec3};

    pub fn at(x: f32, y: f32, z: f32) -> Agent {
        Agent::new(Vec3::new(x, y, z), Vec3::X)
    }

    /// `n` agents scattered in a cube of side `extent` around the origin.
    pub fn scattered(n: usize, extent: f32, seed: u64) -> Vec<Agent> {
        let mut rng = FlockRng::new(seed);
        (0..n)
            .map(|_| {
                let h = extent * 0.5;
                at(rng.gen_range(-h..h), rng.gen_range(-h..h), rng.gen_range(-h..h))
            })
            .collect()
    }
}

#[cfg(test)]
mod brute_force {
    use flock_core::AgentId;

    use super::helpers::at;
    use crate::NeighborGraph;

    #[test]
    fn empty_flock() {
        let g = NeighborGraph::build(&[], 5.0);
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.get(AgentId(0)), None);
    }

    #[test]
    fn excludes_self_and_far_agents() {
        let agents = [at(0.0, 0.0, 0.0), at(3.0, 0.0, 0.0), at(20.0, 0.0, 0.0)];
        let g = NeighborGraph::build(&agents, 5.0);
        assert_eq!(g.len(), 3);
        assert_eq!(g.neighbors(AgentId(0)), &[AgentId(1)]);
        assert_eq!(g.neighbors(AgentId(1)), &[AgentId(0)]);
        assert!(g.neighbors(AgentId(2)).is_empty());
    }

    #[test]
    fn radius_is_strict() {
        let agents = [at(0.0, 0.0, 0.0), at(0.0, 4.0, 0.0)];
        assert_eq!(NeighborGraph::build(&agents, 4.0).edge_count(), 0);
        assert_eq!(NeighborGraph::build(&agents, 4.001).edge_count(), 2);
    }

    #[test]
    fn rows_are_ascending() {
        let agents = [
            at(0.0, 0.0, 0.0),
            at(1.0, 0.0, 0.0),
            at(-1.0, 0.0, 0.0),
            at(0.0, 1.0, 0.0),
        ];
        let g = NeighborGraph::build(&agents, 5.0);
        assert_eq!(g.neighbors(AgentId(3)), &[AgentId(0), AgentId(1), AgentId(2)]);
        for (_, row) in g.rows() {
            assert!(row.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn each_direction_evaluated_independently() {
        let agents = [at(0.0, 0.0, 0.0), at(2.0, 0.0, 0.0), at(4.0, 0.0, 0.0)];
        let g = NeighborGraph::build(&agents, 3.0);
        // 0 and 2 are 4 apart: each sees 1, neither sees the other.
        assert_eq!(g.neighbors(AgentId(0)), &[AgentId(1)]);
        assert_eq!(g.neighbors(AgentId(2)), &[AgentId(1)]);
        assert_eq!(g.neighbors(AgentId(1)), &[AgentId(0), AgentId(2)]);
        for (i, row) in g.rows() {
            for &j in row {
                assert!(g.neighbors(j).contains(&i), "{i} -> {j} without reverse");
            }
        }
    }

    #[test]
    fn dense_flock_rows_cover_every_edge() {
        let agents: Vec<_> = (0..300).map(|i| at(i as f32 * 0.01, 0.0, 0.0)).collect();
        let g = NeighborGraph::build(&agents, 10.0);
        assert_eq!(g.edge_count(), 300 * 299);
        let total: usize = g.rows().map(|(_, row)| row.len()).sum();
        assert_eq!(total, g.edge_count());
        assert_eq!(g.neighbors(AgentId(299)).len(), 299);
        assert_eq!(g.neighbors(AgentId(299)).last(), Some(&AgentId(298)));
    }

    #[test]
    fn coincident_agents_are_neighbors() {
        let agents = [at(1.0, 1.0, 1.0), at(1.0, 1.0, 1.0)];
        let g = NeighborGraph::build(&agents, 0.5);
        assert_eq!(g.neighbors(AgentId(0)), &[AgentId(1)]);
        assert_eq!(g.neighbors(AgentId(1)), &[AgentId(0)]);
    }
}

#[cfg(test)]
mod indexed {
    use flock_core::{AgentId, GraphStrategy};

    use super::helpers::{at, scattered};
    use crate::NeighborGraph;

    #[test]
    fn matches_brute_force_on_random_flocks() {
        for (seed, radius) in [(1, 5.0), (2, 2.5), (3, 12.0), (4, 0.1)] {
            let agents = scattered(400, 40.0, seed);
            let brute = NeighborGraph::build(&agents, radius);
            let tree = NeighborGraph::build_indexed(&agents, radius);
            assert_eq!(brute, tree, "seed {seed}, radius {radius}");
        }
    }

    #[test]
    fn matches_brute_force_on_a_lattice() {
        // Lattice points sit exactly on the radius, exercising the strict test.
        let mut agents = Vec::new();
        for x in 0..6 {
            for y in 0..6 {
                for z in 0..6 {
                    agents.push(at(x as f32 * 2.0, y as f32 * 2.0, z as f32 * 2.0));
                }
            }
        }
        let brute = NeighborGraph::build(&agents, 2.0);
        let tree = NeighborGraph::build_indexed(&agents, 2.0);
        assert_eq!(brute, tree);
        assert_eq!(tree.edge_count(), 0);

        let wider = NeighborGraph::build_indexed(&agents, 2.5);
        assert_eq!(wider, NeighborGraph::build(&agents, 2.5));
        // Corner agent: three axis neighbors.
        assert_eq!(wider.neighbors(AgentId(0)).len(), 3);
    }

    #[test]
    fn build_with_dispatches_on_strategy() {
        let agents = scattered(50, 10.0, 9);
        assert_eq!(
            NeighborGraph::build_with(GraphStrategy::BruteForce, &agents, 3.0),
            NeighborGraph::build(&agents, 3.0),
        );
        assert_eq!(
            NeighborGraph::build_with(GraphStrategy::RTree, &agents, 3.0),
            NeighborGraph::build(&agents, 3.0),
        );
    }

    #[test]
    fn empty_flock() {
        assert!(NeighborGraph::build_indexed(&[], 5.0).is_empty());
    }
}
