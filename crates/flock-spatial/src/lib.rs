//! `flock-spatial` — the per-step neighbor graph.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`graph`] | `NeighborGraph` (CSR rows), brute-force and R-tree builds |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Rows are computed on Rayon's global pool.               |
//!
//! # Neighbor rule
//!
//! Agent `i` lists agent `j` iff `i != j` and
//! `|pos_i - pos_j|² < radius²`.  Each ordered pair is tested on its own;
//! rows are sorted by ascending index.  Both builders apply the exact same
//! predicate, so their graphs are identical for the same input.

pub mod graph;

#[cfg(test)]
mod tests;

pub use graph::NeighborGraph;
