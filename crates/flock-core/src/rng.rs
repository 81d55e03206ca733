//! Simulation RNG.
//!
//! Randomness is only used when the population is (re)built.  Runs are not
//! reproducible by default; pass a seed to get repeatable initial
//! velocities in tests.

use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::math::Vec3;

/// Orchestrator-owned RNG.  Used only on the coordinating thread.
pub struct FlockRng(SmallRng);

impl FlockRng {
    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        FlockRng(SmallRng::from_entropy())
    }

    pub fn new(seed: u64) -> Self {
        FlockRng(SmallRng::seed_from_u64(seed))
    }

    /// `Some(seed)` → seeded, `None` → entropy.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None => Self::from_entropy(),
        }
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// A direction drawn uniformly from the unit sphere.
    ///
    /// Samples `z` uniformly in [-1, 1] and the azimuth uniformly in
    /// [0, 2π), which is area-preserving on the sphere.
    pub fn random_direction(&mut self) -> Vec3 {
        let z: f32 = self.0.gen_range(-1.0..=1.0);
        let theta: f32 = self.0.gen_range(0.0..TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }
}
