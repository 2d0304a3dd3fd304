//! Random draws used by the transform pipeline and batch planner.
//!
//! Everything that needs randomness takes a [`RandomSource`] instead of
//! reaching for a global generator. Production code uses [`ThreadRandom`]
//! (unseeded, no reproducibility); tests script exact draws.

use rand::Rng;
use rand::rngs::ThreadRng;

/// Uniform random draws.
pub trait RandomSource {
    /// Uniform integer in `min..=max`.
    fn uniform_int(&mut self, min: u32, max: u32) -> u32;

    /// Uniform float in `min..=max`.
    fn uniform(&mut self, min: f64, max: f64) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        (**self).uniform_int(min, max)
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        (**self).uniform(min, max)
    }
}

/// The process-wide thread-local generator from `rand`.
pub struct ThreadRandom(ThreadRng);

impl ThreadRandom {
    pub fn new() -> Self {
        Self(rand::thread_rng())
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.gen_range(min..=max)
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.0.gen_range(min..=max)
    }
}
