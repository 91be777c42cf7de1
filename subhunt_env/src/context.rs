//! Core environment context trait for SubHunt agents.

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The central interface for Environment Interaction.
///
/// This trait abstracts the "real world" so that the game engine can run
/// against wall-clock time (production) or a virtual clock (simulation).
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, OS entropy or a fixed seed
/// - **Simulation**: `SimContext` - virtual clock, `ChaCha8Rng(seed)`
///
/// # Determinism
///
/// For reproducible games, all methods that would normally introduce
/// non-determinism (time, randomness) are controlled by the implementation.
#[async_trait]
pub trait HuntContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock and yields to the scheduler
    async fn sleep(&self, duration: Duration);

    /// Spawns a named background task and returns its join handle.
    fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static;

    /// Derives an independent random stream from the context seed.
    ///
    /// The same seed and `stream` always produce the same sequence, so
    /// target placement and attack sampling can be separated without one
    /// perturbing the other.
    fn derive_rng(&self, stream: u64) -> ChaCha8Rng;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// Returns 0 when the context draws from OS entropy.
    fn seed(&self) -> u64;
}

/// Mixes a master seed with a stream number.
///
/// Shared by every context so a given (seed, stream) pair yields the same
/// sequence in production and in simulation.
pub fn stream_seed(seed: u64, stream: u64) -> u64 {
    seed.wrapping_mul(0x517cc1b727220a95) ^ stream.wrapping_mul(0x9e3779b97f4a7c15)
}
