//! Production implementation of HuntContext using Tokio.

use crate::context::{stream_seed, HuntContext};
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Production context backed by Tokio.
///
/// Time comes from the system clock. Randomness comes from OS entropy
/// unless a fixed seed is supplied, in which case placement and attack
/// sequences are reproducible while pacing stays real-time.
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Master seed (0 = OS entropy)
    seed: u64,
}

impl TokioContext {
    /// Creates a new TokioContext drawing from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Creates a TokioContext with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            start: Instant::now(),
            seed,
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HuntContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        debug!(task = name, "spawning task");
        tokio::spawn(future)
    }

    fn derive_rng(&self, stream: u64) -> ChaCha8Rng {
        if self.seed == 0 {
            ChaCha8Rng::from_entropy()
        } else {
            ChaCha8Rng::seed_from_u64(stream_seed(self.seed, stream))
        }
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
