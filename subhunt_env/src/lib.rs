//! SubHunt Environment Abstraction Layer
//!
//! This crate provides the seam that lets the SubHunt game engine run in both
//! **Production** (tokio, wall-clock time) and **Simulation** (virtual clock)
//! environments.
//!
//! # Core Concept
//!
//! Everything an attacker agent needs from "the outside world" goes through
//! a [`HuntContext`]:
//! - Time (`now()`, `sleep()`)
//! - Task spawning (`spawn()`)
//! - Randomness (`derive_rng()`)
//!
//! By deriving all entropy from a single 64-bit seed, a game becomes
//! reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use subhunt_env::HuntContext;
//!
//! async fn agent_loop<Ctx: HuntContext>(ctx: &Ctx) {
//!     loop {
//!         take_turn();
//!         ctx.sleep(Duration::from_secs(1)).await;
//!     }
//! }
//! ```

mod context;
mod error;
mod tokio_impl;
mod types;

pub use context::{stream_seed, HuntContext};
pub use error::EnvError;
pub use tokio_impl::TokioContext;
pub use types::{AgentId, Coord};
