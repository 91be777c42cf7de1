//! SubHunt game harness
//!
//! This crate assembles and runs whole games on top of `subhunt_core`, either
//! against the real tokio clock or inside a deterministic simulation where
//! the same seed always produces the same layout, attack sequence and log.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         HuntWorld                           │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ HuntContext (TokioContext or SimContext)             │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                │                │                   │
//! │  ┌────▼────┐      ┌────▼────┐      ┌────▼────┐              │
//! │  │  Agent  │      │  Agent  │      │  Agent  │   ...        │
//! │  │   #1    │      │   #2    │      │   #3    │              │
//! │  └────┬────┘      └────┬────┘      └────┬────┘              │
//! │       └────────┬───────┴────────┬───────┘                   │
//! │           ┌────▼────────┐  ┌────▼─────┐                     │
//! │           │ Coordinator │  │ EventLog │                     │
//! │           │   (Board)   │  │          │                     │
//! │           └─────────────┘  └────┬─────┘                     │
//! └─────────────────────────────────┼───────────────────────────┘
//!                              ┌────▼─────┐
//!                              │  Oracle  │
//!                              └──────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use subhunt_core::GameConfig;
//! use subhunt_sim::SeedRunner;
//!
//! let runner = SeedRunner::new(GameConfig::default());
//! let result = runner.run(42);
//! assert!(result.passed);
//! ```

mod context;
mod exporter;
mod oracle;
mod runner;
mod world;

pub use context::SimContext;
pub use exporter::GameExport;
pub use oracle::{LogOracle, OracleVerdict};
pub use runner::{RunResult, SeedRunner};
pub use world::{GameReport, HuntWorld};
