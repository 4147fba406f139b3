//! Load stage of the movie popularity pipeline.
//!
//! [`LoadOrchestrator`] runs the four entity batches in foreign-key order
//! over one [`LoadSession`](reelstats_db::LoadSession), delegating each
//! batch to the [`UpsertEngine`].

pub mod error;
pub mod orchestrator;
pub mod upsert;

pub use error::{LoadError, StageError};
pub use orchestrator::{LoadOrchestrator, RunResult};
pub use upsert::{BatchReport, UpsertEngine};
