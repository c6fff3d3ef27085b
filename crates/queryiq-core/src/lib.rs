//! QueryIQ Core - Shared types for the query analysis engine
//!
//! This crate provides the types that sit on the boundary between the
//! analysis engine and its collaborators:
//!
//! - `QueryIqError` / `Result` - the error surface of the engine
//! - `QueryStats` - historical execution statistics for one query,
//!   as recorded by the statistics collector

mod error;
mod stats;

pub use error::*;
pub use stats::*;
