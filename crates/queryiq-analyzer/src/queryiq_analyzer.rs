//! QueryIQ Analyzer - Query analysis and optimization suggestions
//!
//! This crate provides functionality for:
//! - Parsing EXPLAIN (FORMAT JSON) execution plans into a typed tree
//! - Feature extraction from SQL text and plan metrics
//! - Heuristic rule evaluation and ML-backed execution time prediction
//! - Merging both suggestion sources into one ranked, deduplicated list

pub mod analyzer;
pub mod explain;
pub mod features;
pub mod prediction;
pub mod rules;
pub mod suggestions;

pub use analyzer::*;
pub use explain::*;
pub use features::*;
pub use prediction::*;
pub use rules::*;
pub use suggestions::*;
