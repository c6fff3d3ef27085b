//! Optimization Suggestions Module
//!
//! Defines the suggestion data model and the synthesizer that merges,
//! deduplicates, and ranks candidates from the rule engine and the
//! prediction engine into the final ordered list.

pub mod suggestion;
pub mod synthesizer;

pub use suggestion::{ImplementationCost, Suggestion, SuggestionSource, SuggestionType};
pub use synthesizer::synthesize;
