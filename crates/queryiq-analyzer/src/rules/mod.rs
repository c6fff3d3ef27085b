//! Heuristic Rule Module
//!
//! An ordered table of independent, pure rules over the feature vector and
//! raw query text. A failing rule is logged and skipped; it can never take
//! the rest of the analysis down with it.

pub mod engine;

pub use engine::{Rule, RuleContext, RuleError, RuleResult, default_rules, evaluate, evaluate_rules};
