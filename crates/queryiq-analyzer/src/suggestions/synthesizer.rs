//! Suggestion Synthesizer
//!
//! Merges the candidate suggestions from both engines into one ranked list:
//! deduplicate by `(query_id, suggestion_type)` keeping the most confident
//! entry (rule beats model on ties, for explainability), then order by
//! confidence, estimated improvement, and suggestion type. The output is
//! deterministic for identical inputs.

use crate::suggestions::suggestion::{Suggestion, SuggestionSource};
use std::cmp::Ordering;

/// Merges, deduplicates, ranks, and truncates candidate suggestions
pub fn synthesize(candidates: Vec<Suggestion>, max_suggestions: usize) -> Vec<Suggestion> {
    let mut merged: Vec<Suggestion> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match merged.iter_mut().find(|s| {
            s.query_id == candidate.query_id && s.suggestion_type == candidate.suggestion_type
        }) {
            Some(existing) => {
                if wins_over(&candidate, existing) {
                    *existing = candidate;
                }
            }
            None => merged.push(candidate),
        }
    }

    merged.sort_by(rank);
    merged.truncate(max_suggestions);
    merged
}

/// True when `candidate` should replace `existing` under the dedup policy
fn wins_over(candidate: &Suggestion, existing: &Suggestion) -> bool {
    match candidate.confidence.total_cmp(&existing.confidence) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            candidate.source == SuggestionSource::Rule && existing.source == SuggestionSource::Model
        }
    }
}

/// Presentation order: confidence descending, improvement descending
/// (absent last), suggestion type ascending
fn rank(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| improvement_key(b).total_cmp(&improvement_key(a)))
        .then_with(|| a.suggestion_type.cmp(&b.suggestion_type))
}

fn improvement_key(s: &Suggestion) -> f64 {
    s.estimated_improvement_ms.unwrap_or(f64::NEG_INFINITY)
}
