//! Heuristic rule evaluation
//!
//! Each rule is a pure function of the analysis context producing at most
//! one candidate suggestion. Rules share no mutable state and do not depend
//! on each other; the table order only affects the order candidates are
//! handed to the synthesizer, never the set of suggestions produced.

use crate::analyzer::AnalyzerConfig;
use crate::explain::PlanMetrics;
use crate::features::FeatureVector;
use crate::suggestions::{ImplementationCost, Suggestion, SuggestionSource, SuggestionType};
use queryiq_core::QueryStats;
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// Everything a rule is allowed to look at
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub query_id: Uuid,
    pub query_text: &'a str,
    pub features: &'a FeatureVector,
    pub metrics: &'a PlanMetrics,
    pub stats: Option<&'a QueryStats>,
    pub config: &'a AnalyzerConfig,
}

/// Error raised by a single rule; isolated by the engine
#[derive(Debug)]
pub struct RuleError(pub String);

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RuleError {}

/// Outcome of one rule application
pub type RuleResult = Result<Option<Suggestion>, RuleError>;

/// A named heuristic rule
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&RuleContext<'_>) -> RuleResult,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// The built-in rule table, in presentation order
pub fn default_rules() -> &'static [Rule] {
    DEFAULT_RULES
}

const DEFAULT_RULES: &[Rule] = &[
    Rule {
        name: "select_star",
        apply: select_star,
    },
    Rule {
        name: "missing_filter",
        apply: missing_filter,
    },
    Rule {
        name: "seq_scan_on_large_relation",
        apply: seq_scan_on_large_relation,
    },
    Rule {
        name: "join_complexity",
        apply: join_complexity,
    },
    Rule {
        name: "subquery_flattening",
        apply: subquery_flattening,
    },
    Rule {
        name: "slow_execution",
        apply: slow_execution,
    },
    Rule {
        name: "caching_candidate",
        apply: caching_candidate,
    },
    Rule {
        name: "deep_plan",
        apply: deep_plan,
    },
];

/// Evaluates the built-in rule table
pub fn evaluate(ctx: &RuleContext<'_>) -> Vec<Suggestion> {
    evaluate_rules(default_rules(), ctx)
}

/// Evaluates an explicit rule table. A rule returning an error is logged
/// and skipped; the remaining rules still run.
pub fn evaluate_rules(rules: &[Rule], ctx: &RuleContext<'_>) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    for rule in rules {
        match (rule.apply)(ctx) {
            Ok(Some(suggestion)) => suggestions.push(suggestion),
            Ok(None) => {}
            Err(err) => {
                warn!(rule = rule.name, error = %err, "rule evaluation failed, skipping");
            }
        }
    }
    suggestions
}

fn select_star(ctx: &RuleContext<'_>) -> RuleResult {
    if !ctx.features.has_select_star {
        return Ok(None);
    }
    Ok(Some(
        Suggestion::new(
            ctx.query_id,
            SuggestionType::NarrowProjection,
            SuggestionSource::Rule,
            "Query selects all columns; list only the columns it actually reads",
            0.9,
            ImplementationCost::Low,
        )
        .with_improvement(improvement_from_cost(ctx.metrics, 0.05)),
    ))
}

fn missing_filter(ctx: &RuleContext<'_>) -> RuleResult {
    if ctx.features.has_where_clause || !ctx.metrics.has_seq_scan_on_large_relation {
        return Ok(None);
    }
    Ok(Some(
        Suggestion::new(
            ctx.query_id,
            SuggestionType::MissingFilter,
            SuggestionSource::Rule,
            "Query reads a large relation without a WHERE clause; add a filter to avoid full-table access",
            0.7,
            ImplementationCost::Low,
        )
        .with_improvement(improvement_from_cost(ctx.metrics, 0.5)),
    ))
}

fn seq_scan_on_large_relation(ctx: &RuleContext<'_>) -> RuleResult {
    if !ctx.metrics.has_seq_scan_on_large_relation {
        return Ok(None);
    }

    let relations = ctx.metrics.large_scan_relations.join(", ");
    let columns = where_predicate_columns(ctx.query_text);
    let message = match (relations.is_empty(), columns.is_empty()) {
        (false, false) => format!(
            "Sequential scan over large relation(s) {}; consider an index on ({})",
            relations,
            columns.join(", ")
        ),
        (false, true) => format!(
            "Sequential scan over large relation(s) {}; consider indexing the filtered columns",
            relations
        ),
        (true, false) => format!(
            "Sequential scan over a large relation; consider an index on ({})",
            columns.join(", ")
        ),
        (true, true) => {
            "Sequential scan over a large relation; consider indexing the filtered columns"
                .to_string()
        }
    };

    Ok(Some(
        Suggestion::new(
            ctx.query_id,
            SuggestionType::IndexRecommendation,
            SuggestionSource::Rule,
            message,
            0.6,
            ImplementationCost::Medium,
        )
        .with_improvement(improvement_from_cost(ctx.metrics, 0.3)),
    ))
}

fn join_complexity(ctx: &RuleContext<'_>) -> RuleResult {
    if ctx.features.num_join < 4 {
        return Ok(None);
    }
    Ok(Some(
        Suggestion::new(
            ctx.query_id,
            SuggestionType::JoinComplexity,
            SuggestionSource::Rule,
            format!(
                "Query joins {} relations; consider decomposing it or materializing intermediate results",
                ctx.features.num_join + 1
            ),
            0.5,
            ImplementationCost::Medium,
        )
        .with_improvement(improvement_from_cost(ctx.metrics, 0.2)),
    ))
}

fn subquery_flattening(ctx: &RuleContext<'_>) -> RuleResult {
    if ctx.features.num_subqueries < 2 {
        return Ok(None);
    }
    Ok(Some(
        Suggestion::new(
            ctx.query_id,
            SuggestionType::SubqueryFlattening,
            SuggestionSource::Rule,
            format!(
                "Query nests {} subqueries; rewriting them as joins usually plans better",
                ctx.features.num_subqueries
            ),
            0.5,
            ImplementationCost::Medium,
        )
        .with_improvement(improvement_from_cost(ctx.metrics, 0.2)),
    ))
}

fn slow_execution(ctx: &RuleContext<'_>) -> RuleResult {
    let Some(stats) = ctx.stats else {
        return Ok(None);
    };
    if stats.mean_exec_time_ms <= ctx.config.slow_query_threshold_ms {
        return Ok(None);
    }
    Ok(Some(
        Suggestion::new(
            ctx.query_id,
            SuggestionType::SlowExecution,
            SuggestionSource::Rule,
            format!(
                "Mean execution time {:.1} ms exceeds the {:.0} ms threshold ({:.0} ms total over {} calls)",
                stats.mean_exec_time_ms,
                ctx.config.slow_query_threshold_ms,
                stats.total_exec_time_ms,
                stats.calls
            ),
            0.9,
            ImplementationCost::High,
        )
        .with_improvement_ms(stats.mean_exec_time_ms * 0.5),
    ))
}

fn caching_candidate(ctx: &RuleContext<'_>) -> RuleResult {
    let Some(stats) = ctx.stats else {
        return Ok(None);
    };
    if stats.calls <= ctx.config.high_call_count_threshold {
        return Ok(None);
    }
    Ok(Some(Suggestion::new(
        ctx.query_id,
        SuggestionType::CachingCandidate,
        SuggestionSource::Rule,
        format!(
            "Query was executed {} times; caching its result may pay off",
            stats.calls
        ),
        0.8,
        ImplementationCost::Medium,
    )))
}

fn deep_plan(ctx: &RuleContext<'_>) -> RuleResult {
    let Some(depth) = ctx.metrics.depth else {
        return Ok(None);
    };
    if depth <= ctx.config.deep_plan_threshold {
        return Ok(None);
    }
    Ok(Some(
        Suggestion::new(
            ctx.query_id,
            SuggestionType::DeepPlan,
            SuggestionSource::Rule,
            format!(
                "Execution plan is {} levels deep; simplifying the query may flatten it",
                depth
            ),
            0.6,
            ImplementationCost::Medium,
        )
        .with_improvement(improvement_from_cost(ctx.metrics, 0.15)),
    ))
}

/// Heuristic improvement estimate: a fraction of the plan total cost, or
/// nothing when no plan is available
fn improvement_from_cost(metrics: &PlanMetrics, fraction: f64) -> Option<f64> {
    metrics.total_cost.map(|cost| (cost * fraction).max(0.0))
}

/// Best-effort extraction of column names from the WHERE clause.
///
/// Splits the clause on AND/OR, takes the identifier left of the first
/// comparison operator in each conjunct, and strips table qualification.
/// Unparseable predicates simply contribute nothing.
pub(crate) fn where_predicate_columns(query_text: &str) -> Vec<String> {
    let Some(clause) = where_clause(query_text) else {
        return Vec::new();
    };

    let operators = [
        "<=", ">=", "<>", "!=", "=", "<", ">", " like ", " in ", " is ", " between ",
    ];

    let mut columns = Vec::new();
    for part in split_conditions(clause) {
        let trimmed = part.trim().trim_start_matches('(').trim_end_matches(')');

        let Some((idx, _)) = operators
            .iter()
            .filter_map(|op| find_ignore_case(trimmed, op).map(|i| (i, *op)))
            .min_by_key(|(i, _)| *i)
        else {
            continue;
        };

        let candidate = trimmed[..idx].trim();
        if candidate.is_empty()
            || candidate.starts_with('\'')
            || candidate.starts_with('"')
            || candidate.chars().next().is_some_and(|c| c.is_ascii_digit())
        {
            continue;
        }

        let clean = candidate
            .trim_start_matches('(')
            .trim()
            .rsplit('.')
            .next()
            .unwrap_or(candidate)
            .to_string();
        if !clean.is_empty()
            && clean.chars().all(|c| c.is_alphanumeric() || c == '_')
            && !columns.contains(&clean)
        {
            columns.push(clean);
        }
    }

    columns
}

/// Returns the text after the first standalone WHERE keyword
fn where_clause(query_text: &str) -> Option<&str> {
    let bytes = query_text.as_bytes();
    let mut i = 0;
    while i + 5 <= bytes.len() {
        if bytes[i..i + 5].eq_ignore_ascii_case(b"where") {
            let before_ok = i == 0 || !is_ident_byte(bytes[i - 1]);
            let after_ok = i + 5 == bytes.len() || !is_ident_byte(bytes[i + 5]);
            if before_ok && after_ok {
                return query_text.get(i + 5..);
            }
        }
        i += 1;
    }
    None
}

/// Splits a predicate expression on standalone AND/OR (case-insensitive)
fn split_conditions(clause: &str) -> Vec<&str> {
    let bytes = clause.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        for (sep, len) in [(&b"and"[..], 3usize), (&b"or"[..], 2usize)] {
            if i + len <= bytes.len()
                && bytes[i..i + len].eq_ignore_ascii_case(sep)
                && (i == 0 || !is_ident_byte(bytes[i - 1]))
                && (i + len == bytes.len() || !is_ident_byte(bytes[i + len]))
            {
                parts.push(&clause[start..i]);
                start = i + len;
                i += len;
                break;
            }
        }
        i += 1;
    }
    parts.push(&clause[start..]);
    parts
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
