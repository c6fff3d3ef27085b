//! EXPLAIN (FORMAT JSON) Parser
//!
//! Turns the nested JSON plan representation into a typed `PlanNode` tree.
//! Both the bare plan object and the PostgreSQL outer wrapper
//! (`[{"Plan": ...}]`) are accepted; unknown fields are ignored.
//!
//! Parsing is strict about the fields the engine depends on (`Node Type`,
//! costs, row estimate) and about tree shape (`Plans` must be an array).
//! Callers treat a parse error as a degraded analysis, not a failure: the
//! analyzer logs it and continues with unknown metrics.
//!
//! Recursion into the input is depth-bounded: nodes past `MAX_PLAN_DEPTH`
//! (or past the node budget) are dropped and the result is marked truncated,
//! so adversarial input can neither overflow the stack nor run unbounded.

use crate::explain::plan::{NodeCost, NodeType, PlanNode};
use serde_json::Value;
use thiserror::Error;

/// Maximum tree depth (in edges) the parser will descend
pub const MAX_PLAN_DEPTH: u32 = 256;

/// Maximum number of nodes the parser will materialize
pub const MAX_PLAN_NODES: usize = 100_000;

/// Errors that can occur when parsing EXPLAIN JSON output
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing Plan object in EXPLAIN output")]
    MissingPlan,

    #[error("Plan node is not an object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid cost: startup={startup}, total={total}")]
    InvalidCost { startup: f64, total: f64 },

    #[error("Plans field is not an array")]
    ChildrenNotAnArray,
}

/// Result type for plan parsing
pub type Result<T> = std::result::Result<T, PlanParseError>;

/// A parsed plan tree plus parse-time bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPlan {
    /// Root node of the plan tree
    pub root: PlanNode,
    /// True when the depth cap or node budget dropped part of the input
    pub truncated: bool,
}

/// Parses an EXPLAIN (FORMAT JSON) string
pub fn parse_plan_str(json: &str) -> Result<ParsedPlan> {
    let value: Value = serde_json::from_str(json)?;
    parse_plan(&value)
}

/// Parses an already-decoded EXPLAIN JSON tree
pub fn parse_plan(value: &Value) -> Result<ParsedPlan> {
    // EXPLAIN wraps the plan in a one-element array
    let plan_obj = if let Some(arr) = value.as_array() {
        arr.first()
            .and_then(|v| v.get("Plan"))
            .ok_or(PlanParseError::MissingPlan)?
    } else if let Some(plan) = value.get("Plan") {
        plan
    } else if value.is_object() {
        value
    } else {
        return Err(PlanParseError::MissingPlan);
    };

    let mut budget = MAX_PLAN_NODES;
    let mut truncated = false;
    let root = parse_node(plan_obj, 0, &mut budget, &mut truncated)?;
    Ok(ParsedPlan { root, truncated })
}

/// Parses a single node and, depth and budget permitting, its children
fn parse_node(
    value: &Value,
    depth: u32,
    budget: &mut usize,
    truncated: &mut bool,
) -> Result<PlanNode> {
    let obj = value.as_object().ok_or(PlanParseError::NotAnObject)?;

    let node_type_str = obj
        .get("Node Type")
        .and_then(|v| v.as_str())
        .ok_or(PlanParseError::MissingField("Node Type"))?;

    let startup = obj
        .get("Startup Cost")
        .and_then(|v| v.as_f64())
        .ok_or(PlanParseError::MissingField("Startup Cost"))?;
    let total = obj
        .get("Total Cost")
        .and_then(|v| v.as_f64())
        .ok_or(PlanParseError::MissingField("Total Cost"))?;
    let cost = NodeCost::new(startup, total);
    if !cost.is_valid() {
        return Err(PlanParseError::InvalidCost { startup, total });
    }

    let estimated_rows = obj
        .get("Plan Rows")
        .and_then(|v| v.as_f64())
        .ok_or(PlanParseError::MissingField("Plan Rows"))?;

    let mut node = PlanNode::new(NodeType::from_explain_str(node_type_str));
    node.cost = cost;
    node.estimated_rows = estimated_rows;

    if let Some(rel) = obj.get("Relation Name").and_then(|v| v.as_str()) {
        node.relation = Some(rel.to_string());
    }
    if let Some(rows) = obj.get("Actual Rows").and_then(|v| v.as_f64()) {
        node.actual_rows = Some(rows);
    }
    if let Some(ms) = obj.get("Actual Total Time").and_then(|v| v.as_f64()) {
        node.actual_time_ms = Some(ms);
    }

    *budget = budget.saturating_sub(1);

    if let Some(plans) = obj.get("Plans") {
        let children = plans
            .as_array()
            .ok_or(PlanParseError::ChildrenNotAnArray)?;
        if depth >= MAX_PLAN_DEPTH {
            if !children.is_empty() {
                *truncated = true;
            }
        } else {
            for child_value in children {
                if *budget == 0 {
                    *truncated = true;
                    break;
                }
                node.children
                    .push(parse_node(child_value, depth + 1, budget, truncated)?);
            }
        }
    }

    Ok(node)
}
