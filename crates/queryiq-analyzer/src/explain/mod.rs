//! Execution Plan Module
//!
//! Parses EXPLAIN (FORMAT JSON) output into a typed plan tree and derives
//! the summary metrics the rest of the engine consumes.
//!
//! # Example
//!
//! ```
//! use queryiq_analyzer::explain::{parse_plan_str, compute_metrics, NodeType};
//!
//! let json = r#"[{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users",
//!     "Startup Cost": 0.0, "Total Cost": 10.0, "Plan Rows": 100}}]"#;
//! let plan = parse_plan_str(json).unwrap();
//! assert_eq!(plan.root.node_type, NodeType::SeqScan);
//!
//! let metrics = compute_metrics(&plan, 10_000.0);
//! assert_eq!(metrics.depth, Some(0));
//! ```

pub mod metrics;
pub mod plan;
pub mod postgres;

pub use metrics::{PlanMetrics, compute_metrics};
pub use plan::{NodeCost, NodeType, PlanNode, PlanNodeIterator, ScanKind};
pub use postgres::{ParsedPlan, PlanParseError, parse_plan, parse_plan_str};
