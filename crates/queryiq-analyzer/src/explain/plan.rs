//! Query Plan Model - Data structures for representing execution plans
//!
//! The loosely-shaped EXPLAIN output becomes a closed tagged tree here: every
//! node carries a `NodeType` discriminator, cost and row estimates, and its
//! children. Node kinds the engine does not act on are folded into
//! `NodeType::Other` so new database plan operators never break parsing.

use serde::{Deserialize, Serialize};

/// Type of operation performed by a plan node
///
/// Unrecognized type strings map to `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    // Scan operations
    SeqScan,
    IndexScan,
    IndexOnlyScan,
    BitmapIndexScan,
    BitmapHeapScan,
    CteScan,

    // Join operations
    NestedLoop,
    HashJoin,
    MergeJoin,

    // Aggregation
    Aggregate,
    HashAggregate,

    // Everything else the engine inspects
    Sort,
    Hash,
    Limit,
    Materialize,
    Gather,
    Result,

    // Unknown/forward-compatible
    Other,
}

impl NodeType {
    /// Parses a node type from an EXPLAIN `Node Type` string
    pub fn from_explain_str(s: &str) -> Self {
        match s {
            "Seq Scan" => Self::SeqScan,
            "Index Scan" => Self::IndexScan,
            "Index Only Scan" => Self::IndexOnlyScan,
            "Bitmap Index Scan" => Self::BitmapIndexScan,
            "Bitmap Heap Scan" => Self::BitmapHeapScan,
            "CTE Scan" => Self::CteScan,
            "Nested Loop" => Self::NestedLoop,
            "Hash Join" => Self::HashJoin,
            "Merge Join" => Self::MergeJoin,
            "Aggregate" | "GroupAggregate" | "Group Aggregate" => Self::Aggregate,
            "HashAggregate" | "Hash Aggregate" => Self::HashAggregate,
            "Sort" | "Incremental Sort" => Self::Sort,
            "Hash" => Self::Hash,
            "Limit" => Self::Limit,
            "Materialize" => Self::Materialize,
            "Gather" | "Gather Merge" => Self::Gather,
            "Result" => Self::Result,
            _ => Self::Other,
        }
    }

    /// Returns the scan classification of this node type, if it is a scan
    pub fn scan_kind(&self) -> Option<ScanKind> {
        match self {
            Self::SeqScan => Some(ScanKind::Sequential),
            Self::IndexScan => Some(ScanKind::Index),
            Self::IndexOnlyScan => Some(ScanKind::IndexOnly),
            Self::BitmapIndexScan | Self::BitmapHeapScan => Some(ScanKind::Bitmap),
            Self::CteScan => Some(ScanKind::Cte),
            _ => None,
        }
    }

    /// Returns true if this node represents a join operation
    pub fn is_join(&self) -> bool {
        matches!(self, Self::NestedLoop | Self::HashJoin | Self::MergeJoin)
    }
}

/// Classification of how a plan node accesses a relation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Sequential,
    Index,
    IndexOnly,
    Bitmap,
    Cte,
}

impl ScanKind {
    /// Returns true if this scan kind goes through an index structure
    pub fn uses_index(&self) -> bool {
        matches!(self, Self::Index | Self::IndexOnly | Self::Bitmap)
    }
}

/// Cost estimate for a plan node
///
/// Invariant: `total >= startup >= 0` (enforced when parsing).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NodeCost {
    /// Startup cost (time to return the first row)
    pub startup: f64,
    /// Total cost (time to return all rows)
    pub total: f64,
}

impl NodeCost {
    /// Creates a new cost with startup and total values
    pub fn new(startup: f64, total: f64) -> Self {
        Self { startup, total }
    }

    /// Returns true if this cost satisfies `total >= startup >= 0`
    pub fn is_valid(&self) -> bool {
        self.startup >= 0.0 && self.total >= self.startup
    }
}

/// A single node in the execution plan tree
///
/// Children are owned exclusively by their parent, so the tree is acyclic by
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Type of operation this node performs
    pub node_type: NodeType,
    /// Relation/table name (if applicable)
    pub relation: Option<String>,
    /// Cost estimate
    pub cost: NodeCost,
    /// Estimated number of rows
    pub estimated_rows: f64,
    /// Actual rows returned (from EXPLAIN ANALYZE)
    pub actual_rows: Option<f64>,
    /// Actual total time in milliseconds (from EXPLAIN ANALYZE)
    pub actual_time_ms: Option<f64>,
    /// Child nodes
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates a new plan node with the given type and zero cost
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            relation: None,
            cost: NodeCost::new(0.0, 0.0),
            estimated_rows: 0.0,
            actual_rows: None,
            actual_time_ms: None,
            children: Vec::new(),
        }
    }

    /// Sets the relation/table name
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Sets the cost estimate
    pub fn with_cost(mut self, startup: f64, total: f64) -> Self {
        self.cost = NodeCost::new(startup, total);
        self
    }

    /// Sets the estimated rows
    pub fn with_rows(mut self, rows: f64) -> Self {
        self.estimated_rows = rows;
        self
    }

    /// Sets the actual rows (from EXPLAIN ANALYZE)
    pub fn with_actual_rows(mut self, rows: f64) -> Self {
        self.actual_rows = Some(rows);
        self
    }

    /// Sets the actual total time (from EXPLAIN ANALYZE)
    pub fn with_actual_time_ms(mut self, ms: f64) -> Self {
        self.actual_time_ms = Some(ms);
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns true if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns an iterator over this subtree (depth-first, self first)
    pub fn iter(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(self)
    }

    /// Returns the number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// The row count most representative of this node's output: actual rows
    /// when execution statistics are present, the planner estimate otherwise.
    pub fn effective_rows(&self) -> f64 {
        self.actual_rows.unwrap_or(self.estimated_rows)
    }
}

/// Iterator for traversing plan nodes depth-first without recursion
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(root: &'a PlanNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests;
