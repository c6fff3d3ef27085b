//! Tests for the Query Plan Model

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_node_type_from_explain_str() {
    assert_eq!(NodeType::from_explain_str("Seq Scan"), NodeType::SeqScan);
    assert_eq!(NodeType::from_explain_str("Index Scan"), NodeType::IndexScan);
    assert_eq!(
        NodeType::from_explain_str("Bitmap Heap Scan"),
        NodeType::BitmapHeapScan
    );
    assert_eq!(NodeType::from_explain_str("Hash Join"), NodeType::HashJoin);
    assert_eq!(
        NodeType::from_explain_str("Incremental Sort"),
        NodeType::Sort
    );
    assert_eq!(
        NodeType::from_explain_str("Group Aggregate"),
        NodeType::Aggregate
    );
}

#[test]
fn test_unknown_node_type_maps_to_other() {
    assert_eq!(
        NodeType::from_explain_str("Quantum Scan"),
        NodeType::Other
    );
    assert_eq!(NodeType::from_explain_str(""), NodeType::Other);
}

#[test]
fn test_scan_kind_classification() {
    assert_eq!(NodeType::SeqScan.scan_kind(), Some(ScanKind::Sequential));
    assert_eq!(NodeType::IndexScan.scan_kind(), Some(ScanKind::Index));
    assert_eq!(NodeType::IndexOnlyScan.scan_kind(), Some(ScanKind::IndexOnly));
    assert_eq!(NodeType::BitmapIndexScan.scan_kind(), Some(ScanKind::Bitmap));
    assert_eq!(NodeType::BitmapHeapScan.scan_kind(), Some(ScanKind::Bitmap));
    assert_eq!(NodeType::HashJoin.scan_kind(), None);
    assert_eq!(NodeType::Other.scan_kind(), None);
}

#[test]
fn test_scan_kind_uses_index() {
    assert!(ScanKind::Index.uses_index());
    assert!(ScanKind::IndexOnly.uses_index());
    assert!(ScanKind::Bitmap.uses_index());
    assert!(!ScanKind::Sequential.uses_index());
    assert!(!ScanKind::Cte.uses_index());
}

#[test]
fn test_is_join() {
    assert!(NodeType::NestedLoop.is_join());
    assert!(NodeType::HashJoin.is_join());
    assert!(NodeType::MergeJoin.is_join());
    assert!(!NodeType::SeqScan.is_join());
    assert!(!NodeType::Hash.is_join());
}

#[test]
fn test_node_cost_validity() {
    assert!(NodeCost::new(0.0, 10.0).is_valid());
    assert!(NodeCost::new(5.0, 5.0).is_valid());
    assert!(!NodeCost::new(-1.0, 10.0).is_valid());
    assert!(!NodeCost::new(10.0, 5.0).is_valid());
}

#[test]
fn test_plan_node_builder() {
    let node = PlanNode::new(NodeType::IndexScan)
        .with_relation("orders")
        .with_cost(0.42, 8.44)
        .with_rows(1.0)
        .with_actual_rows(3.0)
        .with_actual_time_ms(0.05);

    assert_eq!(node.node_type, NodeType::IndexScan);
    assert_eq!(node.relation, Some("orders".to_string()));
    assert_eq!(node.cost, NodeCost::new(0.42, 8.44));
    assert_eq!(node.estimated_rows, 1.0);
    assert_eq!(node.actual_rows, Some(3.0));
    assert_eq!(node.actual_time_ms, Some(0.05));
    assert!(node.is_leaf());
}

#[test]
fn test_effective_rows_prefers_actual() {
    let estimated_only = PlanNode::new(NodeType::SeqScan).with_rows(100.0);
    assert_eq!(estimated_only.effective_rows(), 100.0);

    let with_actual = estimated_only.with_actual_rows(2500.0);
    assert_eq!(with_actual.effective_rows(), 2500.0);
}

#[test]
fn test_tree_traversal_order() {
    // Build a tree:
    //       HashJoin
    //      /        \
    //   SeqScan    Hash
    //                 \
    //               IndexScan
    let leaf = PlanNode::new(NodeType::IndexScan).with_relation("orders");
    let hash = PlanNode::new(NodeType::Hash).with_child(leaf);
    let root = PlanNode::new(NodeType::HashJoin)
        .with_child(PlanNode::new(NodeType::SeqScan).with_relation("users"))
        .with_child(hash);

    let types: Vec<_> = root.iter().map(|n| n.node_type).collect();
    assert_eq!(
        types,
        vec![
            NodeType::HashJoin,
            NodeType::SeqScan,
            NodeType::Hash,
            NodeType::IndexScan
        ]
    );
    assert_eq!(root.node_count(), 4);
}

#[test]
fn test_serialization_round_trip() {
    let node = PlanNode::new(NodeType::SeqScan)
        .with_relation("users")
        .with_cost(0.0, 120.0)
        .with_rows(4000.0)
        .with_child(PlanNode::new(NodeType::Other));

    let json = serde_json::to_string(&node).unwrap();
    let parsed: PlanNode = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, node);
}
