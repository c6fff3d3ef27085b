//! Tests for the analysis entry point

use super::*;
use crate::prediction::{FALLBACK_MODEL_VERSION, LinearModel};
use crate::suggestions::{SuggestionSource, SuggestionType};
use crate::features::MODEL_INPUT_LEN;
use pretty_assertions::assert_eq;
use serde_json::json;

fn users_seq_scan_plan() -> Value {
    json!([{
        "Plan": {
            "Node Type": "Seq Scan",
            "Relation Name": "users",
            "Startup Cost": 0.0,
            "Total Cost": 1200.0,
            "Plan Rows": 50000
        }
    }])
}

#[test]
fn test_config_defaults() {
    let config = AnalyzerConfig::default();
    assert_eq!(config.slow_query_threshold_ms, 1000.0);
    assert_eq!(config.large_relation_row_threshold, 10_000.0);
    assert_eq!(config.max_suggestions, 10);
    assert_eq!(config.deviation_ratio_threshold, 2.0);
    assert_eq!(config.high_call_count_threshold, 1000);
    assert_eq!(config.deep_plan_threshold, 5);
}

#[test]
fn test_config_builder() {
    let config = AnalyzerConfig::new()
        .with_slow_query_threshold_ms(500.0)
        .with_large_relation_row_threshold(2000.0)
        .with_max_suggestions(3)
        .with_deviation_ratio_threshold(4.0)
        .with_high_call_count_threshold(100)
        .with_deep_plan_threshold(8);

    assert_eq!(config.slow_query_threshold_ms, 500.0);
    assert_eq!(config.large_relation_row_threshold, 2000.0);
    assert_eq!(config.max_suggestions, 3);
    assert_eq!(config.deviation_ratio_threshold, 4.0);
    assert_eq!(config.high_call_count_threshold, 100);
    assert_eq!(config.deep_plan_threshold, 8);
}

#[test]
fn test_empty_query_text_is_rejected() {
    let analyzer = QueryAnalyzer::new();
    assert!(matches!(
        analyzer.analyze("", None, None),
        Err(QueryIqError::InvalidQuery(_))
    ));
    assert!(matches!(
        analyzer.analyze("   \n\t", None, None),
        Err(QueryIqError::InvalidQuery(_))
    ));
}

#[test]
fn test_select_star_with_large_seq_scan_scenario() {
    let analyzer = QueryAnalyzer::new();
    let plan = users_seq_scan_plan();

    let suggestions = analyzer
        .analyze("SELECT * FROM users WHERE age > 25", Some(&plan), None)
        .unwrap();

    assert!(suggestions.len() <= analyzer.config().max_suggestions);

    let narrow = suggestions
        .iter()
        .find(|s| s.suggestion_type == SuggestionType::NarrowProjection)
        .expect("expected NarrowProjection");
    assert_eq!(narrow.confidence, 0.9);

    let index = suggestions
        .iter()
        .find(|s| s.suggestion_type == SuggestionType::IndexRecommendation)
        .expect("expected IndexRecommendation");
    assert_eq!(index.confidence, 0.6);
    assert!(index.message.contains("age"));

    // The query is filtered, so no MissingFilter
    assert!(
        !suggestions
            .iter()
            .any(|s| s.suggestion_type == SuggestionType::MissingFilter)
    );
}

#[test]
fn test_malformed_plan_degrades_to_lexical_analysis() {
    let analyzer = QueryAnalyzer::new();
    // Children field is not a collection
    let malformed = json!({
        "Node Type": "Seq Scan",
        "Startup Cost": 0.0,
        "Total Cost": 10.0,
        "Plan Rows": 100,
        "Plans": {"oops": true}
    });

    let suggestions = analyzer
        .analyze("select * from users", Some(&malformed), None)
        .unwrap();

    // Lexical rules still fire
    assert!(
        suggestions
            .iter()
            .any(|s| s.suggestion_type == SuggestionType::NarrowProjection)
    );
    // Plan-based rules cannot
    assert!(
        !suggestions
            .iter()
            .any(|s| s.suggestion_type == SuggestionType::IndexRecommendation)
    );
}

#[test]
fn test_analysis_is_deterministic_and_idempotent() {
    let analyzer = QueryAnalyzer::new();
    let plan = users_seq_scan_plan();
    let stats = QueryStats::new().with_mean_exec_time_ms(2500.0).with_calls(5000);
    let query_id = Uuid::nil();

    let first = analyzer
        .analyze_with_id(query_id, "SELECT * FROM users", Some(&plan), Some(&stats))
        .unwrap();
    let second = analyzer
        .analyze_with_id(query_id, "SELECT * FROM users", Some(&plan), Some(&stats))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn test_output_invariants() {
    let analyzer = QueryAnalyzer::with_config(AnalyzerConfig::new().with_max_suggestions(4));
    let plan = users_seq_scan_plan();
    let stats = QueryStats::new().with_mean_exec_time_ms(9000.0).with_calls(100_000);

    let suggestions = analyzer
        .analyze_with_id(Uuid::nil(), "SELECT * FROM users", Some(&plan), Some(&stats))
        .unwrap();

    assert!(suggestions.len() <= 4);

    let mut seen = std::collections::HashSet::new();
    for s in &suggestions {
        assert!(seen.insert((s.query_id, s.suggestion_type)), "duplicate suggestion type");
        assert!((0.0..=1.0).contains(&s.confidence));
        if let Some(ms) = s.estimated_improvement_ms {
            assert!(ms >= 0.0);
        }
    }

    // Ranked by confidence descending
    for pair in suggestions.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
}

#[test]
fn test_statistics_drive_slow_and_caching_suggestions() {
    let analyzer = QueryAnalyzer::new();
    let stats = QueryStats::new().with_mean_exec_time_ms(2500.0).with_calls(5000);

    let suggestions = analyzer
        .analyze("select id from orders", None, Some(&stats))
        .unwrap();

    assert!(
        suggestions
            .iter()
            .any(|s| s.suggestion_type == SuggestionType::SlowExecution)
    );
    assert!(
        suggestions
            .iter()
            .any(|s| s.suggestion_type == SuggestionType::CachingCandidate)
    );
}

#[test]
fn test_predict_without_model_uses_fallback() {
    let analyzer = QueryAnalyzer::new();
    let features = FeatureVector::default();

    let result = analyzer.predict(&features);
    assert_eq!(result.model_version, FALLBACK_MODEL_VERSION);
    assert!(result.confidence <= 0.3);
}

#[test]
fn test_load_model_failure_keeps_fallback() {
    let analyzer = QueryAnalyzer::new();

    let bad = Arc::new(LinearModel::new(vec![1.0; 2], 0.0, "bad-v1", 0.9));
    assert!(matches!(
        analyzer.load_model(bad),
        Err(QueryIqError::Model(_))
    ));
    assert!(!analyzer.model_registry().is_loaded());

    let good = Arc::new(LinearModel::new(
        vec![0.0; MODEL_INPUT_LEN],
        75.0,
        "good-v1",
        0.9,
    ));
    analyzer.load_model(good).unwrap();
    assert_eq!(
        analyzer.predict(&FeatureVector::default()).model_version,
        "good-v1"
    );
}

#[test]
fn test_model_deviation_flows_into_suggestions() {
    let analyzer = QueryAnalyzer::new();
    let model = Arc::new(LinearModel::new(
        vec![0.0; MODEL_INPUT_LEN],
        100.0,
        "const-v1",
        0.85,
    ));
    analyzer.load_model(model).unwrap();

    // Observed 10x the predicted time
    let stats = QueryStats::new().with_mean_exec_time_ms(1000.0).with_calls(10);
    let suggestions = analyzer
        .analyze("select id from orders where id = 1", None, Some(&stats))
        .unwrap();

    let deviation = suggestions
        .iter()
        .find(|s| s.suggestion_type == SuggestionType::PerformanceDeviation)
        .expect("expected PerformanceDeviation");
    assert_eq!(deviation.source, SuggestionSource::Model);
}

#[test]
fn test_fresh_query_ids_per_analysis() {
    let analyzer = QueryAnalyzer::new();
    let a = analyzer.analyze("select * from t", None, None).unwrap();
    let b = analyzer.analyze("select * from t", None, None).unwrap();

    assert!(!a.is_empty() && !b.is_empty());
    assert_ne!(a[0].query_id, b[0].query_id);
}

#[test]
fn test_concurrent_analyses_are_independent() {
    let analyzer = Arc::new(QueryAnalyzer::new());
    let plan = Arc::new(users_seq_scan_plan());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            let plan = Arc::clone(&plan);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let suggestions = analyzer
                        .analyze_with_id(Uuid::nil(), "SELECT * FROM users", Some(plan.as_ref()), None)
                        .unwrap();
                    assert!(
                        suggestions
                            .iter()
                            .any(|s| s.suggestion_type == SuggestionType::NarrowProjection)
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
