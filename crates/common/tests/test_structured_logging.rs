use common::{
    ExecutionContext, LoggingConfig, OperationTimer, PerformanceMetrics, RequestContext,
    StructuredLogEntry,
};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::Level;

#[test]
fn test_structured_log_entry_creation() {
    let mut fields = HashMap::new();
    fields.insert("run_id".to_string(), Value::String("C_0000007".to_string()));

    let entry = StructuredLogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: "INFO".to_string(),
        target: "domain::services".to_string(),
        message: "Mapped submission to warehouse rows".to_string(),
        fields,
        context: None,
        performance: None,
    };

    let json = serde_json::to_value(&entry).expect("entry serializes");
    assert_eq!(json["run_id"], "C_0000007");
    assert!(json.get("context").is_none());
    assert!(json.get("performance").is_none());
}

#[test]
fn test_execution_context_default() {
    let context = ExecutionContext::default();

    assert!(context.request_id.is_none());
    assert!(!context.app_version.is_empty());
    assert!(!context.hostname.is_empty());
    assert!(context.pid > 0);
}

#[test]
fn test_logging_config_from_settings() {
    let config = LoggingConfig::from_settings("warn", true, false).expect("valid level");
    assert_eq!(config.level, Level::WARN);
    assert!(config.json_output);
    assert!(!config.color_output);

    assert_eq!(config.verbose().level, Level::DEBUG);
}

#[test]
fn test_verbose_keeps_trace() {
    let config = LoggingConfig::from_settings("TRACE", false, true).expect("valid level");
    assert_eq!(config.verbose().level, Level::TRACE);
}

#[test]
fn test_logging_config_rejects_unknown_level() {
    let error = LoggingConfig::from_settings("loud", false, true).unwrap_err();
    assert!(error.to_string().contains("loud"));
}

#[test]
fn test_operation_timer_reports_duration() {
    let timer = OperationTimer::new("warehouse");
    std::thread::sleep(Duration::from_millis(10));
    assert!(timer.elapsed() >= Duration::from_millis(10));

    let metrics = timer.finish();
    assert!(metrics.duration_ms.unwrap_or_default() >= 10);
    assert_eq!(metrics.items_processed, None);
}

#[test]
fn test_performance_metrics_serialization() {
    let metrics = PerformanceMetrics {
        duration_ms: Some(1500),
        items_processed: Some(42),
    };

    let json = serde_json::to_string(&metrics).expect("metrics serialize");
    assert!(json.contains("\"duration_ms\":1500"));
    assert!(json.contains("\"items_processed\":42"));
}

#[test]
fn test_request_contexts_are_unique() {
    let first = RequestContext::new();
    let second = RequestContext::default();
    assert_ne!(first.request_id, second.request_id);
    assert_eq!(first.request_id.len(), 36);
}
