use anyhow::Result;
use forumstats::metrics::{CounterMetric, JobCounters, Metric, MetricsCollector};
use forumstats::validation::SkipReason;
use serde_json::{Value, json};

struct InputFiles(usize);

impl Metric for InputFiles {
    fn name(&self) -> &str {
        "input_files"
    }

    fn value(&self) -> Value {
        json!(self.0)
    }
}

#[test]
fn custom_metrics_sit_next_to_counters() {
    let mut counters = JobCounters::default();
    counters.records_read = 3;
    counters.record_skip(SkipReason::FieldMissing);

    let mut m = counters.to_collector();
    m.register(Box::new(InputFiles(2)));

    let j = m.to_json();
    assert_eq!(j["input_files"]["value"], json!(2));
    assert!(j["input_files"].get("description").is_none());
    assert_eq!(j["skipped_field_missing"]["value"], json!(1));
    assert_eq!(j["skipped_schema_mismatch"]["value"], json!(0));
}

#[test]
fn register_replaces_same_name() {
    let mut m = MetricsCollector::new();
    m.register(Box::new(CounterMetric::with_value("records_read", 1)));
    m.register(Box::new(CounterMetric::with_value("records_read", 9)));
    assert_eq!(m.get("records_read"), Some(json!(9)));
}

#[test]
fn elapsed_needs_start_and_end() {
    let mut m = MetricsCollector::new();
    assert!(m.elapsed().is_none());
    m.record_start();
    assert!(m.elapsed().is_none());
    m.record_end();
    assert!(m.elapsed().is_some());
    assert!(m.to_json().get("execution_time_ms").is_some());
}

#[test]
fn save_to_file_writes_pretty_json() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("m.json");
    let counters = JobCounters {
        records_emitted: 4,
        ..JobCounters::default()
    };
    counters.to_collector().save_to_file(&path)?;

    let text = std::fs::read_to_string(&path)?;
    assert!(text.contains('\n'));
    let j: Value = serde_json::from_str(&text)?;
    assert_eq!(j["records_emitted"]["value"], json!(4));
    Ok(())
}

#[test]
fn save_to_missing_directory_fails() {
    let m = JobCounters::default().to_collector();
    assert!(m.save_to_file("/nonexistent-dir/forumstats/m.json").is_err());
}
