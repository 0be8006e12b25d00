//! Run counters and their reporting.
//!
//! Skipped records never change a job's output or exit status, so counters
//! are the only way an operator learns how dirty an input was. Every run
//! fills a [`JobCounters`]; [`JobCounters::to_collector`] turns it into a
//! [`MetricsCollector`] that can be printed or saved as JSON.
//!
//! # Example
//!
//! ```no_run
//! use forumstats::metrics::{JobCounters, Metric, MetricsCollector};
//! use forumstats::validation::SkipReason;
//! use serde_json::Value;
//!
//! struct SplitCount(usize);
//!
//! impl Metric for SplitCount {
//!     fn name(&self) -> &str {
//!         "input_files"
//!     }
//!
//!     fn value(&self) -> Value {
//!         serde_json::json!(self.0)
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut counters = JobCounters::default();
//! counters.records_read = 10;
//! counters.record_skip(SkipReason::SchemaMismatch);
//!
//! let mut metrics = counters.to_collector();
//! metrics.register(Box::new(SplitCount(3)));
//! metrics.save_to_file("metrics.json")?;
//! # Ok(())
//! # }
//! ```

use crate::validation::SkipReason;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

/// A named value reported at the end of a run.
pub trait Metric {
    /// The name of this metric (e.g., `records_read`).
    fn name(&self) -> &str;

    /// The current value of this metric as a JSON value.
    fn value(&self) -> Value;

    /// Optional description of what this metric measures.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Named metrics plus the run's wall-clock window.
#[derive(Default)]
pub struct MetricsCollector {
    metrics: BTreeMap<String, Box<dyn Metric>>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric, replacing any metric with the same name.
    pub fn register(&mut self, metric: Box<dyn Metric>) {
        self.metrics.insert(metric.name().to_string(), metric);
    }

    pub fn record_start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn record_end(&mut self) {
        self.end_time = Some(Instant::now());
    }

    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Current value of a metric, by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.metrics.get(name).map(|m| m.value())
    }

    /// All metrics as a JSON object, `{name: {value, description?}}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut metrics_json = serde_json::Map::new();

        for (name, metric) in &self.metrics {
            let mut metric_obj = serde_json::Map::new();
            metric_obj.insert("value".to_string(), metric.value());
            if let Some(desc) = metric.description() {
                metric_obj.insert("description".to_string(), json!(desc));
            }
            metrics_json.insert(name.clone(), Value::Object(metric_obj));
        }

        if let Some(elapsed) = self.elapsed() {
            metrics_json.insert(
                "execution_time_ms".to_string(),
                json!({
                    "value": elapsed.as_millis() as u64,
                    "description": "Wall-clock time of the run in milliseconds",
                }),
            );
        }
        Value::Object(metrics_json)
    }

    /// Print all metrics to stderr; stdout carries job output.
    pub fn print(&self) {
        eprintln!("========== Job Counters ==========");
        if let Some(elapsed) = self.elapsed() {
            eprintln!("Execution Time: {:.3}s", elapsed.as_secs_f64());
        }
        for (name, metric) in &self.metrics {
            match metric.description() {
                Some(desc) => eprintln!("{}: {} ({})", name, metric.value(), desc),
                None => eprintln!("{}: {}", name, metric.value()),
            }
        }
        eprintln!("==================================");
    }

    /// Save all metrics to a JSON file.
    ///
    /// # Errors
    /// Fails if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

/// A simple counter metric.
pub struct CounterMetric {
    name: String,
    count: u64,
    description: Option<String>,
}

impl CounterMetric {
    pub fn with_value(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Metric for CounterMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.count)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Per-run bookkeeping filled in by the runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounters {
    /// Raw records (map) or lines (reduce) consumed.
    pub records_read: u64,
    /// Output lines written.
    pub records_emitted: u64,
    /// Key groups sealed (reduce only).
    pub groups_sealed: u64,
    pub skipped_schema_mismatch: u64,
    pub skipped_field_missing: u64,
    pub skipped_parse_failure: u64,
}

impl JobCounters {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::SchemaMismatch => self.skipped_schema_mismatch += 1,
            SkipReason::FieldMissing => self.skipped_field_missing += 1,
            SkipReason::ParseFailure => self.skipped_parse_failure += 1,
        }
    }

    pub fn skipped(&self, reason: SkipReason) -> u64 {
        match reason {
            SkipReason::SchemaMismatch => self.skipped_schema_mismatch,
            SkipReason::FieldMissing => self.skipped_field_missing,
            SkipReason::ParseFailure => self.skipped_parse_failure,
        }
    }

    pub fn skipped_total(&self) -> u64 {
        SkipReason::ALL.iter().map(|r| self.skipped(*r)).sum()
    }

    /// Export as counter metrics.
    #[must_use]
    pub fn to_collector(&self) -> MetricsCollector {
        let mut m = MetricsCollector::new();
        self.register_into(&mut m);
        m
    }

    /// Register every counter with an existing collector.
    pub fn register_into(&self, m: &mut MetricsCollector) {
        m.register(Box::new(
            CounterMetric::with_value("records_read", self.records_read)
                .with_description("Input records or lines consumed"),
        ));
        m.register(Box::new(
            CounterMetric::with_value("records_emitted", self.records_emitted)
                .with_description("Output lines written"),
        ));
        m.register(Box::new(CounterMetric::with_value(
            "groups_sealed",
            self.groups_sealed,
        )));
        for reason in SkipReason::ALL {
            m.register(Box::new(CounterMetric::with_value(
                format!("skipped_{}", reason.as_str()),
                self.skipped(reason),
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_counters_by_reason() {
        let mut c = JobCounters::default();
        c.record_skip(SkipReason::ParseFailure);
        c.record_skip(SkipReason::ParseFailure);
        c.record_skip(SkipReason::SchemaMismatch);
        assert_eq!(c.skipped(SkipReason::ParseFailure), 2);
        assert_eq!(c.skipped_total(), 3);
    }

    #[test]
    fn collector_json_shape() {
        let c = JobCounters {
            records_read: 5,
            records_emitted: 4,
            skipped_parse_failure: 1,
            ..JobCounters::default()
        };
        let m = c.to_collector();
        assert_eq!(m.get("records_read"), Some(json!(5)));
        assert_eq!(m.get("skipped_parse_failure"), Some(json!(1)));
        let j = m.to_json();
        assert_eq!(j["records_emitted"]["value"], json!(4));
        assert!(j["records_read"]["description"].is_string());
        assert!(j.get("execution_time_ms").is_none());
    }
}
