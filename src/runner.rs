//! Wiring of readers, jobs, sinks and counters for one process run.
//!
//! A run is one phase of one job over one input split:
//!
//! - **map**: raw forum records in, projected lines out
//! - **reduce**: key-sorted projected lines in, aggregates out
//!
//! Sorting between the two phases is done by the surrounding batch runtime
//! (or `sort` in a shell pipeline) and is not this crate's concern.

use crate::config::JobConfig;
use crate::emit::Emit;
use crate::io::{Input, LineSink, lines, raw_records};
use crate::jobs::{
    AverageLengthFold, AverageLengthMapper, PostingHourFold, PostingHourMapper, StudyGroupFold,
    StudyGroupMapper, TagCountMapper, top_tags,
};
use crate::mapper::Mapper;
use crate::metrics::{JobCounters, MetricsCollector};
use crate::reducer::{GroupFold, SortedGroupReducer};
use crate::validation::{ErrorCollector, ValidationError, ValidationMode};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt::{self, Display};
use std::io::Write;
use tracing::{debug, info, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Job {
    /// Question length and average answer length per question.
    AverageLength,
    /// Global top-N tags.
    PopularTags,
    /// Busiest posting hour(s) per author.
    StudentTimes,
    /// Author roster per thread.
    StudyGroups,
}

impl Job {
    pub const ALL: [Job; 4] = [
        Job::AverageLength,
        Job::PopularTags,
        Job::StudentTimes,
        Job::StudyGroups,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Job::AverageLength => "average-length",
            Job::PopularTags => "popular-tags",
            Job::StudentTimes => "student-times",
            Job::StudyGroups => "study-groups",
        }
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Map,
    Reduce,
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Map => "map",
            Phase::Reduce => "reduce",
        })
    }
}

/// What a run did besides writing its output.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub counters: JobCounters,
    /// Skipped records; only filled under [`ValidationMode::LogAndContinue`].
    pub errors: ErrorCollector,
}

/// Line sink that also keeps the books on skipped records.
struct CountingSink<'a, W: Write> {
    lines: LineSink<W>,
    /// Position of the record or line being processed.
    position: &'a Cell<u64>,
    unit: &'static str,
    mode: ValidationMode,
    counters: JobCounters,
    errors: ErrorCollector,
}

impl<'a, W: Write> CountingSink<'a, W> {
    fn new(writer: W, position: &'a Cell<u64>, unit: &'static str, mode: ValidationMode) -> Self {
        Self {
            lines: LineSink::new(writer),
            position,
            unit,
            mode,
            counters: JobCounters::default(),
            errors: ErrorCollector::new(),
        }
    }

    fn into_summary(mut self, groups_sealed: u64) -> Result<RunSummary> {
        self.lines.flush()?;
        self.counters.records_read = self.position.get();
        self.counters.records_emitted = self.lines.lines_written();
        self.counters.groups_sealed = groups_sealed;
        Ok(RunSummary {
            counters: self.counters,
            errors: self.errors,
        })
    }
}

impl<T: Display, W: Write> Emit<T> for CountingSink<'_, W> {
    fn emit(&mut self, value: T) -> Result<()> {
        self.lines.emit(value)
    }

    fn skip(&mut self, error: ValidationError) {
        let position = self.position.get();
        trace!(unit = self.unit, position, reason = %error.reason, "skipped: {error}");
        self.counters.record_skip(error.reason);
        if self.mode == ValidationMode::LogAndContinue {
            self.errors
                .add_error(Some(format!("{} {position}", self.unit)), error);
        }
    }
}

/// Runs jobs under a fixed [`JobConfig`].
#[derive(Clone, Debug, Default)]
pub struct Runner {
    config: JobConfig,
}

impl Runner {
    pub fn new(config: JobConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Run one phase of `job` over `inputs` (read in order as one split),
    /// writing result lines to `output`.
    ///
    /// Skipped records never fail the run. Counters are logged, and written
    /// as JSON when a metrics path is configured.
    ///
    /// # Errors
    /// Invalid configuration, read or write failures on the streams, or a
    /// metrics file that cannot be written.
    pub fn run<W: Write>(
        &self,
        job: Job,
        phase: Phase,
        inputs: Vec<Input>,
        output: W,
    ) -> Result<RunSummary> {
        self.config.validate()?;
        debug!(%job, %phase, inputs = inputs.len(), config = ?self.config, "starting run");

        let mut metrics = MetricsCollector::new();
        metrics.record_start();
        let summary = match phase {
            Phase::Map => self.run_map(job, inputs, output),
            Phase::Reduce => self.run_reduce(job, inputs, output),
        }
        .with_context(|| format!("{job} {phase} failed"))?;
        metrics.record_end();

        let c = &summary.counters;
        info!(
            %job,
            %phase,
            records_read = c.records_read,
            records_emitted = c.records_emitted,
            groups_sealed = c.groups_sealed,
            skipped = c.skipped_total(),
            "run complete"
        );
        c.register_into(&mut metrics);

        if self.config.validation == ValidationMode::LogAndContinue {
            if summary.errors.error_count() > 0 {
                warn!(skipped = summary.errors.error_count(), "records were skipped");
                eprint!("{}", summary.errors);
            }
            metrics.print();
        }
        if let Some(path) = &self.config.metrics_path {
            metrics
                .save_to_file(path)
                .with_context(|| format!("write metrics to {}", path.display()))?;
            debug!(path = %path.display(), "metrics written");
        }
        Ok(summary)
    }

    /// Map phase: project raw records of the split.
    ///
    /// # Errors
    /// Read or write failures.
    pub fn run_map<W: Write>(&self, job: Job, inputs: Vec<Input>, output: W) -> Result<RunSummary> {
        let position = Cell::new(0u64);
        let mut sink = CountingSink::new(output, &position, "record", self.config.validation);
        let records = inputs
            .into_iter()
            .flat_map(|input| {
                debug!(input = %input.name, "reading split");
                raw_records(input.reader)
            })
            .inspect(|_| position.set(position.get() + 1));

        match job {
            Job::AverageLength => AverageLengthMapper.do_map(records, &mut sink)?,
            Job::PopularTags => TagCountMapper::new(self.config.tag_emit).do_map(records, &mut sink)?,
            Job::StudentTimes => PostingHourMapper.do_map(records, &mut sink)?,
            Job::StudyGroups => StudyGroupMapper.do_map(records, &mut sink)?,
        }
        sink.into_summary(0)
    }

    /// Reduce phase: aggregate key-sorted lines.
    ///
    /// # Errors
    /// Read or write failures.
    pub fn run_reduce<W: Write>(
        &self,
        job: Job,
        inputs: Vec<Input>,
        output: W,
    ) -> Result<RunSummary> {
        let position = Cell::new(0u64);
        let mut sink = CountingSink::new(output, &position, "line", self.config.validation);
        let input_lines = inputs
            .into_iter()
            .flat_map(|input| {
                debug!(input = %input.name, "reading sorted input");
                lines(input.into_buf_reader())
            })
            .inspect(|_| position.set(position.get() + 1));

        let groups = match job {
            Job::AverageLength => reduce_sorted(AverageLengthFold, input_lines, &mut sink)?,
            Job::PopularTags => {
                let mut selector = top_tags(self.config.top_n);
                selector.reduce_lines(input_lines, &mut sink)?;
                selector.groups_sealed()
            }
            Job::StudentTimes => reduce_sorted(PostingHourFold, input_lines, &mut sink)?,
            Job::StudyGroups => reduce_sorted(StudyGroupFold, input_lines, &mut sink)?,
        };
        sink.into_summary(groups)
    }
}

/// Drive `fold` over all lines; returns the number of groups sealed.
fn reduce_sorted<R, I, E>(fold: R, lines: I, out: &mut E) -> Result<u64>
where
    R: GroupFold,
    I: IntoIterator<Item = Result<String>>,
    E: Emit<R::Out>,
{
    let mut reducer = SortedGroupReducer::new(fold);
    reducer.reduce_lines(lines, out)?;
    Ok(reducer.groups_sealed())
}
