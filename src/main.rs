use anyhow::Result;
use clap::{Parser, ValueEnum};
use forumstats::config::{DEFAULT_TOP_N, JobConfig};
use forumstats::io::{open_inputs, open_output};
use forumstats::jobs::TagEmitMode;
use forumstats::runner::{Job, Phase, Runner};
use forumstats::validation::ValidationMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TagEmit {
    /// Forward every tag of the split with its count.
    All,
    /// Forward only the split's own top-N (lossy, for comparison runs).
    LocalTopN,
}

/// Streaming aggregations over a forum post dump.
///
/// Map reads raw forum records, reduce reads the key-sorted map output:
///
///   forumstats popular-tags map --input 'dump/*.tsv.gz' | sort | forumstats popular-tags reduce
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(value_enum)]
    job: Job,
    #[arg(value_enum)]
    phase: Phase,
    /// Input file or glob; stdin when omitted or `-`.
    #[arg(long, short)]
    input: Option<String>,
    /// Output file (`.gz` compresses); stdout when omitted or `-`.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Number of tags kept by the popular-tags reducer.
    #[arg(long, env = "FORUMSTATS_TOP_N", default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
    /// What the popular-tags mapper forwards.
    #[arg(long, value_enum, env = "FORUMSTATS_TAG_EMIT", default_value = "all")]
    tag_emit: TagEmit,
    /// Keep skipped records and report them on stderr at the end.
    #[arg(long)]
    log_skipped: bool,
    /// Write run counters as JSON to this path.
    #[arg(long, env = "FORUMSTATS_METRICS")]
    metrics: Option<PathBuf>,
}

impl Args {
    fn job_config(&self) -> JobConfig {
        let mut config = JobConfig::default().with_top_n(self.top_n);
        config.tag_emit = match self.tag_emit {
            TagEmit::All => TagEmitMode::All,
            TagEmit::LocalTopN => TagEmitMode::LocalTopN(self.top_n),
        };
        if self.log_skipped {
            config.validation = ValidationMode::LogAndContinue;
        }
        config.metrics_path = self.metrics.clone();
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let runner = Runner::new(args.job_config());
    let inputs = open_inputs(args.input.as_deref())?;
    let output = open_output(args.output.as_deref())?;
    runner.run(args.job, args.phase, inputs, output)?;
    Ok(())
}
