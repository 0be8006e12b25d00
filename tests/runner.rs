use anyhow::Result;
use forumstats::io::{Input, open_inputs};
use forumstats::jobs::TagEmitMode;
use forumstats::testing::*;
use forumstats::{Job, JobConfig, Phase, Runner, SkipReason, ValidationMode};
use std::io::Cursor;

fn input(text: &str) -> Vec<Input> {
    vec![Input::from_reader("mem", Cursor::new(text.as_bytes().to_vec()))]
}

fn run(runner: &Runner, job: Job, phase: Phase, text: &str) -> Result<(String, forumstats::RunSummary)> {
    let mut buf = Vec::new();
    let summary = runner.run(job, phase, input(text), &mut buf)?;
    Ok((String::from_utf8(buf)?, summary))
}

#[test]
fn map_phase_counts_records_and_skips() -> Result<()> {
    let (out, summary) = run(
        &Runner::default(),
        Job::StudentTimes,
        Phase::Map,
        &sample_forum_tsv(),
    )?;
    assert_eq!(out.lines().count(), 6);

    let c = summary.counters;
    assert_eq!(c.records_read, 7);
    assert_eq!(c.records_emitted, 6);
    assert_eq!(c.skipped(SkipReason::ParseFailure), 1);
    assert_eq!(c.skipped_total(), 1);
    // not collected unless asked for
    assert_eq!(summary.errors.error_count(), 0);
    Ok(())
}

#[test]
fn reduce_phase_popular_tags() -> Result<()> {
    let runner = Runner::new(JobConfig::default().with_top_n(1));
    let (out, summary) = run(&runner, Job::PopularTags, Phase::Reduce, "x\t5\nx\t2\ny\t3\ny\t9\n")?;
    assert_eq!(out, "y\t12\n");
    assert_eq!(summary.counters.records_read, 4);
    assert_eq!(summary.counters.groups_sealed, 2);
    assert_eq!(summary.counters.records_emitted, 1);
    Ok(())
}

#[test]
fn every_job_round_trips_through_both_phases() -> Result<()> {
    let runner = Runner::default();
    let expected = [
        (Job::AverageLength, "1\t30\t25.0\n2\t5\t0\n99\t0\t8.0\n"),
        (Job::PopularTags, "cli\t1\nrust\t2\n"),
        (Job::StudentTimes, "100\t8\n200\t9\n300\t10\n400\t23\n"),
        (Job::StudyGroups, "1\t100,200,300,200\n2\t200\n99\t400\n"),
    ];
    for (job, want) in expected {
        let (mapped, _) = run(&runner, job, Phase::Map, &sample_forum_tsv())?;
        let sorted = shuffle_sort(mapped.lines().map(String::from).collect()).join("\n");
        let (reduced, _) = run(&runner, job, Phase::Reduce, &sorted)?;
        assert_eq!(reduced, want, "{job}");
    }
    Ok(())
}

#[test]
fn log_and_continue_keeps_skipped_records() -> Result<()> {
    let runner = Runner::new(JobConfig::default().with_validation(ValidationMode::LogAndContinue));
    let (out, summary) = run(
        &runner,
        Job::StudyGroups,
        Phase::Reduce,
        "1\tA\tx\nbroken\n1\tZ\ty\n1\tB\tz\n",
    )?;
    assert_eq!(out, "1\tx,z\n");

    let errors = summary.errors.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].record_id.as_deref(), Some("line 2"));
    assert_eq!(errors[0].error.reason, SkipReason::SchemaMismatch);
    assert_eq!(errors[1].record_id.as_deref(), Some("line 3"));
    assert_eq!(errors[1].error.reason, SkipReason::ParseFailure);
    Ok(())
}

#[test]
fn skip_report_lists_each_record() -> Result<()> {
    let runner = Runner::new(JobConfig::default().with_validation(ValidationMode::LogAndContinue));
    let (_, summary) = run(
        &runner,
        Job::StudentTimes,
        Phase::Reduce,
        "a\t9\na\txx\na\t9\textra\n",
    )?;
    assert_eq!(
        summary.errors.to_string(),
        "line 2\tparse_failure: [hour] not an integer: \"xx\"\n\
         line 3\tschema_mismatch: expected 2 columns, found 3\n"
    );
    Ok(())
}

#[test]
fn local_top_n_mode_truncates_the_split() -> Result<()> {
    let runner = Runner::new(JobConfig::default().with_tag_emit(TagEmitMode::LocalTopN(1)));
    let (out, _) = run(&runner, Job::PopularTags, Phase::Map, &sample_forum_tsv())?;
    assert_eq!(out, "rust\t2\n");
    Ok(())
}

#[test]
fn invalid_config_fails_before_reading() {
    let runner = Runner::new(JobConfig::default().with_top_n(0));
    assert!(run(&runner, Job::PopularTags, Phase::Reduce, "x\t1\n").is_err());
}

#[test]
fn metrics_file_is_written() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("counters.json");
    let runner = Runner::new(JobConfig::default().with_metrics_path(&path));
    run(&runner, Job::AverageLength, Phase::Map, &sample_forum_tsv())?;

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(json["records_read"]["value"], 7);
    assert_eq!(json["records_emitted"]["value"], 5);
    assert_eq!(json["skipped_parse_failure"]["value"], 1);
    assert!(json["execution_time_ms"]["value"].is_u64());
    Ok(())
}

#[test]
fn glob_input_is_one_split() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("part-0.tsv"),
        to_tsv(&[NodeRow::question(1, "u").tags("a b")]),
    )?;
    std::fs::write(
        dir.path().join("part-1.tsv"),
        to_tsv(&[NodeRow::question(2, "u").tags("b")]),
    )?;
    let pattern = dir.path().join("part-*.tsv");
    let inputs = open_inputs(pattern.to_str())?;
    assert_eq!(inputs.len(), 2);

    let mut buf = Vec::new();
    Runner::default().run(Job::PopularTags, Phase::Map, inputs, &mut buf)?;
    assert_eq!(String::from_utf8(buf)?, "a\t1\nb\t2\n");
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gzipped_split_is_decompressed() -> Result<()> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nodes.tsv.gz");
    let mut enc = GzEncoder::new(std::fs::File::create(&path)?, Compression::default());
    enc.write_all(sample_forum_tsv().as_bytes())?;
    enc.finish()?;

    let inputs = open_inputs(path.to_str())?;
    let mut buf = Vec::new();
    let summary = Runner::default().run(Job::StudyGroups, Phase::Map, inputs, &mut buf)?;
    assert_eq!(summary.counters.records_emitted, 6);
    Ok(())
}
