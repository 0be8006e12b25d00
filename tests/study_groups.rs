use anyhow::Result;
use forumstats::jobs::{StudyGroupFold, StudyGroupMapper};
use forumstats::testing::*;

#[test]
fn mapper_keys_every_post_by_thread() -> Result<()> {
    let mapped = map_to_lines(&StudyGroupMapper, &sample_forum_tsv())?;
    assert_lines_equal(
        &mapped,
        &["1\tA\t100", "1\tB\t200", "1\tB\t300", "1\tB\t200", "2\tA\t200", "99\tB\t400"],
    );
    Ok(())
}

#[test]
fn shuffle_only_reorders_mapper_output() -> Result<()> {
    let mapped = map_to_lines(&StudyGroupMapper, &sample_forum_tsv())?;
    let sorted = shuffle_sort(mapped.clone());
    assert_lines_unordered_equal(&sorted, &mapped);
    assert_eq!(sorted.first().map(String::as_str), Some("1\tA\t100"));
    Ok(())
}

#[test]
fn end_to_end_over_sample_forum() -> Result<()> {
    let out = map_sort_reduce(&StudyGroupMapper, StudyGroupFold, &sample_forum_tsv())?;
    assert_lines_equal(&out, &["1\t100,200,300,200", "2\t200", "99\t400"]);
    Ok(())
}

#[test]
fn orphaned_thread_still_gets_a_roster() -> Result<()> {
    let out = reduce_to_lines(StudyGroupFold, &["42\tB\tu1", "42\tB\tu2"])?;
    assert_lines_equal(&out, &["42\tu1,u2"]);
    Ok(())
}

#[test]
fn unknown_tags_are_skipped() -> Result<()> {
    let out = reduce_to_lines(StudyGroupFold, &["1\tA\tx", "1\tQ\ty", "1\tB\tz"])?;
    assert_lines_equal(&out, &["1\tx,z"]);
    Ok(())
}

#[test]
fn malformed_lines_do_not_change_output() -> Result<()> {
    let clean = ["1\tA\tx", "1\tB\ty", "2\tB\tz"];
    let dirty = [
        "1\tA\tx",
        "1\tB",
        "1\tB\ty",
        "1\tB\tw\textra",
        "garbage",
        "2\tC\tq",
        "2\tB\tz",
    ];
    let expected = reduce_to_lines(StudyGroupFold, &clean)?;
    assert_lines_equal(&expected, &["1\tx,y", "2\tz"]);
    assert_lines_equal(&reduce_to_lines(StudyGroupFold, &dirty)?, &expected);
    Ok(())
}
