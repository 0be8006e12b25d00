//! Testing utilities for forum jobs.
//!
//! - **Fixtures**: [`NodeRow`] builder and a small [`sample_forum`] dump
//! - **Assertions**: compare output lines ([`assert_lines_equal`] and friends)
//! - **Phase helpers**: run a mapper or reducer over in-memory text, and
//!   [`shuffle_sort`] to stand in for the external sort between them
//!
//! # Quick Start
//!
//! ```
//! use forumstats::jobs::{StudyGroupFold, StudyGroupMapper};
//! use forumstats::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let out = map_sort_reduce(&StudyGroupMapper, StudyGroupFold, &sample_forum_tsv())?;
//! assert_lines_equal(&out, &["1\t100,200,300,200", "2\t200", "99\t400"]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

use crate::emit::Collected;
use crate::io::raw_records;
use crate::mapper::Mapper;
use crate::reducer::{GroupFold, SortedGroupReducer};
use anyhow::Result;
use std::fmt::Display;

/// Run `mapper` over dump text and render its output lines.
///
/// # Errors
/// Propagates read errors from the dump text.
pub fn map_to_lines<M: Mapper>(mapper: &M, dump: &str) -> Result<Vec<String>> {
    let mut out = Collected::new();
    mapper.do_map(raw_records(dump.as_bytes()), &mut out)?;
    Ok(out.values.iter().map(ToString::to_string).collect())
}

/// Reduce already-sorted lines with `fold` and render the output lines.
///
/// # Errors
/// Propagates sink failures.
pub fn reduce_to_lines<R, S>(fold: R, lines: &[S]) -> Result<Vec<String>>
where
    R: GroupFold,
    R::Out: Display,
    S: AsRef<str>,
{
    let mut out = Collected::new();
    let mut reducer = SortedGroupReducer::new(fold);
    reducer.reduce_lines(lines.iter().map(Ok), &mut out)?;
    Ok(out.values.iter().map(ToString::to_string).collect())
}

/// The sort the batch runtime performs between phases: stable, by key, then
/// by tag (first and second tab-separated columns).
pub fn shuffle_sort(mut lines: Vec<String>) -> Vec<String> {
    fn key_and_tag(line: &str) -> (&str, &str) {
        let mut cols = line.split('\t');
        (cols.next().unwrap_or(""), cols.next().unwrap_or(""))
    }
    lines.sort_by(|a, b| key_and_tag(a).cmp(&key_and_tag(b)));
    lines
}

/// Map, sort, reduce: one whole job over in-memory dump text.
///
/// # Errors
/// As [`map_to_lines`] and [`reduce_to_lines`].
pub fn map_sort_reduce<M, R>(mapper: &M, fold: R, dump: &str) -> Result<Vec<String>>
where
    M: Mapper,
    R: GroupFold,
    R::Out: Display,
{
    let mapped = shuffle_sort(map_to_lines(mapper, dump)?);
    reduce_to_lines(fold, &mapped)
}
