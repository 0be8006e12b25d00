//! Global top-N tag frequencies.
//!
//! Two phases:
//!
//! 1. [`TagCountMapper`] counts tags over its whole input split, in a mapping
//!    owned by that one call, and forwards **every** `(tag, count)` pair.
//! 2. [`top_tags`] re-totals the partial counts per tag (input sorted by tag)
//!    and keeps the `k` largest totals in a bounded min-heap.
//!
//! [`TagEmitMode::LocalTopN`] reproduces the old behaviour of truncating each
//! split to its own top-N. It is kept for comparison only: a tag that is
//! globally first but never locally first can vanish under it.

use crate::emit::Emit;
use crate::mapper::Mapper;
use crate::record::{parse_count, split_columns};
use crate::reducer::GroupFold;
use crate::schema::{NODE_SCHEMA, RawRecord};
use crate::topk::TopKSelector;
use crate::validation::ValidationError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A tag with a (partial or global) count.
///
/// Field order makes the derived `Ord` rank by count first, then by tag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagCount {
    pub count: u64,
    pub tag: String,
}

impl TagCount {
    pub fn new(tag: impl Into<String>, count: u64) -> Self {
        Self {
            count,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for TagCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.tag, self.count)
    }
}

/// What the mapper forwards at the end of its split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TagEmitMode {
    /// Every distinct tag with its split-local count, ordered by tag.
    #[default]
    All,
    /// Only the split's own top-N, by descending count. Unsound for a global
    /// ranking; see the module docs.
    LocalTopN(usize),
}

/// Count whitespace-separated `tagnames` tokens over valid records.
///
/// Invalid records are reported to `out` and skipped.
///
/// # Errors
/// Propagates read errors from `input`.
pub fn count_tags<I, E>(input: I, out: &mut E) -> Result<BTreeMap<String, u64>>
where
    I: IntoIterator<Item = Result<RawRecord>>,
    E: Emit<TagCount>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in input {
        let record = record?;
        let tags = match NODE_SCHEMA
            .check(&record)
            .and_then(|()| NODE_SCHEMA.require(&record, "tagnames"))
        {
            Ok(tags) => tags,
            Err(e) => {
                out.skip(e);
                continue;
            }
        };
        for tag in tags.split_whitespace() {
            *counts.entry(tag.to_string()).or_default() += 1;
        }
    }
    Ok(counts)
}

/// The `n` most frequent tags, highest count first, ties by tag name.
pub fn local_top_n(counts: BTreeMap<String, u64>, n: usize) -> Vec<TagCount> {
    let mut all: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { count, tag })
        .collect();
    all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    all.truncate(n);
    all
}

/// Split-level mapper for the tag job.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagCountMapper {
    pub mode: TagEmitMode,
}

impl TagCountMapper {
    pub fn new(mode: TagEmitMode) -> Self {
        Self { mode }
    }
}

impl Mapper for TagCountMapper {
    type Output = TagCount;

    fn do_map<I, E>(&self, input: I, out: &mut E) -> Result<()>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
        E: Emit<TagCount>,
    {
        let counts = count_tags(input, out)?;
        match self.mode {
            TagEmitMode::All => {
                for (tag, count) in counts {
                    out.emit(TagCount { count, tag })?;
                }
            }
            TagEmitMode::LocalTopN(n) => {
                for tc in local_top_n(counts, n) {
                    out.emit(tc)?;
                }
            }
        }
        Ok(())
    }
}

/// Sums partial counts per tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagTotalsFold;

impl GroupFold for TagTotalsFold {
    type Value = u64;
    type Acc = u64;
    type Out = TagCount;

    fn decode<'l>(&self, line: &'l str) -> Result<(&'l str, u64), ValidationError> {
        let [tag, count] = split_columns::<2>(line)?;
        Ok((tag, parse_count("count", count)?))
    }

    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, v: u64) {
        *acc = acc.saturating_add(v);
    }

    fn finish<E: Emit<TagCount>>(&self, key: &str, acc: u64, out: &mut E) -> Result<()> {
        out.emit(TagCount::new(key, acc))
    }
}

/// Reducer for the tag job: global totals, top `k`, ascending.
pub fn top_tags(k: usize) -> TopKSelector<TagTotalsFold> {
    TopKSelector::new(TagTotalsFold, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_top_n_orders_by_count_then_tag() {
        let counts: BTreeMap<String, u64> = [("b", 2), ("a", 2), ("c", 5), ("d", 1)]
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect();
        let top = local_top_n(counts, 3);
        assert_eq!(
            top,
            vec![TagCount::new("c", 5), TagCount::new("a", 2), TagCount::new("b", 2)]
        );
    }

    #[test]
    fn tag_count_ranks_by_count_first() {
        assert!(TagCount::new("zzz", 1) < TagCount::new("aaa", 2));
        assert!(TagCount::new("a", 2) < TagCount::new("b", 2));
        assert_eq!(TagCount::new("rust", 3).to_string(), "rust\t3");
    }
}
