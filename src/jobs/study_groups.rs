//! Author roster per thread.
//!
//! A question opens a thread keyed by its own id; answers and comments join
//! the thread named by their `abs_parent_id`. The reducer lists every
//! participant in input order, duplicates included.

use crate::emit::Emit;
use crate::mapper::RecordMapper;
use crate::record::{Tag, Tagged, split_columns};
use crate::reducer::GroupFold;
use crate::schema::{NODE_SCHEMA, RawRecord};
use crate::validation::ValidationError;
use anyhow::Result;
use std::fmt;

/// Emits `(thread_id, tag, author_id)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StudyGroupMapper;

impl RecordMapper for StudyGroupMapper {
    type Output = Tagged<String>;

    fn project(&self, record: &RawRecord) -> Result<Option<Self::Output>, ValidationError> {
        let id = NODE_SCHEMA.require(record, "id")?;
        let node_type = NODE_SCHEMA.require(record, "node_type")?;
        let parent = NODE_SCHEMA.require(record, "abs_parent_id")?;
        let author = NODE_SCHEMA.require(record, "author_id")?;

        Ok(Some(if node_type == "question" {
            Tagged::new(id, Tag::Primary, author.to_string())
        } else {
            Tagged::new(parent, Tag::Secondary, author.to_string())
        }))
    }
}

/// Sealed output line: a thread and everyone who posted in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadRoster {
    pub thread_id: String,
    pub authors: Vec<String>,
}

impl fmt::Display for ThreadRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.thread_id, self.authors.join(","))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StudyGroupFold;

impl GroupFold for StudyGroupFold {
    type Value = String;
    type Acc = Vec<String>;
    type Out = ThreadRoster;

    fn decode<'l>(&self, line: &'l str) -> Result<(&'l str, String), ValidationError> {
        let [thread, tag, author] = split_columns::<3>(line)?;
        // the tag only orders lines inside a thread; validate and drop it
        Tag::parse(tag)?;
        Ok((thread, author.to_string()))
    }

    fn create(&self) -> Vec<String> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<String>, author: String) {
        acc.push(author);
    }

    fn finish<E: Emit<ThreadRoster>>(&self, key: &str, acc: Vec<String>, out: &mut E) -> Result<()> {
        out.emit(ThreadRoster {
            thread_id: key.to_string(),
            authors: acc,
        })
    }
}
