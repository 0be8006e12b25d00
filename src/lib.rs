//! # forumstats
//!
//! Streaming **map/reduce jobs** over a forum post dump, in the style of
//! Hadoop streaming: every job is a mapper that projects raw records to
//! tab-separated `key, tag, payload` lines, and a reducer that folds a
//! key-sorted stream of those lines one group at a time.
//!
//! ## Jobs
//!
//! - **average-length** - question length and mean answer length per question
//! - **popular-tags** - global top-N tags, via a bounded min-heap
//! - **student-times** - busiest posting hour(s) per author
//! - **study-groups** - who posted in each thread
//!
//! ## Quick Start
//!
//! ```
//! use forumstats::jobs::{AverageLengthFold, AverageLengthMapper};
//! use forumstats::testing::{NodeRow, map_sort_reduce, to_tsv};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dump = to_tsv(&[
//!     NodeRow::question(1, "alice").body("0123456789"),
//!     NodeRow::answer(2, 1, "bob").body("abcd"),
//!     NodeRow::answer(3, 1, "carol").body("ab"),
//! ]);
//! let out = map_sort_reduce(&AverageLengthMapper, AverageLengthFold, &dump)?;
//! assert_eq!(out, vec!["1\t10\t3.0"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Field access
//!
//! [`schema::Schema`] names the positional fields of a raw record and rejects
//! records of the wrong width or with a non-integer id.
//!
//! ### Mappers
//!
//! A [`Mapper`] consumes one input split and emits through an [`Emit`] sink.
//! Per-record jobs implement [`mapper::RecordMapper`] instead and get
//! validation for free.
//!
//! ### Reducers
//!
//! A [`GroupFold`] describes one group's accumulator; the
//! [`SortedGroupReducer`] state machine drives it over a key-sorted stream,
//! sealing a group whenever the key changes and once more at end of stream.
//! [`TopKSelector`] feeds sealed groups into a [`BoundedTopK`] instead of
//! emitting them.
//!
//! ### Dirty data
//!
//! Malformed records are never fatal. They are dropped, counted per
//! [`validation::SkipReason`], and optionally kept for a report (see
//! [`validation::ValidationMode`]).
//!
//! ## Command line
//!
//! ```text
//! forumstats <JOB> <map|reduce> [--input GLOB] [--output PATH] [--top-n N]
//!            [--tag-emit all|local-top-n] [--log-skipped] [--metrics PATH]
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

pub mod config;
pub mod emit;
pub mod io;
pub mod jobs;
pub mod mapper;
pub mod metrics;
pub mod record;
pub mod reducer;
pub mod runner;
pub mod schema;
pub mod testing;
pub mod topk;
pub mod validation;

// General re-exports
pub use config::JobConfig;
pub use emit::{Collected, Emit};
pub use mapper::{Mapper, RecordMapper};
pub use record::{Tag, Tagged};
pub use reducer::{GroupFold, SortedGroupReducer};
pub use runner::{Job, Phase, RunSummary, Runner};
pub use schema::{NODE_FIELDS, NODE_SCHEMA, RawRecord, Schema};
pub use topk::{BoundedTopK, TopKSelector};
pub use validation::{SkipReason, ValidationError, ValidationMode};
