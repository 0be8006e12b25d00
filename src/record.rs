//! Projected triples and the tab-separated line format they travel in.
//!
//! A mapper turns one raw record into at most one [`Tagged`] triple
//! `(key, tag, payload)`. The external sort orders those lines by key, then by
//! tag, so that within a key every [`Tag::Primary`] line precedes every
//! [`Tag::Secondary`] line. Nothing guarantees a primary line exists at all.

use crate::validation::{SkipReason, ValidationError};
use std::fmt;

/// Single-character discriminator imposing intra-group order.
///
/// Serialised as `A` (primary, e.g. a question) and `B` (everything else).
/// The derived `Ord` matches the byte order of the serialised form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Primary,
    Secondary,
}

impl Tag {
    pub const fn as_char(self) -> char {
        match self {
            Tag::Primary => 'A',
            Tag::Secondary => 'B',
        }
    }

    /// Strict parse: only `A` and `B` are tags.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "A" => Ok(Tag::Primary),
            "B" => Ok(Tag::Secondary),
            other => Err(ValidationError::field(
                SkipReason::ParseFailure,
                "tag",
                format!("unknown tag {other:?}"),
            )),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One mapper output record. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged<P> {
    pub key: String,
    pub tag: Tag,
    pub payload: P,
}

impl<P> Tagged<P> {
    pub fn new(key: impl Into<String>, tag: Tag, payload: P) -> Self {
        Self {
            key: key.into(),
            tag,
            payload,
        }
    }
}

impl<P: fmt::Display> fmt::Display for Tagged<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.key, self.tag, self.payload)
    }
}

/// Split a line into exactly `N` tab-separated columns.
///
/// Surrounding whitespace (including the trailing newline) is stripped first,
/// so a trailing empty column counts as missing.
pub fn split_columns<const N: usize>(line: &str) -> Result<[&str; N], ValidationError> {
    let line = line.trim();
    let mut out = [""; N];
    let mut parts = line.split('\t');
    for slot in out.iter_mut() {
        match parts.next() {
            Some(p) => *slot = p,
            None => return Err(ValidationError::columns(N, line.split('\t').count())),
        }
    }
    if parts.next().is_some() {
        return Err(ValidationError::columns(N, line.split('\t').count()));
    }
    Ok(out)
}

/// Parse an integer column, classifying failures as [`SkipReason::ParseFailure`].
pub fn parse_int(field: &str, value: &str) -> Result<i64, ValidationError> {
    value.trim().parse::<i64>().map_err(|_| {
        ValidationError::field(
            SkipReason::ParseFailure,
            field,
            format!("not an integer: {value:?}"),
        )
    })
}

/// Parse a non-negative count column.
pub fn parse_count(field: &str, value: &str) -> Result<u64, ValidationError> {
    value.trim().parse::<u64>().map_err(|_| {
        ValidationError::field(
            SkipReason::ParseFailure,
            field,
            format!("not a count: {value:?}"),
        )
    })
}
