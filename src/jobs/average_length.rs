//! Question length vs. average answer length, per question.
//!
//! The mapper re-keys answers onto their parent question so both land in the
//! same group: questions are emitted as `(id, A, len)`, answers as
//! `(abs_parent_id, B, len)`. Everything else is ignored. The reducer emits
//! `question_id, question_length, average_answer_length`.

use crate::emit::Emit;
use crate::mapper::RecordMapper;
use crate::record::{Tag, Tagged, parse_int, split_columns};
use crate::reducer::GroupFold;
use crate::schema::{NODE_SCHEMA, RawRecord};
use crate::validation::ValidationError;
use anyhow::Result;
use std::fmt;

/// Emits `(question_id, tag, body_length)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AverageLengthMapper;

impl RecordMapper for AverageLengthMapper {
    type Output = Tagged<usize>;

    fn project(&self, record: &RawRecord) -> Result<Option<Self::Output>, ValidationError> {
        let id = NODE_SCHEMA.require(record, "id")?;
        let node_type = NODE_SCHEMA.require(record, "node_type")?;
        let parent = NODE_SCHEMA.require(record, "abs_parent_id")?;
        let body = NODE_SCHEMA.require(record, "body")?;

        // Empty bodies show up as "\N" in the dump; they are measured as-is.
        let len = body.chars().count();
        Ok(match node_type {
            "question" => Some(Tagged::new(id, Tag::Primary, len)),
            "answer" => Some(Tagged::new(parent, Tag::Secondary, len)),
            _ => None,
        })
    }
}

/// Running per-question state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LengthStats {
    pub question_length: i64,
    pub total_answer_length: i64,
    pub answer_count: u64,
}

impl LengthStats {
    /// Mean answer length; `0` when there are no answers.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_answer_length(&self) -> f64 {
        if self.answer_count == 0 {
            0.0
        } else {
            self.total_answer_length as f64 / self.answer_count as f64
        }
    }
}

/// Sealed output line for one question.
#[derive(Clone, Debug, PartialEq)]
pub struct LengthSummary {
    pub question_id: String,
    pub stats: LengthStats,
}

impl fmt::Display for LengthSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t", self.question_id, self.stats.question_length)?;
        if self.stats.answer_count == 0 {
            f.write_str("0")
        } else {
            // Debug keeps the fractional part: 150.0, 33.333333333333336
            write!(f, "{:?}", self.stats.average_answer_length())
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AverageLengthFold;

impl GroupFold for AverageLengthFold {
    type Value = (Tag, i64);
    type Acc = LengthStats;
    type Out = LengthSummary;

    fn decode<'l>(&self, line: &'l str) -> Result<(&'l str, (Tag, i64)), ValidationError> {
        let [node, tag, length] = split_columns::<3>(line)?;
        let length = parse_int("body_length", length)?;
        Ok((node, (Tag::parse(tag)?, length)))
    }

    fn create(&self) -> LengthStats {
        LengthStats::default()
    }

    fn add_input(&self, acc: &mut LengthStats, (tag, length): (Tag, i64)) {
        match tag {
            Tag::Primary => acc.question_length = length,
            Tag::Secondary => {
                acc.total_answer_length = acc.total_answer_length.saturating_add(length);
                acc.answer_count = acc.answer_count.saturating_add(1);
            }
        }
    }

    fn finish<E: Emit<LengthSummary>>(&self, key: &str, acc: LengthStats, out: &mut E) -> Result<()> {
        out.emit(LengthSummary {
            question_id: key.to_string(),
            stats: acc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(answers: u64, total: i64) -> String {
        LengthSummary {
            question_id: "1".into(),
            stats: LengthStats {
                question_length: 10,
                total_answer_length: total,
                answer_count: answers,
            },
        }
        .to_string()
    }

    #[test]
    fn average_formatting() {
        assert_eq!(summary(0, 0), "1\t10\t0");
        assert_eq!(summary(2, 300), "1\t10\t150.0");
        assert_eq!(summary(3, 100), "1\t10\t33.333333333333336");
    }
}
