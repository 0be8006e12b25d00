//! Hour of day at which each author posts most often.
//!
//! The mapper emits `(author_id, hour)` for every post whose `added_at`
//! timestamp parses. The reducer builds a 24-bucket histogram per author and
//! reports every hour tied for the maximum, one line each, ascending.

use crate::emit::Emit;
use crate::mapper::RecordMapper;
use crate::record::{parse_int, split_columns};
use crate::reducer::GroupFold;
use crate::schema::{NODE_SCHEMA, RawRecord};
use crate::validation::{SkipReason, ValidationError};
use anyhow::Result;
use chrono::{NaiveDateTime, Timelike};
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Hour of day from a `YYYY-MM-DD HH:MM:SS[.fraction...]` timestamp.
///
/// Everything from the first `.` on is discarded before parsing, which also
/// drops the `+00` zone suffix the dump appends after the fraction.
pub fn parse_hour(timestamp: &str) -> Result<u32, ValidationError> {
    let ts = match timestamp.split_once('.') {
        Some((whole, _fraction)) => whole,
        None => timestamp,
    };
    NaiveDateTime::parse_from_str(ts.trim(), TIMESTAMP_FORMAT)
        .map(|dt| dt.hour())
        .map_err(|e| {
            ValidationError::field(
                SkipReason::ParseFailure,
                "added_at",
                format!("{timestamp:?}: {e}"),
            )
        })
}

/// One `(author, hour)` observation, also the reducer's output line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AuthorHour {
    pub author_id: String,
    pub hour: u32,
}

impl fmt::Display for AuthorHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.author_id, self.hour)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PostingHourMapper;

impl RecordMapper for PostingHourMapper {
    type Output = AuthorHour;

    fn project(&self, record: &RawRecord) -> Result<Option<AuthorHour>, ValidationError> {
        let author = NODE_SCHEMA.require(record, "author_id")?;
        let added_at = NODE_SCHEMA.require(record, "added_at")?;
        Ok(Some(AuthorHour {
            author_id: author.to_string(),
            hour: parse_hour(added_at)?,
        }))
    }
}

/// Post counts per hour of day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HourHistogram(pub [u64; 24]);

impl HourHistogram {
    /// Count one post; any integer hour lands in `hour mod 24`.
    pub fn increment(&mut self, hour: i64) {
        // rem_euclid(24) is always in 0..24
        self.0[hour.rem_euclid(24) as usize] += 1;
    }

    /// Every hour whose count equals the maximum, ascending. Empty when no
    /// post was counted.
    pub fn busiest_hours(&self) -> Vec<u32> {
        let max = self.0.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }
        (0u32..24).filter(|&h| self.0[h as usize] == max).collect()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PostingHourFold;

impl GroupFold for PostingHourFold {
    type Value = i64;
    type Acc = HourHistogram;
    type Out = AuthorHour;

    fn decode<'l>(&self, line: &'l str) -> Result<(&'l str, i64), ValidationError> {
        let [author, hour] = split_columns::<2>(line)?;
        Ok((author, parse_int("hour", hour)?))
    }

    fn create(&self) -> HourHistogram {
        HourHistogram::default()
    }

    fn add_input(&self, acc: &mut HourHistogram, hour: i64) {
        acc.increment(hour);
    }

    fn finish<E: Emit<AuthorHour>>(&self, key: &str, acc: HourHistogram, out: &mut E) -> Result<()> {
        for hour in acc.busiest_hours() {
            out.emit(AuthorHour {
                author_id: key.to_string(),
                hour,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_fractional_timestamps() {
        assert_eq!(parse_hour("2012-02-25 08:11:01").unwrap(), 8);
        assert_eq!(parse_hour("2012-02-25 23:59:59.623548+00").unwrap(), 23);
        assert_eq!(parse_hour("2012-02-25 00:00:00.0").unwrap(), 0);
    }

    #[test]
    fn rejects_garbage_timestamps() {
        for bad in ["", "\\N", "2012-02-25", "2012-02-25T08:11:01", "2012-13-01 00:00:00"] {
            let e = parse_hour(bad).unwrap_err();
            assert_eq!(e.reason, SkipReason::ParseFailure, "{bad}");
        }
    }

    #[test]
    fn histogram_wraps_and_reports_ties() {
        let mut h = HourHistogram::default();
        for hour in [3, 27, 5, -19, 10] {
            h.increment(hour);
        }
        // 27 -> 3, -19 -> 5
        assert_eq!(h.0[3], 2);
        assert_eq!(h.0[5], 2);
        assert_eq!(h.busiest_hours(), vec![3, 5]);
        assert!(HourHistogram::default().busiest_hours().is_empty());
    }
}
