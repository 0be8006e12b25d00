//! Group-boundary reduction over a key-sorted line stream.
//!
//! # Input contract
//!
//! Lines arrive **grouped by key**, and within a key ordered by tag ascending.
//! That ordering is produced by the shuffle/sort stage of the surrounding batch
//! runtime and is *not* re-verified here. If a key shows up in two separate
//! runs, it is reduced (and emitted) twice.
//!
//! # State machine
//!
//! ```text
//! NoGroup --first line--> InGroup(k, acc) --same key--> InGroup(k, acc')
//!                              |  --new key: seal(k)--> InGroup(k2, fresh)
//!                              '--end of stream: seal(k)--> Done
//! ```
//!
//! Exactly one accumulator is live at a time, so memory is bounded by the
//! largest single group, never by the number of keys. The end-of-stream seal
//! is the only way the last group reaches the output; callers must call
//! [`SortedGroupReducer::finish`].
//!
//! Nothing assumes a group starts with a primary-tagged line. A key made only
//! of secondary lines (answers whose question is missing) is sealed like any
//! other.

use crate::emit::Emit;
use crate::validation::ValidationError;
use anyhow::{Result, bail};
use std::mem;

/// Per-key accumulator protocol, modelled on a combiner:
/// `create` → `add_input`* → `finish`.
pub trait GroupFold {
    /// Decoded payload of one line (tag included when the job has one).
    type Value;
    /// Mutable per-key state.
    type Acc;
    /// Sealed aggregate.
    type Out;

    /// Split a reducer input line into its key and value.
    ///
    /// # Errors
    /// Returns the classified reason for a malformed line; the line is dropped.
    fn decode<'l>(&self, line: &'l str) -> Result<(&'l str, Self::Value), ValidationError>;

    /// Fresh accumulator for a new key.
    fn create(&self) -> Self::Acc;

    fn add_input(&self, acc: &mut Self::Acc, value: Self::Value);

    /// Seal a finished group, emitting zero or more aggregates for `key`.
    ///
    /// # Errors
    /// Propagates sink failures.
    fn finish<E: Emit<Self::Out>>(&self, key: &str, acc: Self::Acc, out: &mut E) -> Result<()>;
}

enum State<A> {
    NoGroup,
    InGroup { key: String, acc: A },
    Done,
}

/// Drives a [`GroupFold`] over a key-sorted stream.
pub struct SortedGroupReducer<R: GroupFold> {
    fold: R,
    state: State<R::Acc>,
    groups_sealed: u64,
}

impl<R: GroupFold> SortedGroupReducer<R> {
    pub fn new(fold: R) -> Self {
        Self {
            fold,
            state: State::NoGroup,
            groups_sealed: 0,
        }
    }

    /// Number of groups emitted so far.
    pub fn groups_sealed(&self) -> u64 {
        self.groups_sealed
    }

    /// Key of the group currently being accumulated.
    pub fn current_key(&self) -> Option<&str> {
        match &self.state {
            State::InGroup { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// Decode and consume one raw line. Malformed lines are reported through
    /// [`Emit::skip`] and leave the state untouched.
    ///
    /// # Errors
    /// Fails if called after [`finish`](Self::finish), or if the sink fails.
    pub fn push_line<E: Emit<R::Out>>(&mut self, line: &str, out: &mut E) -> Result<()> {
        match self.fold.decode(line) {
            Ok((key, value)) => self.push(key, value, out),
            Err(e) => {
                out.skip(e);
                Ok(())
            }
        }
    }

    /// Consume one decoded value.
    ///
    /// # Errors
    /// Fails if called after [`finish`](Self::finish), or if sealing the
    /// previous group fails to write.
    pub fn push<E: Emit<R::Out>>(&mut self, key: &str, value: R::Value, out: &mut E) -> Result<()> {
        match &mut self.state {
            State::InGroup { key: current, acc } if current.as_str() == key => {
                self.fold.add_input(acc, value);
                return Ok(());
            }
            State::Done => bail!("reducer already finished; got a line for key {key:?}"),
            _ => {}
        }

        if let State::InGroup { key: prev, acc } = mem::replace(&mut self.state, State::NoGroup) {
            self.seal(&prev, acc, out)?;
        }
        let mut acc = self.fold.create();
        self.fold.add_input(&mut acc, value);
        self.state = State::InGroup {
            key: key.to_owned(),
            acc,
        };
        Ok(())
    }

    /// End of stream: seal the last group (if any) and move to `Done`.
    /// Calling it again is a no-op.
    ///
    /// # Errors
    /// Propagates sink failures.
    pub fn finish<E: Emit<R::Out>>(&mut self, out: &mut E) -> Result<()> {
        if let State::InGroup { key, acc } = mem::replace(&mut self.state, State::Done) {
            self.seal(&key, acc, out)?;
        }
        Ok(())
    }

    /// Push every line, then [`finish`](Self::finish).
    ///
    /// # Errors
    /// Propagates read errors from `lines` and sink failures.
    pub fn reduce_lines<I, S, E>(&mut self, lines: I, out: &mut E) -> Result<()>
    where
        I: IntoIterator<Item = Result<S>>,
        S: AsRef<str>,
        E: Emit<R::Out>,
    {
        for line in lines {
            self.push_line(line?.as_ref(), out)?;
        }
        self.finish(out)
    }

    fn seal<E: Emit<R::Out>>(&mut self, key: &str, acc: R::Acc, out: &mut E) -> Result<()> {
        self.groups_sealed += 1;
        self.fold.finish(key, acc, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{parse_int, split_columns};

    /// Sums the second column per key.
    struct SumFold;

    impl GroupFold for SumFold {
        type Value = i64;
        type Acc = i64;
        type Out = (String, i64);

        fn decode<'l>(&self, line: &'l str) -> Result<(&'l str, i64), ValidationError> {
            let [k, v] = split_columns::<2>(line)?;
            Ok((k, parse_int("v", v)?))
        }
        fn create(&self) -> i64 {
            0
        }
        fn add_input(&self, acc: &mut i64, v: i64) {
            *acc += v;
        }
        fn finish<E: Emit<(String, i64)>>(&self, key: &str, acc: i64, out: &mut E) -> Result<()> {
            out.emit((key.to_string(), acc))
        }
    }

    #[test]
    fn state_transitions() -> Result<()> {
        let mut r = SortedGroupReducer::new(SumFold);
        let mut out: Vec<(String, i64)> = Vec::new();
        assert_eq!(r.current_key(), None);

        r.push_line("a\t1", &mut out)?;
        assert_eq!(r.current_key(), Some("a"));
        r.push_line("a\t2", &mut out)?;
        assert!(out.is_empty());

        r.push_line("b\t5", &mut out)?;
        assert_eq!(out, vec![("a".to_string(), 3)]);
        assert_eq!(r.current_key(), Some("b"));

        r.finish(&mut out)?;
        assert!(r.is_done());
        assert_eq!(out, vec![("a".to_string(), 3), ("b".to_string(), 5)]);
        assert_eq!(r.groups_sealed(), 2);

        // second finish is a no-op, pushing is an error
        r.finish(&mut out)?;
        assert_eq!(out.len(), 2);
        assert!(r.push_line("c\t1", &mut out).is_err());
        Ok(())
    }

    #[test]
    fn malformed_line_leaves_group_open() -> Result<()> {
        let mut r = SortedGroupReducer::new(SumFold);
        let mut out: Vec<(String, i64)> = Vec::new();
        r.push_line("a\t1", &mut out)?;
        r.push_line("b\tnope", &mut out)?;
        assert_eq!(r.current_key(), Some("a"));
        r.push_line("a\t1", &mut out)?;
        r.finish(&mut out)?;
        assert_eq!(out, vec![("a".to_string(), 2)]);
        Ok(())
    }

    #[test]
    fn empty_stream_emits_nothing() -> Result<()> {
        let mut r = SortedGroupReducer::new(SumFold);
        let mut out: Vec<(String, i64)> = Vec::new();
        r.reduce_lines(Vec::<Result<String>>::new(), &mut out)?;
        assert!(out.is_empty());
        assert_eq!(r.groups_sealed(), 0);
        Ok(())
    }
}
