//! Mapper traits: project raw records into tagged, re-keyed output lines.
//!
//! Most jobs look at one record at a time and implement [`RecordMapper`]; the
//! blanket [`Mapper`] impl adds schema validation and the skip bookkeeping.
//! Jobs that aggregate over the whole input split (tag popularity) implement
//! [`Mapper`] directly.

use crate::emit::Emit;
use crate::schema::{NODE_SCHEMA, RawRecord};
use crate::validation::ValidationError;
use anyhow::Result;
use std::fmt::Display;

/// Consumes one input split and emits mapper output lines.
pub trait Mapper {
    type Output: Display;

    /// Map every record of `input`. Invalid records are reported via
    /// [`Emit::skip`] and dropped.
    ///
    /// # Errors
    /// Propagates read errors from `input` and write errors from `out`.
    fn do_map<I, E>(&self, input: I, out: &mut E) -> Result<()>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
        E: Emit<Self::Output>;
}

/// Record-at-a-time projection, zero or one output per record.
pub trait RecordMapper {
    type Output: Display;

    /// Project a record that already passed [`Schema::check`](crate::schema::Schema::check).
    ///
    /// `Ok(None)` drops the record without counting it as bad data (e.g. a
    /// comment where only questions and answers matter).
    fn project(&self, record: &RawRecord) -> Result<Option<Self::Output>, ValidationError>;
}

impl<M: RecordMapper> Mapper for M {
    type Output = M::Output;

    fn do_map<I, E>(&self, input: I, out: &mut E) -> Result<()>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
        E: Emit<Self::Output>,
    {
        for record in input {
            let record = record?;
            if let Err(e) = NODE_SCHEMA.check(&record) {
                out.skip(e);
                continue;
            }
            match self.project(&record) {
                Ok(Some(v)) => out.emit(v)?,
                Ok(None) => {}
                Err(e) => out.skip(e),
            }
        }
        Ok(())
    }
}
