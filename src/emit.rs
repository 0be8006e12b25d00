//! Output seam shared by mappers and reducers.
//!
//! Jobs never write to a stream directly. They hand finished values to an
//! [`Emit`] implementation, and report every dropped record through
//! [`Emit::skip`]. The runner plugs in a counting line sink; tests plug in
//! [`Collected`].

use crate::validation::ValidationError;
use anyhow::Result;

/// Receiver of job output.
pub trait Emit<T> {
    /// Accept one output value.
    ///
    /// # Errors
    /// Fails only when the underlying sink fails (e.g. a broken pipe).
    fn emit(&mut self, value: T) -> Result<()>;

    /// A record was dropped. Never fatal; the default ignores it.
    fn skip(&mut self, error: ValidationError) {
        let _ = error;
    }
}

/// In-memory [`Emit`] that keeps everything, skips included.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub values: Vec<T>,
    pub skipped: Vec<ValidationError>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Collected<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Emit<T> for Collected<T> {
    fn emit(&mut self, value: T) -> Result<()> {
        self.values.push(value);
        Ok(())
    }

    fn skip(&mut self, error: ValidationError) {
        self.skipped.push(error);
    }
}

impl<T> Emit<T> for Vec<T> {
    fn emit(&mut self, value: T) -> Result<()> {
        self.push(value);
        Ok(())
    }
}
