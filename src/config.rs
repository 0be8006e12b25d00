//! Run configuration.
//!
//! [`JobConfig`] is plain data: the binary fills it from flags and
//! `FORUMSTATS_*` environment variables, tests build it directly.

use crate::jobs::TagEmitMode;
use crate::validation::ValidationMode;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Size of the tag ranking; also the per-split cut in
    /// [`TagEmitMode::LocalTopN`].
    pub top_n: usize,
    pub tag_emit: TagEmitMode,
    pub validation: ValidationMode,
    /// Where to write the run counters as JSON, if anywhere.
    pub metrics_path: Option<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            tag_emit: TagEmitMode::All,
            validation: ValidationMode::SkipInvalid,
            metrics_path: None,
        }
    }
}

impl JobConfig {
    #[must_use]
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    #[must_use]
    pub fn with_tag_emit(mut self, mode: TagEmitMode) -> Self {
        self.tag_emit = mode;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    #[must_use]
    pub fn with_metrics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// # Errors
    /// Rejects a zero-sized ranking.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if let TagEmitMode::LocalTopN(0) = self.tag_emit {
            bail!("local top-n cut must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = JobConfig::default();
        assert_eq!(c.top_n, 10);
        assert_eq!(c.tag_emit, TagEmitMode::All);
        assert_eq!(c.validation, ValidationMode::SkipInvalid);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_top_n_is_rejected() {
        assert!(JobConfig::default().with_top_n(0).validate().is_err());
        assert!(
            JobConfig::default()
                .with_tag_emit(TagEmitMode::LocalTopN(0))
                .validate()
                .is_err()
        );
    }
}
