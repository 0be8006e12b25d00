//! Input splits made of several files.
//!
//! `--input` takes a glob pattern. All matching files form one split and are
//! read in sorted order, so a mapper run over `dump/part-*.tsv.gz` behaves
//! like a run over their concatenation.

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand a glob pattern into a sorted vector of matching file paths.
///
/// Directories are ignored. No match yields an empty vector.
///
/// # Errors
/// Fails on an invalid pattern or when a matched entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }

    // deterministic split order
    result.sort();

    Ok(result)
}

/// Like [`expand_glob`], but zero matches is an error.
///
/// # Errors
/// As [`expand_glob`], plus when nothing matches.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}
