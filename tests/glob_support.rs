use anyhow::Result;
use forumstats::io::glob::{expand_glob, expand_glob_required};
use forumstats::io::open_inputs;
use std::fs;

#[test]
fn matches_are_sorted_and_directories_ignored() -> Result<()> {
    let dir = tempfile::tempdir()?;
    for name in ["part-2.tsv", "part-0.tsv", "part-1.tsv"] {
        fs::write(dir.path().join(name), "")?;
    }
    fs::create_dir(dir.path().join("part-9.tsv"))?;

    let pattern = dir.path().join("part-*.tsv");
    let files = expand_glob(&pattern.to_string_lossy())?;
    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["part-0.tsv", "part-1.tsv", "part-2.tsv"]);
    Ok(())
}

#[test]
fn no_match_is_empty_or_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pattern = dir.path().join("*.gz");
    let pattern = pattern.to_string_lossy();
    assert!(expand_glob(&pattern)?.is_empty());
    assert!(expand_glob_required(&pattern).is_err());
    assert!(open_inputs(Some(&*pattern)).is_err());
    Ok(())
}

#[test]
fn invalid_pattern_is_an_error() {
    assert!(expand_glob("dump/[").is_err());
}

#[test]
fn dash_means_stdin() -> Result<()> {
    let inputs = open_inputs(Some("-"))?;
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].name, "-");
    Ok(())
}
