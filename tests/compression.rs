#![cfg(feature = "compression-gzip")]

use anyhow::Result;
use forumstats::io::compression::{auto_detect_reader, auto_detect_writer};
use forumstats::io::{Input, open_output};
use std::io::{Read, Write};

#[test]
fn gz_extension_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.tsv.gz");
    {
        let mut w = open_output(Some(path.as_path()))?;
        w.write_all(b"rust\t2\n")?;
        w.flush()?;
    }
    let raw = std::fs::read(&path)?;
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    let mut text = String::new();
    Input::open(&path)?.reader.read_to_string(&mut text)?;
    assert_eq!(text, "rust\t2\n");
    Ok(())
}

#[test]
fn magic_bytes_detected_without_extension() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("renamed.gz");
    {
        let mut w = auto_detect_writer(std::fs::File::create(&path)?, &path)?;
        w.write_all(b"1\tA\t5\n")?;
    }
    // no name hint: only the leading bytes can tell
    let compressed = std::fs::read(&path)?;
    let mut r = auto_detect_reader(std::io::Cursor::new(compressed), "-")?;
    let mut text = String::new();
    r.read_to_string(&mut text)?;
    assert_eq!(text, "1\tA\t5\n");
    Ok(())
}

#[test]
fn plain_input_passes_through() -> Result<()> {
    let mut r = auto_detect_reader(std::io::Cursor::new(b"plain\n".to_vec()), "nodes.tsv")?;
    let mut text = String::new();
    r.read_to_string(&mut text)?;
    assert_eq!(text, "plain\n");
    Ok(())
}
