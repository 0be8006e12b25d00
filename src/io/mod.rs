//! Line-oriented stream I/O for mappers and reducers.
//!
//! - [`raw_records`] reads the tab-separated forum dump. Fields may be
//!   double-quoted and quoted fields may span lines (post bodies do). Rows of
//!   any width are returned; the schema check decides what is usable.
//! - [`lines`] reads reducer input one line at a time.
//! - [`LineSink`] writes one `Display` value per line.
//! - [`open_inputs`] / [`open_output`] resolve `--input` / `--output`,
//!   defaulting to stdin and stdout.
//!
//! Invalid UTF-8 never aborts a job: it is replaced with U+FFFD and the
//! record goes through the normal validation path.

pub mod compression;
pub mod glob;

use crate::emit::Emit;
use crate::schema::RawRecord;
use anyhow::{Context, Result};
use compression::{auto_detect_reader, auto_detect_writer};
use std::fmt::Display;
use std::fs::{File, create_dir_all};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Iterator over raw records of a tab-separated stream.
pub struct RawRecords<R: Read> {
    reader: csv::Reader<R>,
    record: csv::ByteRecord,
}

/// Read raw records from a tab-separated, optionally quoted stream.
pub fn raw_records<R: Read>(reader: R) -> RawRecords<R> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    RawRecords {
        reader,
        record: csv::ByteRecord::new(),
    }
}

impl<R: Read> Iterator for RawRecords<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(self
                .record
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect())),
            Ok(false) => None,
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                Some(Err(anyhow::Error::new(e).context(format!("read raw record near line {line}"))))
            }
        }
    }
}

/// Iterator over the lines of a stream, newline stripped.
pub struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
}

pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines {
        reader,
        buf: Vec::new(),
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(anyhow::Error::new(e).context("read input line"))),
        }
    }
}

/// Writes each emitted value as one line.
pub struct LineSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn lines_written(&self) -> u64 {
        self.written
    }

    /// # Errors
    /// Propagates the writer's flush failure.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flush output")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<T: Display, W: Write> Emit<T> for LineSink<W> {
    fn emit(&mut self, value: T) -> Result<()> {
        writeln!(self.writer, "{value}").context("write output line")?;
        self.written += 1;
        Ok(())
    }
}

/// One readable piece of a split.
pub struct Input {
    /// File path, or `-` for stdin.
    pub name: String,
    pub reader: Box<dyn Read>,
}

impl Input {
    pub fn stdin() -> Self {
        Self {
            name: "-".into(),
            reader: Box::new(io::stdin()),
        }
    }

    /// Wrap any reader, e.g. an in-memory buffer.
    pub fn from_reader(name: impl Into<String>, reader: impl Read + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// Open a file, decompressing it if needed.
    ///
    /// # Errors
    /// Fails if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let reader = auto_detect_reader(f, path)
            .with_context(|| format!("setup decompression for {}", path.display()))?;
        Ok(Self {
            name: path.display().to_string(),
            reader,
        })
    }

    pub fn into_buf_reader(self) -> BufReader<Box<dyn Read>> {
        BufReader::new(self.reader)
    }
}

/// Resolve `--input`: stdin when absent (or `-`), otherwise every file the
/// glob matches, in sorted order.
///
/// # Errors
/// Fails on a bad pattern, no matches, or an unreadable file.
pub fn open_inputs(pattern: Option<&str>) -> Result<Vec<Input>> {
    match pattern {
        None | Some("-") => Ok(vec![Input::stdin()]),
        Some(p) => glob::expand_glob_required(p)?
            .into_iter()
            .map(Input::open)
            .collect(),
    }
}

/// Resolve `--output`: stdout when absent (or `-`), otherwise the file,
/// compressed when its extension asks for it.
///
/// # Errors
/// Fails if the file or its parent directories cannot be created.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let path = match path {
        None => return Ok(Box::new(BufWriter::new(io::stdout()))),
        Some(p) if p.as_os_str() == "-" => return Ok(Box::new(BufWriter::new(io::stdout()))),
        Some(p) => p,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
        }
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    auto_detect_writer(f, path).with_context(|| format!("setup compression for {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_may_span_lines() -> Result<()> {
        let data = "1\t\"a\tb\nc\"\tx\n2\tplain\ty\n";
        let recs: Vec<RawRecord> = raw_records(data.as_bytes()).collect::<Result<_>>()?;
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get(1), Some("a\tb\nc"));
        assert_eq!(recs[1].fields(), ["2", "plain", "y"]);
        Ok(())
    }

    #[test]
    fn ragged_rows_are_returned_not_rejected() -> Result<()> {
        let data = "1\t2\t3\n4\n";
        let recs: Vec<RawRecord> = raw_records(data.as_bytes()).collect::<Result<_>>()?;
        assert_eq!(recs[0].len(), 3);
        assert_eq!(recs[1].len(), 1);
        Ok(())
    }

    #[test]
    fn lines_strip_crlf_and_survive_bad_utf8() -> Result<()> {
        let data: &[u8] = b"a\t1\r\nb\t\xff\nlast";
        let got: Vec<String> = lines(data).collect::<Result<_>>()?;
        assert_eq!(got, vec!["a\t1".to_string(), "b\t\u{fffd}".into(), "last".into()]);
        Ok(())
    }

    #[test]
    fn sink_writes_one_line_per_value() -> Result<()> {
        let mut sink = LineSink::new(Vec::new());
        sink.emit("x\t1")?;
        sink.emit(42)?;
        assert_eq!(sink.lines_written(), 2);
        assert_eq!(String::from_utf8(sink.into_inner())?, "x\t1\n42\n");
        Ok(())
    }
}
