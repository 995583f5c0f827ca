//! Parser for delimited rating and metadata files.
//!
//! Handles both header-less MovieLens style files (`1::1193::5::978300760`)
//! and ordinary CSV files with a header row. Single-byte separators are read
//! with the `csv` crate, so quoted cells may contain the separator; longer
//! separators are split line by line. Every column gets a
//! single inferred type, so an id column is either all integers or all
//! strings.

use crate::error::{DatasetError, Result};
use crate::table::Table;
use crate::types::{FieldValue, RawId};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How to split a delimited file
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field separator, may be more than one character (default: `,`)
    pub delimiter: String,
    /// First non-empty line names the columns (default: true)
    pub has_header: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            has_header: true,
        }
    }
}

impl LoadOptions {
    /// Configure the field separator
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Configure whether the first line is a header
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }
}

/// Helper function to read a whole file as text.
///
/// Files are decoded as UTF-8; files that are not valid UTF-8 (MovieLens
/// ships ISO-8859-1) are decoded byte-for-byte as Latin-1 instead.
fn read_content(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        // Latin-1 maps each byte directly to a Unicode code point
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    })
}

/// Read a delimited file into a typed `Table`
pub fn read_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    let file_name = path.display().to_string();
    let content = read_content(path)?;
    parse_table(&content, options, &file_name)
}

/// One non-blank input record and the line it starts on
type RawLine = (usize, Vec<String>);

fn parse_table(content: &str, options: &LoadOptions, file_name: &str) -> Result<Table> {
    let records = match options.delimiter.as_bytes() {
        [] => {
            return Err(DatasetError::InvalidValue {
                field: "delimiter".to_string(),
                value: String::new(),
            });
        }
        // Single-byte separators get full CSV quoting rules
        [byte] => read_csv_records(content, *byte, file_name)?,
        _ => split_lines(content, &options.delimiter),
    };
    build_table(records, options.has_header, file_name)
}

fn read_csv_records(content: &str, delimiter: u8, file_name: &str) -> Result<Vec<RawLine>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DatasetError::ParseError {
            file: file_name.to_string(),
            line: e.position().map_or(0, |p| p.line() as usize),
            reason: e.to_string(),
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        records.push((line, record.iter().map(str::to_string).collect()));
    }
    Ok(records)
}

/// Plain splitting for multi-character separators such as `::`
fn split_lines(content: &str, delimiter: &str) -> Vec<RawLine> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let parts = line.trim().split(delimiter).map(|s| s.trim().to_string()).collect();
            (idx + 1, parts)
        })
        .collect()
}

fn build_table(records: Vec<RawLine>, has_header: bool, file_name: &str) -> Result<Table> {
    let mut records = records.into_iter();
    let header: Option<Vec<String>> = if has_header {
        records.next().map(|(_, fields)| fields)
    } else {
        None
    };

    let mut cells: Vec<Vec<String>> = Vec::new();
    for (line_no, parts) in records {
        let expected = header
            .as_ref()
            .map(Vec::len)
            .or_else(|| cells.first().map(Vec::len))
            .unwrap_or(parts.len());
        if parts.len() != expected {
            return Err(DatasetError::ParseError {
                file: file_name.to_string(),
                line: line_no,
                reason: format!("expected {} fields but found {}", expected, parts.len()),
            });
        }
        cells.push(parts);
    }

    let width = header
        .as_ref()
        .map(Vec::len)
        .or_else(|| cells.first().map(Vec::len))
        .unwrap_or(0);
    let columns = header.unwrap_or_else(|| (0..width).map(|i| i.to_string()).collect());

    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| infer_column_kind(cells.iter().map(|row| row[col].as_str())))
        .collect();

    let mut table = Table::new(columns);
    for row in &cells {
        let values = row
            .iter()
            .zip(&kinds)
            .map(|(text, &kind)| to_value(text, kind))
            .collect();
        table.push_row(values)?;
    }

    tracing::debug!(
        "parsed {} rows x {} columns from {}",
        table.len(),
        width,
        file_name
    );
    Ok(table)
}

/// Type shared by every cell of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Str,
}

/// Int if every non-empty cell is canonical integer text, else Float if
/// every one parses as a float, else Str.
///
/// Integer text with leading zeros (`0195153448`) forces Str so that
/// zero-padded ids survive untouched.
fn infer_column_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Int;
    for text in cells.filter(|t| !t.is_empty()) {
        if text.parse::<i64>().is_ok() {
            if matches!(RawId::infer(text), RawId::Str(_)) {
                return ColumnKind::Str;
            }
        } else if text.parse::<f64>().is_ok() {
            kind = ColumnKind::Float;
        } else {
            return ColumnKind::Str;
        }
    }
    kind
}

fn to_value(text: &str, kind: ColumnKind) -> FieldValue {
    if text.is_empty() {
        return FieldValue::Null;
    }
    match kind {
        ColumnKind::Int => text
            .parse()
            .map(FieldValue::Int)
            .unwrap_or_else(|_| FieldValue::Str(text.to_string())),
        ColumnKind::Float => text
            .parse()
            .map(FieldValue::Float)
            .unwrap_or_else(|_| FieldValue::Str(text.to_string())),
        ColumnKind::Str => FieldValue::Str(text.to_string()),
    }
}
