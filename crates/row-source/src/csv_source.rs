//! Delimited-file row provider.

use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use crate::table::{Row, Table};
use crate::value::Value;
use crate::{RowProvider, SourceError};

enum CsvInput {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

/// Reads a header-first CSV file from disk or from an uploaded buffer.
pub struct CsvSource {
    input: CsvInput,
    delimiter: u8,
    max_rows: Option<usize>,
}

impl CsvSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: CsvInput::Path(path.into()),
            delimiter: b',',
            max_rows: None,
        }
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            input: CsvInput::Bytes {
                name: name.into(),
                data,
            },
            delimiter: b',',
            max_rows: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_rows(mut self, limit: Option<usize>) -> Self {
        self.max_rows = limit;
        self
    }
}

impl RowProvider for CsvSource {
    fn describe(&self) -> String {
        match &self.input {
            CsvInput::Path(path) => format!("CSV file {}", path.display()),
            CsvInput::Bytes { name, .. } => format!("uploaded CSV {name}"),
        }
    }

    fn load(&self) -> Result<Table, SourceError> {
        match &self.input {
            CsvInput::Path(path) => {
                let file = std::fs::File::open(path)?;
                read_table(file, self.delimiter, self.max_rows)
            }
            CsvInput::Bytes { data, .. } => {
                read_table(data.as_slice(), self.delimiter, self.max_rows)
            }
        }
    }
}

/// Parse CSV with a header row into a typed table.
///
/// Cells are typed with [`Value::infer`]. Ragged rows and non-UTF-8 input
/// are errors, as is a file with more than `max_rows` data rows. Repeated
/// header names get `.1`, `.2`, … suffixes.
pub fn read_table<R: Read>(
    reader: R,
    delimiter: u8,
    max_rows: Option<usize>,
) -> Result<Table, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(false)
        .from_reader(reader);

    let raw_headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let columns = dedupe_headers(raw_headers);

    let mut table = Table::new(columns.clone());
    for record in rdr.records() {
        let record = record?;
        if max_rows.is_some_and(|limit| table.len() >= limit) {
            return Err(SourceError::TooManyRows(table.len()));
        }
        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.clone(), Value::infer(cell)))
            .collect();
        table.push_row(row);
    }

    debug!(
        columns = table.columns().len(),
        rows = table.len(),
        "Parsed CSV table"
    );
    Ok(table)
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        if !out.contains(&header) {
            out.push(header);
            continue;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{header}.{n}");
            if !out.contains(&candidate) {
                out.push(candidate);
                break;
            }
            n += 1;
        }
    }
    out
}
