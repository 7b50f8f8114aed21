//! SQLite row provider.

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::table::{Row, Table};
use crate::value::Value;
use crate::{RowProvider, SourceError};

/// Table queried when no table or query is given.
pub const DEFAULT_TABLE: &str = "Sample_QR";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Table(String),
    Query(String),
}

/// Reads rows from a SQLite database file, opened read-only.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    selection: Selection,
    max_rows: Option<usize>,
}

impl SqliteSource {
    /// Select every row of `table`. The name may be schema-qualified
    /// (`main.labels`); each part must be a plain identifier.
    pub fn table(path: impl Into<PathBuf>, table: &str) -> Result<Self, SourceError> {
        validate_table_name(table)?;
        Ok(Self {
            path: path.into(),
            selection: Selection::Table(table.to_string()),
            max_rows: None,
        })
    }

    /// Run a caller-supplied query.
    pub fn query(path: impl Into<PathBuf>, sql: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            selection: Selection::Query(sql.into()),
            max_rows: None,
        }
    }

    /// Fail with [`SourceError::TooManyRows`] instead of reading more than
    /// `limit` rows.
    pub fn with_max_rows(mut self, limit: Option<usize>) -> Self {
        self.max_rows = limit;
        self
    }

    /// The statement this source runs.
    pub fn sql(&self) -> String {
        match &self.selection {
            Selection::Table(table) => format!("SELECT * FROM {}", quote_table_name(table)),
            Selection::Query(sql) => sql.clone(),
        }
    }

    fn open(&self) -> Result<Connection, SourceError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }
}

impl RowProvider for SqliteSource {
    fn describe(&self) -> String {
        match &self.selection {
            Selection::Table(table) => {
                format!("SQLite table {table} in {}", self.path.display())
            }
            Selection::Query(_) => format!("SQLite query on {}", self.path.display()),
        }
    }

    fn load(&self) -> Result<Table, SourceError> {
        let conn = self.open()?;
        info!(source = %self.describe(), "Fetching label rows");
        read_table(&conn, &self.sql(), self.max_rows)
    }
}

/// Run `sql` and collect the result set as a table, stopping with an error
/// once more than `max_rows` rows come back.
pub fn read_table(
    conn: &Connection,
    sql: &str,
    max_rows: Option<usize>,
) -> Result<Table, SourceError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut table = Table::new(columns.clone());
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        if max_rows.is_some_and(|limit| table.len() >= limit) {
            return Err(SourceError::TooManyRows(table.len()));
        }
        let mut out = Row::new();
        for (i, name) in columns.iter().enumerate() {
            out.push(name.clone(), to_value(row.get_ref(i)?));
        }
        table.push_row(out);
    }

    debug!(columns = columns.len(), rows = table.len(), "Read SQLite result set");
    Ok(table)
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Empty,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn validate_table_name(table: &str) -> Result<(), SourceError> {
    let valid = !table.is_empty()
        && table.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(SourceError::InvalidTable(table.to_string()))
    }
}

fn quote_table_name(table: &str) -> String {
    table
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join(".")
}
