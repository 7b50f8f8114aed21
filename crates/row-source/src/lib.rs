//! Row sources for label generation.
//!
//! Provides the tabular data model (`Value`, `Row`, `Table`), row selection
//! (`RangeFilter`, `Table::limit`), and the swappable providers that
//! materialize rows from a delimited file or a SQLite database.

pub mod csv_source;
pub mod filter;
pub mod sqlite;
pub mod table;
pub mod value;

pub use csv_source::CsvSource;
pub use filter::RangeFilter;
pub use sqlite::SqliteSource;
pub use table::{ColumnKind, Row, Table};
pub use value::Value;

/// Something that can materialize an ordered set of rows.
pub trait RowProvider {
    /// Human-readable description for logs and error messages.
    fn describe(&self) -> String;

    /// Load every row. Never retried by callers.
    fn load(&self) -> Result<Table, SourceError>;
}

/// Source acquisition error type.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Source has more than {0} rows")]
    TooManyRows(usize),
}
