//! Rows and tables: the in-memory shape every row provider returns.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::SourceError;
use crate::filter::RangeFilter;
use crate::value::Value;

/// An ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. A repeated name shadows nothing: lookups return the
    /// first occurrence.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Inferred kind of a column, used to pick a range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-empty value is a number (and at least one exists).
    Numeric,
    Text,
}

/// Ordered column names plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn require_column(&self, column: &str) -> Result<(), SourceError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(SourceError::MissingColumn(column.to_string()))
        }
    }

    fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    pub fn column_kind(&self, column: &str) -> Result<ColumnKind, SourceError> {
        self.require_column(column)?;
        let mut non_empty = self.column_values(column).filter(|v| !v.is_empty()).peekable();
        if non_empty.peek().is_none() {
            return Ok(ColumnKind::Text);
        }
        if non_empty.all(Value::is_numeric) {
            Ok(ColumnKind::Numeric)
        } else {
            Ok(ColumnKind::Text)
        }
    }

    /// Sorted distinct non-empty values of `column`.
    pub fn unique_values(&self, column: &str) -> Result<Vec<Value>, SourceError> {
        self.require_column(column)?;
        let mut values: Vec<Value> = self
            .column_values(column)
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();
        values.sort_by(Value::sort_cmp);
        values.dedup_by(|a, b| a.sort_cmp(b).is_eq());
        Ok(values)
    }

    /// Rows matching `filter`, in their original order.
    pub fn filter(&self, filter: &RangeFilter) -> Result<Table, SourceError> {
        self.require_column(filter.column())?;
        if let RangeFilter::Numeric { column, min, max } = filter {
            if self.column_kind(column)? != ColumnKind::Numeric {
                return Err(SourceError::InvalidFilter(format!(
                    "column '{column}' is not numeric"
                )));
            }
            if let (Some(lo), Some(hi)) = (min, max) {
                if lo > hi {
                    return Err(SourceError::InvalidFilter(format!(
                        "range minimum {lo} is greater than maximum {hi}"
                    )));
                }
            }
        }

        let rows = self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        Ok(Table::with_rows(self.columns.clone(), rows))
    }

    /// Keep the first `count` rows.
    pub fn limit(mut self, count: usize) -> Table {
        self.rows.truncate(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let columns = vec!["id".to_string(), "qty".to_string(), "site".to_string()];
        let rows = vec![
            Row::from_iter([
                ("id", Value::from("A1")),
                ("qty", Value::Integer(5)),
                ("site", Value::from("north")),
            ]),
            Row::from_iter([
                ("id", Value::from("A2")),
                ("qty", Value::Float(2.5)),
                ("site", Value::from("south")),
            ]),
            Row::from_iter([
                ("id", Value::from("A3")),
                ("qty", Value::Empty),
                ("site", Value::from("north")),
            ]),
        ];
        Table::with_rows(columns, rows)
    }

    #[test]
    fn row_lookup_preserves_order() {
        let table = sample();
        let row = &table.rows()[0];
        let names: Vec<&str> = row.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["id", "qty", "site"]);
        assert_eq!(row.get("qty"), Some(&Value::Integer(5)));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn row_serializes_as_ordered_map() {
        let json = serde_json::to_string(&sample().rows()[0]).unwrap();
        assert_eq!(json, r#"{"id":"A1","qty":5,"site":"north"}"#);
    }

    #[test]
    fn column_kind_ignores_empty_cells() {
        let table = sample();
        assert_eq!(table.column_kind("qty").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.column_kind("site").unwrap(), ColumnKind::Text);
    }

    #[test]
    fn column_kind_unknown_column_errors() {
        assert!(matches!(
            sample().column_kind("nope"),
            Err(SourceError::MissingColumn(_))
        ));
    }

    #[test]
    fn unique_values_sorted_and_deduplicated() {
        let table = sample();
        assert_eq!(
            table.unique_values("site").unwrap(),
            vec![Value::from("north"), Value::from("south")]
        );
        assert_eq!(
            table.unique_values("qty").unwrap(),
            vec![Value::Float(2.5), Value::Integer(5)]
        );
    }

    #[test]
    fn limit_keeps_leading_rows() {
        let table = sample().limit(2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].get("id"), Some(&Value::from("A2")));
        assert_eq!(sample().limit(10).len(), 3);
    }
}
