//! Row selection over a single column.

use serde::{Deserialize, Serialize};

use crate::table::Row;

/// Restricts rows by the value of one column.
///
/// Numeric columns are filtered by an inclusive range, any other column by
/// an explicit set of accepted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RangeFilter {
    Numeric {
        column: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Values {
        column: String,
        values: Vec<String>,
    },
}

impl RangeFilter {
    pub fn column(&self) -> &str {
        match self {
            RangeFilter::Numeric { column, .. } | RangeFilter::Values { column, .. } => column,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let Some(value) = row.get(self.column()) else {
            return false;
        };
        match self {
            RangeFilter::Numeric { min, max, .. } => match value.as_f64() {
                Some(v) => min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi),
                None => false,
            },
            RangeFilter::Values { values, .. } => {
                if value.is_empty() {
                    return false;
                }
                let shown = value.to_string();
                values.iter().any(|accepted| *accepted == shown)
            }
        }
    }
}
