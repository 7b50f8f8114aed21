//! Scalar cell values.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell: text, number, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl Value {
    /// Type a raw delimited-file cell. A cell becomes `Integer` or `Float`
    /// only when the number prints back as the same text, so identifiers
    /// such as `007` and values such as `1.50` stay `Text` and are shown and
    /// encoded verbatim. Blank cells are `Empty`.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Empty;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            if n.to_string() == trimmed {
                return Value::Integer(n);
            }
        } else if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() && f.to_string() == trimmed {
                return Value::Float(f);
            }
        }
        Value::Text(raw.to_string())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether the cell can take part in a numeric range filter.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Numeric reading of the cell. Text that parses as a finite number
    /// (`007`, `1.50`, `1e3`) counts, without changing how it is displayed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            Value::Empty => None,
        }
    }

    /// Ordering used for sorted unique values: numbers before text,
    /// numbers numerically, text lexically, empty last.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) if !other.is_empty() => Ordering::Less,
            (None, Some(_)) if !self.is_empty() => Ordering::Greater,
            _ => match (self.is_empty(), other.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Empty => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_types_cells() {
        assert_eq!(Value::infer("5"), Value::Integer(5));
        assert_eq!(Value::infer(" -12 "), Value::Integer(-12));
        assert_eq!(Value::infer("2.5"), Value::Float(2.5));
        assert_eq!(Value::infer("A1"), Value::Text("A1".into()));
        assert_eq!(Value::infer("   "), Value::Empty);
    }

    #[test]
    fn infer_keeps_non_canonical_numbers_as_text() {
        assert_eq!(Value::infer("007"), Value::Text("007".into()));
        assert_eq!(Value::infer("1.50"), Value::Text("1.50".into()));
        assert_eq!(Value::infer("1e3"), Value::Text("1e3".into()));
        assert_eq!(Value::infer("+5"), Value::Text("+5".into()));
        assert_eq!(Value::infer("007").to_string(), "007");
    }

    #[test]
    fn numeric_text_still_filters_as_number() {
        assert_eq!(Value::infer("007").as_f64(), Some(7.0));
        assert_eq!(Value::infer("1e3").as_f64(), Some(1000.0));
        assert!(Value::infer("1.50").is_numeric());
        assert!(!Value::from("A1").is_numeric());
        assert_eq!(Value::from("nan").as_f64(), None);
    }

    #[test]
    fn infer_keeps_nan_and_inf_as_text() {
        assert_eq!(Value::infer("nan"), Value::Text("nan".into()));
        assert_eq!(Value::infer("inf"), Value::Text("inf".into()));
    }

    #[test]
    fn display_renders_plain_values() {
        assert_eq!(Value::Integer(5).to_string(), "5");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from("A1").to_string(), "A1");
        assert_eq!(Value::Empty.to_string(), "");
    }

    #[test]
    fn sort_cmp_orders_numbers_then_text() {
        let mut values = vec![
            Value::from("b"),
            Value::Empty,
            Value::Integer(10),
            Value::Float(2.5),
            Value::from("a"),
        ];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![
                Value::Float(2.5),
                Value::Integer(10),
                Value::from("a"),
                Value::from("b"),
                Value::Empty,
            ]
        );
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::Integer(1), Value::from("x"), Value::Empty])
            .unwrap();
        assert_eq!(json, r#"[1,"x",null]"#);
    }
}
