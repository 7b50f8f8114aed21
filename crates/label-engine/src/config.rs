//! Per-run label configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutMetrics, PageSize};
use crate::qr::{CodeParams, MAX_VERSION};

/// What to do when a row cannot be turned into a label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing row.
    #[default]
    Abort,
    /// Record the failure and continue with the next row.
    Skip,
}

/// Everything the composer needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Fields rendered as text, in order.
    #[serde(default)]
    pub display_fields: Vec<String>,
    /// Fields rendered in bold. Must be a subset of `display_fields`.
    #[serde(default)]
    pub emphasized_fields: Vec<String>,
    /// Field whose value is encoded in the code image.
    pub code_field: String,
    #[serde(default)]
    pub page: PageSize,
    #[serde(default)]
    pub metrics: LayoutMetrics,
    #[serde(default)]
    pub code: CodeParams,
    #[serde(default)]
    pub policy: FailurePolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no code field selected")]
    EmptyCodeField,
    #[error("invalid page size {width}x{height}pt")]
    InvalidPageSize { width: f32, height: f32 },
    #[error("field '{0}' is listed more than once in the display fields")]
    DuplicateDisplayField(String),
    #[error("emphasized field '{0}' is not a display field")]
    EmphasisNotDisplayed(String),
    #[error("QR version must be between 1 and 40, got {0}")]
    InvalidCodeVersion(i16),
    #[error("QR module size must be at least 1px")]
    InvalidModuleSize,
    #[error("layout metric '{name}' must be {requirement}, got {value}")]
    InvalidMetric {
        name: &'static str,
        requirement: &'static str,
        value: f32,
    },
}

impl LabelConfig {
    pub fn new(code_field: impl Into<String>) -> Self {
        Self {
            display_fields: Vec::new(),
            emphasized_fields: Vec::new(),
            code_field: code_field.into(),
            page: PageSize::default(),
            metrics: LayoutMetrics::default(),
            code: CodeParams::default(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_display<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.display_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_emphasis<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emphasized_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_page(mut self, page: PageSize) -> Self {
        self.page = page;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_emphasized(&self, field: &str) -> bool {
        self.emphasized_fields.iter().any(|f| f == field)
    }

    /// Reject configurations the composer cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_field.trim().is_empty() {
            return Err(ConfigError::EmptyCodeField);
        }

        let PageSize { width, height } = self.page;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidPageSize { width, height });
        }

        let mut seen = HashSet::new();
        for field in &self.display_fields {
            if !seen.insert(field.as_str()) {
                return Err(ConfigError::DuplicateDisplayField(field.clone()));
            }
        }

        if let Some(field) = self
            .emphasized_fields
            .iter()
            .find(|f| !seen.contains(f.as_str()))
        {
            return Err(ConfigError::EmphasisNotDisplayed(field.clone()));
        }

        if !(1..=MAX_VERSION).contains(&self.code.version) {
            return Err(ConfigError::InvalidCodeVersion(self.code.version));
        }
        if self.code.module_size == 0 {
            return Err(ConfigError::InvalidModuleSize);
        }

        validate_metrics(&self.metrics)
    }
}

fn validate_metrics(m: &LayoutMetrics) -> Result<(), ConfigError> {
    let positive = [
        ("code_size", m.code_size),
        ("line_height", m.line_height),
        ("font_size", m.font_size),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::InvalidMetric {
                name,
                requirement: "a positive number",
                value,
            });
        }
    }
    for (name, value) in [("padding", m.padding), ("top_offset", m.top_offset)] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(ConfigError::InvalidMetric {
                name,
                requirement: "zero or more",
                value,
            });
        }
    }
    Ok(())
}
