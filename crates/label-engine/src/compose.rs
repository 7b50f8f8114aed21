//! Label composition: one fixed-size page per input row.
//!
//! For each row the composer encodes the code field as a QR image, places it
//! at the left edge (vertically centered), and stacks the display fields as
//! `field: value` lines to its right.

use image::GrayImage;
use row_source::Row;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, FailurePolicy, LabelConfig};
use crate::layout::{CodeRect, LabelLayout, PageSize, Placement};
use crate::qr::{self, CodeError};

/// Text shown for a display field the row has no value for.
pub const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    Bold,
}

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    /// Baseline start.
    pub origin: Placement,
    pub weight: FontWeight,
    pub size: f32,
}

/// A composed label for a single row.
#[derive(Debug, Clone)]
pub struct LabelPage {
    /// Index of the source row.
    pub row_index: usize,
    pub payload: String,
    pub code_image: GrayImage,
    pub code_rect: CodeRect,
    pub lines: Vec<TextLine>,
}

/// Why a single row could not become a label.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("code field '{field}' is missing or empty")]
    MissingPayloadField { field: String },
    #[error("value of code field '{field}' does not fit in the code: {source}")]
    EncodingCapacityExceeded {
        field: String,
        #[source]
        source: CodeError,
    },
    #[error("value of code field '{field}' could not be encoded: {source}")]
    Encoding {
        field: String,
        #[source]
        source: CodeError,
    },
}

impl LabelError {
    /// The field the failure is about.
    pub fn field(&self) -> &str {
        match self {
            LabelError::MissingPayloadField { field }
            | LabelError::EncodingCapacityExceeded { field, .. }
            | LabelError::Encoding { field, .. } => field,
        }
    }
}

/// A row skipped under [`FailurePolicy::Skip`].
#[derive(Debug)]
pub struct RowFailure {
    pub index: usize,
    pub error: LabelError,
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("row {index}: {source}")]
    Row {
        index: usize,
        #[source]
        source: LabelError,
    },
}

/// Result of a composition pass.
#[derive(Debug)]
pub struct Composition {
    pub page: PageSize,
    /// Composed pages, in row order.
    pub pages: Vec<LabelPage>,
    /// Rows that failed, in row order. Always empty under `Abort`.
    pub skipped: Vec<RowFailure>,
}

/// Compose one label page per row, in row order.
pub fn compose_labels(rows: &[Row], config: &LabelConfig) -> Result<Composition, ComposeError> {
    config.validate()?;
    let layout = LabelLayout::new(config.page, config.metrics);

    let mut pages = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match compose_label(index, row, config, &layout) {
            Ok(page) => pages.push(page),
            Err(error) => match config.policy {
                FailurePolicy::Abort => {
                    return Err(ComposeError::Row {
                        index,
                        source: error,
                    });
                }
                FailurePolicy::Skip => {
                    warn!(row = index, error = %error, "Skipping label row");
                    skipped.push(RowFailure { index, error });
                }
            },
        }
    }

    info!(
        rows = rows.len(),
        pages = pages.len(),
        skipped = skipped.len(),
        "Composed label pages"
    );

    Ok(Composition {
        page: config.page,
        pages,
        skipped,
    })
}

/// Compose the label for a single row.
pub fn compose_label(
    index: usize,
    row: &Row,
    config: &LabelConfig,
    layout: &LabelLayout,
) -> Result<LabelPage, LabelError> {
    let field = &config.code_field;
    let payload = row
        .get(field)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| LabelError::MissingPayloadField {
            field: field.clone(),
        })?;

    let code_image =
        qr::generate_code_image_with(&payload, &config.code).map_err(|source| match source {
            CodeError::CapacityExceeded { .. } => LabelError::EncodingCapacityExceeded {
                field: field.clone(),
                source,
            },
            CodeError::Encode(_) => LabelError::Encoding {
                field: field.clone(),
                source,
            },
        })?;

    let size = config.metrics.font_size;
    let lines = config
        .display_fields
        .iter()
        .enumerate()
        .map(|(k, name)| TextLine {
            text: format!("{name}: {}", display_value(row, name)),
            origin: layout.line_origin(k),
            weight: if config.is_emphasized(name) {
                FontWeight::Bold
            } else {
                FontWeight::Regular
            },
            size,
        })
        .collect();

    debug!(row = index, payload_len = payload.len(), "Composed label");

    Ok(LabelPage {
        row_index: index,
        payload,
        code_image,
        code_rect: layout.code_rect(),
        lines,
    })
}

fn display_value(row: &Row, field: &str) -> String {
    match row.get(field) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => MISSING_VALUE.to_string(),
    }
}
