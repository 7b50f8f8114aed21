//! Source → selection → composition → PDF.
//!
//! Shared by the CLI commands and the HTTP handlers. Everything here is
//! blocking; the server calls it from `spawn_blocking`.

use std::path::PathBuf;

use label_engine::{
    CodeParams, ComposeError, Composition, DocumentInfo, FailurePolicy, LabelConfig, PageSize,
    RowFailure, write_pdf,
};
use row_source::{CsvSource, RangeFilter, RowProvider, SourceError, SqliteSource, Table};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::config::validation::validate_label_cm;

/// Default file name for generated documents.
pub const DEFAULT_OUTPUT: &str = "QR_Labels.pdf";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("no database configured; set LABEL_DB_PATH or pass --sqlite")]
    NoDatabase,

    #[error("no rows left after filtering")]
    NoRows,

    #[error("{option}: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },
}

impl PipelineError {
    /// Errors caused by the request rather than by the service.
    pub fn is_caller_error(&self) -> bool {
        match self {
            PipelineError::Source(SourceError::Io(_)) => false,
            PipelineError::Source(_)
            | PipelineError::Compose(_)
            | PipelineError::NoRows
            | PipelineError::InvalidOption { .. } => true,
            PipelineError::NoDatabase => false,
        }
    }
}

/// Where label rows come from.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    CsvFile(PathBuf),
    CsvUpload { name: String, data: Vec<u8> },
    Sqlite {
        path: Option<PathBuf>,
        table: Option<String>,
        query: Option<String>,
    },
}

impl SourceSpec {
    /// Build the provider, filling database defaults from `config`.
    /// Every provider stops at `config.max_rows`.
    pub fn provider(self, config: &AppConfig) -> Result<Box<dyn RowProvider + Send>, PipelineError> {
        let max_rows = Some(config.max_rows);
        match self {
            SourceSpec::CsvFile(path) => {
                Ok(Box::new(CsvSource::from_path(path).with_max_rows(max_rows)))
            }
            SourceSpec::CsvUpload { name, data } => Ok(Box::new(
                CsvSource::from_bytes(name, data).with_max_rows(max_rows),
            )),
            SourceSpec::Sqlite { path, table, query } => {
                let path = path
                    .or_else(|| config.db_path.clone())
                    .ok_or(PipelineError::NoDatabase)?;
                let source = match query {
                    Some(sql) => SqliteSource::query(path, sql),
                    None => {
                        let table = table.unwrap_or_else(|| config.db_table.clone());
                        SqliteSource::table(path, &table)?
                    }
                };
                Ok(Box::new(source.with_max_rows(max_rows)))
            }
        }
    }
}

/// Row selection: a range filter, then a count limit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub filter: Option<RangeFilter>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Selection {
    pub fn apply(&self, table: Table) -> Result<Table, SourceError> {
        let table = match &self.filter {
            Some(filter) => table.filter(filter)?,
            None => table,
        };
        Ok(match self.limit {
            Some(n) => table.limit(n),
            None => table,
        })
    }
}

/// Label options as submitted by a client. Page size falls back to the
/// configured default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelRequest {
    pub code_field: String,
    #[serde(default)]
    pub display_fields: Vec<String>,
    #[serde(default)]
    pub emphasized_fields: Vec<String>,
    #[serde(default)]
    pub width_cm: Option<f32>,
    #[serde(default)]
    pub height_cm: Option<f32>,
    #[serde(default)]
    pub skip_invalid: bool,
    #[serde(default)]
    pub grow_to_fit: bool,
    #[serde(flatten)]
    pub selection: Selection,
}

impl LabelRequest {
    /// Explicit page sizes get the same range check as the configured ones.
    pub fn label_config(&self, config: &AppConfig) -> Result<LabelConfig, PipelineError> {
        let width = checked_cm("width_cm", self.width_cm, config.label_width_cm)?;
        let height = checked_cm("height_cm", self.height_cm, config.label_height_cm)?;
        let page = PageSize::from_cm(width, height);
        let policy = if self.skip_invalid {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        };
        let mut label = LabelConfig::new(self.code_field.clone())
            .with_display(self.display_fields.iter().cloned())
            .with_emphasis(self.emphasized_fields.iter().cloned())
            .with_page(page)
            .with_policy(policy);
        label.code = CodeParams {
            grow_to_fit: self.grow_to_fit,
            ..CodeParams::default()
        };
        Ok(label)
    }
}

fn checked_cm(option: &'static str, value: Option<f32>, default: f32) -> Result<f32, PipelineError> {
    let Some(v) = value else {
        return Ok(default);
    };
    validate_label_cm(v).map_err(|message| PipelineError::InvalidOption { option, message })?;
    Ok(v)
}

/// A rendered document plus what was left out of it.
#[derive(Debug)]
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub skipped: Vec<RowFailure>,
}

/// Load rows and apply the selection. An empty result is an error.
pub fn load_rows(provider: &dyn RowProvider, selection: &Selection) -> Result<Table, PipelineError> {
    let table = provider.load()?;
    let loaded = table.len();
    let table = selection.apply(table)?;
    info!(
        source = %provider.describe(),
        loaded,
        selected = table.len(),
        "Loaded label rows"
    );
    if table.is_empty() {
        return Err(PipelineError::NoRows);
    }
    Ok(table)
}

/// Load, select and compose.
pub fn compose(
    provider: &dyn RowProvider,
    selection: &Selection,
    label: &LabelConfig,
) -> Result<Composition, PipelineError> {
    let table = load_rows(provider, selection)?;
    for field in label.display_fields.iter().chain([&label.code_field]) {
        if !table.has_column(field) {
            // Rows without the field render N/A or fail on the payload.
            warn!(field = %field, "Label field is not a column of the source");
        }
    }
    let composition = label_engine::compose_labels(table.rows(), label)?;
    Ok(composition)
}

/// Run the whole pipeline and serialize the result.
pub fn generate_pdf(
    provider: &dyn RowProvider,
    selection: &Selection,
    label: &LabelConfig,
) -> Result<GeneratedPdf, PipelineError> {
    let composition = compose(provider, selection, label)?;
    let bytes = write_pdf(&composition, &DocumentInfo::default());
    info!(
        pages = composition.pages.len(),
        skipped = composition.skipped.len(),
        bytes = bytes.len(),
        "Generated label document"
    );
    Ok(GeneratedPdf {
        bytes,
        pages: composition.pages.len(),
        skipped: composition.skipped,
    })
}
