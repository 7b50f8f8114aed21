//! Runtime application configuration loaded from the environment.

use std::path::PathBuf;

use label_engine::layout::{DEFAULT_HEIGHT_CM, DEFAULT_WIDTH_CM};
use label_engine::{PageSize, preview};
use row_source::sqlite::DEFAULT_TABLE;

use super::validation::validate_setting;

/// Runtime configuration populated from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub label_width_cm: f32,
    pub label_height_cm: f32,
    pub db_path: Option<PathBuf>,
    pub db_table: String,
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub preview_dpi: f32,
    pub server_port: u16,
    pub max_upload_mb: usize,
    /// Largest row count a source may produce before it is rejected.
    pub max_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            label_width_cm: DEFAULT_WIDTH_CM,
            label_height_cm: DEFAULT_HEIGHT_CM,
            db_path: None,
            db_table: DEFAULT_TABLE.into(),
            font_path: None,
            bold_font_path: None,
            preview_dpi: preview::DEFAULT_DPI,
            server_port: 8080,
            max_upload_mb: 20,
            max_rows: 10_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset or empty keys
    /// fall back to defaults; set keys must pass validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> Result<Option<String>, anyhow::Error> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => {
                    let v = v.trim().to_string();
                    validate_setting(key, &v).map_err(|e| anyhow::anyhow!("{key}: {e}"))?;
                    Ok(Some(v))
                }
                _ => Ok(None),
            }
        };

        let defaults = Self::default();
        Ok(Self {
            label_width_cm: parse_or(g("LABEL_WIDTH_CM")?, defaults.label_width_cm),
            label_height_cm: parse_or(g("LABEL_HEIGHT_CM")?, defaults.label_height_cm),
            db_path: g("LABEL_DB_PATH")?.map(PathBuf::from),
            db_table: g("LABEL_DB_TABLE")?.unwrap_or(defaults.db_table),
            font_path: g("LABEL_FONT")?.map(PathBuf::from),
            bold_font_path: g("LABEL_BOLD_FONT")?.map(PathBuf::from),
            preview_dpi: parse_or(g("LABEL_PREVIEW_DPI")?, defaults.preview_dpi),
            server_port: parse_or(g("SERVER_PORT")?, defaults.server_port),
            max_upload_mb: parse_or(g("LABEL_MAX_UPLOAD_MB")?, defaults.max_upload_mb),
            max_rows: parse_or(g("LABEL_MAX_ROWS")?, defaults.max_rows),
        })
    }

    /// Configured label page size.
    pub fn page(&self) -> PageSize {
        PageSize::from_cm(self.label_width_cm, self.label_height_cm)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
