//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap()
});

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "LABEL_WIDTH_CM" | "LABEL_HEIGHT_CM" => {
            let v: f32 = value.parse().map_err(|_| "must be a number")?;
            validate_label_cm(v)?;
        }
        "LABEL_DB_TABLE" => {
            if !RE_TABLE.is_match(value) {
                return Err("must be a plain table name (optionally schema-qualified)".into());
            }
        }
        "LABEL_PREVIEW_DPI" => {
            let v: f32 = value.parse().map_err(|_| "must be a number")?;
            validate_preview_dpi(v)?;
        }
        "SERVER_PORT" => {
            let v: u16 = value.parse().map_err(|_| "must be a port number")?;
            if v == 0 {
                return Err("must be between 1 and 65535".into());
            }
        }
        "LABEL_MAX_UPLOAD_MB" => validate_int_range(value, 1, 512)?,
        "LABEL_MAX_ROWS" => validate_int_range(value, 1, 1_000_000)?,
        _ => {}
    }
    Ok(())
}

/// Label side length in centimetres.
pub fn validate_label_cm(v: f32) -> Result<(), String> {
    if !(0.5..=100.0).contains(&v) {
        return Err("must be between 0.5 and 100 cm".into());
    }
    Ok(())
}

pub fn validate_preview_dpi(v: f32) -> Result<(), String> {
    if !(72.0..=1200.0).contains(&v) {
        return Err("must be between 72 and 1200".into());
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
