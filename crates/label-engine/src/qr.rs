//! QR code generation for label pages.

use image::{GrayImage, Luma};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// QR symbol version used for every label unless overridden.
pub const DEFAULT_VERSION: i16 = 2;

/// Pixel size of a single QR module.
pub const DEFAULT_MODULE_SIZE: u32 = 15;

/// Largest QR version defined by the standard.
pub const MAX_VERSION: i16 = 40;

/// QR error-correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    #[default]
    Low,
    Medium,
    Quartile,
    High,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

/// Encoding parameters shared by every code image of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeParams {
    pub version: i16,
    pub error_correction: ErrorCorrection,
    pub module_size: u32,
    /// Step up to larger versions when the payload does not fit.
    pub grow_to_fit: bool,
}

impl Default for CodeParams {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            error_correction: ErrorCorrection::Low,
            module_size: DEFAULT_MODULE_SIZE,
            grow_to_fit: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("payload of {len} bytes exceeds the capacity of QR version {version}")]
    CapacityExceeded { len: usize, version: i16 },
    #[error("QR encode error: {0}")]
    Encode(String),
}

/// Number of modules along one side of a QR symbol of the given version.
pub fn modules_for_version(version: i16) -> u32 {
    17 + 4 * u32::from(version.unsigned_abs())
}

/// Generate a code image with the system-wide parameters
/// (version 2, low error correction, 15px modules, no quiet zone).
pub fn generate_code_image(payload: &str) -> Result<GrayImage, CodeError> {
    generate_code_image_with(payload, &CodeParams::default())
}

/// Generate a square black-on-white code image for `payload`.
///
/// The image has no quiet zone; its side is `modules * module_size` pixels.
pub fn generate_code_image_with(payload: &str, params: &CodeParams) -> Result<GrayImage, CodeError> {
    let code = encode(payload, params)?;
    Ok(rasterize(&code, params.module_size.max(1)))
}

fn encode(payload: &str, params: &CodeParams) -> Result<QrCode, CodeError> {
    let ec: EcLevel = params.error_correction.into();
    let last = if params.grow_to_fit {
        MAX_VERSION
    } else {
        params.version
    };

    for version in params.version..=last {
        match QrCode::with_version(payload.as_bytes(), Version::Normal(version), ec) {
            Ok(code) => {
                if version != params.version {
                    debug!(
                        from = params.version,
                        to = version,
                        len = payload.len(),
                        "Grew QR version to fit payload"
                    );
                }
                return Ok(code);
            }
            Err(QrError::DataTooLong) => continue,
            Err(e) => return Err(CodeError::Encode(e.to_string())),
        }
    }

    Err(CodeError::CapacityExceeded {
        len: payload.len(),
        version: last,
    })
}

fn rasterize(code: &QrCode, scale: u32) -> GrayImage {
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let img_size = module_count * scale;

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));

    for (i, color) in modules.iter().enumerate() {
        let x = (i as u32) % module_count;
        let y = (i as u32) / module_count;

        if *color == qrcode::Color::Dark {
            for dx in 0..scale {
                for dy in 0..scale {
                    img.put_pixel(x * scale + dx, y * scale + dy, Luma([0u8]));
                }
            }
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_image_is_version_2_at_15px() {
        let img = generate_code_image("A1").unwrap();
        assert_eq!(img.width(), 25 * 15);
        assert_eq!(img.width(), img.height());
    }

    #[test]
    fn image_has_no_quiet_zone() {
        // Finder pattern corners are dark when there is no border.
        let img = generate_code_image("A1").unwrap();
        let last = img.width() - 1;
        assert_eq!(img.get_pixel(0, 0), &Luma([0u8]));
        assert_eq!(img.get_pixel(last, 0), &Luma([0u8]));
        assert_eq!(img.get_pixel(0, last), &Luma([0u8]));
    }

    #[test]
    fn identical_payloads_produce_identical_images() {
        let a = generate_code_image("SKU-0042").unwrap();
        let b = generate_code_image("SKU-0042").unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn oversized_payload_is_capacity_error() {
        let payload = "X".repeat(200);
        match generate_code_image(&payload) {
            Err(CodeError::CapacityExceeded { len, version }) => {
                assert_eq!(len, 200);
                assert_eq!(version, 2);
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
    }

    #[test]
    fn grow_to_fit_picks_larger_version() {
        let params = CodeParams {
            grow_to_fit: true,
            module_size: 1,
            ..CodeParams::default()
        };
        let img = generate_code_image_with(&"X".repeat(200), &params).unwrap();
        assert!(img.width() > modules_for_version(2));
    }

    #[test]
    fn module_size_scales_image() {
        let params = CodeParams {
            module_size: 4,
            ..CodeParams::default()
        };
        let img = generate_code_image_with("A1", &params).unwrap();
        assert_eq!(img.width(), modules_for_version(2) * 4);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: CodeParams = serde_json::from_str(r#"{"grow_to_fit": true}"#).unwrap();
        assert_eq!(params.version, 2);
        assert_eq!(params.error_correction, ErrorCorrection::Low);
        assert!(params.grow_to_fit);
    }
}
