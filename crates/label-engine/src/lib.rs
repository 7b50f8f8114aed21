//! Label composition for QR label sheets.
//!
//! Turns tabular rows into fixed-size label pages (a QR code plus a stack of
//! `field: value` lines), serializes them into a PDF document, and renders
//! raster previews of single labels.

pub mod compose;
pub mod config;
pub mod layout;
pub mod pdf;
pub mod preview;
pub mod qr;
pub mod text;
pub mod units;

// Re-exports for convenience
pub use compose::{
    ComposeError, Composition, FontWeight, LabelError, LabelPage, MISSING_VALUE, RowFailure,
    TextLine, compose_labels,
};
pub use config::{ConfigError, FailurePolicy, LabelConfig};
pub use layout::{CodeRect, LabelLayout, LayoutMetrics, PageSize, Placement};
pub use pdf::{DocumentInfo, write_pdf};
pub use preview::{PreviewError, PreviewFonts, encode_png, render_preview};
pub use qr::{CodeError, CodeParams, ErrorCorrection, generate_code_image, generate_code_image_with};
