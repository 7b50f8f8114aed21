//! Raster previews of composed labels.
//!
//! Renders a [`LabelPage`] with the same geometry as the PDF output, scaled
//! to a target resolution and flipped into image coordinates (origin at the
//! top-left).

use std::io::Cursor;

use ab_glyph::{FontRef, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::compose::{FontWeight, LabelPage};
use crate::layout::{CodeRect, PageSize};
use crate::text;
use crate::units::px_per_point;

/// Resolution used when none is configured.
pub const DEFAULT_DPI: f32 = 300.0;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("invalid font: {0}")]
    InvalidFont(String),
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Faces used to draw label text.
pub struct PreviewFonts<'a> {
    pub regular: FontRef<'a>,
    /// Without a bold face, bold lines are drawn with a double stroke.
    pub bold: Option<FontRef<'a>>,
}

impl<'a> PreviewFonts<'a> {
    pub fn from_bytes(regular: &'a [u8], bold: Option<&'a [u8]>) -> Result<Self, PreviewError> {
        let regular = FontRef::try_from_slice(regular)
            .map_err(|e| PreviewError::InvalidFont(e.to_string()))?;
        let bold = bold
            .map(FontRef::try_from_slice)
            .transpose()
            .map_err(|e| PreviewError::InvalidFont(e.to_string()))?;
        Ok(Self { regular, bold })
    }

    fn face(&self, weight: FontWeight) -> (&FontRef<'a>, bool) {
        match (weight, &self.bold) {
            (FontWeight::Bold, Some(bold)) => (bold, false),
            (FontWeight::Bold, None) => (&self.regular, true),
            (FontWeight::Regular, _) => (&self.regular, false),
        }
    }
}

/// Pixel dimensions of a page at `dpi`.
pub fn page_pixels(page: PageSize, dpi: f32) -> (u32, u32) {
    let scale = px_per_point(dpi);
    (
        (page.width * scale).round().max(1.0) as u32,
        (page.height * scale).round().max(1.0) as u32,
    )
}

/// Top-left corner and side of the code image in pixels.
pub fn code_box_pixels(rect: CodeRect, page: PageSize, dpi: f32) -> (i64, i64, u32) {
    let scale = px_per_point(dpi);
    let left = (rect.x * scale).round() as i64;
    let top = ((page.height - rect.y - rect.size) * scale).round() as i64;
    let side = (rect.size * scale).round().max(1.0) as u32;
    (left, top, side)
}

/// Render one label at `dpi`.
pub fn render_preview(
    label: &LabelPage,
    page: PageSize,
    fonts: &PreviewFonts<'_>,
    dpi: f32,
) -> RgbaImage {
    let scale = px_per_point(dpi);
    let (width, height) = page_pixels(page, dpi);
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    let (left, top, side) = code_box_pixels(label.code_rect, page, dpi);
    let code = DynamicImage::ImageLuma8(label.code_image.clone())
        .resize_exact(side, side, FilterType::Nearest)
        .to_rgba8();
    imageops::overlay(&mut img, &code, left, top);

    for line in &label.lines {
        let (font, embolden) = fonts.face(line.weight);
        let px_scale = PxScale::from(line.size * scale);
        let x = (line.origin.x * scale).round() as i32;
        let baseline = (page.height - line.origin.y) * scale;
        let y = (baseline - text::ascent(font, px_scale)).round() as i32;

        let line_width = text::measure_text_width(font, px_scale, &line.text);
        if x + line_width as i32 > width as i32 {
            debug!(
                row = label.row_index,
                text = %line.text,
                "Label text overflows the page width"
            );
        }

        text::draw_line(&mut img, font, px_scale, x, y, &line.text, embolden);
    }

    img
}

/// Encode a rendered label as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, PreviewError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LabelLayout, LayoutMetrics};

    #[test]
    fn page_pixels_at_72_dpi_match_points() {
        let page = PageSize {
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(page_pixels(page, 72.0), (100, 50));
        assert_eq!(page_pixels(page, 144.0), (200, 100));
    }

    #[test]
    fn code_box_is_flipped_and_centered() {
        let page = PageSize::default();
        let rect = LabelLayout::new(page, LayoutMetrics::default()).code_rect();
        let (left, top, side) = code_box_pixels(rect, page, 300.0);
        let (_, height) = page_pixels(page, 300.0);

        assert!(left > 0);
        // Vertical centering survives the flip, up to rounding.
        let bottom_gap = height as i64 - (top + side as i64);
        assert!((top - bottom_gap).abs() <= 1);
    }

    #[test]
    fn invalid_font_bytes_rejected() {
        let result = PreviewFonts::from_bytes(b"not a font", None);
        assert!(matches!(result, Err(PreviewError::InvalidFont(_))));
    }

    #[test]
    fn encode_png_has_signature() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let png = encode_png(&img).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
