//! Text measuring and drawing for raster label previews.

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width(font: &FontRef<'_>, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil() as u32
}

/// Distance from the top of a drawn line to its baseline.
pub fn ascent(font: &FontRef<'_>, scale: PxScale) -> f32 {
    font.as_scaled(scale).ascent()
}

/// Draw one line of black text with its top-left corner at (`x`, `y`).
///
/// `embolden` draws the line a second time one pixel to the right, for
/// bold text when no bold face is available.
pub fn draw_line(
    img: &mut RgbaImage,
    font: &FontRef<'_>,
    scale: PxScale,
    x: i32,
    y: i32,
    text: &str,
    embolden: bool,
) {
    draw_text_mut(img, BLACK, x, y, scale, font, text);
    if embolden {
        draw_text_mut(img, BLACK, x + 1, y, scale, font, text);
    }
}
