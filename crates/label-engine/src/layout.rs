//! Label geometry: page size, layout metrics, and the placement arithmetic
//! for the code image and text lines.
//!
//! Coordinates follow PDF conventions: points, origin at the bottom-left
//! corner, y growing upward. Text origins are baselines.

use serde::{Deserialize, Serialize};

use crate::units::{cm, to_cm};

/// Default label width (3.8 cm).
pub const DEFAULT_WIDTH_CM: f32 = 3.8;

/// Default label height (1.9 cm).
pub const DEFAULT_HEIGHT_CM: f32 = 1.9;

/// Physical page size of one label, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn from_cm(width: f32, height: f32) -> Self {
        Self {
            width: cm(width),
            height: cm(height),
        }
    }

    pub fn width_cm(&self) -> f32 {
        to_cm(self.width)
    }

    pub fn height_cm(&self) -> f32 {
        to_cm(self.height)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::from_cm(DEFAULT_WIDTH_CM, DEFAULT_HEIGHT_CM)
    }
}

/// Fixed distances used to lay out a label, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Side of the square code image.
    pub code_size: f32,
    /// Gap between the page edge, the code and the text column.
    pub padding: f32,
    /// Distance from the top padding down to the first baseline.
    pub top_offset: f32,
    /// Baseline-to-baseline distance between text lines.
    pub line_height: f32,
    /// Font size of every text line.
    pub font_size: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            code_size: cm(1.0),
            padding: cm(0.07),
            top_offset: cm(0.55),
            line_height: cm(0.4),
            font_size: 6.0,
        }
    }
}

/// A point on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
}

/// Position of the code image: bottom-left corner plus side length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CodeRect {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl CodeRect {
    pub fn right(&self) -> f32 {
        self.x + self.size
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.size / 2.0
    }
}

/// Placement calculator for one page size and set of metrics.
#[derive(Debug, Clone, Copy)]
pub struct LabelLayout {
    page: PageSize,
    metrics: LayoutMetrics,
}

impl LabelLayout {
    pub fn new(page: PageSize, metrics: LayoutMetrics) -> Self {
        Self { page, metrics }
    }

    pub fn page(&self) -> PageSize {
        self.page
    }

    pub fn metrics(&self) -> LayoutMetrics {
        self.metrics
    }

    /// Code image: left padding, vertically centered.
    pub fn code_rect(&self) -> CodeRect {
        let size = self.metrics.code_size;
        CodeRect {
            x: self.metrics.padding,
            y: (self.page.height - size) / 2.0,
            size,
        }
    }

    /// Baseline of the first text line: one padding right of the code,
    /// `padding + top_offset` below the top edge.
    pub fn text_origin(&self) -> Placement {
        Placement {
            x: self.code_rect().right() + self.metrics.padding,
            y: self.page.height - self.metrics.padding - self.metrics.top_offset,
        }
    }

    /// Baseline of text line `index` (0-based).
    pub fn line_origin(&self, index: usize) -> Placement {
        let origin = self.text_origin();
        Placement {
            x: origin.x,
            y: origin.y - index as f32 * self.metrics.line_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn layout(width_cm: f32, height_cm: f32) -> LabelLayout {
        LabelLayout::new(
            PageSize::from_cm(width_cm, height_cm),
            LayoutMetrics::default(),
        )
    }

    #[test]
    fn code_is_vertically_centered() {
        let l = layout(3.8, 1.9);
        let rect = l.code_rect();
        assert!((rect.center_y() - l.page().height / 2.0).abs() < EPS);
    }

    #[test]
    fn centering_does_not_depend_on_width() {
        let narrow = layout(2.0, 1.9).code_rect();
        let wide = layout(10.0, 1.9).code_rect();
        assert_eq!(narrow, wide);
    }

    #[test]
    fn code_starts_at_padding() {
        let rect = layout(3.8, 1.9).code_rect();
        assert!((rect.x - cm(0.07)).abs() < EPS);
        assert!((rect.size - cm(1.0)).abs() < EPS);
    }

    #[test]
    fn text_origin_is_right_of_code() {
        let l = layout(3.8, 1.9);
        let origin = l.text_origin();
        assert!((origin.x - cm(0.07 + 1.0 + 0.07)).abs() < EPS);
        assert!((origin.y - cm(1.9 - 0.07 - 0.55)).abs() < EPS);
    }

    #[test]
    fn lines_are_spaced_by_line_height() {
        let l = layout(3.8, 1.9);
        let first = l.line_origin(0);
        for k in 1..6 {
            let line = l.line_origin(k);
            assert_eq!(line.x, first.x);
            assert!((first.y - line.y - k as f32 * cm(0.4)).abs() < EPS);
        }
    }

    #[test]
    fn default_page_is_38_by_19_mm() {
        let page = PageSize::default();
        assert!((page.width_cm() - 3.8).abs() < 1e-5);
        assert!((page.height_cm() - 1.9).abs() < 1e-5);
    }

    #[test]
    fn metrics_deserialize_partial() {
        let m: LayoutMetrics = serde_json::from_str(r#"{"font_size": 8.0}"#).unwrap();
        assert_eq!(m.font_size, 8.0);
        assert_eq!(m.code_size, LayoutMetrics::default().code_size);
    }
}
