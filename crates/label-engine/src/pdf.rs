//! PDF serialization of composed label pages.
//!
//! One PDF page per label. The code image is embedded as a 1-bit gray image
//! XObject drawn without interpolation; text uses the standard Type 1
//! Helvetica faces, so no font is embedded.

use chrono::{DateTime, Datelike, Timelike, Utc};
use image::GrayImage;
use pdf_writer::{Content, Date, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::debug;

use crate::compose::{Composition, FontWeight, LabelPage};
use crate::layout::PageSize;

const CODE_IMAGE: Name<'static> = Name(b"Code");
const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

/// Document metadata written into the PDF info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
    pub created: DateTime<Utc>,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "QR Labels".into(),
            producer: concat!("qr-labels ", env!("CARGO_PKG_VERSION")).into(),
            created: Utc::now(),
        }
    }
}

/// Serialize a composition into a PDF document.
pub fn write_pdf(composition: &Composition, info: &DocumentInfo) -> Vec<u8> {
    write_pages(&composition.pages, composition.page, info)
}

/// Serialize label pages of a common size into a PDF document.
pub fn write_pages(labels: &[LabelPage], size: PageSize, info: &DocumentInfo) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();

    // (page, image, content) per label
    let ids: Vec<(Ref, Ref, Ref)> = labels
        .iter()
        .map(|_| (alloc.bump(), alloc.bump(), alloc.bump()))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(ids.iter().map(|&(page_id, _, _)| page_id))
        .count(ids.len() as i32);

    pdf.document_info(info_id)
        .title(TextStr(&info.title))
        .producer(TextStr(&info.producer))
        .creation_date(pdf_date(&info.created));

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    for (label, &(page_id, image_id, content_id)) in labels.iter().zip(&ids) {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, size.width, size.height));
        page.parent(tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        resources.x_objects().pair(CODE_IMAGE, image_id);
        resources
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id);
        resources.finish();
        page.finish();

        let (width, height, bits) = pack_1bit(&label.code_image);
        let mut image = pdf.image_xobject(image_id, &bits);
        image.width(width as i32);
        image.height(height as i32);
        image.color_space().device_gray();
        image.bits_per_component(1);
        image.interpolate(false);
        image.finish();

        let content = label_content(label);
        pdf.stream(content_id, &content);
    }

    let bytes = pdf.finish();
    debug!(pages = labels.len(), bytes = bytes.len(), "Wrote label PDF");
    bytes
}

fn label_content(label: &LabelPage) -> Vec<u8> {
    let mut content = Content::new();
    let rect = label.code_rect;

    content.save_state();
    content.transform([rect.size, 0.0, 0.0, rect.size, rect.x, rect.y]);
    content.x_object(CODE_IMAGE);
    content.restore_state();

    for line in &label.lines {
        let font = match line.weight {
            FontWeight::Bold => FONT_BOLD,
            FontWeight::Regular => FONT_REGULAR,
        };
        let text = encode_win_ansi(&line.text);
        content.begin_text();
        content.set_font(font, line.size);
        content.next_line(line.origin.x, line.origin.y);
        content.show(Str(&text));
        content.end_text();
    }

    content.finish()
}

/// Pack a grayscale image into 1 bit per pixel rows (1 = white), each row
/// padded to a whole byte.
fn pack_1bit(img: &GrayImage) -> (u32, u32, Vec<u8>) {
    let (w, h) = img.dimensions();
    let bpr = w.div_ceil(8) as usize;
    let mut out = vec![0u8; bpr * h as usize];

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel.0[0] >= 128 {
            let i = y as usize * bpr + (x as usize / 8);
            out[i] |= 1 << (7 - (x as usize % 8));
        }
    }
    (w, h, out)
}

/// Encode text for the standard fonts. Latin-1 maps directly onto
/// WinAnsi outside 0x80..=0x9F; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            n @ 0x20..=0x7E | n @ 0xA0..=0xFF => n as u8,
            _ if c == '€' => 0x80,
            _ => b'?',
        })
        .collect()
}

fn pdf_date(dt: &DateTime<Utc>) -> Date {
    Date::new(dt.year().clamp(0, 9999) as u16)
        .month(dt.month() as u8)
        .day(dt.day() as u8)
        .hour(dt.hour() as u8)
        .minute(dt.minute() as u8)
        .second(dt.second() as u8)
        .utc_offset_hour(0)
        .utc_offset_minute(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose_labels;
    use crate::config::LabelConfig;
    use image::Luma;
    use row_source::{Row, Value};

    fn composition(ids: &[&str]) -> Composition {
        let rows: Vec<Row> = ids
            .iter()
            .map(|id| Row::from_iter([("id", Value::from(*id)), ("qty", Value::Integer(5))]))
            .collect();
        let cfg = LabelConfig::new("id")
            .with_display(["id", "qty"])
            .with_emphasis(["id"]);
        compose_labels(&rows, &cfg).unwrap()
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn writes_one_page_per_label() {
        let pdf = write_pdf(&composition(&["A1", "A2", "A3"]), &DocumentInfo::default());
        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(count(&pdf, b"/Type /Page\n"), 3);
        assert_eq!(count(&pdf, b"/Count 3"), 1);
    }

    #[test]
    fn every_page_has_a_media_box() {
        let pdf = write_pdf(&composition(&["A1", "A2"]), &DocumentInfo::default());
        assert_eq!(count(&pdf, b"/MediaBox [0 0 "), 2);
    }

    #[test]
    fn text_uses_both_fonts() {
        let pdf = write_pdf(&composition(&["A1"]), &DocumentInfo::default());
        assert_eq!(count(&pdf, b"/BaseFont /Helvetica\n"), 1);
        assert_eq!(count(&pdf, b"/BaseFont /Helvetica-Bold"), 1);
        assert_eq!(count(&pdf, b"(id: A1) Tj"), 1);
        assert_eq!(count(&pdf, b"(qty: 5) Tj"), 1);
    }

    #[test]
    fn pack_1bit_sets_white_bits() {
        let mut img = GrayImage::from_pixel(10, 2, Luma([0u8]));
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(9, 1, Luma([255]));
        let (w, h, bits) = pack_1bit(&img);
        assert_eq!((w, h), (10, 2));
        assert_eq!(bits, vec![0b1000_0000, 0, 0, 0b0100_0000]);
    }

    #[test]
    fn win_ansi_replaces_unsupported_chars() {
        assert_eq!(encode_win_ansi("id: A1"), b"id: A1".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
        assert_eq!(encode_win_ansi("5€"), vec![b'5', 0x80]);
    }

    #[test]
    fn empty_composition_still_writes_document() {
        let pdf = write_pages(&[], PageSize::default(), &DocumentInfo::default());
        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(count(&pdf, b"/Count 0"), 1);
    }
}
