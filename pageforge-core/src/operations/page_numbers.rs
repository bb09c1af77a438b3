//! Page numbering stamps.

use chrono::Utc;
use tracing::debug;

use super::OperationResult;
use crate::content::{Color, ContentBuilder};
use crate::document::PdfDocument;

pub(crate) const HELVETICA_RESOURCE: &str = "Helv";

/// Where the number is placed on each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageNumberPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

impl PageNumberPosition {
    /// Parse a `"bottom-center"` style name; unknown names fall back to
    /// the bottom-center default rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "top-left" => PageNumberPosition::TopLeft,
            "top-center" => PageNumberPosition::TopCenter,
            "top-right" => PageNumberPosition::TopRight,
            "bottom-left" => PageNumberPosition::BottomLeft,
            "bottom-right" => PageNumberPosition::BottomRight,
            _ => PageNumberPosition::BottomCenter,
        }
    }

    /// Text anchor for a page of the given size, using fixed 30pt margins
    fn anchor(self, width: f64, height: f64) -> (f64, f64) {
        let x = match self {
            PageNumberPosition::TopLeft | PageNumberPosition::BottomLeft => 30.0,
            PageNumberPosition::TopCenter | PageNumberPosition::BottomCenter => width / 2.0 - 10.0,
            PageNumberPosition::TopRight | PageNumberPosition::BottomRight => width - 50.0,
        };
        let y = match self {
            PageNumberPosition::TopLeft
            | PageNumberPosition::TopCenter
            | PageNumberPosition::TopRight => height - 30.0,
            _ => 30.0,
        };
        (x, y)
    }
}

/// Options for page numbering
#[derive(Debug, Clone)]
pub struct PageNumberOptions {
    pub position: PageNumberPosition,
    /// Number printed on the first page
    pub start: i32,
    pub font_size: f64,
}

impl Default for PageNumberOptions {
    fn default() -> Self {
        Self {
            position: PageNumberPosition::BottomCenter,
            start: 1,
            font_size: 12.0,
        }
    }
}

/// Stamp `start + index` on every page, in place.
///
/// Numbers are drawn in black Helvetica at a fixed offset from the page
/// edge; no automatic scaling is applied for long numbers.
pub fn add_page_numbers(
    document: &mut PdfDocument,
    options: &PageNumberOptions,
) -> OperationResult<()> {
    debug!(
        "numbering {} pages starting at {}",
        document.page_count(),
        options.start
    );
    for index in 0..document.page_count() {
        let (width, height) = document.page_size(index)?;
        let (x, y) = options.position.anchor(width, height);
        let label = (options.start + index as i32).to_string();

        document.ensure_page_font(index, HELVETICA_RESOURCE, "Helvetica")?;

        let mut content = ContentBuilder::new();
        content
            .save_state()
            .set_fill_color(Color::black())
            .begin_text()
            .set_font(HELVETICA_RESOURCE, options.font_size)
            .text_position(x, y)
            .show_text(&label)
            .end_text()
            .restore_state();
        document.append_page_content(index, content.into_bytes())?;
    }
    document.set_modification_date(Utc::now());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::page_extraction::remove_pages;
    use crate::parser::test_helpers::*;

    fn page_text(doc: &PdfDocument, index: usize) -> String {
        String::from_utf8_lossy(&doc.page_content(index).unwrap()).to_string()
    }

    #[test]
    fn test_position_anchors() {
        let (w, h) = (612.0, 792.0);
        assert_eq!(PageNumberPosition::TopLeft.anchor(w, h), (30.0, 762.0));
        assert_eq!(PageNumberPosition::TopCenter.anchor(w, h), (296.0, 762.0));
        assert_eq!(PageNumberPosition::TopRight.anchor(w, h), (562.0, 762.0));
        assert_eq!(PageNumberPosition::BottomLeft.anchor(w, h), (30.0, 30.0));
        assert_eq!(PageNumberPosition::BottomCenter.anchor(w, h), (296.0, 30.0));
        assert_eq!(PageNumberPosition::BottomRight.anchor(w, h), (562.0, 30.0));
    }

    #[test]
    fn test_position_names() {
        assert_eq!(
            PageNumberPosition::from_name("top-right"),
            PageNumberPosition::TopRight
        );
        assert_eq!(
            PageNumberPosition::from_name("bottom-center"),
            PageNumberPosition::BottomCenter
        );
        // Unknown names fall back to the default position
        assert_eq!(
            PageNumberPosition::from_name("middle"),
            PageNumberPosition::BottomCenter
        );
    }

    #[test]
    fn test_numbers_stamped_on_every_page() {
        let mut doc = PdfDocument::load(multi_page_pdf(3)).unwrap();
        add_page_numbers(&mut doc, &PageNumberOptions::default()).unwrap();

        for index in 0..3 {
            let text = page_text(&doc, index);
            assert!(text.contains(&format!("({}) Tj", index + 1)));
            assert!(text.contains("296.00 30.00 Td"));
        }
    }

    #[test]
    fn test_custom_start_number() {
        let mut doc = PdfDocument::load(multi_page_pdf(2)).unwrap();
        add_page_numbers(
            &mut doc,
            &PageNumberOptions {
                start: 10,
                ..PageNumberOptions::default()
            },
        )
        .unwrap();
        assert!(page_text(&doc, 0).contains("(10) Tj"));
        assert!(page_text(&doc, 1).contains("(11) Tj"));
    }

    #[test]
    fn test_existing_content_is_preserved() {
        let mut doc = PdfDocument::load(multi_page_pdf(1)).unwrap();
        add_page_numbers(&mut doc, &PageNumberOptions::default()).unwrap();
        let text = page_text(&doc, 0);
        let original = text.find("(Page 1)").unwrap();
        let stamp = text.find("(1) Tj").unwrap();
        assert!(original < stamp);
    }

    #[test]
    fn test_remove_then_number_end_to_end() {
        let source = PdfDocument::load(multi_page_pdf(10)).unwrap();
        let mut result = remove_pages(&source, "2,4,6-8,10").unwrap();
        add_page_numbers(&mut result, &PageNumberOptions::default()).unwrap();

        assert_eq!(result.page_count(), 4);
        let reloaded = PdfDocument::load(result.to_bytes().unwrap()).unwrap();
        for (index, original) in [1, 3, 5, 9].iter().enumerate() {
            let text = page_text(&reloaded, index);
            assert!(text.contains(&format!("(Page {original})")));
            assert!(text.contains(&format!("({}) Tj", index + 1)));
            assert!(text.contains("296.00 30.00 Td"));
        }
    }

    #[test]
    fn test_font_registered_in_page_resources() {
        let mut doc = PdfDocument::load(multi_page_pdf(1)).unwrap();
        add_page_numbers(&mut doc, &PageNumberOptions::default()).unwrap();

        let reloaded = PdfDocument::load(doc.to_bytes().unwrap()).unwrap();
        assert!(page_text(&reloaded, 0).contains("/Helv 12.00 Tf"));

        let page = reloaded.page_dict(0).unwrap();
        let fonts = page
            .get_dict("Resources")
            .and_then(|resources| resources.get_dict("Font"))
            .unwrap();
        assert!(fonts.contains_key("Helv"));
        // The fixture's own font survives alongside the stamp font
        assert!(fonts.contains_key("F1"));
    }
}
