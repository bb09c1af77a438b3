//! Uniform page cropping.

use chrono::Utc;
use tracing::debug;

use super::OperationResult;
use crate::document::PdfDocument;
use crate::geometry::Rectangle;

/// Crop box position and size in page units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for CropBox {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            width: 500.0,
            height: 700.0,
        }
    }
}

/// Apply the same crop box to every page, in place.
///
/// The box is not checked against the page bounds; an oversized box is
/// accepted and viewers show the overhang as empty margin.
pub fn crop_pages(document: &mut PdfDocument, options: &CropBox) -> OperationResult<()> {
    debug!(
        "cropping {} pages to {}x{} at ({}, {})",
        document.page_count(),
        options.width,
        options.height,
        options.x,
        options.y
    );
    let rect =
        Rectangle::from_position_and_size(options.x, options.y, options.width, options.height);
    for index in 0..document.page_count() {
        document.set_page_crop_box(index, rect)?;
    }
    document.set_modification_date(Utc::now());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::parser::test_helpers::*;

    #[test]
    fn test_crop_applies_to_every_page() {
        let mut doc = PdfDocument::load(multi_page_pdf(3)).unwrap();
        crop_pages(&mut doc, &CropBox::default()).unwrap();

        for index in 0..3 {
            let rect = doc.page_crop_box(index).unwrap().unwrap();
            assert_eq!(rect.lower_left, Point::new(50.0, 50.0));
            assert_eq!(rect.upper_right, Point::new(550.0, 750.0));
        }
    }

    #[test]
    fn test_crop_with_custom_box() {
        let mut doc = PdfDocument::load(multi_page_pdf(1)).unwrap();
        crop_pages(
            &mut doc,
            &CropBox {
                x: 0.0,
                y: 0.0,
                width: 300.0,
                height: 400.0,
            },
        )
        .unwrap();
        let rect = doc.page_crop_box(0).unwrap().unwrap();
        assert_eq!(rect.width(), 300.0);
        assert_eq!(rect.height(), 400.0);
    }

    #[test]
    fn test_oversized_box_is_accepted() {
        let mut doc = PdfDocument::load(multi_page_pdf(1)).unwrap();
        crop_pages(
            &mut doc,
            &CropBox {
                x: 0.0,
                y: 0.0,
                width: 5000.0,
                height: 5000.0,
            },
        )
        .unwrap();
        assert_eq!(doc.page_crop_box(0).unwrap().unwrap().width(), 5000.0);
    }

    #[test]
    fn test_crop_survives_roundtrip() {
        let mut doc = PdfDocument::load(multi_page_pdf(2)).unwrap();
        crop_pages(&mut doc, &CropBox::default()).unwrap();
        let reloaded = PdfDocument::load(doc.to_bytes().unwrap()).unwrap();
        let rect = reloaded.page_crop_box(1).unwrap().unwrap();
        assert_eq!(rect.upper_right, Point::new(550.0, 750.0));
    }
}
