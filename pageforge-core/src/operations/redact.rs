//! Redaction rectangles.
//!
//! Redaction here is visual occlusion: an opaque black rectangle drawn
//! over each area. The occluded content is still present in the file and
//! can be recovered; this does not provide secure redaction.

use chrono::Utc;
use tracing::debug;

use super::OperationResult;
use crate::content::{Color, ContentBuilder};
use crate::document::PdfDocument;

/// One rectangle to paint, addressed by 0-based page index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedactArea {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for RedactArea {
    fn default() -> Self {
        Self {
            page: 0,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 20.0,
        }
    }
}

/// Paint the given areas black, in place.
///
/// Areas on pages the document does not have are skipped silently.
pub fn redact_areas(document: &mut PdfDocument, areas: &[RedactArea]) -> OperationResult<()> {
    debug!(
        "redacting {} areas in {}-page document",
        areas.len(),
        document.page_count()
    );
    let mut applied = false;
    for area in areas {
        if area.page >= document.page_count() {
            continue;
        }
        let mut content = ContentBuilder::new();
        content
            .save_state()
            .set_fill_color(Color::black())
            .rect(area.x, area.y, area.width, area.height)
            .fill()
            .restore_state();
        document.append_page_content(area.page, content.into_bytes())?;
        applied = true;
    }
    if applied {
        document.set_modification_date(Utc::now());
    }
    Ok(())
}
