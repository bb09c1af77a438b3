//! Page reordering and duplication.

use tracing::debug;

use super::page_extraction::copy_selection;
use super::page_range::{parse_page_range, RangeMode};
use super::OperationResult;
use crate::document::PdfDocument;

/// Rebuild the document with pages in the given order.
///
/// The order string lists 1-based pages in their target sequence and may
/// repeat a page to duplicate it: `"2,1,1,3"`. Unlike extraction, every
/// listed page must exist; the whole order is validated before the first
/// copy, so a failing call never yields a partial document.
pub fn organize_pages(document: &PdfDocument, order: &str) -> OperationResult<PdfDocument> {
    let layout = parse_page_range(order, document.page_count(), RangeMode::Organize)?;
    debug!(
        "reordering {}-page document into {} pages",
        document.page_count(),
        layout.len()
    );
    copy_selection(document, &layout)
}
