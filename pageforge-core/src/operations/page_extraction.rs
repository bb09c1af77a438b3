//! Page extraction and removal.
//!
//! Both operations build a new document from deep page copies; the source
//! document is never modified and stays independently serializable.

use tracing::debug;

use super::page_range::{parse_page_range, RangeMode};
use super::OperationResult;
use crate::document::PdfDocument;

/// Copy the selected pages into a new document, in selector order.
///
/// Out-of-range tokens in the selector are dropped; repeating a token
/// repeats the page.
pub fn extract_pages(document: &PdfDocument, spec: &str) -> OperationResult<PdfDocument> {
    let selection = parse_page_range(spec, document.page_count(), RangeMode::Extract)?;
    debug!(
        "extracting {} of {} pages",
        selection.len(),
        document.page_count()
    );
    copy_selection(document, &selection)
}

/// Copy every page except the selected ones, in ascending source order.
///
/// The surviving pages are implicitly renumbered by their new positions.
pub fn remove_pages(document: &PdfDocument, spec: &str) -> OperationResult<PdfDocument> {
    let keep = parse_page_range(spec, document.page_count(), RangeMode::Remove)?;
    debug!(
        "removing {} of {} pages",
        document.page_count() - keep.len(),
        document.page_count()
    );
    copy_selection(document, &keep)
}

/// Deep-copy the 1-based page numbers into a fresh document.
pub(crate) fn copy_selection(
    document: &PdfDocument,
    selection: &[usize],
) -> OperationResult<PdfDocument> {
    let mut output = PdfDocument::empty();
    for &number in selection {
        output.copy_page_from(document, number - 1)?;
    }
    Ok(output)
}
