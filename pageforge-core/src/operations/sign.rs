//! Signature stamping.
//!
//! This is a visible text stamp, not a cryptographic signature: it adds
//! a name and date line to the last page and nothing else.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{OperationError, OperationResult};
use crate::content::{Color, ContentBuilder};
use crate::document::PdfDocument;

const BOLD_RESOURCE: &str = "HeBo";

/// Stamp `Digitally Signed: {name}` and today's date on the last page.
pub fn sign_document(document: &mut PdfDocument, name: &str) -> OperationResult<()> {
    sign_with_date(document, name, Utc::now())
}

fn sign_with_date(
    document: &mut PdfDocument,
    name: &str,
    when: DateTime<Utc>,
) -> OperationResult<()> {
    let last = document
        .page_count()
        .checked_sub(1)
        .ok_or(OperationError::NoPagesToProcess)?;
    debug!("signing page {} as {:?}", last + 1, name);

    let (width, _) = document.page_size(last)?;
    document.ensure_page_font(last, BOLD_RESOURCE, "Helvetica-Bold")?;

    let mut content = ContentBuilder::new();
    content
        .save_state()
        .set_fill_color(Color::rgb(0.0, 0.0, 0.8))
        .begin_text()
        .set_font(BOLD_RESOURCE, 12.0)
        .text_position(width - 300.0, 80.0)
        .show_text(&format!("Digitally Signed: {name}"))
        .end_text()
        .set_fill_color(Color::rgb(0.5, 0.5, 0.5))
        .begin_text()
        .set_font(BOLD_RESOURCE, 10.0)
        .text_position(width - 300.0, 60.0)
        .show_text(&format!("Date: {}", when.format("%-m/%-d/%Y")))
        .end_text()
        .restore_state();
    document.append_page_content(last, content.into_bytes())?;
    document.set_modification_date(when);
    Ok(())
}
