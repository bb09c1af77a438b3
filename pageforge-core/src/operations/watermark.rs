//! Watermark overlays.

use chrono::Utc;
use tracing::debug;

use super::page_numbers::HELVETICA_RESOURCE;
use super::OperationResult;
use crate::content::{Color, ContentBuilder};
use crate::document::PdfDocument;

/// Options for watermarking
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    /// Fill alpha, 0.0 transparent to 1.0 opaque
    pub opacity: f64,
    pub font_size: f64,
    pub color: Color,
    /// Counter-clockwise rotation in degrees
    pub rotation_degrees: f64,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            opacity: 0.3,
            font_size: 50.0,
            color: Color::rgb(0.5, 0.5, 0.5),
            rotation_degrees: 45.0,
        }
    }
}

/// Draw `text` across every page, in place.
///
/// Horizontal centering uses a character-count approximation
/// (`len * size / 4`) instead of measured glyph widths, so long strings
/// drift off-center in proportional fonts.
pub fn add_watermark(
    document: &mut PdfDocument,
    text: &str,
    options: &WatermarkOptions,
) -> OperationResult<()> {
    debug!(
        "watermarking {} pages with {:?}",
        document.page_count(),
        text
    );
    let state_name = format!("GSa{}", (options.opacity * 100.0).round() as i64);

    for index in 0..document.page_count() {
        let (width, height) = document.page_size(index)?;
        let x = width / 2.0 - text.chars().count() as f64 * options.font_size / 4.0;
        let y = height / 2.0;

        document.ensure_page_font(index, HELVETICA_RESOURCE, "Helvetica")?;
        document.ensure_page_ext_gstate(index, &state_name, options.opacity)?;

        let mut content = ContentBuilder::new();
        content
            .save_state()
            .set_ext_gstate(&state_name)
            .set_fill_color(options.color)
            .translate(x, y)
            .rotate(options.rotation_degrees.to_radians())
            .begin_text()
            .set_font(HELVETICA_RESOURCE, options.font_size)
            .text_position(0.0, 0.0)
            .show_text(text)
            .end_text()
            .restore_state();
        document.append_page_content(index, content.into_bytes())?;
    }
    document.set_modification_date(Utc::now());
    Ok(())
}
