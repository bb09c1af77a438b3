//! Page rotation.

use chrono::Utc;
use tracing::debug;

use super::page_range::{parse_page_range, RangeMode};
use super::OperationResult;
use crate::document::PdfDocument;

/// Options for page rotation
#[derive(Debug, Clone)]
pub struct RotateOptions {
    /// Degrees added to each targeted page's current rotation. Multiples
    /// of 90 are the meaningful values; anything else is stored as given
    /// and viewers decide what to do with it.
    pub degrees: i32,
    /// Extraction-style selector for the pages to rotate; `None` targets
    /// every page. Repeated tokens rotate a page once, not twice.
    pub pages: Option<String>,
}

impl Default for RotateOptions {
    fn default() -> Self {
        Self {
            degrees: 90,
            pages: None,
        }
    }
}

/// Add to the rotation of the targeted pages, in place.
///
/// Rotation accumulates across calls and is stored normalized into
/// `[0, 360)`.
pub fn rotate_pages(document: &mut PdfDocument, options: &RotateOptions) -> OperationResult<()> {
    let targets: Vec<usize> = match &options.pages {
        Some(spec) => {
            let mut pages = parse_page_range(spec, document.page_count(), RangeMode::Extract)?;
            pages.sort_unstable();
            pages.dedup();
            pages.into_iter().map(|page| page - 1).collect()
        }
        None => (0..document.page_count()).collect(),
    };

    debug!("rotating {} pages by {} degrees", targets.len(), options.degrees);
    for index in targets {
        document.add_page_rotation(index, options.degrees)?;
    }
    document.set_modification_date(Utc::now());
    Ok(())
}
