//! # pageforge
//!
//! A pure Rust engine for transforming the page sets of existing PDF
//! documents: select, reorder, split, merge, stamp and repair, with no
//! external PDF dependencies.
//!
//! ## Features
//!
//! - **Page selection**: extract, remove and reorganize pages with one
//!   selector language (`"1,3,5-7,10"`)
//! - **Split & merge**: one document per page, or many documents into one
//! - **Stamps**: page numbers, diagonal watermarks, signature lines and
//!   redaction boxes drawn straight into page content
//! - **Geometry**: cumulative page rotation and crop box assignment
//! - **Maintenance**: structural repair of damaged files, whole-document
//!   flate compression, byte-level comparison
//! - **Pure Rust**: native parsing of classic and cross-reference-stream
//!   PDFs, no C dependencies
//!
//! ## Quick Start
//!
//! ### Extracting pages
//!
//! ```rust,no_run
//! use pageforge::operations::extract_pages;
//! use pageforge::PdfDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = PdfDocument::open("report.pdf")?;
//! let excerpt = extract_pages(&doc, "1,3,5-7")?;
//! excerpt.save("excerpt.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Rotating in place
//!
//! ```rust,no_run
//! use pageforge::operations::{rotate_pages, RotateOptions};
//! use pageforge::PdfDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = PdfDocument::open("scan.pdf")?;
//! let options = RotateOptions {
//!     degrees: 90,
//!     pages: None,
//! };
//! rotate_pages(&mut doc, &options)?;
//! doc.save("rotated.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Merging
//!
//! ```rust,no_run
//! use pageforge::operations::merge_documents;
//! use pageforge::PdfDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = vec![
//!     PdfDocument::open("cover.pdf")?,
//!     PdfDocument::open("body.pdf")?,
//! ];
//! merge_documents(&inputs)?.save("combined.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`document`] - The loaded document model and page-level editing
//! - [`operations`] - Page-set transformations built on top of it
//! - [`parser`] - PDF container parsing
//! - [`writer`] - Serialization with object renumbering
//! - [`objects`] - The PDF object model
//! - [`content`] - Content stream construction
//! - [`geometry`] - Points and rectangles

pub mod content;
pub mod document;
pub mod error;
pub mod geometry;
pub mod objects;
pub mod operations;
pub mod parser;
pub mod writer;

// Re-export the document model
pub use content::{Color, ContentBuilder};
pub use document::{DocumentMetadata, PdfDocument};
pub use error::{PdfError, Result};
pub use geometry::{Point, Rectangle};
pub use objects::{Dictionary, Object, ObjectId, Stream};

// Re-export parsing and writing entry points
pub use parser::{ParseError, ParseOptions, PdfReader, PdfVersion};
pub use writer::PdfWriter;

// Re-export the page-set operations
pub use operations::{
    extract_pages, merge_documents, organize_pages, remove_pages, rotate_pages, split_into_pages,
    OperationError,
};

/// Current version of pageforge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_empty_document_roundtrip() {
        let doc = PdfDocument::empty();
        assert_eq!(doc.page_count(), 0);

        let bytes = doc.to_bytes().unwrap();
        let reloaded = PdfDocument::load(bytes).unwrap();
        assert_eq!(reloaded.page_count(), 0);
    }
}
