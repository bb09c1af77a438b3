//! Page-set transformation operations
//!
//! High-level operations over loaded documents: selecting, reordering and
//! duplicating pages, page-level stamps (numbers, watermark, signature,
//! redaction), multi-document merge and the repair/compress passes.
//!
//! Selection and combination operations build a brand-new document from
//! deep page copies and never touch their sources; mutation operations
//! change the passed document in place.

pub mod compare;
#[cfg(feature = "compression")]
pub mod compress;
pub mod crop;
pub mod merge;
pub mod page_extraction;
pub mod page_numbers;
pub mod page_range;
pub mod redact;
pub mod reorder;
pub mod repair;
pub mod rotate;
pub mod sign;
pub mod split;
pub mod watermark;

pub use compare::{compare_documents, compare_files, ComparisonResult, DocumentSummary};
#[cfg(feature = "compression")]
pub use compress::{compress_document, compress_file};
pub use crop::{crop_pages, CropBox};
pub use merge::{merge_documents, merge_files};
pub use page_extraction::{extract_pages, remove_pages};
pub use page_numbers::{add_page_numbers, PageNumberOptions, PageNumberPosition};
pub use page_range::{parse_page_range, RangeMode};
pub use redact::{redact_areas, RedactArea};
pub use reorder::organize_pages;
pub use repair::{repair_document, repair_file};
pub use rotate::{rotate_pages, RotateOptions};
pub use sign::sign_document;
pub use split::{split_into_pages, split_to_files};
pub use watermark::{add_watermark, WatermarkOptions};

use crate::error::PdfError;
use crate::parser::ParseError;

/// Result type for operations
pub type OperationResult<T> = Result<T, OperationError>;

/// Operation-specific errors
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// Page selector fails the allowed-character/structure check
    #[error("Invalid page range format: {0}")]
    InvalidRangeFormat(String),

    /// Page index out of bounds
    #[error("Page index {0} out of bounds (document has {1} pages)")]
    IndexOutOfBounds(usize, usize),

    /// Too few input documents
    #[error("Insufficient inputs: got {0} documents, need at least 2")]
    InsufficientInputs(usize),

    /// No pages to process
    #[error("No pages to process")]
    NoPagesToProcess,

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document-level failure while applying the operation
    #[error("Document error: {0}")]
    Document(String),
}

impl From<PdfError> for OperationError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Parse(parse) => OperationError::Parse(parse),
            PdfError::Io(io) => OperationError::Io(io),
            other => OperationError::Document(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_display() {
        assert_eq!(
            OperationError::InvalidRangeFormat("a;b".to_string()).to_string(),
            "Invalid page range format: a;b"
        );
        assert_eq!(
            OperationError::IndexOutOfBounds(6, 5).to_string(),
            "Page index 6 out of bounds (document has 5 pages)"
        );
        assert_eq!(
            OperationError::InsufficientInputs(1).to_string(),
            "Insufficient inputs: got 1 documents, need at least 2"
        );
    }

    #[test]
    fn test_pdf_error_conversion() {
        let err: OperationError = PdfError::InvalidPageNumber(9).into();
        assert!(matches!(err, OperationError::Document(_)));

        let err: OperationError = PdfError::Parse(ParseError::InvalidTrailer).into();
        assert!(matches!(err, OperationError::Parse(_)));
    }
}
