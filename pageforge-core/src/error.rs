use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] crate::parser::ParseError),

    #[error("Operation error: {0}")]
    Operation(#[from] crate::operations::OperationError),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid object reference: {0} {1} R")]
    InvalidObjectReference(u32, u16),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Invalid page number: {0}")]
    InvalidPageNumber(u32),
}

pub type Result<T> = std::result::Result<T, PdfError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_pdf_error_display() {
        let error = PdfError::InvalidStructure("missing page tree".to_string());
        assert_eq!(error.to_string(), "Invalid PDF structure: missing page tree");
    }

    #[test]
    fn test_pdf_error_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let pdf_error = PdfError::from(io_error);

        match pdf_error {
            PdfError::Io(ref err) => {
                assert_eq!(err.kind(), ErrorKind::NotFound);
            }
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_invalid_object_reference_display() {
        let error = PdfError::InvalidObjectReference(12, 0);
        assert_eq!(error.to_string(), "Invalid object reference: 12 0 R");
    }

    #[test]
    fn test_error_variants_display_non_empty() {
        let errors = vec![
            PdfError::InvalidStructure("structure".to_string()),
            PdfError::InvalidObjectReference(1, 0),
            PdfError::CompressionError("bad deflate".to_string()),
            PdfError::InvalidPageNumber(999),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
