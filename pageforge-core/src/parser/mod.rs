//! PDF container parsing.
//!
//! Reads the standard container structure: header, indirect objects,
//! cross-reference tables (classic and stream form), trailer and object
//! streams. The output is the object model from [`crate::objects`]; the
//! document-level view lives in [`crate::document`].

pub mod header;
pub mod lexer;
pub mod objects;
pub mod reader;
pub mod trailer;
pub mod xref;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use header::{PdfHeader, PdfVersion};
pub use lexer::{Lexer, Token};
pub use reader::PdfReader;
pub use trailer::PdfTrailer;
pub use xref::{XRefEntry, XRefTable};

use thiserror::Error;

/// Parser errors
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is empty")]
    EmptyFile,

    #[error("Invalid PDF header")]
    InvalidHeader,

    #[error("Syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Invalid object reference: {0} {1} R")]
    InvalidReference(u32, u16),

    #[error("Missing required key: {0}")]
    MissingKey(String),

    #[error("Invalid cross-reference table: {0}")]
    InvalidXRef(String),

    #[error("Invalid or missing trailer")]
    InvalidTrailer,

    #[error("Circular reference detected")]
    CircularReference,

    #[error("Stream decode error: {0}")]
    StreamDecode(String),

    #[error("Encrypted documents are not supported")]
    EncryptionNotSupported,
}

/// Result type for parsing operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Options controlling how strictly the container is validated.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Tolerate recoverable syntax damage (mismatched object headers,
    /// unparseable objects become null) instead of failing
    pub lenient_syntax: bool,
    /// Load documents whose trailer carries encryption metadata instead of
    /// refusing them; string and stream content stays as stored
    pub ignore_encryption: bool,
    /// Rebuild the cross-reference table by scanning for object headers
    /// when the stored one is missing or unusable
    pub rebuild_xref: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::strict()
    }
}

impl ParseOptions {
    /// Validating mode: structural damage is an error.
    pub fn strict() -> Self {
        Self {
            lenient_syntax: false,
            ignore_encryption: false,
            rebuild_xref: false,
        }
    }

    /// Repair mode: recoverable structural issues never fail the load.
    pub fn relaxed() -> Self {
        Self {
            lenient_syntax: true,
            ignore_encryption: true,
            rebuild_xref: true,
        }
    }
}
