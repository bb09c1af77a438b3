//! Byte-level document comparison.

use std::path::Path;

use super::OperationResult;
use crate::document::PdfDocument;

/// Size and page count of one comparison input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSummary {
    pub byte_length: usize,
    pub page_count: usize,
}

/// Outcome of comparing two documents.
///
/// `identical` reflects byte equality of the inputs. Two documents that
/// render the same but were serialized differently compare as different.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub identical: bool,
    pub first: DocumentSummary,
    pub second: DocumentSummary,
    pub summary: String,
}

/// Compare two documents given as raw bytes.
///
/// Both inputs must parse; a damaged input is an error rather than a
/// "different" verdict.
pub fn compare_documents(first: &[u8], second: &[u8]) -> OperationResult<ComparisonResult> {
    let first_doc = PdfDocument::load(first.to_vec())?;
    let second_doc = PdfDocument::load(second.to_vec())?;

    let first_summary = DocumentSummary {
        byte_length: first.len(),
        page_count: first_doc.page_count(),
    };
    let second_summary = DocumentSummary {
        byte_length: second.len(),
        page_count: second_doc.page_count(),
    };

    let identical = first == second;
    let summary = if identical {
        "Documents are identical in content and structure".to_string()
    } else {
        format!(
            "Documents differ - first: {} pages ({}KB), second: {} pages ({}KB)",
            first_summary.page_count,
            kilobytes(first_summary.byte_length),
            second_summary.page_count,
            kilobytes(second_summary.byte_length),
        )
    };

    Ok(ComparisonResult {
        identical,
        first: first_summary,
        second: second_summary,
        summary,
    })
}

/// Compare two documents on disk.
pub fn compare_files(
    first: impl AsRef<Path>,
    second: impl AsRef<Path>,
) -> OperationResult<ComparisonResult> {
    let first = std::fs::read(first)?;
    let second = std::fs::read(second)?;
    compare_documents(&first, &second)
}

fn kilobytes(len: usize) -> i64 {
    (len as f64 / 1024.0).round() as i64
}
