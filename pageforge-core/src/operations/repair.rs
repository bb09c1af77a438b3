//! Structural repair by reparse and rewrite.

use std::path::Path;

use tracing::debug;

use super::OperationResult;
use crate::document::PdfDocument;

/// Rebuild a damaged document.
///
/// The input is parsed in recovery mode, which falls back to scanning
/// for object headers when the cross-reference data is missing or
/// wrong, and the surviving structure is serialized fresh. The output
/// always carries a consistent cross-reference table.
pub fn repair_document(data: Vec<u8>) -> OperationResult<Vec<u8>> {
    let document = PdfDocument::load_relaxed(data)?;
    debug!("rebuilt document with {} pages", document.page_count());
    Ok(document.to_bytes()?)
}

/// Repair `input` and write the rebuilt file to `output`.
pub fn repair_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> OperationResult<()> {
    let data = std::fs::read(input)?;
    let repaired = repair_document(data)?;
    std::fs::write(output, repaired)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::OperationError;
    use crate::parser::test_helpers::*;

    #[test]
    fn test_missing_startxref_is_repairable() {
        let broken = pdf_without_startxref();
        assert!(PdfDocument::load(broken.clone()).is_err());

        let repaired = repair_document(broken).unwrap();
        let doc = PdfDocument::load(repaired).unwrap();
        assert_eq!(doc.page_count(), 1);
        let text = String::from_utf8_lossy(&doc.page_content(0).unwrap()).to_string();
        assert!(text.contains("(Page 1)"));
    }

    #[test]
    fn test_healthy_document_passes_through() {
        let repaired = repair_document(multi_page_pdf(3)).unwrap();
        let doc = PdfDocument::load(repaired).unwrap();
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn test_unsalvageable_input_is_an_error() {
        let result = repair_document(b"complete garbage".to_vec());
        assert!(matches!(result, Err(OperationError::Parse(_))));
    }

    #[test]
    fn test_repair_file_writes_loadable_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        let output = dir.path().join("fixed.pdf");
        std::fs::write(&input, pdf_without_startxref()).unwrap();

        repair_file(&input, &output).unwrap();
        assert_eq!(PdfDocument::open(&output).unwrap().page_count(), 1);
    }
}
