//! Concatenation of complete documents.

use std::path::Path;

use tracing::debug;

use super::{OperationError, OperationResult};
use crate::document::PdfDocument;

/// Concatenate the pages of every input document, in input order.
///
/// Each page subtree is copied into the output, so the inputs stay
/// usable afterwards. At least two inputs are required.
pub fn merge_documents(documents: &[PdfDocument]) -> OperationResult<PdfDocument> {
    if documents.len() < 2 {
        return Err(OperationError::InsufficientInputs(documents.len()));
    }
    let mut merged = PdfDocument::empty();
    for document in documents {
        for index in 0..document.page_count() {
            merged.copy_page_from(document, index)?;
        }
    }
    debug!(
        "merged {} documents into {} pages",
        documents.len(),
        merged.page_count()
    );
    Ok(merged)
}

/// Read every input file, merge them and write the result to `output`.
pub fn merge_files<P: AsRef<Path>>(inputs: &[P], output: impl AsRef<Path>) -> OperationResult<()> {
    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        documents.push(PdfDocument::open(input)?);
    }
    merge_documents(&documents)?.save(output)?;
    Ok(())
}
