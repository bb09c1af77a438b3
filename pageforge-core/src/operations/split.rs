//! Splitting a document into single-page documents.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::OperationResult;
use crate::document::PdfDocument;

/// One single-page document per source page, in source order.
pub fn split_into_pages(document: &PdfDocument) -> OperationResult<Vec<PdfDocument>> {
    debug!("splitting {}-page document", document.page_count());
    let mut parts = Vec::with_capacity(document.page_count());
    for index in 0..document.page_count() {
        let mut single = PdfDocument::empty();
        single.copy_page_from(document, index)?;
        parts.push(single);
    }
    Ok(parts)
}

/// Split and write one `page-N.pdf` per page into `output_dir` (1-based
/// names). The directory is created if it does not exist.
pub fn split_to_files(
    document: &PdfDocument,
    output_dir: impl AsRef<Path>,
) -> OperationResult<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let mut files = Vec::new();
    for (index, part) in split_into_pages(document)?.into_iter().enumerate() {
        let path = output_dir.join(format!("page-{}.pdf", index + 1));
        part.save(&path)?;
        files.push(path);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::merge::merge_documents;
    use crate::parser::test_helpers::*;

    #[test]
    fn test_split_produces_single_page_documents() {
        let source = PdfDocument::load(multi_page_pdf(3)).unwrap();
        let parts = split_into_pages(&source).unwrap();
        assert_eq!(parts.len(), 3);
        for (index, part) in parts.iter().enumerate() {
            assert_eq!(part.page_count(), 1);
            let text = String::from_utf8_lossy(&part.page_content(0).unwrap()).to_string();
            assert!(text.contains(&format!("(Page {})", index + 1)));
        }
    }

    #[test]
    fn test_split_of_empty_document() {
        let parts = split_into_pages(&PdfDocument::empty()).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_merge_of_split_matches_source() {
        let source = PdfDocument::load(two_page_different_sizes()).unwrap();
        let parts = split_into_pages(&source).unwrap();
        let rebuilt = merge_documents(&parts).unwrap();

        assert_eq!(rebuilt.page_count(), source.page_count());
        for index in 0..source.page_count() {
            assert_eq!(
                rebuilt.page_size(index).unwrap(),
                source.page_size(index).unwrap()
            );
            assert_eq!(
                rebuilt.page_rotation(index).unwrap(),
                source.page_rotation(index).unwrap()
            );
        }
    }

    #[test]
    fn test_split_to_files_names_and_content() {
        let source = PdfDocument::load(multi_page_pdf(2)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let files = split_to_files(&source, dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name().unwrap(), "page-1.pdf");
        assert_eq!(files[1].file_name().unwrap(), "page-2.pdf");

        let reloaded = PdfDocument::open(&files[1]).unwrap();
        assert_eq!(reloaded.page_count(), 1);
        let text = String::from_utf8_lossy(&reloaded.page_content(0).unwrap()).to_string();
        assert!(text.contains("(Page 2)"));
    }
}
