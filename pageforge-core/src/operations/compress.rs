//! Whole-document compression.

use std::path::Path;

use chrono::Utc;
use tracing::debug;

use super::OperationResult;
use crate::document::PdfDocument;
use crate::objects::Object;

/// Creator string recorded on compressed output
const CREATOR: &str = "pageforge";

/// Flate-compress every uncompressed stream and strip descriptive
/// metadata, in place.
///
/// Streams that already carry a filter are left alone. The title,
/// author and subject entries are cleared so the output does not carry
/// a stale description of its content.
pub fn compress_document(document: &mut PdfDocument) -> OperationResult<()> {
    let mut compressed = 0usize;
    for object in document.objects.values_mut() {
        if let Object::Stream(stream) = object {
            if stream.dict.contains_key("Filter") {
                continue;
            }
            stream.compress_flate()?;
            compressed += 1;
        }
    }
    debug!("flate-compressed {compressed} streams");

    document.set_title("");
    document.set_author("");
    document.set_subject("");
    document.set_creator(CREATOR);
    document.set_modification_date(Utc::now());
    Ok(())
}

/// Compress `input` and write the result to `output`.
pub fn compress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> OperationResult<()> {
    let mut document = PdfDocument::open(input)?;
    compress_document(&mut document)?;
    document.save(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_helpers::*;

    fn padded_single_page() -> PdfDocument {
        let mut doc = PdfDocument::load(multi_page_pdf(1)).unwrap();
        let filler = "0.5 0.5 0.5 rg\n".repeat(2000);
        doc.append_page_content(0, filler.into_bytes()).unwrap();
        doc
    }

    #[test]
    fn test_repetitive_content_shrinks() {
        let mut doc = padded_single_page();
        let plain = doc.to_bytes().unwrap();
        compress_document(&mut doc).unwrap();
        let packed = doc.to_bytes().unwrap();
        assert!(packed.len() < plain.len());
    }

    #[test]
    fn test_content_survives_compression() {
        let mut doc = padded_single_page();
        let before = doc.page_content(0).unwrap();
        compress_document(&mut doc).unwrap();

        let reloaded = PdfDocument::load(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.page_content(0).unwrap(), before);
    }

    #[test]
    fn test_descriptive_metadata_cleared() {
        let mut doc = PdfDocument::load(pdf_with_info()).unwrap();
        assert_eq!(doc.metadata().title.as_deref(), Some("Quarterly Report"));

        compress_document(&mut doc).unwrap();
        let reloaded = PdfDocument::load(doc.to_bytes().unwrap()).unwrap();
        let metadata = reloaded.metadata();
        assert_eq!(metadata.title.as_deref(), Some(""));
        assert_eq!(metadata.author.as_deref(), Some(""));
        assert_eq!(metadata.subject.as_deref(), Some(""));
        assert_eq!(metadata.creator.as_deref(), Some(CREATOR));
    }

    #[test]
    fn test_second_pass_skips_filtered_streams() {
        let mut doc = padded_single_page();
        let before = doc.page_content(0).unwrap();
        compress_document(&mut doc).unwrap();
        compress_document(&mut doc).unwrap();

        let reloaded = PdfDocument::load(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.page_content(0).unwrap(), before);
    }

    #[test]
    fn test_compress_file_writes_loadable_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, multi_page_pdf(2)).unwrap();

        compress_file(&input, &output).unwrap();
        assert_eq!(PdfDocument::open(&output).unwrap().page_count(), 2);
    }
}
