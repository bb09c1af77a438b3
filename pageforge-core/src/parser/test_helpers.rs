//! Synthetic documents for tests.
//!
//! Builders keep every cross-reference offset correct by recording byte
//! positions as objects are appended.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Incrementally builds a classic-xref file
pub(crate) struct SyntheticPdf {
    buffer: Vec<u8>,
    offsets: BTreeMap<u32, usize>,
}

impl SyntheticPdf {
    pub fn new() -> Self {
        Self {
            buffer: b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec(),
            offsets: BTreeMap::new(),
        }
    }

    /// Append `number 0 obj <body> endobj`
    pub fn add_object(&mut self, number: u32, body: &str) -> &mut Self {
        self.offsets.insert(number, self.buffer.len());
        self.buffer
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
        self
    }

    /// Append a stream object; `/Length` is filled in from `data`
    pub fn add_stream_object(&mut self, number: u32, dict_body: &str, data: &[u8]) -> &mut Self {
        self.offsets.insert(number, self.buffer.len());
        self.buffer.extend_from_slice(
            format!(
                "{number} 0 obj\n<< {dict_body} /Length {} >>\nstream\n",
                data.len()
            )
            .as_bytes(),
        );
        self.buffer.extend_from_slice(data);
        self.buffer.extend_from_slice(b"\nendstream\nendobj\n");
        self
    }

    pub fn finish(self, root: u32) -> Vec<u8> {
        self.finish_with(root, "")
    }

    /// Write the xref table and trailer; `extra` lands inside the trailer
    pub fn finish_with(mut self, root: u32, extra: &str) -> Vec<u8> {
        let size = self.offsets.keys().max().map_or(1, |max| max + 1);
        let xref_offset = self.buffer.len();

        let mut tail = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for number in 1..size {
            match self.offsets.get(&number) {
                Some(offset) => {
                    let _ = writeln!(tail, "{offset:010} 00000 n ");
                }
                None => tail.push_str("0000000000 00000 f \n"),
            }
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {size} /Root {root} 0 R {extra} >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.buffer.extend_from_slice(tail.as_bytes());
        self.buffer
    }
}

/// One blank-ish page with inherited page size and font
pub(crate) fn minimal_pdf() -> Vec<u8> {
    multi_page_pdf(1)
}

/// `count` pages under a single pages node that carries the media box
/// and a Helvetica resource, so inheritance is exercised.
pub(crate) fn multi_page_pdf(count: usize) -> Vec<u8> {
    let mut pdf = SyntheticPdf::new();

    let kids: Vec<String> = (0..count).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    pdf.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    pdf.add_object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {count} /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> >>",
            kids.join(" ")
        ),
    );
    pdf.add_object(3, "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");

    for i in 0..count {
        let page = (4 + 2 * i) as u32;
        let contents = page + 1;
        pdf.add_object(
            page,
            &format!("<< /Type /Page /Parent 2 0 R /Contents {contents} 0 R >>"),
        );
        let text = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i + 1);
        pdf.add_stream_object(contents, "", text.as_bytes());
    }

    pdf.finish(1)
}

/// Two pages with explicit, different media boxes; the second is rotated
pub(crate) fn two_page_different_sizes() -> Vec<u8> {
    let mut pdf = SyntheticPdf::new();
    pdf.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    pdf.add_object(
        2,
        "<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 /Resources << /Font << /F1 7 0 R >> >> >>",
    );
    pdf.add_object(
        3,
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
    );
    pdf.add_stream_object(4, "", b"BT /F1 12 Tf 72 720 Td (Letter) Tj ET");
    pdf.add_object(
        5,
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Rotate 90 /Contents 6 0 R >>",
    );
    pdf.add_stream_object(6, "", b"BT /F1 12 Tf 72 720 Td (A4) Tj ET");
    pdf.add_object(7, "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");
    pdf.finish(1)
}

/// Minimal document with a document information dictionary
pub(crate) fn pdf_with_info() -> Vec<u8> {
    let mut pdf = SyntheticPdf::new();
    pdf.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    pdf.add_object(
        2,
        "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 612 792] >>",
    );
    pdf.add_object(3, "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>");
    pdf.add_stream_object(4, "", b"0 0 0 rg");
    pdf.add_object(
        5,
        "<< /Title (Quarterly Report) /Author (Jane Doe) /Subject (Figures) >>",
    );
    pdf.finish_with(1, "/Info 5 0 R")
}

/// Minimal document whose trailer declares standard security
pub(crate) fn encrypted_pdf() -> Vec<u8> {
    let mut pdf = SyntheticPdf::new();
    pdf.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    pdf.add_object(
        2,
        "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 612 792] >>",
    );
    pdf.add_object(3, "<< /Type /Page /Parent 2 0 R >>");
    pdf.add_object(
        4,
        "<< /Filter /Standard /V 1 /R 2 /O (0123456789abcdef0123456789abcdef) /U (fedcba9876543210fedcba9876543210) /P -44 >>",
    );
    pdf.finish_with(1, "/Encrypt 4 0 R")
}

/// Valid body but the `startxref` tail is gone
pub(crate) fn pdf_without_startxref() -> Vec<u8> {
    let mut data = minimal_pdf();
    let keyword = data
        .windows(9)
        .rposition(|w| w == b"startxref")
        .unwrap();
    data.truncate(keyword);
    data.extend_from_slice(b"%%EOF\n");
    data
}

/// One-page document indexed by a cross-reference stream
pub(crate) fn pdf_with_xref_stream() -> Vec<u8> {
    let mut buffer = b"%PDF-1.5\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::new();

    let bodies = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 612 792] >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>".to_string(),
    ];
    for (i, body) in bodies.iter().enumerate() {
        offsets.push(buffer.len());
        buffer.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    offsets.push(buffer.len());
    let content = b"BT 72 720 Td ET";
    buffer.extend_from_slice(
        format!("4 0 obj\n<< /Length {} >>\nstream\n", content.len()).as_bytes(),
    );
    buffer.extend_from_slice(content);
    buffer.extend_from_slice(b"\nendstream\nendobj\n");

    // The xref stream indexes itself as object 5
    let stream_offset = buffer.len();
    offsets.push(stream_offset);
    let mut rows: Vec<u8> = vec![0, 0, 0, 255]; // object 0: free
    for offset in &offsets {
        rows.push(1);
        rows.extend_from_slice(&(*offset as u16).to_be_bytes());
        rows.push(0);
    }
    buffer.extend_from_slice(
        format!(
            "5 0 obj\n<< /Type /XRef /Size 6 /W [1 2 1] /Root 1 0 R /Length {} >>\nstream\n",
            rows.len()
        )
        .as_bytes(),
    );
    buffer.extend_from_slice(&rows);
    buffer.extend_from_slice(b"\nendstream\nendobj\n");
    buffer.extend_from_slice(format!("startxref\n{stream_offset}\n%%EOF\n").as_bytes());
    buffer
}

/// One-page document whose catalog, pages node and page live in an
/// object stream.
pub(crate) fn pdf_with_object_stream() -> Vec<u8> {
    let mut buffer = b"%PDF-1.5\n%\xE2\xE3\xCF\xD3\n".to_vec();

    // Object 4: the page content, stored normally
    let content_offset = buffer.len();
    let content = b"BT 72 720 Td ET";
    buffer.extend_from_slice(
        format!("4 0 obj\n<< /Length {} >>\nstream\n", content.len()).as_bytes(),
    );
    buffer.extend_from_slice(content);
    buffer.extend_from_slice(b"\nendstream\nendobj\n");

    // Object 5: the object stream holding objects 1, 2 and 3
    let bodies = [
        "<< /Type /Catalog /Pages 2 0 R >>",
        "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 612 792] >>",
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>",
    ];
    let mut inner_offsets = Vec::new();
    let mut area = String::new();
    for body in bodies {
        inner_offsets.push(area.len());
        area.push_str(body);
        area.push(' ');
    }
    let mut directory = String::new();
    for (i, offset) in inner_offsets.iter().enumerate() {
        let _ = write!(directory, "{} {} ", i + 1, offset);
    }
    let payload = format!("{directory}{area}");
    let objstm_offset = buffer.len();
    buffer.extend_from_slice(
        format!(
            "5 0 obj\n<< /Type /ObjStm /N 3 /First {} /Length {} >>\nstream\n",
            directory.len(),
            payload.len()
        )
        .as_bytes(),
    );
    buffer.extend_from_slice(payload.as_bytes());
    buffer.extend_from_slice(b"\nendstream\nendobj\n");

    // Object 6: the cross-reference stream
    let xref_offset = buffer.len();
    let mut rows: Vec<u8> = vec![0, 0, 0, 255]; // object 0: free
    for index in 0..3u16 {
        rows.push(2); // objects 1..3 live in stream 5
        rows.extend_from_slice(&5u16.to_be_bytes());
        rows.push(index as u8);
    }
    for offset in [content_offset, objstm_offset, xref_offset] {
        rows.push(1);
        rows.extend_from_slice(&(offset as u16).to_be_bytes());
        rows.push(0);
    }
    buffer.extend_from_slice(
        format!(
            "6 0 obj\n<< /Type /XRef /Size 7 /W [1 2 1] /Root 1 0 R /Length {} >>\nstream\n",
            rows.len()
        )
        .as_bytes(),
    );
    buffer.extend_from_slice(&rows);
    buffer.extend_from_slice(b"\nendstream\nendobj\n");
    buffer.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF\n").as_bytes());
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_offsets_are_exact() {
        let data = minimal_pdf();
        // Every recorded offset must point at the object's number
        let mut pdf = SyntheticPdf::new();
        pdf.add_object(1, "null");
        let offset = pdf.offsets[&1];
        assert_eq!(&pdf.buffer[offset..offset + 7], b"1 0 obj");
        assert!(data.starts_with(b"%PDF-1.7"));
        assert!(data.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_multi_page_structure() {
        let data = multi_page_pdf(3);
        let text = String::from_utf8_lossy(&data);
        assert!(text.contains("/Count 3"));
        assert!(text.contains("(Page 3)"));
    }
}
