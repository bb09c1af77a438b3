//! PDF header parsing.

use super::{ParseError, ParseOptions, ParseResult};

/// How far into the file the `%PDF-` marker may sit in lenient mode.
/// Some generators prepend junk (HTTP headers, printer prologues).
const HEADER_SCAN_WINDOW: usize = 1024;

/// PDF version from the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl PdfVersion {
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Default for PdfVersion {
    fn default() -> Self {
        Self { major: 1, minor: 7 }
    }
}

/// Parsed file header
#[derive(Debug, Clone, Copy)]
pub struct PdfHeader {
    pub version: PdfVersion,
    /// Byte offset of the `%PDF-` marker. Non-zero when junk precedes the
    /// header; all cross-reference offsets are then relative to this point.
    pub offset: usize,
}

impl PdfHeader {
    /// Parse the header from the start of the file.
    ///
    /// Strict mode requires the marker at byte zero. Lenient mode scans the
    /// first kilobyte for it.
    pub fn parse(data: &[u8], options: &ParseOptions) -> ParseResult<PdfHeader> {
        if data.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        let offset = if data.starts_with(b"%PDF-") {
            0
        } else if options.lenient_syntax {
            find_marker(data).ok_or(ParseError::InvalidHeader)?
        } else {
            return Err(ParseError::InvalidHeader);
        };

        let rest = &data[offset + 5..];
        let version = parse_version(rest).ok_or(ParseError::InvalidHeader)?;

        Ok(PdfHeader { version, offset })
    }
}

fn find_marker(data: &[u8]) -> Option<usize> {
    let window = &data[..data.len().min(HEADER_SCAN_WINDOW)];
    window.windows(5).position(|w| w == b"%PDF-")
}

fn parse_version(rest: &[u8]) -> Option<PdfVersion> {
    let major = rest.first().filter(|b| b.is_ascii_digit())? - b'0';
    if rest.get(1) != Some(&b'.') {
        return None;
    }
    let minor = rest.get(2).filter(|b| b.is_ascii_digit())? - b'0';
    Some(PdfVersion::new(major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let header = PdfHeader::parse(b"%PDF-1.7\n", &ParseOptions::strict()).unwrap();
        assert_eq!(header.version, PdfVersion::new(1, 7));
        assert_eq!(header.offset, 0);
    }

    #[test]
    fn test_parse_header_2_0() {
        let header = PdfHeader::parse(b"%PDF-2.0\n", &ParseOptions::strict()).unwrap();
        assert_eq!(header.version, PdfVersion::new(2, 0));
    }

    #[test]
    fn test_empty_file() {
        let err = PdfHeader::parse(b"", &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, ParseError::EmptyFile));
    }

    #[test]
    fn test_missing_marker() {
        let err = PdfHeader::parse(b"not a pdf", &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeader));
    }

    #[test]
    fn test_junk_before_header_strict_vs_lenient() {
        let data = b"garbage bytes\n%PDF-1.4\n";
        assert!(PdfHeader::parse(data, &ParseOptions::strict()).is_err());

        let header = PdfHeader::parse(data, &ParseOptions::relaxed()).unwrap();
        assert_eq!(header.version, PdfVersion::new(1, 4));
        assert_eq!(header.offset, 14);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(PdfVersion::new(1, 5).to_string(), "1.5");
    }
}
