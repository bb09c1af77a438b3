//! Cross-reference parsing.
//!
//! Handles classic `xref` tables, cross-reference streams (PDF 1.5+),
//! hybrid files carrying both, and `/Prev` chains from incremental
//! updates. Also provides the full-file scan used to rebuild a usable
//! table when the stored one is missing or damaged.

use std::collections::{HashMap, HashSet, VecDeque};

use super::lexer::{self, Lexer, Token};
use super::objects::{parse_indirect_object, parse_object};
use super::{ParseError, ParseOptions, ParseResult};
use crate::objects::{Dictionary, Object, ObjectId};

/// How far from the end of the file `startxref` is searched for
const STARTXREF_WINDOW: usize = 1024;

/// One cross-reference entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntry {
    /// Object slot is free
    Free { next_free: u32, generation: u16 },
    /// Object stored at a byte offset in the file
    InUse { offset: usize, generation: u16 },
    /// Object stored inside an object stream
    Compressed { stream_number: u32, index: u32 },
}

impl XRefEntry {
    pub fn is_in_use(&self) -> bool {
        !matches!(self, XRefEntry::Free { .. })
    }
}

/// Merged cross-reference table for a document.
///
/// When the same object number appears in several sections, the entry
/// seen first while walking from the newest section wins.
#[derive(Debug, Clone, Default)]
pub struct XRefTable {
    entries: HashMap<u32, XRefEntry>,
}

impl XRefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, number: u32) -> Option<&XRefEntry> {
        self.entries.get(&number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Object numbers with in-use entries, in ascending order
    pub fn in_use_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_in_use())
            .map(|(n, _)| *n)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn max_object_number(&self) -> u32 {
        self.entries.keys().copied().max().unwrap_or(0)
    }

    fn insert_if_absent(&mut self, number: u32, entry: XRefEntry) {
        self.entries.entry(number).or_insert(entry);
    }

    /// Locate the `startxref` offset near the end of the file
    pub fn find_startxref(data: &[u8]) -> ParseResult<usize> {
        let tail_start = data.len().saturating_sub(STARTXREF_WINDOW);
        let tail = &data[tail_start..];
        let keyword_pos = tail
            .windows(9)
            .rposition(|w| w == b"startxref")
            .ok_or_else(|| ParseError::InvalidXRef("startxref not found".to_string()))?;

        let mut lexer = Lexer::new_at(data, tail_start + keyword_pos);
        lexer.expect_token(Token::StartXref)?;
        match lexer.next_token()? {
            Token::Integer(offset) if offset >= 0 && (offset as usize) < data.len() => {
                Ok(offset as usize)
            }
            _ => Err(ParseError::InvalidXRef(
                "invalid startxref offset".to_string(),
            )),
        }
    }

    /// Parse the table reachable from `start`, following `/Prev` and
    /// `/XRefStm` links. Returns the table and the merged trailer.
    pub fn parse(
        data: &[u8],
        start: usize,
        options: &ParseOptions,
    ) -> ParseResult<(XRefTable, Dictionary)> {
        let mut table = XRefTable::new();
        let mut trailer = Dictionary::new();
        let mut queue = VecDeque::from([start]);
        let mut visited = HashSet::new();

        while let Some(offset) = queue.pop_front() {
            if !visited.insert(offset) {
                if options.lenient_syntax {
                    continue;
                }
                return Err(ParseError::InvalidXRef(
                    "circular cross-reference chain".to_string(),
                ));
            }
            if offset >= data.len() {
                if options.lenient_syntax {
                    continue;
                }
                return Err(ParseError::InvalidXRef(format!(
                    "cross-reference offset {offset} past end of file"
                )));
            }

            let section = parse_section(data, offset, options)?;
            for (number, entry) in section.entries {
                table.insert_if_absent(number, entry);
            }

            // Hybrid files: the stream complements the table, and both
            // come before anything older.
            if let Some(stm) = section.trailer.get_integer("XRefStm") {
                if stm >= 0 {
                    queue.push_back(stm as usize);
                }
            }
            if let Some(prev) = section.trailer.get_integer("Prev") {
                if prev >= 0 {
                    queue.push_back(prev as usize);
                }
            }

            for (key, value) in section.trailer.entries() {
                if !trailer.contains_key(key) {
                    trailer.set(key.clone(), value.clone());
                }
            }
        }

        if table.is_empty() {
            return Err(ParseError::InvalidXRef(
                "empty cross-reference table".to_string(),
            ));
        }
        Ok((table, trailer))
    }

    /// Rebuild a table by scanning the whole file for `N G obj` headers.
    ///
    /// The last occurrence of each object number wins, matching how
    /// incremental updates append replacements. The trailer is taken from
    /// the last `trailer` keyword when one survives, otherwise
    /// reconstructed around the catalog object.
    pub fn rebuild_from_scan(
        data: &[u8],
        options: &ParseOptions,
    ) -> ParseResult<(XRefTable, Dictionary)> {
        let mut offsets: HashMap<u32, (u16, usize)> = HashMap::new();
        for (id, offset) in scan_object_headers(data) {
            offsets.insert(id.number(), (id.generation(), offset));
        }
        if offsets.is_empty() {
            return Err(ParseError::InvalidXRef(
                "no objects found while scanning".to_string(),
            ));
        }

        let mut table = XRefTable::new();
        for (number, (generation, offset)) in &offsets {
            table.insert_if_absent(
                *number,
                XRefEntry::InUse {
                    offset: *offset,
                    generation: *generation,
                },
            );
        }

        let mut trailer = recover_trailer(data, options).unwrap_or_default();
        if trailer.get("Root").is_none() {
            let root = find_catalog(data, &table, options).ok_or_else(|| {
                ParseError::InvalidXRef("no document catalog found while scanning".to_string())
            })?;
            trailer.set("Root", Object::Reference(root));
        }
        if trailer.get("Size").is_none() {
            trailer.set("Size", Object::Integer(table.max_object_number() as i64 + 1));
        }
        Ok((table, trailer))
    }
}

struct Section {
    entries: Vec<(u32, XRefEntry)>,
    trailer: Dictionary,
}

fn parse_section(data: &[u8], offset: usize, options: &ParseOptions) -> ParseResult<Section> {
    let mut lexer = Lexer::new_at(data, offset);
    match lexer.peek_token() {
        Ok(Token::Xref) => parse_classic_section(data, offset, options),
        Ok(Token::Integer(_)) => parse_stream_section(data, offset, options),
        _ => Err(ParseError::InvalidXRef(format!(
            "no cross-reference section at offset {offset}"
        ))),
    }
}

/// Classic `xref` table: subsection headers as tokens, entry lines as
/// raw bytes since real files deviate from the fixed 20-byte format.
fn parse_classic_section(
    data: &[u8],
    offset: usize,
    options: &ParseOptions,
) -> ParseResult<Section> {
    let mut lexer = Lexer::new_at(data, offset);
    lexer.expect_token(Token::Xref)?;

    let mut entries = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::Integer(start) => {
                let count = match lexer.next_token()? {
                    Token::Integer(c) if c >= 0 => c as u64,
                    other => {
                        return Err(ParseError::UnexpectedToken {
                            expected: "entry count".to_string(),
                            found: other.describe(),
                        })
                    }
                };
                if start < 0 {
                    return Err(ParseError::InvalidXRef(
                        "negative subsection start".to_string(),
                    ));
                }

                let mut pos = lexer.position();
                for i in 0..count {
                    let number = start as u64 + i;
                    let (field1, field2, kind, next) =
                        read_table_entry(data, pos).ok_or_else(|| {
                            ParseError::InvalidXRef(format!(
                                "truncated entry for object {number}"
                            ))
                        })?;
                    pos = next;

                    let generation = clamp_generation(field2, options)?;
                    let entry = match kind {
                        b'n' => XRefEntry::InUse {
                            offset: field1 as usize,
                            generation,
                        },
                        b'f' => XRefEntry::Free {
                            next_free: field1 as u32,
                            generation,
                        },
                        other if options.lenient_syntax => {
                            let _ = other;
                            continue;
                        }
                        other => {
                            return Err(ParseError::InvalidXRef(format!(
                                "invalid entry type '{}'",
                                other as char
                            )))
                        }
                    };
                    entries.push((number as u32, entry));
                }
                lexer.set_position(pos);
            }
            Token::Trailer => {
                let trailer = match parse_object(&mut lexer, options)? {
                    Object::Dictionary(dict) => dict,
                    _ => return Err(ParseError::InvalidTrailer),
                };
                return Ok(Section { entries, trailer });
            }
            Token::Eof if options.lenient_syntax => {
                return Ok(Section {
                    entries,
                    trailer: Dictionary::new(),
                })
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "subsection or 'trailer'".to_string(),
                    found: other.describe(),
                })
            }
        }
    }
}

/// Read one `offset generation kind` line, tolerating 19- and 21-byte
/// variants. Returns the fields and the position after the kind marker.
fn read_table_entry(data: &[u8], mut pos: usize) -> Option<(u64, u32, u8, usize)> {
    let field1 = {
        pos = skip_ws(data, pos);
        let (v, next) = read_digits(data, pos)?;
        pos = next;
        v
    };
    let field2 = {
        pos = skip_ws(data, pos);
        let (v, next) = read_digits(data, pos)?;
        pos = next;
        v as u32
    };
    pos = skip_ws(data, pos);
    let kind = *data.get(pos)?;
    Some((field1, field2, kind, pos + 1))
}

fn skip_ws(data: &[u8], mut pos: usize) -> usize {
    while pos < data.len() && lexer::is_whitespace(data[pos]) {
        pos += 1;
    }
    pos
}

fn read_digits(data: &[u8], mut pos: usize) -> Option<(u64, usize)> {
    let start = pos;
    let mut value: u64 = 0;
    while let Some(b @ b'0'..=b'9') = data.get(pos) {
        value = value.checked_mul(10)?.checked_add((b - b'0') as u64)?;
        pos += 1;
    }
    (pos > start).then_some((value, pos))
}

fn clamp_generation(value: u32, options: &ParseOptions) -> ParseResult<u16> {
    match u16::try_from(value) {
        Ok(g) => Ok(g),
        Err(_) if options.lenient_syntax => Ok(u16::MAX),
        Err(_) => Err(ParseError::InvalidXRef(format!(
            "generation {value} out of range"
        ))),
    }
}

/// Cross-reference stream: typed binary rows described by `/W`.
fn parse_stream_section(
    data: &[u8],
    offset: usize,
    options: &ParseOptions,
) -> ParseResult<Section> {
    let mut lexer = Lexer::new_at(data, offset);
    let (_, object) = parse_indirect_object(&mut lexer, options, None, None)?;
    let stream = object
        .as_stream()
        .ok_or_else(|| ParseError::InvalidXRef("expected a cross-reference stream".to_string()))?;

    if stream.dict.get_type() != Some("XRef") && !options.lenient_syntax {
        return Err(ParseError::InvalidXRef(
            "stream is not of /Type /XRef".to_string(),
        ));
    }

    let size = stream
        .dict
        .get_integer("Size")
        .ok_or_else(|| ParseError::MissingKey("Size".to_string()))?;
    let widths = field_widths(&stream.dict)?;
    let row_width: usize = widths.iter().sum();
    if row_width == 0 {
        return Err(ParseError::InvalidXRef("/W sums to zero".to_string()));
    }

    let index = subsection_index(&stream.dict, size)?;
    let decoded = stream
        .decode()
        .map_err(|e| ParseError::StreamDecode(e.to_string()))?;

    let mut entries = Vec::new();
    let mut row = 0usize;
    'subsections: for (start, count) in index {
        for i in 0..count {
            let begin = row * row_width;
            row += 1;
            let Some(bytes) = decoded.get(begin..begin + row_width) else {
                if options.lenient_syntax {
                    break 'subsections;
                }
                return Err(ParseError::InvalidXRef(
                    "cross-reference stream data shorter than /Index".to_string(),
                ));
            };

            let (f1, rest) = bytes.split_at(widths[0]);
            let (f2, f3) = rest.split_at(widths[1]);
            // A missing type field defaults to 1 (in use)
            let kind = if widths[0] == 0 { 1 } else { read_be(f1) };
            let field2 = read_be(f2);
            let field3 = read_be(f3);

            let number = start + i;
            let entry = match kind {
                0 => XRefEntry::Free {
                    next_free: field2 as u32,
                    generation: field3 as u16,
                },
                1 => XRefEntry::InUse {
                    offset: field2 as usize,
                    generation: field3 as u16,
                },
                2 => XRefEntry::Compressed {
                    stream_number: field2 as u32,
                    index: field3 as u32,
                },
                // Unknown types are reserved; treat the slot as absent
                _ => continue,
            };
            entries.push((number, entry));
        }
    }

    Ok(Section {
        entries,
        trailer: stream.dict.clone(),
    })
}

fn field_widths(dict: &Dictionary) -> ParseResult<[usize; 3]> {
    let values = dict
        .get_array("W")
        .ok_or_else(|| ParseError::MissingKey("W".to_string()))?;
    if values.len() != 3 {
        return Err(ParseError::InvalidXRef("/W must have 3 entries".to_string()));
    }
    let mut widths = [0usize; 3];
    for (i, value) in values.iter().enumerate() {
        let w = value
            .as_integer()
            .filter(|w| (0..=8).contains(w))
            .ok_or_else(|| ParseError::InvalidXRef("invalid /W field width".to_string()))?;
        widths[i] = w as usize;
    }
    Ok(widths)
}

fn subsection_index(dict: &Dictionary, size: i64) -> ParseResult<Vec<(u32, u32)>> {
    let Some(values) = dict.get_array("Index") else {
        return Ok(vec![(0, size.max(0) as u32)]);
    };
    if values.len() % 2 != 0 {
        return Err(ParseError::InvalidXRef(
            "/Index must hold pairs".to_string(),
        ));
    }
    let mut pairs = Vec::with_capacity(values.len() / 2);
    for chunk in values.chunks_exact(2) {
        let start = chunk[0].as_integer().filter(|v| *v >= 0);
        let count = chunk[1].as_integer().filter(|v| *v >= 0);
        match (start, count) {
            (Some(s), Some(c)) => pairs.push((s as u32, c as u32)),
            _ => {
                return Err(ParseError::InvalidXRef(
                    "invalid /Index entry".to_string(),
                ))
            }
        }
    }
    Ok(pairs)
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)
}

/// Find every `N G obj` header in the file. Later duplicates override
/// earlier ones through the caller's map insert.
pub(crate) fn scan_object_headers(data: &[u8]) -> Vec<(ObjectId, usize)> {
    let mut found = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if &data[i..i + 3] != b"obj" {
            i += 1;
            continue;
        }
        let after_ok = data
            .get(i + 3)
            .map_or(true, |b| lexer::is_whitespace(*b) || lexer::is_delimiter(*b));
        if !after_ok {
            i += 1;
            continue;
        }
        if let Some((id, start)) = backtrack_header(data, i) {
            found.push((id, start));
        }
        i += 3;
    }
    found
}

/// Walk backwards from the `obj` keyword over `ws gen ws num`.
fn backtrack_header(data: &[u8], keyword: usize) -> Option<(ObjectId, usize)> {
    let mut pos = keyword;
    pos = rskip_ws(data, pos)?;
    let (generation, gen_start) = rread_digits(data, pos)?;
    pos = rskip_ws(data, gen_start)?;
    let (number, num_start) = rread_digits(data, pos)?;

    let boundary_ok = num_start == 0
        || lexer::is_whitespace(data[num_start - 1])
        || lexer::is_delimiter(data[num_start - 1]);
    if !boundary_ok {
        return None;
    }

    let generation = u16::try_from(generation).ok()?;
    let number = u32::try_from(number).ok()?;
    Some((ObjectId::new(number, generation), num_start))
}

fn rskip_ws(data: &[u8], mut pos: usize) -> Option<usize> {
    let end = pos;
    while pos > 0 && lexer::is_whitespace(data[pos - 1]) {
        pos -= 1;
    }
    (pos < end).then_some(pos)
}

fn rread_digits(data: &[u8], mut pos: usize) -> Option<(u64, usize)> {
    let end = pos;
    while pos > 0 && data[pos - 1].is_ascii_digit() {
        pos -= 1;
    }
    if pos == end {
        return None;
    }
    let mut value: u64 = 0;
    for b in &data[pos..end] {
        value = value.checked_mul(10)?.checked_add((b - b'0') as u64)?;
    }
    Some((value, pos))
}

fn recover_trailer(data: &[u8], options: &ParseOptions) -> Option<Dictionary> {
    let keyword = data.windows(7).rposition(|w| w == b"trailer")?;
    let mut lexer = Lexer::new_at(data, keyword);
    lexer.next_token().ok()?;
    match parse_object(&mut lexer, options) {
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    }
}

/// Parse scanned objects newest-first until a catalog shows up
fn find_catalog(data: &[u8], table: &XRefTable, options: &ParseOptions) -> Option<ObjectId> {
    let mut candidates: Vec<(u32, usize, u16)> = table
        .entries
        .iter()
        .filter_map(|(n, e)| match e {
            XRefEntry::InUse { offset, generation } => Some((*n, *offset, *generation)),
            _ => None,
        })
        .collect();
    candidates.sort_unstable_by(|a, b| b.1.cmp(&a.1));

    for (number, offset, generation) in candidates {
        let mut lexer = Lexer::new_at(data, offset);
        let id = ObjectId::new(number, generation);
        if let Ok((_, object)) = parse_indirect_object(&mut lexer, options, Some(id), None) {
            if object.as_dict().map(|d| d.get_type()) == Some(Some("Catalog")) {
                return Some(id);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classic_table() {
        let data = b"xref\n0 3\n0000000000 65535 f \n0000000015 00000 n \n0000000099 00001 n \ntrailer\n<< /Size 3 /Root 1 0 R >>\n";
        let (table, trailer) = XRefTable::parse(data, 0, &ParseOptions::strict()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get(0),
            Some(&XRefEntry::Free {
                next_free: 0,
                generation: 65535
            })
        );
        assert_eq!(
            table.get(1),
            Some(&XRefEntry::InUse {
                offset: 15,
                generation: 0
            })
        );
        assert_eq!(
            table.get(2),
            Some(&XRefEntry::InUse {
                offset: 99,
                generation: 1
            })
        );
        assert_eq!(trailer.get_integer("Size"), Some(3));
    }

    #[test]
    fn test_parse_multiple_subsections() {
        let data =
            b"xref\n0 1\n0000000000 65535 f \n4 2\n0000000100 00000 n \n0000000200 00000 n \ntrailer\n<< /Size 6 >>\n";
        let (table, _) = XRefTable::parse(data, 0, &ParseOptions::strict()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(matches!(
            table.get(5),
            Some(XRefEntry::InUse { offset: 200, .. })
        ));
    }

    #[test]
    fn test_prev_chain_newest_entry_wins() {
        let older = b"xref\n0 3\n0000000000 65535 f \n0000000010 00000 n \n0000000020 00000 n \ntrailer\n<< /Size 3 /Root 1 0 R >>\n";
        let mut data = older.to_vec();
        let newer_offset = data.len();
        data.extend_from_slice(
            b"xref\n2 1\n0000000555 00000 n \ntrailer\n<< /Size 3 /Prev 0 >>\n",
        );

        let (table, trailer) =
            XRefTable::parse(&data, newer_offset, &ParseOptions::strict()).unwrap();

        // Object 2 comes from the newer section, object 1 from the older
        assert!(matches!(
            table.get(2),
            Some(XRefEntry::InUse { offset: 555, .. })
        ));
        assert!(matches!(
            table.get(1),
            Some(XRefEntry::InUse { offset: 10, .. })
        ));
        // Root survives the merge from the older trailer
        assert!(trailer.get("Root").is_some());
    }

    #[test]
    fn test_circular_prev_chain() {
        let data = b"xref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 /Prev 0 >>\n";

        let err = XRefTable::parse(data, 0, &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidXRef(_)));

        let (table, _) = XRefTable::parse(data, 0, &ParseOptions::relaxed()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_parse_xref_stream() {
        let rows: Vec<u8> = vec![
            0, 0, 0, 0, // object 0: free
            1, 0, 20, 0, // object 1: in use at offset 20
            2, 0, 5, 3, // object 2: in stream 5 at index 3
        ];
        let mut data = format!(
            "7 0 obj\n<< /Type /XRef /Size 3 /W [1 2 1] /Length {} /Root 1 0 R >>\nstream\n",
            rows.len()
        )
        .into_bytes();
        data.extend_from_slice(&rows);
        data.extend_from_slice(b"\nendstream\nendobj\n");

        let (table, trailer) = XRefTable::parse(&data, 0, &ParseOptions::strict()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get(1),
            Some(&XRefEntry::InUse {
                offset: 20,
                generation: 0
            })
        );
        assert_eq!(
            table.get(2),
            Some(&XRefEntry::Compressed {
                stream_number: 5,
                index: 3
            })
        );
        assert!(trailer.get("Root").is_some());
    }

    #[test]
    fn test_xref_stream_with_index() {
        // Only objects 3 and 4 are covered
        let rows: Vec<u8> = vec![1, 0, 30, 0, 1, 0, 40, 0];
        let mut data = format!(
            "9 0 obj\n<< /Type /XRef /Size 5 /Index [3 2] /W [1 2 1] /Length {} >>\nstream\n",
            rows.len()
        )
        .into_bytes();
        data.extend_from_slice(&rows);
        data.extend_from_slice(b"\nendstream\nendobj\n");

        let (table, _) = XRefTable::parse(&data, 0, &ParseOptions::strict()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get(0).is_none());
        assert!(matches!(
            table.get(4),
            Some(XRefEntry::InUse { offset: 40, .. })
        ));
    }

    #[test]
    fn test_find_startxref() {
        let data = b"%PDF-1.7\nstuff\nstartxref\n123\n%%EOF\n";
        assert_eq!(XRefTable::find_startxref(data).unwrap(), 123);
    }

    #[test]
    fn test_find_startxref_missing() {
        let err = XRefTable::find_startxref(b"%PDF-1.7\nno tail\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidXRef(_)));
    }

    #[test]
    fn test_scan_object_headers() {
        let data = b"1 0 obj null endobj\n12 3 obj true endobj\n";
        let found = scan_object_headers(data);
        assert_eq!(
            found,
            vec![
                (ObjectId::new(1, 0), 0),
                (ObjectId::new(12, 3), 20),
            ]
        );
    }

    #[test]
    fn test_scan_skips_non_headers() {
        // "obj" inside a name and with a non-numeric prefix
        let data = b"/MyObject 5 shapeobj 1 0 obj null endobj";
        let found = scan_object_headers(data);
        assert_eq!(found, vec![(ObjectId::new(1, 0), 21)]);
    }

    #[test]
    fn test_rebuild_from_scan() {
        let data = b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n";
        let (table, trailer) =
            XRefTable::rebuild_from_scan(data, &ParseOptions::relaxed()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            trailer.get("Root").and_then(Object::as_reference),
            Some(ObjectId::new(1, 0))
        );
        assert_eq!(trailer.get_integer("Size"), Some(3));
    }

    #[test]
    fn test_rebuild_newest_duplicate_wins() {
        let first = b"1 0 obj\n<< /Type /Catalog >>\nendobj\n".to_vec();
        let mut data = first.clone();
        let second_offset = data.len();
        data.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        let (table, _) = XRefTable::rebuild_from_scan(&data, &ParseOptions::relaxed()).unwrap();
        assert_eq!(
            table.get(1),
            Some(&XRefEntry::InUse {
                offset: second_offset,
                generation: 0
            })
        );
    }
}
