//! Document-level container reading.
//!
//! [`PdfReader`] loads a file into memory, locates the cross-reference
//! table and hands out parsed objects on demand. Parsed objects are
//! cached by object number, matching the one-live-object-per-number
//! model of the cross-reference table.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::warn;

use super::header::{PdfHeader, PdfVersion};
use super::lexer::{Lexer, Token};
use super::objects::{parse_indirect_object, parse_object};
use super::trailer::PdfTrailer;
use super::xref::{self, XRefEntry, XRefTable};
use super::{ParseError, ParseOptions, ParseResult};
use crate::objects::{Dictionary, Object, ObjectId};

/// Reads a PDF file and resolves indirect objects.
#[derive(Debug)]
pub struct PdfReader {
    data: Vec<u8>,
    header: PdfHeader,
    xref: XRefTable,
    trailer: PdfTrailer,
    options: ParseOptions,
    cache: HashMap<u32, Object>,
    object_streams: HashMap<u32, ObjectStream>,
    /// Offsets recovered by scanning, built on the first stale entry
    scan_map: Option<HashMap<u32, usize>>,
}

/// A decoded `/Type /ObjStm` payload with its object directory
#[derive(Debug)]
struct ObjectStream {
    data: Vec<u8>,
    first: usize,
    pairs: Vec<(u32, usize)>,
}

impl PdfReader {
    /// Open a file with strict parsing
    pub fn open(path: impl AsRef<Path>) -> ParseResult<Self> {
        Self::open_with_options(path, ParseOptions::strict())
    }

    /// Open a file with explicit parsing options
    pub fn open_with_options(
        path: impl AsRef<Path>,
        options: ParseOptions,
    ) -> ParseResult<Self> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::from_bytes(data, options)
    }

    /// Read a whole stream into memory and parse it
    pub fn from_reader<R: Read>(mut reader: R, options: ParseOptions) -> ParseResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data, options)
    }

    /// Parse an in-memory file
    pub fn from_bytes(data: Vec<u8>, options: ParseOptions) -> ParseResult<Self> {
        let header = PdfHeader::parse(&data, &options)?;
        // Offsets are relative to the marker when junk precedes it
        let data = if header.offset > 0 {
            data[header.offset..].to_vec()
        } else {
            data
        };

        let located = XRefTable::find_startxref(&data)
            .and_then(|start| XRefTable::parse(&data, start, &options))
            .and_then(|(xref, trailer)| {
                // A table without a catalog pointer is no better than none
                if trailer.get("Root").and_then(Object::as_reference).is_none() {
                    Err(ParseError::MissingKey("Root".to_string()))
                } else {
                    Ok((xref, trailer))
                }
            });

        let (xref, trailer_dict) = match located {
            Ok(found) => found,
            Err(err) if options.rebuild_xref => {
                warn!("cross-reference table unusable ({}), rebuilding by scan", err);
                XRefTable::rebuild_from_scan(&data, &options)?
            }
            Err(err) => return Err(err),
        };

        let trailer = PdfTrailer::from_dict(trailer_dict);
        if trailer.is_encrypted() && !options.ignore_encryption {
            return Err(ParseError::EncryptionNotSupported);
        }

        Ok(Self {
            data,
            header,
            xref,
            trailer,
            options,
            cache: HashMap::new(),
            object_streams: HashMap::new(),
            scan_map: None,
        })
    }

    pub fn version(&self) -> PdfVersion {
        self.header.version
    }

    pub fn trailer(&self) -> &PdfTrailer {
        &self.trailer
    }

    pub fn xref(&self) -> &XRefTable {
        &self.xref
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// The document catalog
    pub fn catalog(&mut self) -> ParseResult<Dictionary> {
        let root = self.trailer.root()?;
        self.get_object(root)?
            .as_dict()
            .cloned()
            .ok_or(ParseError::InvalidTrailer)
    }

    /// Resolve a reference one level; non-references pass through
    pub fn resolve<'a>(&'a mut self, object: &'a Object) -> ParseResult<&'a Object> {
        match object {
            Object::Reference(id) => self.get_object(*id),
            _ => Ok(object),
        }
    }

    /// Fetch an object by id, parsing and caching it on first use
    pub fn get_object(&mut self, id: ObjectId) -> ParseResult<&Object> {
        if !self.cache.contains_key(&id.number()) {
            let object = self.load_object(id)?;
            self.cache.insert(id.number(), object);
        }
        self.cache
            .get(&id.number())
            .ok_or_else(|| ParseError::InvalidReference(id.number(), id.generation()))
    }

    fn load_object(&mut self, id: ObjectId) -> ParseResult<Object> {
        let entry = match self.xref.get(id.number()) {
            Some(entry) => *entry,
            None => return self.missing_object(id),
        };

        match entry {
            XRefEntry::Free { .. } => self.missing_object(id),
            XRefEntry::InUse { offset, generation } => {
                if generation != id.generation() && !self.options.lenient_syntax {
                    return Err(ParseError::InvalidReference(id.number(), id.generation()));
                }
                self.load_at_offset(id, offset)
            }
            XRefEntry::Compressed {
                stream_number,
                index,
            } => self.load_compressed(id, stream_number, index),
        }
    }

    fn load_at_offset(&mut self, id: ObjectId, offset: usize) -> ParseResult<Object> {
        let attempt = {
            let resolver = |len_id: ObjectId| {
                resolve_stream_length(&self.data, &self.xref, &self.options, len_id)
            };
            let mut lexer = Lexer::new_at(&self.data, offset);
            parse_indirect_object(&mut lexer, &self.options, Some(id), Some(&resolver))
        };

        match attempt {
            Ok((actual, object)) if actual.number() == id.number() => return Ok(object),
            _ if !self.options.lenient_syntax => return attempt.map(|(_, object)| object),
            _ => {}
        }

        // The recorded offset is stale or damaged; fall back to scanning
        warn!("object {} not found at recorded offset {}, scanning", id, offset);
        let Some(scanned) = self.scanned_offset(id) else {
            return Ok(Object::Null);
        };
        let resolver = |len_id: ObjectId| {
            resolve_stream_length(&self.data, &self.xref, &self.options, len_id)
        };
        let mut lexer = Lexer::new_at(&self.data, scanned);
        match parse_indirect_object(&mut lexer, &self.options, Some(id), Some(&resolver)) {
            Ok((actual, object)) if actual.number() == id.number() => Ok(object),
            _ => Ok(Object::Null),
        }
    }

    fn scanned_offset(&mut self, id: ObjectId) -> Option<usize> {
        let map = self.scan_map.get_or_insert_with(|| {
            let mut map = HashMap::new();
            for (found, offset) in xref::scan_object_headers(&self.data) {
                map.insert(found.number(), offset);
            }
            map
        });
        map.get(&id.number()).copied()
    }

    fn missing_object(&self, id: ObjectId) -> ParseResult<Object> {
        if self.options.lenient_syntax {
            Ok(Object::Null)
        } else {
            Err(ParseError::InvalidReference(id.number(), id.generation()))
        }
    }

    fn load_compressed(
        &mut self,
        id: ObjectId,
        stream_number: u32,
        index: u32,
    ) -> ParseResult<Object> {
        self.ensure_object_stream(stream_number)?;
        let stream = self
            .object_streams
            .get(&stream_number)
            .ok_or_else(|| ParseError::InvalidReference(id.number(), id.generation()))?;

        let directory_entry = stream
            .pairs
            .get(index as usize)
            .filter(|(number, _)| *number == id.number())
            .or_else(|| {
                // Index and directory disagree; trust the directory
                stream.pairs.iter().find(|(number, _)| *number == id.number())
            });
        let Some((_, offset)) = directory_entry else {
            return if self.options.lenient_syntax {
                Ok(Object::Null)
            } else {
                Err(ParseError::InvalidReference(id.number(), id.generation()))
            };
        };

        let mut lexer = Lexer::new_at(&stream.data, stream.first + offset);
        parse_object(&mut lexer, &self.options)
    }

    fn ensure_object_stream(&mut self, stream_number: u32) -> ParseResult<()> {
        if self.object_streams.contains_key(&stream_number) {
            return Ok(());
        }
        let offset = match self.xref.get(stream_number) {
            Some(XRefEntry::InUse { offset, .. }) => *offset,
            _ => return Err(ParseError::InvalidReference(stream_number, 0)),
        };

        let object = {
            let resolver = |len_id: ObjectId| {
                resolve_stream_length(&self.data, &self.xref, &self.options, len_id)
            };
            let mut lexer = Lexer::new_at(&self.data, offset);
            let expected = ObjectId::new(stream_number, 0);
            parse_indirect_object(&mut lexer, &self.options, Some(expected), Some(&resolver))?.1
        };
        let stream = object.as_stream().ok_or_else(|| ParseError::SyntaxError {
            position: offset,
            message: format!("object {stream_number} is not an object stream"),
        })?;
        if stream.dict.get_type() != Some("ObjStm") && !self.options.lenient_syntax {
            return Err(ParseError::SyntaxError {
                position: offset,
                message: "stream is not of /Type /ObjStm".to_string(),
            });
        }

        let count = stream
            .dict
            .get_integer("N")
            .filter(|n| *n >= 0)
            .ok_or_else(|| ParseError::MissingKey("N".to_string()))?;
        let first = stream
            .dict
            .get_integer("First")
            .filter(|f| *f >= 0)
            .ok_or_else(|| ParseError::MissingKey("First".to_string()))?;
        let data = stream
            .decode()
            .map_err(|e| ParseError::StreamDecode(e.to_string()))?;

        let mut pairs = Vec::with_capacity(count as usize);
        let mut directory = Lexer::new(&data);
        for _ in 0..count {
            let number = directory.next_token()?;
            let offset = directory.next_token()?;
            match (number, offset) {
                (Token::Integer(n), Token::Integer(o)) if n >= 0 && o >= 0 => {
                    pairs.push((n as u32, o as usize))
                }
                _ if self.options.lenient_syntax => break,
                _ => {
                    return Err(ParseError::SyntaxError {
                        position: directory.position(),
                        message: "malformed object stream directory".to_string(),
                    })
                }
            }
        }

        self.object_streams.insert(
            stream_number,
            ObjectStream {
                data,
                first: first as usize,
                pairs,
            },
        );
        Ok(())
    }
}

/// Resolve an indirect `/Length` without touching the object cache.
/// Length objects are plain integers, so one level of parsing suffices.
fn resolve_stream_length(
    data: &[u8],
    xref: &XRefTable,
    options: &ParseOptions,
    id: ObjectId,
) -> Option<i64> {
    match xref.get(id.number())? {
        XRefEntry::InUse { offset, .. } => {
            let mut lexer = Lexer::new_at(data, *offset);
            let (_, object) = parse_indirect_object(&mut lexer, options, Some(id), None).ok()?;
            object.as_integer()
        }
        _ => None,
    }
}
