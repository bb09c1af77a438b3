//! PDF object model shared by the parser, the page operations and the writer.
//!
//! Everything a document holds is an [`Object`]; indirect objects are stored
//! in the document's object map keyed by [`ObjectId`] and referenced through
//! [`Object::Reference`].

use crate::error::{PdfError, Result};
use std::collections::BTreeMap;

/// Identifier of an indirect object: object number plus generation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// Any value the container format can express.
///
/// Strings are kept as raw bytes; PDF string objects are byte strings and
/// only sometimes hold text.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Vec<u8>),
    Name(String),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Stream(Stream),
    Reference(ObjectId),
}

impl Object {
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an integer or real object.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_string_bytes(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// String content decoded as UTF-8, replacing invalid sequences.
    pub fn as_str_lossy(&self) -> Option<String> {
        match self {
            Object::String(s) => Some(String::from_utf8_lossy(s).into_owned()),
            _ => None,
        }
    }

    /// String content decoded with text-string semantics: UTF-16BE when
    /// the byte-order mark is present, byte text otherwise.
    pub fn as_text_string(&self) -> Option<String> {
        let bytes = self.as_string_bytes()?;
        if let Some(utf16) = bytes.strip_prefix(&[0xfe, 0xff]) {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Some(String::from_utf16_lossy(&units))
        } else {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Object>> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&mut s.dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_stream_mut(&mut self) -> Option<&mut Stream> {
        match self {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// A `[llx lly urx ury]` rectangle array, when this object is one.
    pub fn as_rectangle(&self) -> Option<[f64; 4]> {
        let arr = self.as_array()?;
        if arr.len() != 4 {
            return None;
        }
        let mut out = [0.0; 4];
        for (slot, obj) in out.iter_mut().zip(arr.iter()) {
            *slot = obj.as_real()?;
        }
        Some(out)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Boolean(b)
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Object::Integer(i)
    }
}

impl From<f64> for Object {
    fn from(r: f64) -> Self {
        Object::Real(r)
    }
}

impl From<ObjectId> for Object {
    fn from(id: ObjectId) -> Self {
        Object::Reference(id)
    }
}

impl From<Dictionary> for Object {
    fn from(d: Dictionary) -> Self {
        Object::Dictionary(d)
    }
}

impl From<Vec<Object>> for Object {
    fn from(a: Vec<Object>) -> Self {
        Object::Array(a)
    }
}

/// A PDF dictionary.
///
/// Backed by a `BTreeMap` so repeated serialization of the same document is
/// byte-stable; key order carries no meaning in the container format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary(BTreeMap<String, Object>);

impl Dictionary {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.0.iter()
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&String, &mut Object)> {
        self.0.iter_mut()
    }

    /// Value of the `/Type` entry, when present and a name.
    pub fn get_type(&self) -> Option<&str> {
        self.get("Type").and_then(Object::as_name)
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(Object::as_dict)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Object>> {
        self.get(key).and_then(Object::as_array)
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Object::as_integer)
    }

    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Object::as_name)
    }
}

/// A stream object: dictionary plus raw (possibly encoded) data.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub dict: Dictionary,
    pub data: Vec<u8>,
}

impl Stream {
    pub fn new(data: Vec<u8>) -> Self {
        let mut dict = Dictionary::new();
        dict.set("Length", data.len() as i64);
        Self { dict, data }
    }

    pub fn with_dictionary(dict: Dictionary, data: Vec<u8>) -> Self {
        Self { dict, data }
    }

    /// Name of the (single) filter applied to the data, if any.
    ///
    /// A one-element filter array is treated like a bare name; longer filter
    /// chains are reported as-is by `decode` failing.
    pub fn filter_name(&self) -> Option<&str> {
        match self.dict.get("Filter") {
            Some(Object::Name(n)) => Some(n),
            Some(Object::Array(a)) if a.len() == 1 => a[0].as_name(),
            _ => None,
        }
    }

    /// Decoded stream content.
    ///
    /// Supports unfiltered data and FlateDecode (with optional PNG
    /// predictors). Anything else is an error rather than silently returning
    /// encoded bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        match self.dict.get("Filter") {
            None => Ok(self.data.clone()),
            Some(Object::Array(a)) if a.is_empty() => Ok(self.data.clone()),
            _ => match self.filter_name() {
                Some("FlateDecode") => {
                    let inflated = flate_decompress(&self.data)?;
                    self.apply_predictor(inflated)
                }
                Some(other) => Err(PdfError::CompressionError(format!(
                    "unsupported stream filter: {other}"
                ))),
                None => Err(PdfError::CompressionError(
                    "unsupported stream filter chain".to_string(),
                )),
            },
        }
    }

    /// Compress the data with Flate and update the stream dictionary.
    ///
    /// Does nothing if a filter is already applied.
    #[cfg(feature = "compression")]
    pub fn compress_flate(&mut self) -> Result<()> {
        if self.dict.contains_key("Filter") {
            return Ok(());
        }
        self.data = flate_compress(&self.data)?;
        self.dict.set("Filter", Object::Name("FlateDecode".to_string()));
        self.dict.set("Length", self.data.len() as i64);
        Ok(())
    }

    /// Undo PNG-style predictors declared in `/DecodeParms`.
    fn apply_predictor(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        let parms = match self.dict.get("DecodeParms").and_then(Object::as_dict) {
            Some(p) => p,
            None => return Ok(data),
        };
        let predictor = parms.get_integer("Predictor").unwrap_or(1);
        if predictor <= 1 {
            return Ok(data);
        }
        if predictor < 10 {
            return Err(PdfError::CompressionError(format!(
                "unsupported predictor: {predictor}"
            )));
        }

        let colors = parms.get_integer("Colors").unwrap_or(1) as usize;
        let bpc = parms.get_integer("BitsPerComponent").unwrap_or(8) as usize;
        let columns = parms.get_integer("Columns").unwrap_or(1) as usize;
        let bytes_per_pixel = (colors * bpc).div_ceil(8);
        let row_len = (columns * colors * bpc).div_ceil(8);

        png_unpredict(&data, row_len, bytes_per_pixel)
    }
}

/// Reverse PNG row predictors (each row is prefixed with its filter byte).
fn png_unpredict(data: &[u8], row_len: usize, bpp: usize) -> Result<Vec<u8>> {
    if row_len == 0 {
        return Err(PdfError::CompressionError(
            "predictor row length is zero".to_string(),
        ));
    }
    let stride = row_len + 1;
    let mut out: Vec<u8> = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; row_len];

    for chunk in data.chunks(stride) {
        if chunk.len() < 2 {
            break;
        }
        let filter = chunk[0];
        let mut row = chunk[1..].to_vec();
        match filter {
            0 => {}
            1 => {
                for i in bpp..row.len() {
                    row[i] = row[i].wrapping_add(row[i - bpp]);
                }
            }
            2 => {
                for i in 0..row.len() {
                    row[i] = row[i].wrapping_add(prev_row[i]);
                }
            }
            3 => {
                for i in 0..row.len() {
                    let left = if i >= bpp { row[i - bpp] as u16 } else { 0 };
                    let up = prev_row[i] as u16;
                    row[i] = row[i].wrapping_add(((left + up) / 2) as u8);
                }
            }
            4 => {
                for i in 0..row.len() {
                    let left = if i >= bpp { row[i - bpp] as i16 } else { 0 };
                    let up = prev_row[i] as i16;
                    let up_left = if i >= bpp { prev_row[i - bpp] as i16 } else { 0 };
                    row[i] = row[i].wrapping_add(paeth(left, up, up_left));
                }
            }
            other => {
                return Err(PdfError::CompressionError(format!(
                    "unknown PNG predictor filter: {other}"
                )));
            }
        }
        prev_row.clone_from(&row);
        out.extend_from_slice(&row);
    }

    Ok(out)
}

fn paeth(a: i16, b: i16, c: i16) -> u8 {
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

/// Compress data using Flate/Zlib compression.
#[cfg(feature = "compression")]
pub fn flate_compress(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(PdfError::Io)?;
    encoder.finish().map_err(PdfError::Io)
}

/// Decompress Flate/Zlib data.
#[cfg(feature = "compression")]
pub fn flate_decompress(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(PdfError::Io)?;
    Ok(decompressed)
}

#[cfg(not(feature = "compression"))]
pub fn flate_decompress(_data: &[u8]) -> Result<Vec<u8>> {
    Err(PdfError::CompressionError(
        "flate support disabled (enable the `compression` feature)".to_string(),
    ))
}
