//! Trailer dictionary access.

use super::{ParseError, ParseResult};
use crate::objects::{Dictionary, Object, ObjectId};

/// The merged trailer of a document.
///
/// For files with incremental updates this is the union of all trailer
/// dictionaries, newest values winning.
#[derive(Debug, Clone)]
pub struct PdfTrailer {
    dict: Dictionary,
}

impl PdfTrailer {
    pub fn from_dict(dict: Dictionary) -> Self {
        Self { dict }
    }

    /// The catalog reference. Required for any usable document.
    pub fn root(&self) -> ParseResult<ObjectId> {
        self.dict
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| ParseError::MissingKey("Root".to_string()))
    }

    /// The document information dictionary reference, when present
    pub fn info(&self) -> Option<ObjectId> {
        self.dict.get("Info").and_then(Object::as_reference)
    }

    pub fn size(&self) -> Option<i64> {
        self.dict.get_integer("Size")
    }

    pub fn is_encrypted(&self) -> bool {
        self.dict.contains_key("Encrypt")
    }

    pub fn dict(&self) -> &Dictionary {
        &self.dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_required() {
        let mut dict = Dictionary::new();
        dict.set("Size", Object::Integer(4));

        let trailer = PdfTrailer::from_dict(dict.clone());
        assert!(matches!(
            trailer.root(),
            Err(ParseError::MissingKey(ref k)) if k == "Root"
        ));

        dict.set("Root", Object::Reference(ObjectId::new(1, 0)));
        let trailer = PdfTrailer::from_dict(dict);
        assert_eq!(trailer.root().unwrap(), ObjectId::new(1, 0));
        assert_eq!(trailer.size(), Some(4));
    }

    #[test]
    fn test_info_is_optional() {
        let trailer = PdfTrailer::from_dict(Dictionary::new());
        assert!(trailer.info().is_none());
    }

    #[test]
    fn test_encryption_detection() {
        let mut dict = Dictionary::new();
        assert!(!PdfTrailer::from_dict(dict.clone()).is_encrypted());
        dict.set("Encrypt", Object::Reference(ObjectId::new(9, 0)));
        assert!(PdfTrailer::from_dict(dict).is_encrypted());
    }
}
