//! In-memory document model.
//!
//! [`PdfDocument`] owns the complete object graph of a parsed file plus an
//! ordered list of its pages. Inheritable page attributes (media box, crop
//! box, rotation, resources) are materialized onto each page at load time,
//! so pages stay self-contained when they are copied between documents.
//!
//! Object identity is tracked by object number. Output files are fully
//! renumbered on save, so numbers only need to be unique within one
//! document instance.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{PdfError, Result};
use crate::geometry::Rectangle;
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::parser::{ParseOptions, PdfReader, PdfVersion};
use crate::writer::PdfWriter;

/// Page size applied when a page carries no media box at all
pub const DEFAULT_PAGE_SIZE: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

const MAX_PAGE_TREE_DEPTH: usize = 50;

static NULL_OBJECT: Object = Object::Null;

/// A loaded document: object graph plus ordered page list.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub(crate) objects: BTreeMap<u32, Object>,
    pub(crate) pages: Vec<u32>,
    pub(crate) catalog_number: u32,
    pub(crate) info_number: Option<u32>,
    version: PdfVersion,
    next_number: u32,
}

/// Document information entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

impl PdfDocument {
    /// Parse a document from bytes, rejecting malformed files
    pub fn load(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(PdfReader::from_bytes(data, ParseOptions::strict())?)
    }

    /// Parse a document from bytes, recovering from damage where possible
    pub fn load_relaxed(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(PdfReader::from_bytes(data, ParseOptions::relaxed())?)
    }

    /// Read and parse a file with strict parsing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::strict())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::from_reader(PdfReader::from_bytes(data, options)?)
    }

    /// Materialize the full object graph out of a reader
    pub fn from_reader(mut reader: PdfReader) -> Result<Self> {
        let version = reader.version();
        let catalog_id = reader.trailer().root()?;
        let info_id = reader.trailer().info();

        let catalog = reader.catalog()?;
        let pages_root = catalog
            .get("Pages")
            .and_then(Object::as_reference)
            .ok_or_else(|| PdfError::InvalidStructure("catalog has no /Pages".to_string()))?;

        let mut flattened = Vec::new();
        let mut visited = HashSet::new();
        collect_pages(
            &mut reader,
            pages_root,
            &Inherited::default(),
            &mut flattened,
            &mut visited,
            0,
        )?;

        let mut objects = BTreeMap::new();
        for number in reader.xref().in_use_numbers() {
            let generation = match reader.xref().get(number) {
                Some(crate::parser::XRefEntry::InUse { generation, .. }) => *generation,
                _ => 0,
            };
            match reader.get_object(ObjectId::new(number, generation)) {
                Ok(object) => {
                    objects.insert(number, object.clone());
                }
                Err(err) => {
                    if !reader.options().lenient_syntax {
                        return Err(err.into());
                    }
                }
            }
        }

        let mut pages = Vec::with_capacity(flattened.len());
        for (number, dict) in flattened {
            pages.push(number);
            objects.insert(number, Object::Dictionary(dict));
        }

        let next_number = objects.keys().max().copied().unwrap_or(0) + 1;
        Ok(Self {
            objects,
            pages,
            catalog_number: catalog_id.number(),
            info_number: info_id.map(|id| id.number()),
            version,
            next_number,
        })
    }

    /// A document with no pages, ready to receive copies
    pub fn empty() -> Self {
        let mut objects = BTreeMap::new();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name("Catalog".to_string()));
        catalog.set("Pages", Object::Reference(ObjectId::new(2, 0)));
        objects.insert(1, Object::Dictionary(catalog));

        let mut tree = Dictionary::new();
        tree.set("Type", Object::Name("Pages".to_string()));
        tree.set("Kids", Object::Array(Vec::new()));
        tree.set("Count", Object::Integer(0));
        objects.insert(2, Object::Dictionary(tree));

        Self {
            objects,
            pages: Vec::new(),
            catalog_number: 1,
            info_number: None,
            version: PdfVersion::default(),
            next_number: 3,
        }
    }

    pub fn version(&self) -> PdfVersion {
        self.version
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize with renumbered objects and a rebuilt page tree
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PdfWriter::new(&mut buffer).write_document(self)?;
        Ok(buffer)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        PdfWriter::new(&mut writer).write_document(self)?;
        writer.flush()?;
        Ok(())
    }

    /// Resolve a reference against this document's graph
    pub(crate) fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.objects.get(&id.number()).unwrap_or(&NULL_OBJECT),
            _ => object,
        }
    }

    fn page_number_at(&self, index: usize) -> Result<u32> {
        self.pages
            .get(index)
            .copied()
            .ok_or(PdfError::InvalidPageNumber(index as u32))
    }

    pub(crate) fn page_dict(&self, index: usize) -> Result<&Dictionary> {
        let number = self.page_number_at(index)?;
        self.objects
            .get(&number)
            .and_then(Object::as_dict)
            .ok_or_else(|| PdfError::InvalidStructure(format!("page {index} is not a dictionary")))
    }

    fn page_dict_mut(&mut self, index: usize) -> Result<&mut Dictionary> {
        let number = self.page_number_at(index)?;
        self.objects
            .get_mut(&number)
            .and_then(Object::as_dict_mut)
            .ok_or_else(|| PdfError::InvalidStructure(format!("page {index} is not a dictionary")))
    }

    /// The effective media box of a page
    pub fn page_media_box(&self, index: usize) -> Result<Rectangle> {
        let dict = self.page_dict(index)?;
        let rect = dict
            .get("MediaBox")
            .map(|b| self.resolve(b))
            .and_then(Object::as_rectangle)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(Rectangle::from_array(rect))
    }

    /// Page width and height in points, media box order normalized
    pub fn page_size(&self, index: usize) -> Result<(f64, f64)> {
        let rect = self.page_media_box(index)?;
        Ok((rect.width(), rect.height()))
    }

    /// Page rotation normalized to 0, 90, 180 or 270
    pub fn page_rotation(&self, index: usize) -> Result<i32> {
        let dict = self.page_dict(index)?;
        let raw = dict
            .get("Rotate")
            .map(|r| self.resolve(r))
            .and_then(Object::as_integer)
            .unwrap_or(0);
        Ok(normalize_rotation(raw))
    }

    pub fn page_crop_box(&self, index: usize) -> Result<Option<Rectangle>> {
        let dict = self.page_dict(index)?;
        Ok(dict
            .get("CropBox")
            .map(|b| self.resolve(b))
            .and_then(Object::as_rectangle)
            .map(Rectangle::from_array))
    }

    /// Decoded page content, streams concatenated in order
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>> {
        let dict = self.page_dict(index)?;
        let mut content = Vec::new();
        match dict.get("Contents") {
            None => {}
            Some(Object::Array(parts)) => {
                for part in parts {
                    self.append_stream_data(part, &mut content)?;
                }
            }
            Some(single) => self.append_stream_data(single, &mut content)?,
        }
        Ok(content)
    }

    fn append_stream_data(&self, entry: &Object, out: &mut Vec<u8>) -> Result<()> {
        if let Some(stream) = self.resolve(entry).as_stream() {
            if !out.is_empty() {
                // Stream boundaries count as whitespace between operators
                out.push(b'\n');
            }
            out.extend_from_slice(&stream.decode()?);
        }
        Ok(())
    }

    /// Add to a page's rotation; the result is stored normalized
    pub fn add_page_rotation(&mut self, index: usize, degrees: i32) -> Result<()> {
        let current = self.page_rotation(index)?;
        let dict = self.page_dict_mut(index)?;
        dict.set(
            "Rotate",
            Object::Integer(normalize_rotation(current as i64 + degrees as i64) as i64),
        );
        Ok(())
    }

    pub fn set_page_crop_box(&mut self, index: usize, rect: Rectangle) -> Result<()> {
        let value = rect.to_array_object();
        let dict = self.page_dict_mut(index)?;
        dict.set("CropBox", value);
        Ok(())
    }

    /// Append a content stream drawn after the existing page content
    pub fn append_page_content(&mut self, index: usize, content: Vec<u8>) -> Result<()> {
        self.page_number_at(index)?;
        let number = self.insert_object(Object::Stream(Stream::new(content)));
        let reference = Object::Reference(ObjectId::new(number, 0));

        let dict = self.page_dict_mut(index)?;
        match dict.get_mut("Contents") {
            Some(Object::Array(parts)) => parts.push(reference),
            Some(existing) => {
                let first = existing.clone();
                *existing = Object::Array(vec![first, reference]);
            }
            None => dict.set("Contents", reference),
        }
        Ok(())
    }

    /// Register a standard font under `name` in the page's resources.
    /// Font objects are shared across pages of the same document.
    pub fn ensure_page_font(&mut self, index: usize, name: &str, base_font: &str) -> Result<()> {
        let font_number = self.find_or_create_font(base_font);
        self.inline_page_resources(index)?;

        let fonts = self.resource_category_mut(index, "Font")?;
        if !fonts.contains_key(name) {
            fonts.set(name, Object::Reference(ObjectId::new(font_number, 0)));
        }
        Ok(())
    }

    /// Register a graphics state with constant alpha under `name`
    pub fn ensure_page_ext_gstate(&mut self, index: usize, name: &str, alpha: f64) -> Result<()> {
        let state_number = self.find_or_create_ext_gstate(alpha);
        self.inline_page_resources(index)?;

        let states = self.resource_category_mut(index, "ExtGState")?;
        if !states.contains_key(name) {
            states.set(name, Object::Reference(ObjectId::new(state_number, 0)));
        }
        Ok(())
    }

    fn find_or_create_font(&mut self, base_font: &str) -> u32 {
        let existing = self.objects.iter().find(|(_, object)| {
            object.as_dict().is_some_and(|d| {
                d.get_type() == Some("Font")
                    && d.get_name("Subtype") == Some("Type1")
                    && d.get_name("BaseFont") == Some(base_font)
            })
        });
        if let Some((number, _)) = existing {
            return *number;
        }

        let mut font = Dictionary::new();
        font.set("Type", Object::Name("Font".to_string()));
        font.set("Subtype", Object::Name("Type1".to_string()));
        font.set("BaseFont", Object::Name(base_font.to_string()));
        self.insert_object(Object::Dictionary(font))
    }

    fn find_or_create_ext_gstate(&mut self, alpha: f64) -> u32 {
        let existing = self.objects.iter().find(|(_, object)| {
            object.as_dict().is_some_and(|d| {
                d.get_type() == Some("ExtGState")
                    && d.get("ca").and_then(Object::as_real) == Some(alpha)
            })
        });
        if let Some((number, _)) = existing {
            return *number;
        }

        let mut state = Dictionary::new();
        state.set("Type", Object::Name("ExtGState".to_string()));
        state.set("ca", Object::Real(alpha));
        state.set("CA", Object::Real(alpha));
        self.insert_object(Object::Dictionary(state))
    }

    /// Turn a page's `/Resources` (and its Font and ExtGState entries)
    /// into direct dictionaries owned by the page, copying shared ones.
    fn inline_page_resources(&mut self, index: usize) -> Result<()> {
        let current = self.page_dict(index)?.get("Resources").cloned();
        let mut resources = match current {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Reference(id)) => self
                .objects
                .get(&id.number())
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_default(),
            _ => Dictionary::new(),
        };

        for category in ["Font", "ExtGState"] {
            if let Some(Object::Reference(id)) = resources.get(category).cloned() {
                let inlined = self
                    .objects
                    .get(&id.number())
                    .and_then(Object::as_dict)
                    .cloned()
                    .unwrap_or_default();
                resources.set(category, Object::Dictionary(inlined));
            }
        }

        self.page_dict_mut(index)?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    /// A named sub-dictionary of inlined page resources, created on demand
    fn resource_category_mut(&mut self, index: usize, category: &str) -> Result<&mut Dictionary> {
        let resources = self
            .page_dict_mut(index)?
            .get_mut("Resources")
            .and_then(Object::as_dict_mut)
            .ok_or_else(|| {
                PdfError::InvalidStructure("page resources are not a dictionary".to_string())
            })?;
        if resources.get(category).and_then(Object::as_dict).is_none() {
            resources.set(category, Object::Dictionary(Dictionary::new()));
        }
        resources
            .get_mut(category)
            .and_then(Object::as_dict_mut)
            .ok_or_else(|| {
                PdfError::InvalidStructure(format!("page resource /{category} is unusable"))
            })
    }

    /// Copy one page and everything it references out of another document.
    ///
    /// The whole subtree below the page dictionary is cloned with fresh
    /// object numbers; only the `/Parent` link is left behind, since the
    /// page joins this document's tree on save. Copying the same source
    /// page twice yields two independent pages.
    pub fn copy_page_from(&mut self, source: &PdfDocument, page_index: usize) -> Result<()> {
        let source_number = source
            .pages
            .get(page_index)
            .copied()
            .ok_or(PdfError::InvalidPageNumber(page_index as u32))?;

        let mut mapping: BTreeMap<u32, u32> = BTreeMap::new();
        let mut stack = vec![source_number];
        while let Some(number) = stack.pop() {
            if mapping.contains_key(&number) {
                continue;
            }
            let Some(object) = source.objects.get(&number) else {
                continue;
            };
            mapping.insert(number, self.allocate_number());
            collect_references(object, &mut stack);
        }

        for (old, new) in &mapping {
            let Some(object) = source.objects.get(old) else {
                continue;
            };
            self.objects.insert(*new, remap_object(object, &mapping));
        }

        let new_page = mapping.get(&source_number).copied().ok_or_else(|| {
            PdfError::InvalidStructure("page subtree could not be copied".to_string())
        })?;
        if let Some(dict) = self.objects.get_mut(&new_page).and_then(Object::as_dict_mut) {
            dict.remove("Parent");
        }
        self.pages.push(new_page);
        Ok(())
    }

    /// Document information entries, when an information dictionary exists
    pub fn metadata(&self) -> DocumentMetadata {
        let Some(info) = self
            .info_number
            .and_then(|n| self.objects.get(&n))
            .and_then(Object::as_dict)
        else {
            return DocumentMetadata::default();
        };
        let text = |key: &str| info.get(key).map(|v| self.resolve(v)).and_then(Object::as_text_string);
        DocumentMetadata {
            title: text("Title"),
            author: text("Author"),
            subject: text("Subject"),
            keywords: text("Keywords"),
            creator: text("Creator"),
            producer: text("Producer"),
        }
    }

    pub fn set_title(&mut self, value: &str) {
        self.set_info_entry("Title", value);
    }

    pub fn set_author(&mut self, value: &str) {
        self.set_info_entry("Author", value);
    }

    pub fn set_subject(&mut self, value: &str) {
        self.set_info_entry("Subject", value);
    }

    pub fn set_keywords(&mut self, value: &str) {
        self.set_info_entry("Keywords", value);
    }

    pub fn set_creator(&mut self, value: &str) {
        self.set_info_entry("Creator", value);
    }

    pub fn set_producer(&mut self, value: &str) {
        self.set_info_entry("Producer", value);
    }

    /// Record when the document was last changed
    pub fn set_modification_date(&mut self, when: chrono::DateTime<chrono::Utc>) {
        let formatted = crate::writer::format_pdf_date(when);
        self.set_info_entry("ModDate", &formatted);
    }

    fn set_info_entry(&mut self, key: &str, value: &str) {
        let number = match self.info_number {
            Some(number) if self.objects.get(&number).and_then(Object::as_dict).is_some() => {
                number
            }
            _ => {
                let number = self.insert_object(Object::Dictionary(Dictionary::new()));
                self.info_number = Some(number);
                number
            }
        };
        if let Some(info) = self.objects.get_mut(&number).and_then(Object::as_dict_mut) {
            info.set(key, Object::String(value.as_bytes().to_vec()));
        }
    }

    pub(crate) fn insert_object(&mut self, object: Object) -> u32 {
        let number = self.allocate_number();
        self.objects.insert(number, object);
        number
    }

    fn allocate_number(&mut self) -> u32 {
        let number = self.next_number;
        self.next_number += 1;
        number
    }
}

fn normalize_rotation(raw: i64) -> i32 {
    let wrapped = raw.rem_euclid(360) as i32;
    wrapped - wrapped % 90
}

/// Inheritable page-tree attributes carried down during discovery
#[derive(Debug, Clone, Default)]
struct Inherited {
    media_box: Option<[f64; 4]>,
    crop_box: Option<[f64; 4]>,
    rotate: Option<i64>,
    resources: Option<Object>,
}

fn collect_pages(
    reader: &mut PdfReader,
    node_id: ObjectId,
    inherited: &Inherited,
    pages: &mut Vec<(u32, Dictionary)>,
    visited: &mut HashSet<u32>,
    depth: usize,
) -> Result<()> {
    if depth > MAX_PAGE_TREE_DEPTH {
        return Err(PdfError::InvalidStructure("page tree too deep".to_string()));
    }
    if !visited.insert(node_id.number()) {
        return Ok(());
    }

    let Some(node) = reader.get_object(node_id)?.as_dict().cloned() else {
        if reader.options().lenient_syntax {
            return Ok(());
        }
        return Err(PdfError::InvalidStructure(format!(
            "page tree node {node_id} is not a dictionary"
        )));
    };

    let mut inherited = inherited.clone();
    if let Some(value) = node.get("MediaBox") {
        if let Some(rect) = resolve_box(reader, value)? {
            inherited.media_box = Some(rect);
        }
    }
    if let Some(value) = node.get("CropBox") {
        if let Some(rect) = resolve_box(reader, value)? {
            inherited.crop_box = Some(rect);
        }
    }
    if let Some(value) = node.get("Rotate") {
        let resolved = reader.resolve(value)?.as_integer();
        if resolved.is_some() {
            inherited.rotate = resolved;
        }
    }
    if let Some(value) = node.get("Resources") {
        inherited.resources = Some(value.clone());
    }

    // Nodes without /Type are classified by the presence of /Kids
    let is_leaf = match node.get_type() {
        Some("Page") => true,
        Some("Pages") => false,
        _ => !node.contains_key("Kids"),
    };

    if is_leaf {
        pages.push((node_id.number(), flatten_page(node, &inherited)));
        return Ok(());
    }

    let kids = match node.get("Kids") {
        Some(value) => {
            let resolved = reader.resolve(value)?.as_array().cloned();
            match resolved {
                Some(kids) => kids,
                None if reader.options().lenient_syntax => Vec::new(),
                None => {
                    return Err(PdfError::InvalidStructure(
                        "/Kids is not an array".to_string(),
                    ))
                }
            }
        }
        None => Vec::new(),
    };
    for kid in kids {
        match kid.as_reference() {
            Some(id) => collect_pages(reader, id, &inherited, pages, visited, depth + 1)?,
            None if reader.options().lenient_syntax => {}
            None => {
                return Err(PdfError::InvalidStructure(
                    "page tree kid is not a reference".to_string(),
                ))
            }
        }
    }
    Ok(())
}

fn flatten_page(mut page: Dictionary, inherited: &Inherited) -> Dictionary {
    page.set("Type", Object::Name("Page".to_string()));

    let media_box = inherited.media_box.unwrap_or(DEFAULT_PAGE_SIZE);
    page.set("MediaBox", Rectangle::from_array(media_box).to_array_object());
    if let Some(crop_box) = inherited.crop_box {
        if !page.contains_key("CropBox") {
            page.set("CropBox", Rectangle::from_array(crop_box).to_array_object());
        }
    }
    if let Some(rotate) = inherited.rotate {
        if !page.contains_key("Rotate") {
            page.set("Rotate", Object::Integer(rotate));
        }
    }
    if let Some(resources) = &inherited.resources {
        if !page.contains_key("Resources") {
            page.set("Resources", resources.clone());
        }
    }
    page
}

/// Resolve a box value (possibly a reference, possibly with reference
/// elements) down to four numbers.
fn resolve_box(reader: &mut PdfReader, value: &Object) -> Result<Option<[f64; 4]>> {
    let array = match reader.resolve(value)?.as_array() {
        Some(array) => array.clone(),
        None => return Ok(None),
    };
    if array.len() != 4 {
        return Ok(None);
    }
    let mut rect = [0.0; 4];
    for (slot, element) in rect.iter_mut().zip(&array) {
        match reader.resolve(element)?.as_real() {
            Some(v) => *slot = v,
            None => return Ok(None),
        }
    }
    Ok(Some(rect))
}

pub(crate) fn collect_references(object: &Object, stack: &mut Vec<u32>) {
    match object {
        Object::Reference(id) => stack.push(id.number()),
        Object::Array(items) => {
            for item in items {
                collect_references(item, stack);
            }
        }
        Object::Dictionary(dict) => {
            for (key, value) in dict.entries() {
                if key != "Parent" {
                    collect_references(value, stack);
                }
            }
        }
        Object::Stream(stream) => {
            for (key, value) in stream.dict.entries() {
                if key != "Parent" {
                    collect_references(value, stack);
                }
            }
        }
        _ => {}
    }
}

/// Clone an object, rewriting references through the number mapping.
/// References to objects outside the copied subtree become null.
pub(crate) fn remap_object(object: &Object, mapping: &BTreeMap<u32, u32>) -> Object {
    match object {
        Object::Reference(id) => match mapping.get(&id.number()) {
            Some(new) => Object::Reference(ObjectId::new(*new, 0)),
            None => Object::Null,
        },
        Object::Array(items) => {
            Object::Array(items.iter().map(|i| remap_object(i, mapping)).collect())
        }
        Object::Dictionary(dict) => {
            let mut out = Dictionary::new();
            for (key, value) in dict.entries() {
                if key == "Parent" {
                    continue;
                }
                out.set(key.clone(), remap_object(value, mapping));
            }
            Object::Dictionary(out)
        }
        Object::Stream(stream) => {
            let mut dict = Dictionary::new();
            for (key, value) in stream.dict.entries() {
                if key == "Parent" {
                    continue;
                }
                dict.set(key.clone(), remap_object(value, mapping));
            }
            Object::Stream(Stream::with_dictionary(dict, stream.data.clone()))
        }
        other => other.clone(),
    }
}
