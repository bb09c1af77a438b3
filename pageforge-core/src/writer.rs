//! Document serialization.
//!
//! Writes a [`PdfDocument`] as a fresh file: objects are renumbered
//! sequentially, the page tree is rebuilt flat from the document's page
//! list, and anything unreachable from the pages or the information
//! dictionary is left out. Stream lengths are recomputed at write time,
//! so stale `/Length` entries in the graph never reach the output.
//!
//! Output layout: catalog is object 1, the pages node is object 2, page
//! subtrees follow in page order, the information dictionary comes last.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};

use crate::document::{collect_references, remap_object, PdfDocument};
use crate::error::Result;
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::parser::lexer::is_regular;

/// Serializes documents with classic cross-reference tables.
pub struct PdfWriter<W: Write> {
    writer: W,
    position: usize,
    offsets: BTreeMap<u32, usize>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
            offsets: BTreeMap::new(),
        }
    }

    pub fn write_document(&mut self, document: &PdfDocument) -> Result<()> {
        let plan = RenumberPlan::build(document);

        self.write_bytes(format!("%PDF-{}\n", document.version()).as_bytes())?;
        // Binary marker so transfer tools treat the file as binary
        self.write_bytes(b"%\xE2\xE3\xCF\xD3\n")?;

        self.write_catalog()?;
        self.write_page_tree(document, &plan)?;
        for (new_number, old_number) in &plan.ordered {
            let Some(object) = document.objects.get(old_number) else {
                continue;
            };
            let mut emitted = remap_object(object, &plan.mapping);
            if plan.page_numbers.contains(old_number) {
                if let Some(dict) = emitted.as_dict_mut() {
                    dict.set("Parent", Object::Reference(ObjectId::new(2, 0)));
                }
            }
            self.write_indirect_object(*new_number, &emitted)?;
        }

        let xref_offset = self.write_xref_table(plan.total)?;
        self.write_trailer(plan.total, plan.info_new, xref_offset)?;
        Ok(())
    }

    fn write_catalog(&mut self) -> Result<()> {
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name("Catalog".to_string()));
        catalog.set("Pages", Object::Reference(ObjectId::new(2, 0)));
        self.write_indirect_object(1, &Object::Dictionary(catalog))
    }

    fn write_page_tree(&mut self, document: &PdfDocument, plan: &RenumberPlan) -> Result<()> {
        let kids: Vec<Object> = document
            .pages
            .iter()
            .filter_map(|page| plan.mapping.get(page))
            .map(|new| Object::Reference(ObjectId::new(*new, 0)))
            .collect();
        let mut tree = Dictionary::new();
        tree.set("Type", Object::Name("Pages".to_string()));
        tree.set("Count", Object::Integer(kids.len() as i64));
        tree.set("Kids", Object::Array(kids));
        self.write_indirect_object(2, &Object::Dictionary(tree))
    }

    fn write_indirect_object(&mut self, number: u32, object: &Object) -> Result<()> {
        self.offsets.insert(number, self.position);
        self.write_bytes(format!("{number} 0 obj\n").as_bytes())?;
        self.write_object(object)?;
        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null"),
            Object::Boolean(true) => self.write_bytes(b"true"),
            Object::Boolean(false) => self.write_bytes(b"false"),
            Object::Integer(value) => self.write_bytes(value.to_string().as_bytes()),
            Object::Real(value) => self.write_real(*value),
            Object::String(bytes) => self.write_literal_string(bytes),
            Object::Name(name) => self.write_name(name),
            Object::Reference(id) => {
                self.write_bytes(format!("{} {} R", id.number(), id.generation()).as_bytes())
            }
            Object::Array(items) => {
                self.write_bytes(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object(item)?;
                }
                self.write_bytes(b"]")
            }
            Object::Dictionary(dict) => self.write_dictionary(dict),
            Object::Stream(stream) => self.write_stream(stream),
        }
    }

    fn write_dictionary(&mut self, dict: &Dictionary) -> Result<()> {
        self.write_bytes(b"<<")?;
        for (key, value) in dict.entries() {
            self.write_bytes(b" ")?;
            self.write_name(key)?;
            self.write_bytes(b" ")?;
            self.write_object(value)?;
        }
        self.write_bytes(b" >>")
    }

    fn write_stream(&mut self, stream: &Stream) -> Result<()> {
        let mut dict = stream.dict.clone();
        dict.set("Length", Object::Integer(stream.data.len() as i64));
        self.write_dictionary(&dict)?;
        self.write_bytes(b"\nstream\n")?;
        self.write_bytes(&stream.data)?;
        self.write_bytes(b"\nendstream")
    }

    /// PDF reals must not use exponent notation
    fn write_real(&mut self, value: f64) -> Result<()> {
        if value.is_finite() {
            self.write_bytes(value.to_string().as_bytes())
        } else {
            self.write_bytes(b"0")
        }
    }

    fn write_literal_string(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_bytes(b"(")?;
        for byte in bytes {
            match byte {
                b'(' => self.write_bytes(b"\\(")?,
                b')' => self.write_bytes(b"\\)")?,
                b'\\' => self.write_bytes(b"\\\\")?,
                b'\n' => self.write_bytes(b"\\n")?,
                b'\r' => self.write_bytes(b"\\r")?,
                b'\t' => self.write_bytes(b"\\t")?,
                0x20..=0x7e => self.write_bytes(&[*byte])?,
                other => self.write_bytes(format!("\\{other:03o}").as_bytes())?,
            }
        }
        self.write_bytes(b")")
    }

    fn write_name(&mut self, name: &str) -> Result<()> {
        self.write_bytes(b"/")?;
        for ch in name.chars() {
            let code = ch as u32;
            if code < 0x80 && code > 0x20 && ch != '#' && is_regular(code as u8) {
                self.write_bytes(&[code as u8])?;
            } else if code <= 0xff {
                self.write_bytes(format!("#{code:02X}").as_bytes())?;
            } else {
                // Cannot be represented in a name; substitute
                self.write_bytes(b"#3F")?;
            }
        }
        Ok(())
    }

    fn write_xref_table(&mut self, total: u32) -> Result<usize> {
        let xref_offset = self.position;
        let size = total + 1;
        self.write_bytes(format!("xref\n0 {size}\n").as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;
        for number in 1..size {
            let offset = self.offsets.get(&number).copied().unwrap_or(0);
            self.write_bytes(format!("{offset:010} 00000 n \n").as_bytes())?;
        }
        Ok(xref_offset)
    }

    fn write_trailer(
        &mut self,
        total: u32,
        info: Option<u32>,
        xref_offset: usize,
    ) -> Result<()> {
        let mut trailer = Dictionary::new();
        trailer.set("Size", Object::Integer(total as i64 + 1));
        trailer.set("Root", Object::Reference(ObjectId::new(1, 0)));
        if let Some(info) = info {
            trailer.set("Info", Object::Reference(ObjectId::new(info, 0)));
        }
        self.write_bytes(b"trailer\n")?;
        self.write_dictionary(&trailer)?;
        self.write_bytes(format!("\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes())?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len();
        Ok(())
    }
}

/// The renumbering decided before any byte is written.
///
/// Objects 1 and 2 are reserved for the synthesized catalog and pages
/// node. Page subtrees claim numbers in page order, so related objects
/// stay adjacent; the information dictionary takes the last number.
struct RenumberPlan {
    mapping: BTreeMap<u32, u32>,
    /// (new, old) pairs for swept objects, in output order
    ordered: Vec<(u32, u32)>,
    page_numbers: std::collections::HashSet<u32>,
    info_new: Option<u32>,
    total: u32,
}

impl RenumberPlan {
    fn build(document: &PdfDocument) -> Self {
        let mut mapping = BTreeMap::new();
        mapping.insert(document.catalog_number, 1);
        let old_root = document
            .objects
            .get(&document.catalog_number)
            .and_then(Object::as_dict)
            .and_then(|catalog| catalog.get("Pages"))
            .and_then(Object::as_reference);
        if let Some(root) = old_root {
            mapping.entry(root.number()).or_insert(2);
        }

        let mut ordered = Vec::new();
        let mut next = 3u32;
        for page in &document.pages {
            sweep_subtree(document, *page, &mut mapping, &mut ordered, &mut next);
        }

        let mut info_new = None;
        if let Some(info) = document.info_number {
            if let Some(object) = document.objects.get(&info) {
                // Number anything the information dictionary references
                // before the dictionary itself, so it stays last
                let mut children = Vec::new();
                collect_references(object, &mut children);
                for child in children {
                    sweep_subtree(document, child, &mut mapping, &mut ordered, &mut next);
                }
                let new = *mapping.entry(info).or_insert_with(|| {
                    let assigned = next;
                    ordered.push((assigned, info));
                    next += 1;
                    assigned
                });
                info_new = Some(new);
            }
        }

        let page_numbers = document.pages.iter().copied().collect();
        Self {
            mapping,
            ordered,
            page_numbers,
            info_new,
            total: next - 1,
        }
    }
}

fn sweep_subtree(
    document: &PdfDocument,
    root: u32,
    mapping: &mut BTreeMap<u32, u32>,
    ordered: &mut Vec<(u32, u32)>,
    next: &mut u32,
) {
    let mut stack = vec![root];
    while let Some(old) = stack.pop() {
        if mapping.contains_key(&old) {
            continue;
        }
        let Some(object) = document.objects.get(&old) else {
            continue;
        };
        mapping.insert(old, *next);
        ordered.push((*next, old));
        *next += 1;
        collect_references(object, &mut stack);
    }
}

/// Timestamp in PDF date format, UTC
pub(crate) fn format_pdf_date(when: DateTime<Utc>) -> String {
    when.format("D:%Y%m%d%H%M%SZ").to_string()
}
