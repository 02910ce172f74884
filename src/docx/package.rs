//! OPC (zip) package access: parts, relationships and content types.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::{self, Element};
use crate::error::{Error, Result};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const REL_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
pub const REL_COMMENTS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";

pub const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const CT_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
pub const CT_COMMENTS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";
pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Upper bound on the buffer reserved up front for one part.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// An in-memory OPC package. Parts keep their archive order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Empty package with no parts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a package from a `.docx` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            // Declared sizes are untrusted
            let mut data = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
            entry.read_to_end(&mut data)?;
            parts.push((entry.name().to_string(), data));
        }
        log::debug!("opened package with {} parts", parts.len());
        Ok(Self { parts })
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = name.trim_start_matches('/');
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Replace a part's content, or add it at the end.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        let name = name.trim_start_matches('/');
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    /// Parse an XML part, failing with [`Error::MissingPart`] when absent.
    pub fn xml_part(&self, name: &str) -> Result<Element> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        xml::parse(data, name)
    }

    pub fn set_xml_part(&mut self, name: &str, root: &Element) {
        self.set_part(name, xml::to_bytes(root));
    }

    /// Name of the main document part, found through the package relationships.
    pub fn main_document_part(&self) -> Result<String> {
        let rels = self.xml_part(PACKAGE_RELS_PART)?;
        let target = rels
            .elements()
            .find(|r| r.attr("Type") == Some(REL_OFFICE_DOCUMENT))
            .and_then(|r| r.attr("Target"))
            .map(|target| target.trim_start_matches('/').to_string());
        target.ok_or_else(|| Error::MissingPart("officeDocument relationship".to_string()))
    }

    /// Resolve the target of the first `rel_type` relationship of `source`.
    pub fn related_part(&self, source: &str, rel_type: &str) -> Result<Option<String>> {
        let rels_name = rels_part_for(source);
        if !self.contains(&rels_name) {
            return Ok(None);
        }
        let rels = self.xml_part(&rels_name)?;
        let target = rels
            .elements()
            .filter(|r| r.attr("TargetMode") != Some("External"))
            .find(|r| r.attr("Type") == Some(rel_type))
            .and_then(|r| r.attr("Target"))
            .map(|target| resolve_target(source, target));
        Ok(target)
    }

    /// Make sure `source` has a `rel_type` relationship to `target`.
    ///
    /// `target` is relative to the source part's directory. Returns the
    /// relationship id, reusing an existing one of the same type and target.
    pub fn ensure_relationship(&mut self, source: &str, rel_type: &str, target: &str) -> Result<String> {
        let rels_name = rels_part_for(source);
        let mut rels = if self.contains(&rels_name) {
            self.xml_part(&rels_name)?
        } else {
            Element::new("Relationships").with_attr("xmlns", RELS_NS)
        };

        if let Some(existing) = rels
            .elements()
            .find(|r| r.attr("Type") == Some(rel_type) && r.attr("Target") == Some(target))
            .and_then(|r| r.attr("Id"))
        {
            return Ok(existing.to_string());
        }

        let taken: Vec<&str> = rels.elements().filter_map(|r| r.attr("Id")).collect();
        let id = (1..)
            .map(|n| format!("rId{}", n))
            .find(|candidate| !taken.contains(&candidate.as_str()))
            .unwrap_or_else(|| "rId1".to_string());

        rels.push(
            Element::new("Relationship")
                .with_attr("Id", id.clone())
                .with_attr("Type", rel_type)
                .with_attr("Target", target),
        );
        self.set_xml_part(&rels_name, &rels);
        self.ensure_default_content_type("rels", CT_RELATIONSHIPS)?;
        Ok(id)
    }

    /// Register an `Override` content type for `part_name`.
    pub fn ensure_override(&mut self, part_name: &str, content_type: &str) -> Result<()> {
        let part_name = format!("/{}", part_name.trim_start_matches('/'));
        let mut types = self.content_types()?;
        let existing = types
            .elements_mut()
            .find(|e| e.is("Override") && e.attr("PartName") == Some(part_name.as_str()));
        match existing {
            Some(entry) => entry.set_attr("ContentType", content_type),
            None => types.push(
                Element::new("Override")
                    .with_attr("PartName", part_name)
                    .with_attr("ContentType", content_type),
            ),
        }
        self.set_xml_part(CONTENT_TYPES_PART, &types);
        Ok(())
    }

    fn ensure_default_content_type(&mut self, extension: &str, content_type: &str) -> Result<()> {
        let mut types = self.content_types()?;
        let present = types
            .elements()
            .any(|e| e.is("Default") && e.attr("Extension").map(|x| x.eq_ignore_ascii_case(extension)) == Some(true));
        if !present {
            types.children.insert(
                0,
                super::xml::Node::Element(
                    Element::new("Default")
                        .with_attr("Extension", extension)
                        .with_attr("ContentType", content_type),
                ),
            );
            self.set_xml_part(CONTENT_TYPES_PART, &types);
        }
        Ok(())
    }

    fn content_types(&self) -> Result<Element> {
        if self.contains(CONTENT_TYPES_PART) {
            self.xml_part(CONTENT_TYPES_PART)
        } else {
            Ok(Element::new("Types").with_attr("xmlns", CONTENT_TYPES_NS))
        }
    }

    /// Write the package as a Deflate-compressed zip.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        Ok(zip.finish()?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Save to `path`, creating or truncating the file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
pub fn rels_part_for(source: &str) -> String {
    let source = source.trim_start_matches('/');
    match source.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", source),
    }
}

/// Resolve a relationship target against the source part's directory.
pub fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let source = source.trim_start_matches('/');
    let mut segments: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
