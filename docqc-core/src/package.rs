//! `.docx` container access.
//!
//! A `.docx` file is a zip archive; the engine needs the main document part
//! and, when present, the style definitions (to turn style ids such as
//! `Heading1` into display names such as `Heading 1`).

use crate::error::LoadError;
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";

#[derive(Debug, Clone)]
pub struct DocxPackage {
    source: String,
    sha256: String,
    document_xml: String,
    styles_xml: Option<String>,
}

impl DocxPackage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, path.display().to_string())
    }

    pub fn from_bytes(bytes: &[u8], source: impl Into<String>) -> Result<Self, LoadError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let document_xml = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| LoadError::MissingPart(DOCUMENT_PART.to_string()))?;
        let styles_xml = read_part(&mut archive, STYLES_PART)?;

        Ok(Self {
            source: source.into(),
            sha256: calculate_document_hash(bytes),
            document_xml,
            styles_xml,
        })
    }

    /// Path or name the package was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn document_xml(&self) -> &str {
        &self.document_xml
    }

    pub fn styles_xml(&self) -> Option<&str> {
        self.styles_xml.as_deref()
    }
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, LoadError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// SHA-256 of the raw container bytes, hex encoded
pub fn calculate_document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn zip_with(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_document_hash_consistency() {
        let data = b"docx bytes";
        assert_eq!(calculate_document_hash(data), calculate_document_hash(data));
        assert_ne!(calculate_document_hash(b"a"), calculate_document_hash(b"b"));
    }

    #[test]
    fn test_reads_parts() {
        let bytes = zip_with(&[(DOCUMENT_PART, "<w:document/>")]);
        let package = DocxPackage::from_bytes(&bytes, "memory.docx").unwrap();
        assert_eq!(package.document_xml(), "<w:document/>");
        assert!(package.styles_xml().is_none());
        assert_eq!(package.source(), "memory.docx");
        assert_eq!(package.sha256().len(), 64);
    }

    #[test]
    fn test_missing_document_part() {
        let bytes = zip_with(&[(STYLES_PART, "<w:styles/>")]);
        let err = DocxPackage::from_bytes(&bytes, "memory.docx").unwrap_err();
        assert!(matches!(err, LoadError::MissingPart(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let err = DocxPackage::from_bytes(b"plain text, not a zip", "memory.docx").unwrap_err();
        assert!(matches!(err, LoadError::Zip(_)));
    }
}
