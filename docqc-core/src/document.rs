//! A document loaded once per session and shared read-only by every rule.

use crate::error::LoadError;
use crate::markup::MarkupTree;
use crate::model::{DocumentModel, StyleCatalog};
use crate::navigation::NavigationGraph;
use crate::package::{DocxPackage, DOCUMENT_PART, STYLES_PART};
use crate::word_index::WordIndex;
use std::path::Path;

#[derive(Debug)]
pub struct LoadedDocument {
    pub source: String,
    pub sha256: String,
    pub markup: MarkupTree,
    pub model: DocumentModel,
    pub words: WordIndex,
    pub navigation: NavigationGraph,
}

impl LoadedDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_package(&DocxPackage::open(path)?)
    }

    pub fn from_bytes(bytes: &[u8], source: &str) -> Result<Self, LoadError> {
        Self::from_package(&DocxPackage::from_bytes(bytes, source)?)
    }

    pub fn from_package(package: &DocxPackage) -> Result<Self, LoadError> {
        let markup = MarkupTree::parse(DOCUMENT_PART, package.document_xml())?;
        let styles = match package.styles_xml() {
            Some(xml) => StyleCatalog::from_markup(&MarkupTree::parse(STYLES_PART, xml)?),
            None => StyleCatalog::default(),
        };

        let model = DocumentModel::from_markup(&markup, &styles);
        let words = WordIndex::build(&model);
        let navigation = NavigationGraph::build(&markup, &model);

        log::debug!(
            "Loaded {}: {} paragraphs, {} tables, {} words, {} pages",
            package.source(),
            model.paragraphs.len(),
            model.tables.len(),
            words.len(),
            words.page_count()
        );

        Ok(Self {
            source: package.source().to_string(),
            sha256: package.sha256().to_string(),
            markup,
            model,
            words,
            navigation,
        })
    }
}
