// Rule battery for document QC.
// - engine.rs: RuleEngine, ordering, per-rule error capture
// - fonts.rs: rules 1-3 (font family, body and table font sizes)
// - layout.rs: rules 4-6 (orientation, margins, header/footer distance)
// - toc.rs: rules 7-8 (TOC presence, TOC link targets)
// - hyperlinks.rs: rules 9-10 (internal and external links)
// - tense.rs: rule 11
// - acronym.rs: rule 12

pub mod acronym;
pub mod engine;
pub mod fonts;
pub mod hyperlinks;
pub mod layout;
pub mod tense;
pub mod toc;

pub use engine::*;

use crate::acronyms::AcronymTable;
use crate::config::{CompiledPatterns, QcConfig};
use crate::document::LoadedDocument;
use crate::links::LinkProber;
use crate::types::{QcResult, ViolationLocation};
use crate::word_index::WordLocation;
use anyhow::Result;

/// Everything a rule may read. All of it is immutable for the session.
pub struct CheckContext<'a> {
    pub document: &'a LoadedDocument,
    pub config: &'a QcConfig,
    pub patterns: &'a CompiledPatterns,
    pub acronyms: &'a AcronymTable,
    pub prober: &'a dyn LinkProber,
}

impl CheckContext<'_> {
    /// Truncate a list to `max_reported_locations`
    pub fn capped<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .take(self.config.max_reported_locations)
            .cloned()
            .collect()
    }
}

pub trait QcRule: Send + Sync {
    fn number(&self) -> u8;
    fn name(&self) -> &str;
    fn check(&self, ctx: &CheckContext) -> Result<QcResult>;
}

/// The full battery in report order
pub fn standard_rules() -> Vec<Box<dyn QcRule>> {
    vec![
        Box::new(fonts::FontFamilyRule),
        Box::new(fonts::NormalFontSizeRule),
        Box::new(fonts::TableFontSizeRule),
        Box::new(layout::PageOrientationRule),
        Box::new(layout::MarginsRule),
        Box::new(layout::HeaderFooterDistanceRule),
        Box::new(toc::TableOfContentsRule),
        Box::new(toc::TocLinksRule),
        Box::new(hyperlinks::InternalHyperlinksRule),
        Box::new(hyperlinks::ExternalHyperlinksRule),
        Box::new(tense::VerbTenseRule),
        Box::new(acronym::AcronymDefinitionRule),
    ]
}

pub(crate) fn word_location(word: &WordLocation) -> ViolationLocation {
    ViolationLocation::new("word", Some(word.paragraph_index))
        .with_preview(&word.to_string())
        .with_line(word.page_number)
}

pub(crate) fn paragraph_location(index: usize, text: &str) -> ViolationLocation {
    ViolationLocation::new("paragraph", Some(index)).with_preview(text.trim())
}
