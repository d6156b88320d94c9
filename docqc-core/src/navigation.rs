//! Navigation graph: bookmarks, heading-like paragraphs, hyperlinks and
//! table-of-contents entries.
//!
//! Built once per document from the markup tree and the document model and
//! shared read-only by the TOC and hyperlink rules.

use crate::markup::MarkupTree;
use crate::model::{DocumentModel, Paragraph};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static NUMBERED_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+[\w\s]+$").expect("numbered section pattern"));
static NUMBERED_SECTION_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("numbered section parts pattern"));

// TOC line shapes: "Title ..... 3", "2. Title ..... 3", "Title 3"
static TOC_DOTTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s]+\s+\.+\s+\d+$").expect("dotted TOC pattern"));
static TOC_DOTTED_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+\.+\s+(\d+)$").expect("dotted TOC parts pattern"));
static TOC_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+[\w\s]+\s+\.+\s+\d+$").expect("numbered TOC pattern"));
static TOC_NUMBERED_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.\s+(.+?)\s+\.+\s+(\d+)$").expect("numbered TOC parts pattern")
});
static TOC_SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s]+\s+\d+$").expect("simple TOC pattern"));
static TOC_SIMPLE_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+(\d+)$").expect("simple TOC parts pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub page_number: u32,
    pub source_paragraph_index: usize,
}

/// A `w:hyperlink` element. Internal links carry `w:anchor`, external ones
/// an `r:id` relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub anchor: Option<String>,
    pub relationship_id: Option<String>,
    pub text: String,
}

/// `N. Title` paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedSection {
    pub number: String,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationGraph {
    pub bookmarks: BTreeSet<String>,
    pub headings: BTreeSet<String>,
    pub numbered_sections: Vec<NumberedSection>,
    pub hyperlinks: Vec<Hyperlink>,
    pub toc_entries: Vec<TocEntry>,
    pub toc_field_present: bool,
}

impl NavigationGraph {
    pub fn build(markup: &MarkupTree, model: &DocumentModel) -> Self {
        let bookmarks = markup
            .descendants("bookmarkStart")
            .into_iter()
            .filter_map(|bookmark| bookmark.attr("w:name"))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        let hyperlinks = markup
            .descendants("hyperlink")
            .into_iter()
            .map(|link| Hyperlink {
                anchor: link
                    .attr("w:anchor")
                    .filter(|anchor| !anchor.is_empty())
                    .map(str::to_string),
                relationship_id: link.attr("r:id").map(str::to_string),
                text: link.text_of("t"),
            })
            .collect();

        let simple_toc_field = markup
            .descendants("fldSimple")
            .into_iter()
            .filter_map(|field| field.attr("w:instr"))
            .any(is_toc_instruction);
        let complex_toc_field = markup
            .descendants("instrText")
            .into_iter()
            .any(|instr| is_toc_instruction(&instr.own_text()));

        let mut headings = BTreeSet::new();
        let mut numbered_sections = Vec::new();
        for paragraph in &model.paragraphs {
            let text = paragraph.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            if paragraph.style_starts_with("Heading") || is_bold_lead(paragraph, text) {
                headings.insert(text.to_string());
            }

            if NUMBERED_SECTION.is_match(text) {
                headings.insert(text.to_string());
                if let Some(caps) = NUMBERED_SECTION_PARTS.captures(text) {
                    numbered_sections.push(NumberedSection {
                        number: caps[1].to_string(),
                        title: caps[2].trim().to_string(),
                    });
                }
            }
        }

        let graph = Self {
            bookmarks,
            headings,
            numbered_sections,
            hyperlinks,
            toc_entries: parse_toc_entries(model),
            toc_field_present: simple_toc_field || complex_toc_field,
        };

        log::debug!(
            "Navigation graph: {} bookmarks, {} headings, {} hyperlinks, {} TOC entries",
            graph.bookmarks.len(),
            graph.headings.len(),
            graph.hyperlinks.len(),
            graph.toc_entries.len()
        );

        graph
    }

    /// Lowercased resolution set for internal links: bookmarks, heading
    /// texts, and for numbered sections both `section_N` and the bare title.
    pub fn link_targets(&self) -> BTreeSet<String> {
        let mut targets: BTreeSet<String> = self
            .bookmarks
            .iter()
            .chain(self.headings.iter())
            .map(|target| target.to_lowercase())
            .collect();

        for section in &self.numbered_sections {
            targets.insert(format!("section_{}", section.number));
            targets.insert(section.title.to_lowercase());
        }

        targets
    }

    pub fn internal_links(&self) -> impl Iterator<Item = &Hyperlink> {
        self.hyperlinks.iter().filter(|link| link.anchor.is_some())
    }
}

/// First run explicitly bold and more than three characters of text
fn is_bold_lead(paragraph: &Paragraph, text: &str) -> bool {
    let bold = paragraph
        .runs
        .first()
        .and_then(|run| run.attributes.bold)
        .unwrap_or(false);
    bold && text.chars().count() > 3
}

fn is_toc_instruction(instruction: &str) -> bool {
    let instruction = instruction.trim();
    instruction == "TOC" || instruction.starts_with("TOC ")
}

/// Parse TOC-shaped body paragraphs, in document order.
pub fn parse_toc_entries(model: &DocumentModel) -> Vec<TocEntry> {
    model
        .paragraphs
        .iter()
        .enumerate()
        .filter_map(|(index, paragraph)| parse_toc_line(paragraph.text().trim(), index))
        .collect()
}

fn parse_toc_line(text: &str, paragraph_index: usize) -> Option<TocEntry> {
    let entry = |title: String, page: &str| {
        page.parse().ok().map(|page_number| TocEntry {
            title,
            page_number,
            source_paragraph_index: paragraph_index,
        })
    };

    if TOC_DOTTED.is_match(text) {
        let caps = TOC_DOTTED_PARTS.captures(text)?;
        entry(caps[1].trim().to_string(), &caps[2])
    } else if TOC_NUMBERED.is_match(text) {
        let caps = TOC_NUMBERED_PARTS.captures(text)?;
        entry(format!("{}. {}", &caps[1], caps[2].trim()), &caps[3])
    } else if TOC_SIMPLE.is_match(text) && !text.to_lowercase().starts_with("table of contents") {
        let caps = TOC_SIMPLE_PARTS.captures(text)?;
        entry(caps[1].trim().to_string(), &caps[2])
    } else {
        None
    }
}
