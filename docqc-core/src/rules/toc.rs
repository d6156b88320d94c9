// Rules 7-8: table of contents presence and TOC entry targets.

use super::{paragraph_location, CheckContext, QcRule};
use crate::navigation::TocEntry;
use crate::types::{QcResult, ViolationType};
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

pub struct TableOfContentsRule;
pub struct TocLinksRule;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern"));

/// How a table of contents was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocEvidence {
    Text { paragraph_index: usize, text: String },
    FieldCode,
    Style { paragraph_index: usize, style: String },
}

impl TocEvidence {
    fn location(&self) -> String {
        match self {
            TocEvidence::Text { paragraph_index, .. } => format!("Paragraph {}", paragraph_index + 1),
            TocEvidence::FieldCode => "TOC field code found".to_string(),
            TocEvidence::Style { paragraph_index, .. } => {
                format!("Paragraph {} with TOC style", paragraph_index + 1)
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            TocEvidence::Text { paragraph_index, text } => {
                format!("Found TOC text: '{text}' in paragraph {}", paragraph_index + 1)
            }
            TocEvidence::FieldCode => "Found TOC field code in document XML".to_string(),
            TocEvidence::Style { paragraph_index, style } => {
                format!("Found TOC style: {style} in paragraph {}", paragraph_index + 1)
            }
        }
    }
}

/// Text patterns first, then a TOC field, then a TOC paragraph style
pub fn locate_toc(ctx: &CheckContext) -> Option<TocEvidence> {
    let paragraphs = &ctx.document.model.paragraphs;

    for (index, paragraph) in paragraphs.iter().enumerate() {
        let text = paragraph.text();
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();
        if ctx.patterns.toc.iter().any(|pattern| pattern.is_match(&lowered)) {
            return Some(TocEvidence::Text {
                paragraph_index: index,
                text: trimmed.to_string(),
            });
        }
    }

    if ctx.document.navigation.toc_field_present {
        return Some(TocEvidence::FieldCode);
    }

    paragraphs.iter().enumerate().find_map(|(index, paragraph)| {
        let style = paragraph.style_name.as_deref()?;
        style.to_lowercase().contains("toc").then(|| TocEvidence::Style {
            paragraph_index: index,
            style: style.to_string(),
        })
    })
}

impl QcRule for TableOfContentsRule {
    fn number(&self) -> u8 {
        7
    }

    fn name(&self) -> &str {
        "Table of Contents Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        match locate_toc(ctx) {
            Some(evidence) => Ok(QcResult::success(self.number(), self.name(), "Table of Contents found")
                .with_details(format!("Location: {}\n{}", evidence.location(), evidence.describe()))),
            None => Ok(QcResult::violation(
                self.number(),
                self.name(),
                ViolationType::Error,
                "No Table of Contents found in document",
            )
            .with_details("Checked for TOC text, field codes, and styles - none found")),
        }
    }
}

fn normalize(text: &str) -> String {
    NON_WORD.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Substring containment either way, or a shared token longer than two characters
pub fn title_matches(title: &str, target: &str) -> bool {
    let title = normalize(title);
    let target = normalize(target);
    if title.trim().is_empty() || target.trim().is_empty() {
        return false;
    }

    if title.contains(&target) || target.contains(&title) {
        return true;
    }

    let target_tokens: Vec<&str> = target.split_whitespace().collect();
    title
        .split_whitespace()
        .filter(|token| token.chars().count() > 2)
        .any(|token| target_tokens.contains(&token))
}

fn entry_resolves(ctx: &CheckContext, entry: &TocEntry) -> bool {
    let nav = &ctx.document.navigation;
    nav.bookmarks
        .iter()
        .chain(nav.headings.iter())
        .any(|target| title_matches(&entry.title, target))
}

impl QcRule for TocLinksRule {
    fn number(&self) -> u8 {
        8
    }

    fn name(&self) -> &str {
        "TOC Links Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        if locate_toc(ctx).is_none() {
            return Ok(QcResult::violation(
                self.number(),
                self.name(),
                ViolationType::Error,
                "Cannot verify TOC links - no Table of Contents found",
            ));
        }

        let nav = &ctx.document.navigation;
        let entries = &nav.toc_entries;
        let broken: Vec<&TocEntry> = entries
            .iter()
            .filter(|entry| !entry_resolves(ctx, entry))
            .collect();

        if !broken.is_empty() {
            let details = broken
                .iter()
                .map(|entry| {
                    format!(
                        "TOC entry '{}' (paragraph {}) - no matching target found",
                        entry.title,
                        entry.source_paragraph_index + 1
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            let locations = broken
                .iter()
                .take(ctx.config.max_reported_locations)
                .map(|entry| paragraph_location(entry.source_paragraph_index, &entry.title))
                .collect();

            Ok(QcResult::violation(
                self.number(),
                self.name(),
                ViolationType::Error,
                format!("Found {} broken TOC links", broken.len()),
            )
            .with_details(details)
            .with_locations(locations))
        } else if !entries.is_empty() {
            Ok(QcResult::success(
                self.number(),
                self.name(),
                format!("All {} TOC links appear to be valid", entries.len()),
            )
            .with_details(format!(
                "Validated {} TOC entries against {} bookmarks and {} headings",
                entries.len(),
                nav.bookmarks.len(),
                nav.headings.len()
            )))
        } else {
            Ok(QcResult::success(
                self.number(),
                self.name(),
                "TOC found but no page-numbered entries to validate",
            )
            .with_details(
                "TOC exists but appears to be a simple list without page numbers - this is acceptable",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_matching() {
        assert!(title_matches("Introduction", "Introduction"));
        assert!(title_matches("1. Introduction", "Introduction"));
        assert!(title_matches("Intro", "Introduction to the system"));
        assert!(title_matches("Results and Discussion", "Discussion"));
        assert!(!title_matches("Nonexistent Chapter", "Introduction"));
        // Short tokens alone never match
        assert!(!title_matches("An Of", "of an x"));
    }

    #[test]
    fn test_punctuation_only_never_matches() {
        assert!(!title_matches("Nonexistent Chapter", "!!"));
        assert!(!title_matches("****", "Introduction"));
        assert!(!title_matches("...", "!!"));
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("2. Methods & Tools!"), "2 methods  tools");
    }
}
