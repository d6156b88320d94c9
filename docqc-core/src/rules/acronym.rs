// Rule 12: acronyms must be defined, at first use for known acronyms or
// anywhere in the text for unknown ones.

use super::{paragraph_location, CheckContext, QcRule};
use crate::types::{QcResult, ViolationType};
use anyhow::Result;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::sync::LazyLock;

pub struct AcronymDefinitionRule;

static ACRONYM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("acronym token pattern"));

const MAX_ACRONYM_LEN: usize = 15;

/// An acronym and the paragraph it first appears in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcronymUse {
    pub acronym: String,
    pub paragraph_index: usize,
}

/// Distinct acronyms in first-occurrence order
pub fn find_acronyms<'p>(
    paragraphs: impl IntoIterator<Item = &'p str>,
    stoplist: &[String],
) -> Vec<AcronymUse> {
    let stop: HashSet<&str> = stoplist.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut uses = Vec::new();

    for (index, text) in paragraphs.into_iter().enumerate() {
        for token in ACRONYM_TOKEN.find_iter(text) {
            let acronym = token.as_str();
            if acronym.len() > MAX_ACRONYM_LEN || stop.contains(acronym) {
                continue;
            }
            if seen.insert(acronym.to_string()) {
                uses.push(AcronymUse {
                    acronym: acronym.to_string(),
                    paragraph_index: index,
                });
            }
        }
    }

    uses
}

/// "Full Name (ACR)" or "ACR (Full Name)", case-insensitive
pub fn defined_inline(text: &str, acronym: &str, full_name: &str) -> bool {
    let acronym = regex::escape(acronym);
    let full_name = regex::escape(full_name);
    [
        format!(r"{full_name}\s*\(\s*{acronym}\s*\)"),
        format!(r"{acronym}\s*\(\s*{full_name}\s*\)"),
    ]
    .iter()
    .filter_map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build().ok())
    .any(|pattern| pattern.is_match(text))
}

/// First definition pattern with a capture group containing the acronym
fn defined_by_pattern<'r>(patterns: &'r [Regex], text: &str, acronym: &str) -> Option<&'r Regex> {
    let needle = acronym.to_lowercase();
    patterns.iter().find(|pattern| {
        pattern.captures_iter(text).any(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .any(|group| group.as_str().to_lowercase().contains(&needle))
        })
    })
}

impl QcRule for AcronymDefinitionRule {
    fn number(&self) -> u8 {
        12
    }

    fn name(&self) -> &str {
        "Acronym Definition Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let texts = ctx.document.model.paragraph_texts();
        let uses = find_acronyms(texts.iter().map(String::as_str), &ctx.config.acronyms.stoplist);

        if uses.is_empty() {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                "No acronyms found in document",
            ));
        }

        let full_text = ctx.document.model.full_text();
        let mut defined = Vec::new();
        let mut undefined = Vec::new();
        let mut locations = Vec::new();

        for acronym_use in &uses {
            let acronym = acronym_use.acronym.as_str();
            let first_use = &texts[acronym_use.paragraph_index];

            let found = match ctx.acronyms.get(acronym) {
                Some(record) => defined_inline(first_use, acronym, &record.full_name)
                    .then(|| format!("{acronym}: {} (defined at first use)", record.full_name)),
                None => defined_by_pattern(&ctx.patterns.acronym_definitions, &full_text, acronym)
                    .map(|pattern| format!("{acronym}: defined by pattern '{}'", pattern.as_str())),
            };

            match found {
                Some(line) => defined.push(line),
                None => {
                    undefined.push(acronym);
                    locations.push(paragraph_location(acronym_use.paragraph_index, first_use));
                }
            }
        }

        log::debug!(
            "Acronyms: {} found, {} defined, {} undefined",
            uses.len(),
            defined.len(),
            undefined.len()
        );

        if undefined.is_empty() {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                "All acronyms are properly defined or recognized",
            )
            .with_details(format!("Defined acronyms:\n{}", defined.join("\n"))));
        }

        let mut details = format!("Undefined acronyms: {}", undefined.join(", "));
        if !defined.is_empty() {
            details.push_str(&format!("\n\nDefined acronyms:\n{}", defined.join("\n")));
        }

        Ok(QcResult::violation(
            self.number(),
            self.name(),
            ViolationType::Warning,
            format!("Found {} acronyms that may not be defined", undefined.len()),
        )
        .with_details(details)
        .with_locations(ctx.capped(&locations)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QcConfig;

    #[test]
    fn test_find_acronyms_first_use_and_stoplist() {
        let stoplist = vec!["THE".to_string()];
        let uses = find_acronyms(
            [
                "THE NASA report on GPS",
                "More about NASA",
                "ABCDEFGHIJKLMNOP is too long, A is too short",
            ],
            &stoplist,
        );
        assert_eq!(
            uses,
            vec![
                AcronymUse {
                    acronym: "NASA".to_string(),
                    paragraph_index: 0
                },
                AcronymUse {
                    acronym: "GPS".to_string(),
                    paragraph_index: 0
                },
            ]
        );
    }

    #[test]
    fn test_inline_definition_either_order() {
        let full = "Application Programming Interface";
        assert!(defined_inline(
            "We use the API (Application Programming Interface) here.",
            "API",
            full
        ));
        assert!(defined_inline(
            "An application programming interface (api) is used.",
            "API",
            full
        ));
        assert!(!defined_inline("We call the API from our service.", "API", full));
    }

    #[test]
    fn test_definition_patterns() {
        let patterns = QcConfig::default().validate().unwrap().acronym_definitions;
        assert!(defined_by_pattern(&patterns, "The QZX stands for quiet zone exchange.", "QZX").is_some());
        assert!(defined_by_pattern(&patterns, "Quiet zone exchange (QZX) is used.", "QZX").is_some());
        assert!(defined_by_pattern(&patterns, "Nothing here.", "QZX").is_none());
    }
}
