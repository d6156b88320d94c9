// Rules 9-10: internal link targets and external link reachability.

use super::{paragraph_location, CheckContext, QcRule};
use crate::links::{probe_all, LinkCheck};
use crate::types::{QcResult, ViolationLocation, ViolationType};
use anyhow::Result;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::LazyLock;

pub struct InternalHyperlinksRule;
pub struct ExternalHyperlinksRule;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("URL pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalLinkKind {
    Hyperlink,
    TextReference { paragraph_index: usize },
}

impl fmt::Display for InternalLinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternalLinkKind::Hyperlink => f.write_str("hyperlink"),
            InternalLinkKind::TextReference { .. } => f.write_str("text_reference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLink {
    pub anchor: String,
    pub text: String,
    pub kind: InternalLinkKind,
}

/// Anchored hyperlinks in document order, then textual section references
/// paragraph by paragraph. Each reference pattern contributes its own
/// matches, so "see section 2" counts for both `section N` and `see section N`.
pub fn collect_internal_links(ctx: &CheckContext) -> Vec<InternalLink> {
    let mut links: Vec<InternalLink> = ctx
        .document
        .navigation
        .internal_links()
        .filter_map(|link| {
            Some(InternalLink {
                anchor: link.anchor.clone()?,
                text: link.text.clone(),
                kind: InternalLinkKind::Hyperlink,
            })
        })
        .collect();

    for (index, paragraph) in ctx.document.model.paragraphs.iter().enumerate() {
        let text = paragraph.text();
        for pattern in &ctx.patterns.section_references {
            for caps in pattern.captures_iter(&text) {
                let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                links.push(InternalLink {
                    anchor: format!("section_{}", number.as_str()),
                    text: whole.as_str().to_string(),
                    kind: InternalLinkKind::TextReference {
                        paragraph_index: index,
                    },
                });
            }
        }
    }

    links
}

/// First target the anchor resolves to
pub fn resolve_anchor<'t>(anchor: &str, targets: &'t BTreeSet<String>) -> Option<&'t str> {
    let anchor = anchor.to_lowercase();
    let section_number = anchor.contains("section_").then(|| anchor.replace("section_", ""));
    let anchor_words: HashSet<&str> = anchor.split_whitespace().collect();

    targets
        .iter()
        .find(|target| {
            if anchor == **target {
                return true;
            }
            if let Some(number) = &section_number {
                if target.contains(&format!("{number}.")) || target.contains(number.as_str()) {
                    return true;
                }
            }
            target
                .split_whitespace()
                .any(|word| anchor_words.contains(word))
        })
        .map(String::as_str)
}

impl QcRule for InternalHyperlinksRule {
    fn number(&self) -> u8 {
        9
    }

    fn name(&self) -> &str {
        "Internal Hyperlinks Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let links = collect_internal_links(ctx);
        if links.is_empty() {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                "No internal hyperlinks found (no issues)",
            )
            .with_details("No internal hyperlinks or references detected in the document"));
        }

        let targets = ctx.document.navigation.link_targets();
        let mut working = Vec::new();
        let mut broken = Vec::new();
        let mut locations = Vec::new();

        for link in &links {
            match resolve_anchor(&link.anchor, &targets) {
                Some(target) => working.push(format!(
                    "✓ Working link: '{}' → '{}' ({})",
                    link.text, target, link.kind
                )),
                None => {
                    broken.push(format!(
                        "✗ Broken link: '{}' → '{}' ({})",
                        link.text, link.anchor, link.kind
                    ));
                    locations.push(match link.kind {
                        InternalLinkKind::TextReference { paragraph_index } => {
                            paragraph_location(paragraph_index, &link.text)
                        }
                        InternalLinkKind::Hyperlink => {
                            ViolationLocation::new("hyperlink", None).with_preview(&link.anchor)
                        }
                    });
                }
            }
        }

        let total = links.len();
        if broken.is_empty() {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                format!("All {total} internal hyperlinks are valid"),
            )
            .with_details(format!(
                "Working links ({}/{total}):\n{}\n\nValidated {total} internal links against {} targets",
                working.len(),
                working.join("\n"),
                targets.len()
            )));
        }

        let mut details = format!("Broken links ({}/{total}):\n{}", broken.len(), broken.join("\n"));
        if !working.is_empty() {
            details.push_str(&format!(
                "\n\nWorking links ({}/{total}):\n{}",
                working.len(),
                working.join("\n")
            ));
        }

        Ok(QcResult::violation(
            self.number(),
            self.name(),
            ViolationType::Error,
            format!(
                "Found {} broken internal links out of {total} total links",
                broken.len()
            ),
        )
        .with_details(details)
        .with_locations(ctx.capped(&locations)))
    }
}

/// External hyperlink targets and bare URLs in body text, de-duplicated and sorted
pub fn collect_external_urls(ctx: &CheckContext) -> Vec<String> {
    let mut urls = BTreeSet::new();

    for link in &ctx.document.navigation.hyperlinks {
        if link.anchor.is_none()
            && link.relationship_id.is_some()
            && (link.text.starts_with("http://") || link.text.starts_with("https://"))
        {
            urls.insert(link.text.clone());
        }
    }

    let text = ctx.document.model.full_text();
    for found in URL_PATTERN.find_iter(&text) {
        urls.insert(found.as_str().to_string());
    }

    urls.into_iter().collect()
}

impl QcRule for ExternalHyperlinksRule {
    fn number(&self) -> u8 {
        10
    }

    fn name(&self) -> &str {
        "External Hyperlinks Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let urls = collect_external_urls(ctx);
        if urls.is_empty() {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                "No external hyperlinks found (no issues)",
            ));
        }

        log::info!("Probing {} external links", urls.len());
        let checks = probe_all(ctx.prober, &urls, ctx.config.links.max_concurrent_probes);
        let broken: Vec<&LinkCheck> = checks.iter().filter(|c| c.status.is_broken()).collect();

        if broken.is_empty() {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                format!("All {} external hyperlinks are valid", urls.len()),
            )
            .with_details(format!("Validated {} external URLs", urls.len())));
        }

        let details = broken
            .iter()
            .map(|c| c.status.describe(&c.url))
            .collect::<Vec<_>>()
            .join("\n");
        let locations = broken
            .iter()
            .take(ctx.config.max_reported_locations)
            .map(|c| ViolationLocation::new("hyperlink", None).with_preview(&c.url))
            .collect();

        Ok(QcResult::violation(
            self.number(),
            self.name(),
            ViolationType::Error,
            format!("Found {} broken external links", broken.len()),
        )
        .with_details(details)
        .with_locations(locations))
    }
}
