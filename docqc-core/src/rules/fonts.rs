// Rules 1-3: word-level font checks.
//
// Only formatting set directly on a run counts. A run with no explicit font
// or size inherits from its style and is never a violation.

use super::{word_location, CheckContext, QcRule};
use crate::types::{QcResult, ViolationType};
use crate::word_index::WordLocation;
use anyhow::Result;

pub struct FontFamilyRule;
pub struct NormalFontSizeRule;
pub struct TableFontSizeRule;

const SIZE_EPSILON: f64 = 1e-6;

struct WordViolation<'a> {
    word: &'a WordLocation,
    note: String,
}

fn violation_result(
    ctx: &CheckContext,
    rule_number: u8,
    rule_name: &str,
    message: String,
    violations: &[WordViolation],
) -> QcResult {
    let limit = ctx.config.max_reported_locations;
    let details = violations
        .iter()
        .take(limit)
        .map(|v| format!("{} ({})", v.word, v.note))
        .collect::<Vec<_>>()
        .join("\n");
    let locations = violations
        .iter()
        .take(limit)
        .map(|v| word_location(v.word))
        .collect();

    QcResult::violation(rule_number, rule_name, ViolationType::Error, message)
        .with_details(details)
        .with_locations(locations)
}

impl QcRule for FontFamilyRule {
    fn number(&self) -> u8 {
        1
    }

    fn name(&self) -> &str {
        "Font Family Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let doc = ctx.document;
        let accepted = &ctx.config.fonts.accepted_variants;
        let required = &ctx.config.fonts.required_font;

        let mut violations = Vec::new();
        for word in doc.words.words() {
            let Some(run) = doc.words.run_for(&doc.model, word) else {
                continue;
            };
            if let Some(font) = &run.attributes.font_name {
                let normalized = font.trim().to_lowercase();
                if !accepted.iter().any(|variant| *variant == normalized) {
                    violations.push(WordViolation {
                        word,
                        note: format!("Font: {font}"),
                    });
                }
            }
        }

        if violations.is_empty() {
            Ok(QcResult::success(
                self.number(),
                self.name(),
                format!("All words use {required} font"),
            )
            .with_details(format!(
                "Checked {} words across {} pages",
                doc.words.len(),
                doc.words.page_count()
            )))
        } else {
            Ok(violation_result(
                ctx,
                self.number(),
                self.name(),
                format!("Found {} words not using {required}", violations.len()),
                &violations,
            ))
        }
    }
}

/// Words whose explicit size differs from `expected`
fn size_violations<'a>(
    ctx: &'a CheckContext,
    words: impl Iterator<Item = &'a WordLocation>,
    expected: f64,
) -> (usize, Vec<WordViolation<'a>>) {
    let doc = ctx.document;
    let mut checked = 0;
    let mut violations = Vec::new();

    for word in words {
        checked += 1;
        let Some(run) = doc.words.run_for(&doc.model, word) else {
            continue;
        };
        if let Some(size) = run.attributes.font_size_pt {
            if (size - expected).abs() > SIZE_EPSILON {
                violations.push(WordViolation {
                    word,
                    note: format!("Size: {size}pt"),
                });
            }
        }
    }

    (checked, violations)
}

impl QcRule for NormalFontSizeRule {
    fn number(&self) -> u8 {
        2
    }

    fn name(&self) -> &str {
        "Normal Text Font Size Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let expected = ctx.config.fonts.normal_size_pt;
        let (checked, violations) = size_violations(ctx, ctx.document.words.body_words(), expected);

        if violations.is_empty() {
            Ok(QcResult::success(
                self.number(),
                self.name(),
                format!("All normal text uses {expected}pt font size"),
            )
            .with_details(format!("Checked {checked} words")))
        } else {
            Ok(violation_result(
                ctx,
                self.number(),
                self.name(),
                format!("Found {} words not using {expected}pt", violations.len()),
                &violations,
            ))
        }
    }
}

impl QcRule for TableFontSizeRule {
    fn number(&self) -> u8 {
        3
    }

    fn name(&self) -> &str {
        "Table Font Size Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let expected = ctx.config.fonts.table_size_pt;
        let (checked, violations) = size_violations(ctx, ctx.document.words.table_words(), expected);

        if violations.is_empty() {
            Ok(QcResult::success(
                self.number(),
                self.name(),
                format!("All table text uses {expected}pt font size"),
            )
            .with_details(format!("Checked {checked} table words")))
        } else {
            Ok(violation_result(
                ctx,
                self.number(),
                self.name(),
                format!("Found {} table words not using {expected}pt", violations.len()),
                &violations,
            ))
        }
    }
}
