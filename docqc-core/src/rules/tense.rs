// Rule 11: verb tense consistency.
//
// Keyword heuristic: an indicator counts once if it occurs anywhere in the
// lowercased text (substring match, so "is" also counts inside "this").

use super::{paragraph_location, CheckContext, QcRule};
use crate::config::TenseConfig;
use crate::types::{QcResult, ViolationType};
use anyhow::Result;
use std::fmt;

pub struct VerbTenseRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TenseCounts {
    pub present: usize,
    pub past: usize,
    pub future: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tense {
    Present,
    Past,
    Future,
}

impl fmt::Display for Tense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tense::Present => "Present",
            Tense::Past => "Past",
            Tense::Future => "Future",
        })
    }
}

fn indicators_present(indicators: &[String], text: &str) -> usize {
    indicators
        .iter()
        .filter(|indicator| text.contains(indicator.as_str()))
        .count()
}

impl TenseCounts {
    pub fn of(config: &TenseConfig, text: &str) -> Self {
        let text = text.to_lowercase();
        Self {
            present: indicators_present(&config.present_indicators, &text),
            past: indicators_present(&config.past_indicators, &text),
            future: indicators_present(&config.future_indicators, &text),
        }
    }

    pub fn active(&self) -> usize {
        [self.present, self.past, self.future]
            .iter()
            .filter(|&&count| count > 0)
            .count()
    }

    pub fn max(&self) -> usize {
        self.present.max(self.past).max(self.future)
    }

    pub fn primary(&self) -> Tense {
        if self.present > self.past && self.present > self.future {
            Tense::Present
        } else if self.past > self.future {
            Tense::Past
        } else {
            Tense::Future
        }
    }

    /// The first mixed pair found in a paragraph, if any
    fn mix(&self) -> Option<&'static str> {
        if self.present > 0 && self.past > 0 {
            Some("Mixed present and past tense")
        } else if self.present > 0 && self.future > 0 {
            Some("Mixed present and future tense")
        } else if self.past > 0 && self.future > 0 {
            Some("Mixed past and future tense")
        } else {
            None
        }
    }
}

impl fmt::Display for TenseCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Present: {}, Past: {}, Future: {}",
            self.present, self.past, self.future
        )
    }
}

impl QcRule for VerbTenseRule {
    fn number(&self) -> u8 {
        11
    }

    fn name(&self) -> &str {
        "Verb Tense Consistency Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let tense = &ctx.config.tense;
        let counts = TenseCounts::of(tense, &ctx.document.model.full_text());

        let mut inconsistencies = Vec::new();
        let mut locations = Vec::new();
        if counts.active() > 2 && counts.max() > tense.threshold {
            for (index, paragraph) in ctx.document.model.paragraphs.iter().enumerate() {
                let text = paragraph.text();
                if let Some(mix) = TenseCounts::of(tense, &text).mix() {
                    inconsistencies.push(format!("Paragraph {}: {mix}", index + 1));
                    locations.push(paragraph_location(index, &text));
                }
            }
        }

        if inconsistencies.is_empty() {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                "Verb tenses appear to be consistent",
            )
            .with_details(format!(
                "Primary tense detected: {} ({counts})",
                counts.primary()
            )));
        }

        Ok(QcResult::violation(
            self.number(),
            self.name(),
            ViolationType::Warning,
            "Multiple verb tenses detected - potential inconsistency",
        )
        .with_details(format!(
            "Present tense indicators: {}, Past tense indicators: {}, Future tense indicators: {}\n\nInconsistencies:\n{}",
            counts.present,
            counts.past,
            counts.future,
            inconsistencies.join("\n")
        ))
        .with_locations(ctx.capped(&locations)))
    }
}
