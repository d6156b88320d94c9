//! Report output for the terminal and for machine consumers.

use anyhow::Result;
use docqc_core::{QcReport, QcResult};
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 70;

pub fn render_json(report: &QcReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn status_icon(result: &QcResult) -> &'static str {
    if result.passed {
        "✅"
    } else if result.violation_type == docqc_core::ViolationType::Warning {
        "⚠️ "
    } else {
        "❌"
    }
}

/// Human-readable report: summary block, then one section per rule
pub fn render_text(report: &QcReport) -> String {
    let mut out = String::new();
    match render_into(&mut out, report) {
        Ok(()) => out,
        Err(e) => format!("failed to render report: {e}"),
    }
}

fn render_into(out: &mut String, report: &QcReport) -> fmt::Result {
    let summary = report.summary();
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{rule}")?;
    writeln!(out, "📄 QC Report: {}", report.document())?;
    writeln!(out, "   Checked at: {}", report.timestamp().to_rfc3339())?;
    if let Some(sha) = report.document_sha256() {
        writeln!(out, "   SHA-256:    {sha}")?;
    }
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "📊 {}/{} checks passed ({:.2}%) - overall {:?}, severity {:?}",
        summary.passed_checks,
        summary.total_checks,
        summary.success_rate,
        summary.overall_status,
        summary.severity
    )?;
    writeln!(
        out,
        "   Errors: {}, Warnings: {}, Info: {}",
        summary.errors, summary.warnings, summary.info
    )?;

    for result in report.results() {
        writeln!(out, "\n{}", "-".repeat(RULE_WIDTH))?;
        writeln!(
            out,
            "{} {}. {} [{}]",
            status_icon(result),
            result.rule_number,
            result.rule_name,
            result.status_label()
        )?;
        writeln!(out, "   {}", result.message)?;
        if result.assumed_default {
            writeln!(out, "   (some values could not be read and were assumed)")?;
        }
        if let Some(details) = &result.details {
            for line in details.lines() {
                writeln!(out, "   {line}")?;
            }
        }
        if !result.passed && !result.locations.is_empty() {
            writeln!(out, "   📍 Locations:")?;
            for location in &result.locations {
                let index = location
                    .element_index
                    .map(|i| format!(" #{}", i + 1))
                    .unwrap_or_default();
                let preview = location.text_preview.as_deref().unwrap_or("");
                writeln!(out, "      - {}{index}: {preview}", location.element_type)?;
            }
        }
    }

    writeln!(out, "\n{rule}")
}
