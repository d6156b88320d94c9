//! End-to-end report assembly: ordering, load failures, engine error capture
//! and repeatability.

mod support;

use anyhow::{bail, Result};
use docqc_core::acronyms::AcronymTable;
use docqc_core::rules::{CheckContext, QcRule, RuleEngine};
use docqc_core::{LinkStatus, LoadedDocument, OverallStatus, QcConfig, QcResult, Severity, ViolationType};
use pretty_assertions::assert_eq;
use support::*;

fn sample_document() -> DocxBuilder {
    DocxBuilder::new()
        .text("Table of Contents")
        .text("Introduction ....... 1")
        .block(styled_paragraph("Heading1", "Introduction"))
        .block(paragraph(&[run("We call the API from our service.", Some("Arial"), Some(11.0))]))
        .text("Details at https://example.com/spec and https://example.com/missing.")
        .text("See section 1 for scope.")
        .page(PageSetup::default())
}

fn sample_prober() -> FixedProber {
    FixedProber::default().with("https://example.com/missing.", LinkStatus::HttpError { status: 404 })
}

#[test]
fn report_has_one_result_per_rule_in_order() {
    let report = checker_with(QcConfig::default(), sample_prober())
        .check_bytes(&sample_document().build(), "sample.docx");

    let numbers: Vec<u8> = report.results().iter().map(|r| r.rule_number).collect();
    assert_eq!(numbers, (1..=12).collect::<Vec<u8>>());
    assert_eq!(report.document(), "sample.docx");
    assert_eq!(report.document_sha256().map(str::len), Some(64));

    let summary = report.summary();
    assert_eq!(summary.total_checks, 12);
    assert_eq!(summary.passed_checks + summary.failed_checks, 12);
    assert_eq!(summary.overall_status, OverallStatus::Fail);
    assert_eq!(summary.severity, Severity::Error);
    assert!(!report.all_passed());
}

#[test]
fn load_failure_is_a_single_rule_zero_error() {
    let report = checker().check_bytes(b"definitely not a zip", "broken.docx");
    assert_eq!(report.results().len(), 1);

    let result = &report.results()[0];
    assert_eq!(result.rule_number, 0);
    assert_eq!(result.rule_name, "Document Loading");
    assert_eq!(result.violation_type, ViolationType::Error);
    assert_eq!(result.message, "Failed to load document");
    assert!(report.document_sha256().is_none());
}

#[test]
fn missing_document_part_is_a_load_failure() {
    let bytes = zip_parts(&[("word/styles.xml", "<w:styles/>".to_string())]);
    let report = checker().check_bytes(&bytes, "empty.docx");
    assert_eq!(report.results()[0].details.as_deref(), Some("Missing required part: word/document.xml"));
}

#[test]
fn malformed_markup_is_a_load_failure() {
    let bytes = zip_parts(&[("word/document.xml", "<w:document><w:body>".to_string())]);
    let report = checker().check_bytes(&bytes, "truncated.docx");
    assert_eq!(report.results().len(), 1);
    assert!(report.results()[0]
        .details
        .as_deref()
        .unwrap()
        .starts_with("Malformed markup in word/document.xml"));
}

#[test]
fn check_path_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("on-disk.docx");
    std::fs::write(&path, sample_document().build()).unwrap();

    let report = checker_with(QcConfig::default(), sample_prober()).check_path(&path);
    assert_eq!(report.results().len(), 12);
    assert!(report.document().ends_with("on-disk.docx"));
}

#[test]
fn repeated_runs_are_identical_except_timestamp() {
    let checker = checker_with(QcConfig::default(), sample_prober());
    let document = LoadedDocument::from_bytes(&sample_document().build(), "sample.docx").unwrap();

    let first = checker.check_loaded(&document);
    let second = checker.check_loaded(&document);

    assert_eq!(first.results(), second.results());
    assert_eq!(first.summary(), second.summary());
    assert_eq!(
        serde_json::to_string(first.results()).unwrap(),
        serde_json::to_string(second.results()).unwrap()
    );
}

#[test]
fn parallel_rules_match_sequential_rules() {
    let document = LoadedDocument::from_bytes(&sample_document().build(), "sample.docx").unwrap();
    let sequential = checker_with(QcConfig::default(), sample_prober()).check_loaded(&document);

    let config = QcConfig {
        parallel_rules: true,
        ..QcConfig::default()
    };
    let parallel = checker_with(config, sample_prober()).check_loaded(&document);

    assert_eq!(sequential.results(), parallel.results());
}

struct FailingRule;

impl QcRule for FailingRule {
    fn number(&self) -> u8 {
        3
    }

    fn name(&self) -> &str {
        "Failing Rule"
    }

    fn check(&self, _ctx: &CheckContext) -> Result<QcResult> {
        bail!("style table unavailable")
    }
}

struct PanickingRule;

impl QcRule for PanickingRule {
    fn number(&self) -> u8 {
        2
    }

    fn name(&self) -> &str {
        "Panicking Rule"
    }

    fn check(&self, _ctx: &CheckContext) -> Result<QcResult> {
        panic!("index out of range")
    }
}

struct PassingRule;

impl QcRule for PassingRule {
    fn number(&self) -> u8 {
        1
    }

    fn name(&self) -> &str {
        "Passing Rule"
    }

    fn check(&self, _ctx: &CheckContext) -> Result<QcResult> {
        Ok(QcResult::success(self.number(), self.name(), "ok"))
    }
}

#[test]
fn engine_captures_rule_errors_and_keeps_going() {
    let document = LoadedDocument::from_bytes(&sample_document().build(), "sample.docx").unwrap();
    let config = QcConfig::default();
    let patterns = config.validate().unwrap();
    let acronyms = AcronymTable::builtin().unwrap();
    let prober = FixedProber::default();
    let ctx = CheckContext {
        document: &document,
        config: &config,
        patterns: &patterns,
        acronyms: &acronyms,
        prober: &prober,
    };

    let engine = RuleEngine::with_rules(vec![
        Box::new(FailingRule),
        Box::new(PanickingRule),
        Box::new(PassingRule),
    ]);
    let results = engine.run(&ctx);

    let numbers: Vec<u8> = results.iter().map(|r| r.rule_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(results[0].passed);
    assert_eq!(results[1].message, "Check failed with error: index out of range");
    assert_eq!(results[2].message, "Check failed with error: style table unavailable");
    assert_eq!(results[2].violation_type, ViolationType::Error);
    assert_eq!(engine.rule_timings.borrow().len(), 3);
}
