use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== RESULT TYPES =====
// One QcResult per rule invocation, built once and never mutated.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationType {
    Error,
    Warning,
    Info,
    Success,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::Error => "error",
            ViolationType::Warning => "warning",
            ViolationType::Info => "info",
            ViolationType::Success => "success",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a violation was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationLocation {
    /// `word`, `paragraph`, `section`, `hyperlink`, ...
    pub element_type: String,
    pub element_index: Option<usize>,
    /// At most 100 characters
    pub text_preview: Option<String>,
    /// Page number for word locations
    pub line_number: Option<usize>,
}

pub const TEXT_PREVIEW_LIMIT: usize = 100;

impl ViolationLocation {
    pub fn new(element_type: &str, element_index: Option<usize>) -> Self {
        Self {
            element_type: element_type.to_string(),
            element_index,
            text_preview: None,
            line_number: None,
        }
    }

    pub fn with_preview(mut self, preview: &str) -> Self {
        self.text_preview = Some(preview.chars().take(TEXT_PREVIEW_LIMIT).collect());
        self
    }

    pub fn with_line(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcResult {
    pub rule_name: String,
    pub rule_number: u8,
    pub passed: bool,
    pub violation_type: ViolationType,
    pub message: String,
    pub details: Option<String>,
    pub locations: Vec<ViolationLocation>,
    /// Passed on a fail-open default rather than a measured value
    #[serde(default)]
    pub assumed_default: bool,
}

impl QcResult {
    pub fn success(rule_number: u8, rule_name: &str, message: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            rule_number,
            passed: true,
            violation_type: ViolationType::Success,
            message: message.into(),
            details: None,
            locations: Vec::new(),
            assumed_default: false,
        }
    }

    pub fn violation(
        rule_number: u8,
        rule_name: &str,
        violation_type: ViolationType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            rule_number,
            passed: false,
            violation_type,
            message: message.into(),
            details: None,
            locations: Vec::new(),
            assumed_default: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_locations(mut self, locations: Vec<ViolationLocation>) -> Self {
        self.locations = locations;
        self
    }

    pub fn assumed(mut self) -> Self {
        self.assumed_default = true;
        self
    }

    pub fn status_label(&self) -> String {
        if self.passed {
            "PASS".to_string()
        } else {
            format!("FAIL ({})", self.violation_type)
        }
    }
}

/// Outcome of resolving a value that may fall back to a default.
///
/// Keeps "measured and fine" apart from "could not measure, assumed fine".
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Measured { value: T, source: &'static str },
    Assumed { value: T, reason: String },
}

impl<T> Resolution<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolution::Measured { value, .. } | Resolution::Assumed { value, .. } => value,
        }
    }
}

// ===== REPORT TYPES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub success_rate: f64,
    pub overall_status: OverallStatus,
    pub severity: Severity,
}

impl ReportSummary {
    pub fn from_results(results: &[QcResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failing = |kind: ViolationType| {
            results
                .iter()
                .filter(|r| !r.passed && r.violation_type == kind)
                .count()
        };
        let errors = failing(ViolationType::Error);
        let warnings = failing(ViolationType::Warning);
        let info = failing(ViolationType::Info);

        let success_rate = if total > 0 {
            (passed as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        let severity = if errors > 0 {
            Severity::Error
        } else if warnings > 0 {
            Severity::Warning
        } else if info > 0 {
            Severity::Info
        } else {
            Severity::Success
        };

        Self {
            total_checks: total,
            passed_checks: passed,
            failed_checks: total - passed,
            errors,
            warnings,
            info,
            success_rate,
            overall_status: if passed == total {
                OverallStatus::Pass
            } else {
                OverallStatus::Fail
            },
            severity,
        }
    }
}

/// Complete QC report for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcReport {
    document: String,
    document_sha256: Option<String>,
    timestamp: DateTime<Utc>,
    summary: ReportSummary,
    results: Vec<QcResult>,
}

impl QcReport {
    pub fn new(document: &str, document_sha256: Option<String>, results: Vec<QcResult>) -> Self {
        Self::with_timestamp(document, document_sha256, Utc::now(), results)
    }

    pub fn with_timestamp(
        document: &str,
        document_sha256: Option<String>,
        timestamp: DateTime<Utc>,
        results: Vec<QcResult>,
    ) -> Self {
        Self {
            document: document.to_string(),
            document_sha256,
            timestamp,
            summary: ReportSummary::from_results(&results),
            results,
        }
    }

    /// Report for a document that could not be loaded
    pub fn load_failure(document: &str, reason: &str) -> Self {
        let result = QcResult::violation(0, "Document Loading", ViolationType::Error, "Failed to load document")
            .with_details(reason);
        Self::new(document, None, vec![result])
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn document_sha256(&self) -> Option<&str> {
        self.document_sha256.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn results(&self) -> &[QcResult] {
        &self.results
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    pub fn all_passed(&self) -> bool {
        self.summary.overall_status == OverallStatus::Pass
    }
}
