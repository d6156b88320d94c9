use crate::acronyms::AcronymTable;
use crate::config::{CompiledPatterns, QcConfig};
use crate::document::LoadedDocument;
use crate::links::{HttpLinkProber, LinkProber};
use crate::rules::{CheckContext, RuleEngine};
use crate::types::QcReport;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wall-clock timings for document loading and each rule.
///
/// Disabled profilers run the closure and record nothing.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let started = Instant::now();
        let value = f();
        let elapsed = started.elapsed();
        log::debug!("{step} finished in {}ms", elapsed.as_millis());
        self.timings.push((step.to_string(), elapsed));
        value
    }

    /// Append timings measured by someone else, such as the rule engine
    pub fn record(&mut self, timings: &[(String, Duration)]) {
        if self.enabled {
            self.timings.extend(timings.iter().cloned());
        }
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    fn total(&self) -> Duration {
        self.timings.iter().map(|(_, elapsed)| *elapsed).sum()
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total = self.total();
        println!("\n⏱️  Timing breakdown");
        for (step, elapsed) in &self.timings {
            let share = if total.is_zero() {
                0.0
            } else {
                elapsed.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            println!("   {step:<38} {:>6}ms {share:>5.1}%", elapsed.as_millis());
        }
        println!("   {:<38} {:>6}ms", "total", total.as_millis());
    }
}

/// One QC session: configuration, compiled patterns, the shared acronym
/// table and a link prober, reused for every document checked.
pub struct DocumentChecker {
    config: QcConfig,
    patterns: CompiledPatterns,
    acronyms: Arc<AcronymTable>,
    prober: Box<dyn LinkProber>,
    rule_engine: RuleEngine,
}

impl DocumentChecker {
    /// Checker with the built-in acronym table and a live HTTP prober
    pub fn new(config: QcConfig) -> Result<Self> {
        let prober = Box::new(HttpLinkProber::new(&config.links));
        Self::with_prober(config, AcronymTable::builtin()?, prober)
    }

    /// Create DocumentChecker with full dependency injection
    pub fn with_prober(
        config: QcConfig,
        acronyms: Arc<AcronymTable>,
        prober: Box<dyn LinkProber>,
    ) -> Result<Self> {
        let patterns = config.validate()?;
        Ok(Self {
            config,
            patterns,
            acronyms,
            prober,
            rule_engine: RuleEngine::new(),
        })
    }

    pub fn config(&self) -> &QcConfig {
        &self.config
    }

    pub fn check_path(&self, path: impl AsRef<Path>) -> QcReport {
        self.check_path_with_profiler(path, &mut StepProfiler::new(false))
    }

    pub fn check_path_with_profiler(
        &self,
        path: impl AsRef<Path>,
        profiler: &mut StepProfiler,
    ) -> QcReport {
        let path = path.as_ref();
        let name = path.display().to_string();
        match profiler.time_step("Document load", || LoadedDocument::open(path)) {
            Ok(document) => self.run_checks(&document, profiler),
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                QcReport::load_failure(&name, &e.to_string())
            }
        }
    }

    pub fn check_bytes(&self, bytes: &[u8], name: &str) -> QcReport {
        match LoadedDocument::from_bytes(bytes, name) {
            Ok(document) => self.check_loaded(&document),
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                QcReport::load_failure(name, &e.to_string())
            }
        }
    }

    pub fn check_loaded(&self, document: &LoadedDocument) -> QcReport {
        self.run_checks(document, &mut StepProfiler::new(false))
    }

    fn run_checks(&self, document: &LoadedDocument, profiler: &mut StepProfiler) -> QcReport {
        log::info!("Running QC checks on {}", document.source);
        let ctx = CheckContext {
            document,
            config: &self.config,
            patterns: &self.patterns,
            acronyms: &self.acronyms,
            prober: self.prober.as_ref(),
        };

        let results = self.rule_engine.run(&ctx);
        profiler.record(&self.rule_engine.rule_timings.borrow());

        QcReport::new(&document.source, Some(document.sha256.clone()), results)
    }
}
