use super::{standard_rules, CheckContext, QcRule};
use crate::types::{QcResult, ViolationType};
use rayon::prelude::*;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

pub struct RuleEngine {
    rules: Vec<Box<dyn QcRule>>,
    pub rule_timings: RefCell<Vec<(String, Duration)>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_rules(standard_rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn QcRule>>) -> Self {
        Self {
            rules,
            rule_timings: RefCell::new(Vec::new()),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run every rule and return results ordered by rule number.
    ///
    /// A rule that errors or panics still produces an ERROR result, so the
    /// report always carries one entry per rule.
    pub fn run(&self, ctx: &CheckContext) -> Vec<QcResult> {
        self.rule_timings.borrow_mut().clear();

        let rules = &self.rules;
        let mut outcomes: Vec<(QcResult, Duration)> = if ctx.config.parallel_rules {
            log::info!("Running {} rules in parallel", rules.len());
            rules.par_iter().map(|rule| run_rule(rule.as_ref(), ctx)).collect()
        } else {
            rules.iter().map(|rule| run_rule(rule.as_ref(), ctx)).collect()
        };

        outcomes.sort_by_key(|(result, _)| result.rule_number);

        let mut timings = self.rule_timings.borrow_mut();
        outcomes
            .into_iter()
            .map(|(result, elapsed)| {
                timings.push((result.rule_name.clone(), elapsed));
                result
            })
            .collect()
    }
}

fn run_rule(rule: &dyn QcRule, ctx: &CheckContext) -> (QcResult, Duration) {
    let started = Instant::now();
    log::debug!("Running rule {}: {}", rule.number(), rule.name());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.check(ctx)));
    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => failed_check(rule, &format!("{e:#}")),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "rule panicked".to_string());
            failed_check(rule, &reason)
        }
    };

    log_result(&result);
    (result, started.elapsed())
}

fn failed_check(rule: &dyn QcRule, reason: &str) -> QcResult {
    QcResult::violation(
        rule.number(),
        rule.name(),
        ViolationType::Error,
        format!("Check failed with error: {reason}"),
    )
}

fn log_result(result: &QcResult) {
    match result.violation_type {
        ViolationType::Error => log::error!("{}: {}", result.rule_name, result.message),
        ViolationType::Warning => log::warn!("{}: {}", result.rule_name, result.message),
        _ => log::info!("{}: {}", result.rule_name, result.message),
    }
}
