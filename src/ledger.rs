//! Append-only result ledger and the report sink it notifies.

use crate::report::{Report, TEST_CATEGORIES};
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;

/// One named check outcome. Immutable once recorded.
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    /// Test name; repeated names are valid (one per pod/container/host).
    pub name: String,
    pub passed: bool,
    pub details: String,
}

/// Observer for outcomes and the final report as they are produced.
///
/// Purely a sink for rendering; never influences evaluator logic.
pub trait ReportSink: Send + Sync {
    /// Called once per check family, before its outcomes.
    fn section(&self, title: &str);

    /// Called for every outcome, in recording order.
    fn outcome(&self, outcome: &TestOutcome);

    /// Called once with the aggregated report at the end of the run.
    fn report(&self, report: &Report);
}

/// Append-only record of outcomes for one evaluator, with running counters.
///
/// Each evaluator owns exactly one ledger for the lifetime of a run; the
/// aggregator only ever reads them.
pub struct Ledger {
    outcomes: Vec<TestOutcome>,
    passed: usize,
    failed: usize,
    sink: Arc<dyn ReportSink>,
}

impl Ledger {
    #[must_use]
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self {
            outcomes: Vec::new(),
            passed: 0,
            failed: 0,
            sink,
        }
    }

    /// Append an outcome, bump the matching counter, and notify the sink.
    /// Always succeeds.
    pub fn record(&mut self, name: impl Into<String>, passed: bool, details: impl Into<String>) {
        let outcome = TestOutcome {
            name: name.into(),
            passed,
            details: details.into(),
        };
        self.sink.outcome(&outcome);
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Emit a section banner through the sink.
    pub fn section(&self, title: &str) {
        self.sink.section(title);
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.passed
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// Counters plus the recorded outcomes, in order.
    #[must_use]
    pub fn summary(&self) -> (usize, usize, &[TestOutcome]) {
        (self.passed, self.failed, &self.outcomes)
    }
}

/// Console sink: `✓ PASSED` / `✗ FAILED` lines with indented detail, blue
/// section banners, and the framed coverage report.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn section(&self, title: &str) {
        println!("\n{}", format!("=== {title} ===").blue());
    }

    fn outcome(&self, outcome: &TestOutcome) {
        let status = if outcome.passed {
            "✓ PASSED".green()
        } else {
            "✗ FAILED".red()
        };
        println!("{status} - {}", outcome.name);
        if !outcome.details.is_empty() {
            println!("  └─ {}", outcome.details);
        }
    }

    fn report(&self, report: &Report) {
        let divider = "=".repeat(60);
        println!("\n{}", divider.blue());
        println!("{}", "=== TEST COVERAGE REPORT ===".blue());
        println!("{}\n", divider.blue());

        for summary in &report.summaries {
            println!(
                "{}: {} passed, {} failed",
                summary.label, summary.passed, summary.failed
            );
        }

        println!("\n{} {}", "Total Tests:".blue(), report.total);
        println!("{} {}", "Passed:".green(), report.passed);
        println!("{} {}", "Failed:".red(), report.failed);
        println!("{} {:.1}%\n", "Coverage:".yellow(), report.coverage);

        println!("{}", "Test Categories Covered:".blue());
        for category in TEST_CATEGORIES {
            println!("  {} {category}", "✓".green());
        }

        println!("\n{}\n", divider.blue());
    }
}

/// Sink that renders nothing; used when the caller wants the report as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ReportSink for SilentSink {
    fn section(&self, _title: &str) {}
    fn outcome(&self, _outcome: &TestOutcome) {}
    fn report(&self, _report: &Report) {}
}
