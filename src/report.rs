//! Coverage aggregation across evaluator ledgers.

use crate::ledger::{Ledger, TestOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Check families this harness is designed to exercise. A static manifest,
/// not derived from the ledgers.
pub const TEST_CATEGORIES: [&str; 7] = [
    "K3s Service Health",
    "Pod Readiness State",
    "Liveness/Readiness Probes",
    "Service Endpoints",
    "Ingress Configuration",
    "Ingress Routing Rules",
    "HTTP Connectivity",
];

/// Per-evaluator totals and recorded outcomes carried into the final report.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub label: String,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<TestOutcome>,
}

/// Final aggregated run report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summaries: Vec<LedgerSummary>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage of outcomes that passed; 0 when nothing was recorded.
    pub coverage: f64,
    pub categories: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Report {
    /// The run passes only when no outcome failed.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status: 0 on pass, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_pass())
    }
}

/// Fold one or more labeled ledgers into a single report.
#[must_use]
pub fn aggregate(ledgers: &[(&str, &Ledger)]) -> Report {
    let summaries: Vec<LedgerSummary> = ledgers
        .iter()
        .map(|(label, ledger)| LedgerSummary {
            label: (*label).to_string(),
            passed: ledger.passed_count(),
            failed: ledger.failed_count(),
            outcomes: ledger.outcomes().to_vec(),
        })
        .collect();

    let passed: usize = summaries.iter().map(|summary| summary.passed).sum();
    let failed: usize = summaries.iter().map(|summary| summary.failed).sum();
    let total = passed + failed;
    let coverage = if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    };

    Report {
        summaries,
        total,
        passed,
        failed,
        coverage,
        categories: TEST_CATEGORIES.iter().map(ToString::to_string).collect(),
        timestamp: Utc::now(),
    }
}
