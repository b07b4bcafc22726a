//! Run results and the JSON report

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// File name of the report inside the output directory
pub const RESULTS_FILE: &str = "api-test-results.json";

/// Result of a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of one suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub cases: Vec<CaseResult>,
}

impl SuiteResult {
    pub fn new(name: &str, cases: Vec<CaseResult>, duration_ms: u64) -> Self {
        let passed = cases.iter().filter(|c| c.success).count();
        Self {
            name: name.to_string(),
            passed,
            failed: cases.len() - passed,
            duration_ms,
            cases,
        }
    }

    pub fn total(&self) -> usize {
        self.cases.len()
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub suites: Vec<SuiteResult>,
}

impl RunSummary {
    pub fn new(
        base_url: &str,
        started_at: DateTime<Utc>,
        suites: Vec<SuiteResult>,
        duration_ms: u64,
    ) -> Self {
        let passed = suites.iter().map(|s| s.passed).sum();
        let failed = suites.iter().map(|s| s.failed).sum();
        Self {
            base_url: base_url.to_string(),
            started_at,
            total: passed + failed,
            passed,
            failed,
            duration_ms,
            suites,
        }
    }

    /// Percentage of passed cases; 0 for an empty run
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passed as f64 * 100.0 / self.total as f64
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Log the per-suite breakdown and the totals
    pub fn log(&self) {
        info!("");
        info!("Results for {}", self.base_url);
        for suite in &self.suites {
            info!(
                "  {}: {}/{} passed ({} ms)",
                suite.name,
                suite.passed,
                suite.total(),
                suite.duration_ms
            );
            for case in suite.cases.iter().filter(|c| !c.success) {
                error!(
                    "    ✗ {} - {}",
                    case.name,
                    case.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        info!(
            "Total: {} passed, {} failed ({:.1}%) in {} ms",
            self.passed,
            self.failed,
            self.success_rate(),
            self.duration_ms
        );
    }

    /// Write the summary as pretty JSON into `output_dir`
    pub fn write_results(&self, output_dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("creating {}", output_dir.display()))?;

        let path = output_dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, success: bool) -> CaseResult {
        CaseResult {
            name: name.to_string(),
            success,
            duration_ms: 5,
            error: if success {
                None
            } else {
                Some("Contract violation: boom".to_string())
            },
        }
    }

    fn summary() -> RunSummary {
        let health = SuiteResult::new("Health", vec![case("status", true), case("docs", true)], 10);
        let items = SuiteResult::new(
            "Items CRUD",
            vec![case("create", true), case("delete twice", false)],
            20,
        );
        RunSummary::new("http://localhost:5000", Utc::now(), vec![health, items], 30)
    }

    #[test]
    fn test_summary_totals() {
        let summary = summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.success_rate(), 75.0);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_empty_run() {
        let summary = RunSummary::new("http://localhost:5000", Utc::now(), vec![], 0);
        assert_eq!(summary.success_rate(), 0.0);
        assert!(summary.is_success());
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("reports");

        let path = summary().write_results(&output).unwrap();
        assert_eq!(path, output.join(RESULTS_FILE));

        let written: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.failed, 1);
        assert_eq!(written.suites[1].cases[1].name, "delete twice");
    }
}
