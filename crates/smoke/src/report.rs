//! Step records and the run summary

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    /// The check did not apply to the current app state, e.g. the viewer
    /// flow when the wallet holds no photos
    Skipped,
    Failed,
}

/// Record of one executed check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub label: String,
    pub status: StepStatus,
    pub detail: Option<String>,
    pub artifact: Option<PathBuf>,
    pub duration_ms: u64,
}

/// Accumulated results for a whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    steps: Vec<StepRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn passed(&self) -> usize {
        self.count(StepStatus::Passed)
    }

    pub fn skipped(&self) -> usize {
        self.count(StepStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(StepStatus::Failed)
    }

    fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Closing lines printed after a run that reached the end
    pub fn print_summary(&self, total: Duration, artifact_dir: &Path) {
        println!(
            "\n✅ All checks completed: {} passed, {} skipped, {} failed ({} ms)",
            self.passed(),
            self.skipped(),
            self.failed(),
            total.as_millis()
        );
        println!("\n📸 Screenshots saved to {}", artifact_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, status: StepStatus) -> StepRecord {
        StepRecord {
            label: label.to_string(),
            status,
            detail: None,
            artifact: None,
            duration_ms: 5,
        }
    }

    #[test]
    fn counts_by_status() {
        let mut report = RunReport::new();
        report.push(record("server readiness", StepStatus::Passed));
        report.push(record("photo viewer", StepStatus::Skipped));
        report.push(record("settings dialog", StepStatus::Passed));

        assert_eq!(report.passed(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.steps().len(), 3);
    }

    #[test]
    fn empty_report_counts_zero() {
        let report = RunReport::new();
        assert_eq!(report.passed(), 0);
        assert_eq!(report.skipped(), 0);
        assert_eq!(report.failed(), 0);
    }
}
