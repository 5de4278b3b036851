//! Run reports: the one artifact a scenario execution produces.
//!
//! A report names every step in order with its outcome, and on failure
//! carries enough diagnostic detail (failing step, error kind, selector,
//! last observed state, optional screenshot) that a human can diagnose
//! the run without re-running it with instrumentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use uuid::Uuid;

use crate::result::{FailureKind, PilotError, PilotResult};
use crate::store::ScreenshotHandle;

/// Outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// Step completed
    Passed,
    /// Step's outcome was a failure; the run stopped here
    Failed,
    /// Step was never attempted because an earlier step failed
    Skipped,
}

impl StepStatus {
    /// Check if the step completed.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if the step failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// One step's entry in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step label, as narrated before execution
    pub label: String,
    /// Outcome
    pub status: StepStatus,
    /// Execution time (zero for skipped steps)
    pub duration: Duration,
    /// Error message if the step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepRecord {
    /// Record a completed step.
    #[must_use]
    pub fn passed(label: impl Into<String>, duration: Duration) -> Self {
        Self {
            label: label.into(),
            status: StepStatus::Passed,
            duration,
            error: None,
        }
    }

    /// Record a failed step.
    #[must_use]
    pub fn failed(label: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: StepStatus::Failed,
            duration,
            error: Some(error.into()),
        }
    }

    /// Record a step that was never attempted.
    #[must_use]
    pub fn skipped(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: StepStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
        }
    }
}

/// Diagnostic detail for the step that stopped the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureDetail {
    /// Zero-based index of the failing step
    pub step_index: usize,
    /// Label of the failing step
    pub step_label: String,
    /// Error classification
    pub kind: FailureKind,
    /// Rendered error, including any last-observed state
    pub message: String,
    /// Selector involved, when the error carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Best-effort capture taken at the moment of failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<ScreenshotHandle>,
}

impl FailureDetail {
    /// Assemble failure detail from the failing step's error.
    #[must_use]
    pub fn from_error(
        step_index: usize,
        step_label: impl Into<String>,
        error: &PilotError,
        screenshot: Option<ScreenshotHandle>,
    ) -> Self {
        Self {
            step_index,
            step_label: step_label.into(),
            kind: error.kind(),
            message: error.to_string(),
            selector: error.selector().map(ToString::to_string),
            screenshot,
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every step succeeded
    Completed,
    /// A step failed; the rest were skipped
    Failed,
}

/// The report handed to the enclosing harness at the end of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of this execution
    pub run_id: Uuid,
    /// Scenario name
    pub scenario: String,
    /// Terminal state
    pub status: RunStatus,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Every step in order, with its outcome
    pub steps: Vec<StepRecord>,
    /// Present exactly when `status` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDetail>,
}

impl RunReport {
    /// Whether every step succeeded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Labels of completed steps, in execution order.
    #[must_use]
    pub fn completed_labels(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.status.is_passed())
            .map(|s| s.label.as_str())
            .collect()
    }

    /// Labels of steps that were never attempted.
    #[must_use]
    pub fn skipped_labels(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .map(|s| s.label.as_str())
            .collect()
    }

    /// Count of completed steps.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_passed()).count()
    }

    /// Total step count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.steps.len()
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration(&self) -> chrono::TimeDelta {
        self.finished_at - self.started_at
    }

    /// Pretty-printed JSON export, failure screenshot inlined when the
    /// store kept its bytes.
    pub fn to_json(&self) -> PilotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Console rendering of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let verdict = match self.status {
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        };
        let mut out = String::new();
        let _ = writeln!(
            out,
            "scenario {:?}: {verdict} ({}/{} steps, {}ms)",
            self.scenario,
            self.passed_count(),
            self.total(),
            self.duration().num_milliseconds()
        );
        for step in &self.steps {
            let marker = match step.status {
                StepStatus::Passed => "pass",
                StepStatus::Failed => "FAIL",
                StepStatus::Skipped => "skip",
            };
            let _ = writeln!(out, "  [{marker}] {} ({}ms)", step.label, step.duration.as_millis());
        }
        if let Some(failure) = &self.failure {
            let _ = writeln!(
                out,
                "  failure at step {} ({:?}): {}",
                failure.step_index, failure.step_label, failure.message
            );
            if let Some(selector) = &failure.selector {
                let _ = writeln!(out, "  selector: {selector}");
            }
            if let Some(shot) = &failure.screenshot {
                match &shot.path {
                    Some(path) => {
                        let _ = writeln!(out, "  screenshot: {}", path.display());
                    }
                    None => {
                        let _ = writeln!(out, "  screenshot: {:?}", shot.label);
                    }
                }
            }
        }
        out
    }
}
