//! Scenario sequencing and the fail-fast runner.
//!
//! A scenario is an ordered list of labeled steps modeling one user
//! journey. Steps form a strictly ordered causal chain: step N's
//! preconditions depend on the effects of step N-1, so the first failing
//! step stops the run and the rest are recorded as skipped rather than
//! attempted against a surface in an unknown state.

use chrono::Utc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::channel::CommandChannel;
use crate::dispatch::Dispatcher;
use crate::report::{FailureDetail, RunReport, RunStatus, StepRecord};
use crate::result::{PilotError, PilotResult};
use crate::store::ScreenshotHandle;

type StepAction<C> = Box<dyn FnOnce(&mut Dispatcher<C>) -> PilotResult<()>>;

/// One labeled step of a scenario.
///
/// Immutable once constructed; owned exclusively by the scenario handed
/// to a single runner execution.
pub struct Step<C> {
    label: String,
    action: StepAction<C>,
}

impl<C> Step<C> {
    /// Create a step from a label and its action.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        action: impl FnOnce(&mut Dispatcher<C>) -> PilotResult<()> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }

    /// The step's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<C> std::fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Ordered list of steps modeling one user journey.
pub struct Scenario<C> {
    name: String,
    steps: Vec<Step<C>>,
}

impl<C: CommandChannel> Scenario<C> {
    /// Create an empty scenario.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn step(
        mut self,
        label: impl Into<String>,
        action: impl FnOnce(&mut Dispatcher<C>) -> PilotResult<()> + 'static,
    ) -> Self {
        self.steps.push(Step::new(label, action));
        self
    }

    /// Append a diagnostic screenshot step that never fails the run.
    ///
    /// A failed capture is logged and swallowed; screenshots are for
    /// post-mortem debugging and must not decide a run's outcome.
    #[must_use]
    pub fn snapshot(self, label: impl Into<String>) -> Self {
        let label = label.into();
        let step_label = format!("screenshot: {label}");
        self.step(step_label, move |driver| {
            if let Err(error) = driver.take_screenshot(&label) {
                tracing::warn!(%error, label = %label, "diagnostic screenshot failed");
            }
            Ok(())
        })
    }

    /// Scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the scenario has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<C> std::fmt::Debug for Scenario<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Execution states of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Failed,
    Completed,
}

/// Executes scenarios step by step, fail-fast, one report per run.
#[derive(Debug)]
pub struct ScenarioRunner<C> {
    dispatcher: Dispatcher<C>,
}

impl<C: CommandChannel> ScenarioRunner<C> {
    /// Create a runner over a configured dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher<C>) -> Self {
        Self { dispatcher }
    }

    /// The underlying dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    /// Mutable access to the underlying dispatcher.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<C> {
        &mut self.dispatcher
    }

    /// Execute `scenario` to completion or first failure.
    ///
    /// Narrates each step's label before acting. On the first failing
    /// step the runner attempts one best-effort screenshot, assembles the
    /// failure detail, and records every remaining step as skipped. A
    /// cancellation requested between steps fails the pending step with
    /// `Cancelled` without executing it. Exactly one report is produced
    /// per run, success or failure.
    pub fn run(&mut self, scenario: Scenario<C>) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(scenario = %scenario.name, %run_id, "starting scenario run");

        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut failure = None;
        let mut state = RunState::Running;

        for (index, step) in scenario.steps.into_iter().enumerate() {
            if state != RunState::Running {
                steps.push(StepRecord::skipped(step.label));
                continue;
            }
            if self.dispatcher.is_cancelled() {
                let error = PilotError::Cancelled;
                failure = Some(FailureDetail::from_error(
                    index,
                    step.label.as_str(),
                    &error,
                    None,
                ));
                steps.push(StepRecord::failed(
                    step.label,
                    Duration::ZERO,
                    error.to_string(),
                ));
                state = RunState::Failed;
                continue;
            }

            self.dispatcher.log(&step.label);
            let clock = Instant::now();
            match (step.action)(&mut self.dispatcher) {
                Ok(()) => steps.push(StepRecord::passed(step.label, clock.elapsed())),
                Err(error) => {
                    tracing::error!(step = %step.label, %error, "step failed, aborting run");
                    let screenshot = self.capture_failure(index);
                    failure = Some(FailureDetail::from_error(
                        index,
                        step.label.as_str(),
                        &error,
                        screenshot,
                    ));
                    steps.push(StepRecord::failed(
                        step.label,
                        clock.elapsed(),
                        error.to_string(),
                    ));
                    state = RunState::Failed;
                }
            }
        }

        if state == RunState::Running {
            state = RunState::Completed;
        }
        let status = match state {
            RunState::Failed => RunStatus::Failed,
            _ => RunStatus::Completed,
        };
        let report = RunReport {
            run_id,
            scenario: scenario.name,
            status,
            started_at,
            finished_at: Utc::now(),
            steps,
            failure,
        };
        tracing::info!(%run_id, status = ?report.status, "scenario run finished");
        report
    }

    // Best effort; the channel may already be gone.
    fn capture_failure(&mut self, index: usize) -> Option<ScreenshotHandle> {
        match self.dispatcher.take_screenshot(&format!("step-{index}-failure")) {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::warn!(%error, "failure screenshot could not be captured");
                None
            }
        }
    }
}
