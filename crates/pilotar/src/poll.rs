//! Condition polling with bounded timeouts.
//!
//! The central building block for every "wait until" operation: a predicate
//! is evaluated immediately, then re-evaluated at a fixed interval until it
//! reports satisfied or the deadline elapses. Transient "not yet" states
//! are retried; channel-level failures abort the poll at once, because
//! retrying against a dead channel cannot converge and only burns the
//! timeout budget masking a worse problem.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::result::{PilotError, PilotResult};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// How often a predicate is re-evaluated and for how long.
///
/// Invariant: `interval > 0` and `timeout >= interval`; otherwise the
/// predicate could never be evaluated before the deadline fires, which is
/// a configuration error, not a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    /// Sleep between evaluations
    pub interval: Duration,
    /// Wall-clock budget measured from the first evaluation
    pub timeout: Duration,
}

impl Default for PollSpec {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl PollSpec {
    /// Create a spec with the default interval and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Reject specs that could never evaluate their predicate in time.
    pub fn validate(&self) -> PilotResult<()> {
        if self.interval.is_zero() {
            return Err(PilotError::InvalidPollSpec {
                message: "interval must be greater than zero".to_string(),
            });
        }
        if self.timeout < self.interval {
            return Err(PilotError::InvalidPollSpec {
                message: format!(
                    "timeout {:?} is shorter than interval {:?}",
                    self.timeout, self.interval
                ),
            });
        }
        Ok(())
    }
}

/// One observation of a polled condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// Condition holds; stop polling
    Satisfied,
    /// Condition does not hold yet; the carried description of what was
    /// observed feeds the deadline diagnostic
    Pending(String),
}

impl PollStatus {
    /// Pending with an observed-state description.
    #[must_use]
    pub fn pending(observed: impl Into<String>) -> Self {
        Self::Pending(observed.into())
    }
}

/// Cooperative cancellation flag shared with the enclosing harness.
///
/// Clones share the flag; an in-progress poll observes cancellation within
/// one polling interval.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every poll holding a clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Successful wait outcome.
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time from the first evaluation to the satisfied observation
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Repeated predicate evaluation under one [`PollSpec`].
#[derive(Debug, Clone, Default)]
pub struct Poller {
    spec: PollSpec,
    cancel: CancelToken,
}

impl Poller {
    /// Create a poller for the given spec.
    #[must_use]
    pub fn new(spec: PollSpec) -> Self {
        Self {
            spec,
            cancel: CancelToken::new(),
        }
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Evaluate `predicate` until it is satisfied or the deadline elapses.
    ///
    /// The predicate runs immediately, then once per interval. `Ok(Pending)`
    /// is retried; any `Err` (notably `ChannelUnavailable`) aborts the
    /// poll and propagates unchanged. The sleep before the final evaluation
    /// is clamped to the remaining budget, so success never blocks past the
    /// deadline and timeout overshoot stays within one interval.
    pub fn run<F>(
        &self,
        description: impl Into<String>,
        mut predicate: F,
    ) -> PilotResult<WaitResult>
    where
        F: FnMut() -> PilotResult<PollStatus>,
    {
        self.spec.validate()?;
        let description = description.into();
        let start = Instant::now();
        let mut last_observed = String::from("not yet evaluated");

        loop {
            if self.cancel.is_cancelled() {
                return Err(PilotError::Cancelled);
            }
            match predicate()? {
                PollStatus::Satisfied => {
                    return Ok(WaitResult {
                        elapsed: start.elapsed(),
                        waited_for: description,
                    });
                }
                PollStatus::Pending(observed) => last_observed = observed,
            }
            let elapsed = start.elapsed();
            if elapsed >= self.spec.timeout {
                return Err(PilotError::DeadlineExceeded {
                    ms: self.spec.timeout.as_millis() as u64,
                    last_observed,
                });
            }
            let remaining = self.spec.timeout - elapsed;
            std::thread::sleep(remaining.min(self.spec.interval));
        }
    }
}
