//! Pilotar: scenario driver for asynchronously-updating UIs.
//!
//! Drives a live user interface through an abstract command channel:
//! actions are dispatched against elements addressed by opaque selector
//! strings, eventually-true conditions are polled under bounded timeouts,
//! the first unmet expectation fails the whole run, and diagnostic
//! artifacts (screenshots, narration) are captured for post-mortem
//! debugging.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │  Scenario    │──►│  Action      │──►│  Condition   │──►│  Command    │
//! │  Runner      │   │  Dispatcher  │   │  Poller      │   │  Channel    │
//! │  (fail-fast) │   │  (click,     │   │  (interval,  │   │  (UI        │
//! │              │   │   waits)     │   │   deadline)  │   │   surface)  │
//! └──────────────┘   └──────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! Failures flow back up unchanged in kind, enriched with context at each
//! layer; the runner turns the first failure into one diagnostic
//! [`RunReport`].
//!
//! # Example
//!
//! ```
//! use pilotar::mock::MockChannel;
//! use pilotar::{Dispatcher, Scenario, ScenarioRunner, Selector};
//!
//! let mut surface = MockChannel::new();
//! surface.set_text("#search", "");
//! surface.script_text(".main-action", ["Install", "Launch"]);
//!
//! let mut runner = ScenarioRunner::new(Dispatcher::new(surface));
//! let report = runner.run(
//!     Scenario::new("install flow")
//!         .step("searching for known game", |d| {
//!             d.click(&Selector::new("#search"))
//!         })
//!         .step("launching it", |d| {
//!             d.wait_for_text(&Selector::new(".main-action"), "Launch")
//!         }),
//! );
//! assert!(report.is_completed());
//! ```

#![warn(missing_docs)]

mod channel;
mod dispatch;
mod poll;
mod report;
mod result;
mod scenario;
mod selector;
mod sink;
mod store;

/// Scriptable mock surface for tests and demos.
pub mod mock;

/// Tracing bootstrap for harnesses and examples.
pub mod trace;

pub use channel::{Command, CommandChannel, Payload, Screenshot};
pub use dispatch::Dispatcher;
pub use poll::{
    CancelToken, PollSpec, PollStatus, Poller, WaitResult, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};
pub use report::{FailureDetail, RunReport, RunStatus, StepRecord, StepStatus};
pub use result::{FailureKind, PilotError, PilotResult};
pub use scenario::{Scenario, ScenarioRunner, Step};
pub use selector::Selector;
pub use sink::{LogSink, MemorySink, TracingSink};
pub use store::{DirStore, MemoryStore, NullStore, ScreenshotHandle, ScreenshotStore};
