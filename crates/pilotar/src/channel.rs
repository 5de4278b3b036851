//! Command channel interface to the live UI surface.
//!
//! The channel is the one external collaborator the driver core consumes:
//! it executes imperative actions (click, set value, capture) and evaluates
//! queries (text, visibility, existence) against the surface, one
//! synchronous call at a time. The transport behind it is unspecified (a
//! remote-debugging protocol, an accessibility API, or an in-process DOM
//! handle all fit) as long as connectivity failure is reported distinctly
//! from "query returned false/empty".

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::result::{PilotError, PilotResult};
use crate::selector::Selector;

/// One imperative action or query against the UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Click the first element matching the selector
    Click(Selector),
    /// Set the value of the first element matching the selector
    SetValue {
        /// Target element
        selector: Selector,
        /// Value to set
        value: String,
    },
    /// Text content of the first matching element, if any
    QueryText(Selector),
    /// Whether a matching element is rendered and not hidden
    QueryVisible(Selector),
    /// Whether any element matches the selector
    QueryExists(Selector),
    /// Capture the current surface state
    Screenshot {
        /// Label the capture is keyed by
        label: String,
    },
}

impl Command {
    /// Operation name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click(_) => "click",
            Self::SetValue { .. } => "set_value",
            Self::QueryText(_) => "query_text",
            Self::QueryVisible(_) => "query_visible",
            Self::QueryExists(_) => "query_exists",
            Self::Screenshot { .. } => "screenshot",
        }
    }
}

/// Success payload of one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Action completed with nothing to report
    None,
    /// Boolean query result
    Bool(bool),
    /// Text query result; `None` when no element matched
    Text(Option<String>),
    /// Captured surface state
    Image(Screenshot),
}

/// Captured state of the UI surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    /// Raw image bytes (PNG on most surfaces)
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// When the capture was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot stamped with the current time.
    #[must_use]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: SystemTime::now(),
        }
    }

    /// Size of the raw bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check the capture carries data and nonzero dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }

    /// Base64 rendering of the raw bytes, for report embedding.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }
}

/// Synchronous command/query channel to the UI surface.
///
/// Implementors provide `execute`; the typed wrappers are derived from it.
/// A channel-level failure must surface as
/// [`PilotError::ChannelUnavailable`] so the poll loop can distinguish it
/// from a condition that is merely not yet true.
pub trait CommandChannel {
    /// Execute one command, returning its payload or a channel failure.
    fn execute(&mut self, command: Command) -> PilotResult<Payload>;

    /// Click the first element matching `selector`.
    fn click(&mut self, selector: &Selector) -> PilotResult<()> {
        match self.execute(Command::Click(selector.clone()))? {
            Payload::None => Ok(()),
            other => Err(unexpected_payload("click", &other)),
        }
    }

    /// Set the value of the first element matching `selector`.
    fn set_value(&mut self, selector: &Selector, value: &str) -> PilotResult<()> {
        let command = Command::SetValue {
            selector: selector.clone(),
            value: value.to_string(),
        };
        match self.execute(command)? {
            Payload::None => Ok(()),
            other => Err(unexpected_payload("set_value", &other)),
        }
    }

    /// Text content of the first matching element, `None` when nothing matches.
    fn query_text(&mut self, selector: &Selector) -> PilotResult<Option<String>> {
        match self.execute(Command::QueryText(selector.clone()))? {
            Payload::Text(text) => Ok(text),
            other => Err(unexpected_payload("query_text", &other)),
        }
    }

    /// Whether a matching element is rendered and not hidden.
    fn query_visible(&mut self, selector: &Selector) -> PilotResult<bool> {
        match self.execute(Command::QueryVisible(selector.clone()))? {
            Payload::Bool(visible) => Ok(visible),
            other => Err(unexpected_payload("query_visible", &other)),
        }
    }

    /// Whether any element matches `selector`.
    fn query_exists(&mut self, selector: &Selector) -> PilotResult<bool> {
        match self.execute(Command::QueryExists(selector.clone()))? {
            Payload::Bool(exists) => Ok(exists),
            other => Err(unexpected_payload("query_exists", &other)),
        }
    }

    /// Capture the current surface state.
    fn screenshot(&mut self, label: &str) -> PilotResult<Screenshot> {
        let command = Command::Screenshot {
            label: label.to_string(),
        };
        match self.execute(command)? {
            Payload::Image(shot) => Ok(shot),
            other => Err(unexpected_payload("screenshot", &other)),
        }
    }
}

// A payload of the wrong shape means the channel broke its contract, which
// is indistinguishable from any other channel-level fault to callers.
fn unexpected_payload(operation: &str, payload: &Payload) -> PilotError {
    PilotError::ChannelUnavailable {
        message: format!("unexpected payload for {operation}: {payload:?}"),
    }
}
