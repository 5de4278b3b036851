//! Scriptable in-memory command channel for tests and demos.
//!
//! Models the UI surface as a table of elements whose text and visibility
//! the test controls, plus optional per-selector text sequences so a query
//! can observe a transition ("Install" → "Launch") across successive
//! polls. Every executed command is recorded for verification.

use std::collections::{HashMap, VecDeque};

use crate::channel::{Command, CommandChannel, Payload, Screenshot};
use crate::result::{PilotError, PilotResult};

/// One element on the mock surface.
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Text content reported by `QueryText`
    pub text: String,
    /// Whether `QueryVisible` reports the element as rendered
    pub visible: bool,
}

impl MockElement {
    /// Visible element with the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
        }
    }

    /// Element present in the tree but hidden.
    #[must_use]
    pub fn hidden(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: false,
        }
    }
}

/// Scriptable [`CommandChannel`] backed by in-memory state.
#[derive(Debug, Default)]
pub struct MockChannel {
    elements: HashMap<String, MockElement>,
    text_scripts: HashMap<String, VecDeque<String>>,
    screenshot: Option<Screenshot>,
    screenshots_fail: bool,
    unavailable: bool,
    calls: Vec<String>,
}

impl MockChannel {
    /// Create an empty mock surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element.
    pub fn set_element(&mut self, selector: impl AsRef<str>, element: MockElement) {
        self.elements.insert(selector.as_ref().to_string(), element);
    }

    /// Insert or replace a visible element with the given text.
    pub fn set_text(&mut self, selector: impl AsRef<str>, text: impl Into<String>) {
        self.set_element(selector, MockElement::new(text));
    }

    /// Remove an element from the surface.
    pub fn remove_element(&mut self, selector: impl AsRef<str>) {
        self.elements.remove(selector.as_ref());
    }

    /// Script the answers `QueryText` gives for a selector.
    ///
    /// Each query consumes one entry until a single entry remains; that
    /// last entry is then repeated forever, so a scripted transition
    /// settles into a stable final state.
    pub fn script_text<I, S>(&mut self, selector: impl AsRef<str>, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: VecDeque<String> = texts.into_iter().map(Into::into).collect();
        if !queue.is_empty() {
            self.text_scripts
                .insert(selector.as_ref().to_string(), queue);
        }
    }

    /// Toggle channel-level failure for every subsequent command.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Stub the capture returned by `Screenshot` commands.
    pub fn set_screenshot(&mut self, screenshot: Screenshot) {
        self.screenshot = Some(screenshot);
    }

    /// Make `Screenshot` commands fail while everything else keeps working.
    pub fn fail_screenshots(&mut self, fail: bool) {
        self.screenshots_fail = fail;
    }

    /// Recorded commands, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.calls
    }

    /// Whether any recorded command starts with `prefix`.
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(prefix))
    }

    fn next_text(&mut self, selector: &str) -> Option<String> {
        if let Some(queue) = self.text_scripts.get_mut(selector) {
            if queue.len() > 1 {
                return queue.pop_front();
            }
            return queue.front().cloned();
        }
        self.elements.get(selector).map(|e| e.text.clone())
    }

    fn exists(&self, selector: &str) -> bool {
        self.elements.contains_key(selector) || self.text_scripts.contains_key(selector)
    }
}

impl CommandChannel for MockChannel {
    fn execute(&mut self, command: Command) -> PilotResult<Payload> {
        if self.unavailable {
            return Err(PilotError::ChannelUnavailable {
                message: "mock surface marked unavailable".to_string(),
            });
        }
        match command {
            Command::Click(selector) => {
                self.calls.push(format!("click:{selector}"));
                Ok(Payload::None)
            }
            Command::SetValue { selector, value } => {
                self.calls.push(format!("set_value:{selector}={value}"));
                if let Some(element) = self.elements.get_mut(selector.as_str()) {
                    element.text = value;
                }
                Ok(Payload::None)
            }
            Command::QueryText(selector) => {
                self.calls.push(format!("query_text:{selector}"));
                let text = self.next_text(selector.as_str());
                Ok(Payload::Text(text))
            }
            Command::QueryVisible(selector) => {
                self.calls.push(format!("query_visible:{selector}"));
                let visible = self
                    .elements
                    .get(selector.as_str())
                    .map_or_else(|| self.text_scripts.contains_key(selector.as_str()), |e| e.visible);
                Ok(Payload::Bool(visible))
            }
            Command::QueryExists(selector) => {
                self.calls.push(format!("query_exists:{selector}"));
                Ok(Payload::Bool(self.exists(selector.as_str())))
            }
            Command::Screenshot { label } => {
                self.calls.push(format!("screenshot:{label}"));
                if self.screenshots_fail {
                    return Err(PilotError::ChannelUnavailable {
                        message: "mock screenshot capture failed".to_string(),
                    });
                }
                let shot = self
                    .screenshot
                    .clone()
                    .unwrap_or_else(|| Screenshot::new(vec![0x89, 0x50, 0x4E, 0x47], 1, 1));
                Ok(Payload::Image(shot))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    #[test]
    fn test_empty_surface_reports_nothing() {
        let mut channel = MockChannel::new();
        let selector = Selector::new("#missing");
        assert!(!channel.query_exists(&selector).unwrap());
        assert_eq!(channel.query_text(&selector).unwrap(), None);
        assert!(!channel.query_visible(&selector).unwrap());
    }

    #[test]
    fn test_set_text_makes_element_queryable() {
        let mut channel = MockChannel::new();
        channel.set_text("#search", "");
        let selector = Selector::new("#search");
        assert!(channel.query_exists(&selector).unwrap());
        assert!(channel.query_visible(&selector).unwrap());
    }

    #[test]
    fn test_hidden_element_exists_but_not_visible() {
        let mut channel = MockChannel::new();
        channel.set_element(".no-active-downloads", MockElement::hidden("No downloads"));
        let selector = Selector::new(".no-active-downloads");
        assert!(channel.query_exists(&selector).unwrap());
        assert!(!channel.query_visible(&selector).unwrap());
    }

    #[test]
    fn test_set_value_updates_text() {
        let mut channel = MockChannel::new();
        channel.set_text("#search", "");
        let selector = Selector::new("#search");
        channel.set_value(&selector, "111 first").unwrap();
        assert_eq!(
            channel.query_text(&selector).unwrap(),
            Some("111 first".to_string())
        );
    }

    #[test]
    fn test_scripted_text_settles_on_last_entry() {
        let mut channel = MockChannel::new();
        channel.script_text(".main-action", ["Install", "Install", "Launch"]);
        let selector = Selector::new(".main-action");
        assert_eq!(
            channel.query_text(&selector).unwrap(),
            Some("Install".to_string())
        );
        assert_eq!(
            channel.query_text(&selector).unwrap(),
            Some("Install".to_string())
        );
        for _ in 0..3 {
            assert_eq!(
                channel.query_text(&selector).unwrap(),
                Some("Launch".to_string())
            );
        }
    }

    #[test]
    fn test_unavailable_channel_fails_every_command() {
        let mut channel = MockChannel::new();
        channel.set_text("#search", "x");
        channel.set_unavailable(true);
        let selector = Selector::new("#search");
        assert!(matches!(
            channel.query_exists(&selector),
            Err(PilotError::ChannelUnavailable { .. })
        ));
        assert!(matches!(
            channel.click(&selector),
            Err(PilotError::ChannelUnavailable { .. })
        ));
    }

    #[test]
    fn test_history_records_commands_in_order() {
        let mut channel = MockChannel::new();
        channel.set_text("#search", "");
        let selector = Selector::new("#search");
        channel.click(&selector).unwrap();
        channel.set_value(&selector, "abc").unwrap();
        assert_eq!(channel.history()[0], "click:#search");
        assert_eq!(channel.history()[1], "set_value:#search=abc");
        assert!(channel.was_called("click:"));
        assert!(!channel.was_called("screenshot:"));
    }

    #[test]
    fn test_screenshot_stub_and_failure_toggle() {
        let mut channel = MockChannel::new();
        let shot = channel.screenshot("default").unwrap();
        assert!(shot.is_valid());

        channel.set_screenshot(Screenshot::new(vec![1, 2, 3], 4, 4));
        let shot = channel.screenshot("stubbed").unwrap();
        assert_eq!(shot.data, vec![1, 2, 3]);

        channel.fail_screenshots(true);
        assert!(matches!(
            channel.screenshot("broken"),
            Err(PilotError::ChannelUnavailable { .. })
        ));
        // Non-screenshot traffic still flows.
        assert!(!channel.query_exists(&Selector::new("#x")).unwrap());
    }
}
