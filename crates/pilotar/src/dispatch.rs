//! Named UI operations over the command channel and the poller.
//!
//! The dispatcher is a thin layer: immediate actions (`click`,
//! `set_value`) probe existence once and dispatch, never waiting; the
//! `wait_for_*` operations compose the same queries with the condition
//! poller. Callers that need "wait, then click" compose the two
//! explicitly.

use std::time::Duration;

use crate::channel::CommandChannel;
use crate::poll::{CancelToken, PollSpec, PollStatus, Poller};
use crate::result::{PilotError, PilotResult};
use crate::selector::Selector;
use crate::sink::{LogSink, TracingSink};
use crate::store::{NullStore, ScreenshotHandle, ScreenshotStore};

/// Issues commands and polled waits against one UI surface.
///
/// Owns the command channel exclusively for the duration of a run, plus
/// the screenshot store, the narration sink, the default poll spec, and
/// the cancellation token shared with the enclosing harness.
pub struct Dispatcher<C> {
    channel: C,
    store: Box<dyn ScreenshotStore>,
    sink: Box<dyn LogSink>,
    defaults: PollSpec,
    cancel: CancelToken,
}

impl<C> std::fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl<C: CommandChannel> Dispatcher<C> {
    /// Create a dispatcher over `channel` with default configuration:
    /// captures discarded, narration to `tracing`, default poll spec.
    #[must_use]
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            store: Box::new(NullStore),
            sink: Box::new(TracingSink),
            defaults: PollSpec::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the screenshot store.
    #[must_use]
    pub fn with_store(mut self, store: impl ScreenshotStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Replace the narration sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Override the default poll spec used by the `wait_for_*` operations.
    #[must_use]
    pub fn with_defaults(mut self, defaults: PollSpec) -> Self {
        self.defaults = defaults;
        self
    }

    /// Share a cancellation token with the enclosing harness.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Clone of the cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Mutable access to the underlying channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Append one narration line to the sink.
    pub fn log(&mut self, message: &str) {
        self.sink.log(message);
    }

    /// Whether any element matches `selector` right now.
    pub fn exists(&mut self, selector: &Selector) -> PilotResult<bool> {
        tracing::debug!(selector = %selector, "exists");
        self.channel.query_exists(selector)
    }

    /// Click the first element matching `selector`.
    ///
    /// Fails with [`PilotError::ElementNotFound`] if nothing matches at
    /// dispatch time; there is no implicit waiting.
    pub fn click(&mut self, selector: &Selector) -> PilotResult<()> {
        tracing::debug!(selector = %selector, "click");
        if !self.channel.query_exists(selector)? {
            return Err(PilotError::ElementNotFound {
                operation: "click".to_string(),
                selector: selector.to_string(),
            });
        }
        self.channel.click(selector)
    }

    /// Set the value of the first element matching `selector`.
    ///
    /// Same no-implicit-wait contract as [`Dispatcher::click`].
    pub fn set_value(&mut self, selector: &Selector, value: &str) -> PilotResult<()> {
        tracing::debug!(selector = %selector, value, "set_value");
        if !self.channel.query_exists(selector)? {
            return Err(PilotError::ElementNotFound {
                operation: "set_value".to_string(),
                selector: selector.to_string(),
            });
        }
        self.channel.set_value(selector, value)
    }

    /// Poll until an element matching `selector` reports text content
    /// containing `text`, under the default poll spec.
    ///
    /// Matching is substring containment: an element whose text contains
    /// `text` satisfies the wait.
    pub fn wait_for_text(&mut self, selector: &Selector, text: &str) -> PilotResult<()> {
        let spec = self.defaults;
        self.wait_text(selector, text, spec)
    }

    /// Same predicate as [`Dispatcher::wait_for_text`] with an explicit
    /// timeout, for transitions known to be slow (a long-running install
    /// before a "Launch" state appears).
    pub fn wait_for_text_with_timeout(
        &mut self,
        selector: &Selector,
        text: &str,
        timeout: Duration,
    ) -> PilotResult<()> {
        let spec = self.defaults.with_timeout(timeout);
        self.wait_text(selector, text, spec)
    }

    fn wait_text(&mut self, selector: &Selector, text: &str, spec: PollSpec) -> PilotResult<()> {
        tracing::debug!(selector = %selector, text, timeout_ms = spec.timeout.as_millis() as u64, "wait_for_text");
        let poller = Poller::new(spec).with_cancel(self.cancel.clone());
        let channel = &mut self.channel;
        poller
            .run(format!("text {text:?} in {selector}"), || {
                match channel.query_text(selector)? {
                    Some(observed) if observed.contains(text) => Ok(PollStatus::Satisfied),
                    Some(observed) => Ok(PollStatus::pending(format!("text was {observed:?}"))),
                    None => Ok(PollStatus::pending(format!(
                        "no element matches {selector}"
                    ))),
                }
            })
            .map(|_| ())
    }

    /// Poll until an element matching `selector` is rendered and not
    /// hidden, under the default poll spec.
    pub fn wait_for_visible(&mut self, selector: &Selector) -> PilotResult<()> {
        tracing::debug!(selector = %selector, "wait_for_visible");
        let poller = Poller::new(self.defaults).with_cancel(self.cancel.clone());
        let channel = &mut self.channel;
        poller
            .run(format!("{selector} visible"), || {
                if channel.query_visible(selector)? {
                    Ok(PollStatus::Satisfied)
                } else if channel.query_exists(selector)? {
                    Ok(PollStatus::pending(format!("{selector} exists but is hidden")))
                } else {
                    Ok(PollStatus::pending(format!(
                        "no element matches {selector}"
                    )))
                }
            })
            .map(|_| ())
    }

    /// Capture the surface once and persist it under `label`.
    ///
    /// Never polls and never blocks on UI state; failures are channel or
    /// store failures. Diagnostics only; callers decide whether a failed
    /// capture matters (the scenario runner's own captures never fail a
    /// run).
    pub fn take_screenshot(&mut self, label: &str) -> PilotResult<ScreenshotHandle> {
        tracing::debug!(label, "take_screenshot");
        let shot = self.channel.screenshot(label)?;
        self.store.persist(label, &shot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockChannel, MockElement};
    use crate::sink::MemorySink;
    use crate::store::MemoryStore;
    use std::time::Instant;

    fn fast_defaults() -> PollSpec {
        PollSpec::new()
            .with_timeout(Duration::from_millis(200))
            .with_interval(Duration::from_millis(10))
    }

    fn dispatcher(channel: MockChannel) -> Dispatcher<MockChannel> {
        Dispatcher::new(channel).with_defaults(fast_defaults())
    }

    mod immediate_action_tests {
        use super::*;

        #[test]
        fn test_click_dispatches_when_element_exists() {
            let mut channel = MockChannel::new();
            channel.set_text("#search", "");
            let mut dispatcher = dispatcher(channel);
            dispatcher.click(&Selector::new("#search")).unwrap();
            assert!(dispatcher.channel().was_called("click:#search"));
        }

        #[test]
        fn test_click_missing_element_fails_without_polling() {
            let mut dispatcher = dispatcher(MockChannel::new());
            let start = Instant::now();
            let err = dispatcher.click(&Selector::new("#missing")).unwrap_err();
            assert!(start.elapsed() < Duration::from_millis(50));
            match err {
                PilotError::ElementNotFound {
                    operation,
                    selector,
                } => {
                    assert_eq!(operation, "click");
                    assert_eq!(selector, "#missing");
                }
                other => panic!("expected ElementNotFound, got {other:?}"),
            }
            assert!(!dispatcher.channel().was_called("click:"));
        }

        #[test]
        fn test_set_value_missing_element_fails() {
            let mut dispatcher = dispatcher(MockChannel::new());
            let err = dispatcher
                .set_value(&Selector::new("#search"), "111 first")
                .unwrap_err();
            assert!(matches!(err, PilotError::ElementNotFound { .. }));
        }

        #[test]
        fn test_set_value_updates_element() {
            let mut channel = MockChannel::new();
            channel.set_text("#search", "");
            let mut dispatcher = dispatcher(channel);
            let selector = Selector::new("#search");
            dispatcher.set_value(&selector, "111 first").unwrap();
            assert_eq!(
                dispatcher.channel_mut().query_text(&selector).unwrap(),
                Some("111 first".to_string())
            );
        }

        #[test]
        fn test_exists_probe() {
            let mut channel = MockChannel::new();
            channel.set_text("#present", "x");
            let mut dispatcher = dispatcher(channel);
            assert!(dispatcher.exists(&Selector::new("#present")).unwrap());
            assert!(!dispatcher.exists(&Selector::new("#absent")).unwrap());
        }
    }

    mod wait_tests {
        use super::*;

        #[test]
        fn test_wait_for_text_observes_transition() {
            let mut channel = MockChannel::new();
            channel.script_text(".main-action", ["Install", "Install", "Launch"]);
            let mut dispatcher = dispatcher(channel);
            dispatcher
                .wait_for_text(&Selector::new(".main-action"), "Launch")
                .unwrap();
        }

        #[test]
        fn test_wait_for_text_deadline_reports_last_observed() {
            let mut channel = MockChannel::new();
            channel.set_text(".main-action", "Install");
            let mut dispatcher = dispatcher(channel);
            let err = dispatcher
                .wait_for_text(&Selector::new(".main-action"), "Launch")
                .unwrap_err();
            match err {
                PilotError::DeadlineExceeded { last_observed, .. } => {
                    assert!(last_observed.contains("Install"));
                }
                other => panic!("expected DeadlineExceeded, got {other:?}"),
            }
        }

        #[test]
        fn test_wait_for_text_explicit_timeout_overrides_default() {
            let mut channel = MockChannel::new();
            // Flips on the 31st query; the 200ms default would expire first.
            let mut script: Vec<&str> = vec!["Install"; 30];
            script.push("Launch");
            channel.script_text(".main-action", script);
            let mut dispatcher = dispatcher(channel);
            dispatcher
                .wait_for_text_with_timeout(
                    &Selector::new(".main-action"),
                    "Launch",
                    Duration::from_secs(5),
                )
                .unwrap();
        }

        #[test]
        fn test_wait_for_text_channel_loss_aborts_fast() {
            let mut channel = MockChannel::new();
            channel.set_unavailable(true);
            let mut dispatcher = dispatcher(channel);
            let start = Instant::now();
            let err = dispatcher
                .wait_for_text(&Selector::new(".main-action"), "Launch")
                .unwrap_err();
            assert!(matches!(err, PilotError::ChannelUnavailable { .. }));
            assert!(start.elapsed() < Duration::from_millis(100));
        }

        #[test]
        fn test_wait_for_visible_success() {
            let mut channel = MockChannel::new();
            channel.set_text(".no-active-downloads", "No active downloads");
            let mut dispatcher = dispatcher(channel);
            dispatcher
                .wait_for_visible(&Selector::new(".no-active-downloads"))
                .unwrap();
        }

        #[test]
        fn test_wait_for_visible_hidden_element_times_out() {
            let mut channel = MockChannel::new();
            channel.set_element(".spinner", MockElement::hidden("loading"));
            let mut dispatcher = dispatcher(channel);
            let err = dispatcher
                .wait_for_visible(&Selector::new(".spinner"))
                .unwrap_err();
            match err {
                PilotError::DeadlineExceeded { last_observed, .. } => {
                    assert!(last_observed.contains("hidden"));
                }
                other => panic!("expected DeadlineExceeded, got {other:?}"),
            }
        }
    }

    mod text_matching_tests {
        use super::*;

        // Matching policy is substring containment, not exact equality.
        #[test]
        fn test_text_match_is_substring_containment() {
            let mut channel = MockChannel::new();
            channel.set_text(".main-action", "Launching sandbox");
            let mut dispatcher = dispatcher(channel);
            dispatcher
                .wait_for_text(&Selector::new(".main-action"), "Launch")
                .unwrap();
        }

        #[test]
        fn test_text_match_fails_when_substring_absent() {
            let mut channel = MockChannel::new();
            channel.set_text(".title-bar-text", "Preferences");
            let mut dispatcher = dispatcher(channel);
            assert!(dispatcher
                .wait_for_text(&Selector::new(".title-bar-text"), "My creations")
                .is_err());
        }
    }

    mod diagnostics_tests {
        use super::*;

        #[test]
        fn test_take_screenshot_persists_to_store() {
            let mut channel = MockChannel::new();
            channel.set_screenshot(crate::channel::Screenshot::new(vec![1, 2, 3], 4, 4));
            let mut dispatcher =
                Dispatcher::new(channel).with_store(MemoryStore::new());
            let handle = dispatcher.take_screenshot("finished download").unwrap();
            assert_eq!(handle.label, "finished download");
            assert!(handle.encoded.is_some());
        }

        #[test]
        fn test_take_screenshot_surfaces_channel_failure() {
            let mut channel = MockChannel::new();
            channel.fail_screenshots(true);
            let mut dispatcher = dispatcher(channel);
            assert!(matches!(
                dispatcher.take_screenshot("broken"),
                Err(PilotError::ChannelUnavailable { .. })
            ));
        }

        #[test]
        fn test_log_reaches_sink() {
            let sink = MemorySink::new();
            let mut dispatcher =
                Dispatcher::new(MockChannel::new()).with_sink(sink.clone());
            dispatcher.log("searching for known game");
            assert_eq!(sink.lines(), vec!["searching for known game"]);
        }

        #[test]
        fn test_cancel_token_is_shared() {
            let dispatcher = Dispatcher::new(MockChannel::new());
            let token = dispatcher.cancel_token();
            assert!(!dispatcher.is_cancelled());
            token.cancel();
            assert!(dispatcher.is_cancelled());
        }
    }
}
