//! Status and message reporting.
//!
//! Stages report progress through a [`StatusReporter`]. A
//! [`StatusHooks`] value can additionally carry a message renderer, which
//! redirects user-facing messages (e.g. "database upgraded") into whatever
//! the caller is collecting instead of the reporter.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

/// Fire-and-forget status output
pub trait StatusReporter: Send + Sync {
    /// Replace the current status line
    fn set_status(&self, text: &str);

    /// Emit a user-facing message
    fn message(&self, text: &str);
}

/// Reporter that writes status updates to the log
#[derive(Debug, Default, Clone)]
pub struct TracingStatus;

impl StatusReporter for TracingStatus {
    fn set_status(&self, text: &str) {
        info!("⏳ {}", text);
    }

    fn message(&self, text: &str) {
        info!("{}", text);
    }
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone)]
pub struct NullStatus;

impl StatusReporter for NullStatus {
    fn set_status(&self, _text: &str) {}

    fn message(&self, _text: &str) {}
}

/// Callback receiving rendered messages
pub type MessageRenderer = Arc<dyn Fn(String) + Send + Sync>;

/// Status reporter plus an optional message renderer override.
#[derive(Clone)]
pub struct StatusHooks {
    reporter: Arc<dyn StatusReporter>,
    renderer: Option<MessageRenderer>,
}

impl StatusHooks {
    pub fn new(reporter: Arc<dyn StatusReporter>) -> Self {
        Self {
            reporter,
            renderer: None,
        }
    }

    /// Copy of these hooks whose messages go to `renderer`
    pub fn with_message_renderer(&self, renderer: MessageRenderer) -> Self {
        Self {
            reporter: self.reporter.clone(),
            renderer: Some(renderer),
        }
    }

    pub fn set_status(&self, text: &str) {
        self.reporter.set_status(text);
    }

    pub fn message(&self, text: impl Into<String>) {
        let text = text.into();
        match &self.renderer {
            Some(render) => render(text),
            None => self.reporter.message(&text),
        }
    }
}

/// Build a renderer that queues messages on a channel. Messages are drained
/// from the receiver by the caller, in send order.
pub fn channel_renderer() -> (MessageRenderer, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let renderer: MessageRenderer = Arc::new(move |text: String| {
        // receiver dropped means nobody is collecting any more
        let _ = tx.send(text);
    });
    (renderer, rx)
}
