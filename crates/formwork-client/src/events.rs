//! The session event stream.
//!
//! The engine surfaces progress as a stream of [`SessionEvent`]s the
//! embedding UI subscribes to: a waiting indicator to show or clear, and
//! inline status text (plain or error). Sending never blocks and a dropped
//! receiver never fails the engine.

use tokio::sync::mpsc;

/// One observable step of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Show (`true`) or clear (`false`) the blocking waiting indicator.
    Waiting(bool),
    /// Inline status text.
    Status {
        /// The text to display.
        message: String,
        /// Whether to render it as an error.
        is_error: bool,
    },
}

/// Sending half of a session's event stream.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    /// Creates a connected sender/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Shows or clears the waiting indicator.
    pub fn waiting(&self, on: bool) {
        self.send(SessionEvent::Waiting(on));
    }

    /// Emits plain status text.
    pub fn status(&self, message: impl Into<String>) {
        self.send(SessionEvent::Status {
            message: message.into(),
            is_error: false,
        });
    }

    /// Emits error status text.
    pub fn error(&self, message: impl Into<String>) {
        self.send(SessionEvent::Status {
            message: message.into(),
            is_error: true,
        });
    }

    fn send(&self, event: SessionEvent) {
        // The UI may have gone away; the engine keeps working regardless.
        let _ = self.tx.send(event);
    }
}
