use tokio::sync::mpsc::UnboundedSender;

use super::message::Message;
use crate::error::ChatError;

/// Receives progress from one session.
///
/// Callbacks run on the task driving `submit`, between reads; keep them
/// short.
pub trait SessionObserver: Send + Sync {
    /// Called with everything received so far. `is_complete` is set once,
    /// after the stream ended successfully.
    fn on_progress(&self, _partial: &str, _is_complete: bool) {}

    /// Called after the assistant reply has been appended.
    fn on_complete(&self, _message: &Message) {}

    /// Called after the error entry has been appended.
    fn on_error(&self, _error: &ChatError, _message: &Message) {}
}

/// Observer notifications as values, for channel consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Progress { partial: String, is_complete: bool },
    Completed(Message),
    Failed { error: String, message: Message },
}

// A closed receiver just stops receiving.
impl SessionObserver for UnboundedSender<SessionEvent> {
    fn on_progress(&self, partial: &str, is_complete: bool) {
        let _ = self.send(SessionEvent::Progress {
            partial: partial.to_string(),
            is_complete,
        });
    }

    fn on_complete(&self, message: &Message) {
        let _ = self.send(SessionEvent::Completed(message.clone()));
    }

    fn on_error(&self, error: &ChatError, message: &Message) {
        let _ = self.send(SessionEvent::Failed {
            error: error.to_string(),
            message: message.clone(),
        });
    }
}
