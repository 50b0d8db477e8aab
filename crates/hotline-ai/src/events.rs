//! Session event types and broadcast bus.

use tokio::sync::broadcast;

use crate::ChatError;

/// Receivers that fall this far behind start losing events.
const DEFAULT_CAPACITY: usize = 64;

/// Events a session emits to its subscribers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// One speakable chunk of the assistant's reply.
    ReplySegment {
        /// Monotonically increasing within a session, zeroed on reset.
        segment_index: u64,
        text: String,
        session_tag: Option<String>,
        /// The inbound turn number this segment answers.
        turn: u64,
    },
    /// A turn failed after exhausting retries. Carries the raw failure
    /// for host-side logging and alerting.
    TurnFailed { turn: u64, error: ChatError },
}

pub struct SessionEventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers, returning how many there were.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
