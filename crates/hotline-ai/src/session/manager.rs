//! Session state and lifecycle operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::config::SessionConfig;
use crate::events::{SessionEvent, SessionEventBus};
use crate::Turn;

/// A transcript always starts with the system prompt plus the greeting.
const SEED_TURNS: usize = 2;

/// One logical conversation: transcript, segment counter, event bus and
/// the single-flight flag. Independent sessions share no state.
pub struct Session {
    pub(super) config: SessionConfig,
    pub(super) transcript: Vec<Turn>,
    pub(super) reply_index: u64,
    pub(super) session_tag: Option<String>,
    pub(super) busy: Arc<AtomicBool>,
    pub(super) events: SessionEventBus,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let transcript = vec![
            Turn::system(config.system_prompt.clone()),
            Turn::assistant(config.greeting.clone()),
        ];
        Self {
            config,
            transcript,
            reply_index: 0,
            session_tag: None,
            busy: Arc::new(AtomicBool::new(false)),
            events: SessionEventBus::default(),
        }
    }

    /// Attach a subscriber. Must be called before the turns whose events
    /// it wants to see.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Set the correlation tag carried on every emitted segment. First
    /// write wins; later calls are ignored.
    pub fn set_session_tag(&mut self, tag: impl Into<String>) {
        if self.session_tag.is_some() {
            debug!("session tag already set, ignoring");
            return;
        }
        self.session_tag = Some(tag.into());
    }

    pub fn session_tag(&self) -> Option<&str> {
        self.session_tag.as_deref()
    }

    /// Truncate the transcript back to the seeded system + greeting pair
    /// and restart segment numbering. `busy` and the tag are untouched.
    pub fn reset(&mut self) {
        self.transcript.truncate(SEED_TURNS);
        self.reply_index = 0;
    }

    /// Reset, detach all subscribers and clear `busy`. Terminal: the
    /// owner must re-subscribe if it insists on reusing the instance.
    pub fn dispose(&mut self) {
        self.reset();
        // Dropping the old bus sender closes every outstanding receiver.
        self.events = SessionEventBus::default();
        self.busy.store(false, Ordering::Release);
    }

    /// True once the transcript has outgrown the trim threshold. Pure
    /// query; deciding when to `reset` is the caller's business.
    pub fn should_trim(&self) -> bool {
        self.transcript.len() > self.config.trim_threshold
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    pub fn reply_index(&self) -> u64 {
        self.reply_index
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
