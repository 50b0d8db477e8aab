//! Session tuning knobs and seed prompts.
//!
//! All fields have defaults so a partial config deserializes cleanly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Marker the prompt asks the model to insert at natural speech pauses.
/// Chosen for being a low-frequency character in normal prose.
pub const DEFAULT_BOUNDARY_MARKER: char = '\u{2022}'; // •

const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly assistant answering a live phone call. \
     Keep replies short and conversational, and insert a \u{2022} wherever a natural \
     pause in speech belongs.";

const DEFAULT_GREETING: &str = "Hi, you've reached the Hotline assistant. How can I help you today?";

const DEFAULT_FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble answering right now. Could you say that again? \u{2022}";

/// Fixed per-session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// System turn seeded at the head of every transcript.
    pub system_prompt: String,
    /// Seed assistant greeting, spoken before the first user turn.
    pub greeting: String,
    /// Total streaming attempts per turn, first try included.
    pub retry_limit: u32,
    /// Base backoff in seconds; attempt n waits `base * 2^(n-1)` before retrying.
    pub backoff_base_secs: u64,
    /// `should_trim` fires strictly above this transcript length.
    pub trim_threshold: usize,
    /// Phrase-break marker delimiting emitted reply segments.
    pub boundary_marker: char,
    /// Spoken apology when retries are exhausted. Ends with a marker so a
    /// consumer treats it as one complete segment.
    pub fallback_reply: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            retry_limit: 3,
            backoff_base_secs: 2,
            trim_threshold: 10,
            boundary_marker: DEFAULT_BOUNDARY_MARKER,
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    pub fn with_backoff_base_secs(mut self, secs: u64) -> Self {
        self.backoff_base_secs = secs;
        self
    }

    pub fn with_trim_threshold(mut self, threshold: usize) -> Self {
        self.trim_threshold = threshold;
        self
    }

    pub fn with_boundary_marker(mut self, marker: char) -> Self {
        self.boundary_marker = marker;
        self
    }

    pub fn with_fallback_reply(mut self, reply: impl Into<String>) -> Self {
        self.fallback_reply = reply.into();
        self
    }

    /// Delay before the attempt after `failed_attempt` (1-based).
    pub(crate) fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        Duration::from_secs(self.backoff_base_secs.saturating_mul(1 << exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.retry_limit, 3);
        assert_eq!(config.backoff_base_secs, 2);
        assert_eq!(config.trim_threshold, 10);
        assert_eq!(config.boundary_marker, '\u{2022}');
        assert!(config.fallback_reply.contains(config.boundary_marker));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let config = SessionConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn builder_overrides() {
        let config = SessionConfig::default()
            .with_retry_limit(5)
            .with_boundary_marker('|')
            .with_greeting("Hello.");
        assert_eq!(config.retry_limit, 5);
        assert_eq!(config.boundary_marker, '|');
        assert_eq!(config.greeting, "Hello.");
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"retry_limit": 1}"#).unwrap();
        assert_eq!(config.retry_limit, 1);
        assert_eq!(config.trim_threshold, 10);
        assert_eq!(config.boundary_marker, '\u{2022}');
    }
}
