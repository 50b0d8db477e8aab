//! Conversation engine for Hotline.
//!
//! Drives a voice-call bot against a hosted chat-completions API with:
//! - Streaming (SSE) fragment delivery
//! - Phrase-boundary segmentation so playback can start early
//! - Bounded retry with exponential backoff
//! - Single-flight sessions emitting events on a broadcast bus

pub mod config;
pub mod events;
pub mod id;
pub mod openai;
pub mod session;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub use config::SessionConfig;
pub use events::{SessionEvent, SessionEventBus};
pub use id::new_call_id;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use session::Session;

/// Lazy sequence of assistant content fragments. The stream ending is the
/// provider's completion signal; an `Err` item is a mid-stream failure.
pub type FragmentStream = BoxStream<'static, Result<String, ChatError>>;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Open a streaming completion request over the full transcript.
    async fn stream_chat(&self, turns: &[Turn]) -> Result<FragmentStream, ChatError>;
}

/// One message in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Speaker of a turn. Closed for now; named third-party participants would
/// slot in here if multi-party calls ever land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// All variants are cloneable so events can carry the raw failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
