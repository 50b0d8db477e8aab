//! Speech collaborator interface for Hotline.
//!
//! The conversation core hands reply segments to a speech engine; this
//! crate specifies that seam. An environment offers an extension-privileged
//! platform TTS API, the standard speech-synthesis API, or neither, and
//! the speaker falls back accordingly while reporting start/end/error
//! lifecycle events. Playback mechanics themselves live with the host.

pub mod engine;
pub mod speaker;

pub use engine::{select_engine, EngineKind, SpeechEngine, SpeechEvent, Voice};
pub use speaker::FallbackSpeaker;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("no speech engine available")]
    NoEngine,
    #[error("engine error: {0}")]
    Engine(String),
}
