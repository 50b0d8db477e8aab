//! Speech engine abstraction and availability-based selection.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::SpeechError;

/// Voice identifier understood by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice(pub String);

impl Voice {
    /// Placeholder offered when no engine reported a voice list.
    pub fn placeholder() -> Self {
        Self("default".to_string())
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which speech API family the environment offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Extension-privileged platform TTS API.
    Platform,
    /// Standard speech-synthesis API.
    Synthesis,
}

/// Pick the engine to use: the privileged platform API wins when present,
/// the standard synthesis API is the fallback, `None` means mute.
pub fn select_engine(platform_available: bool, synthesis_available: bool) -> Option<EngineKind> {
    if platform_available {
        Some(EngineKind::Platform)
    } else if synthesis_available {
        Some(EngineKind::Synthesis)
    } else {
        None
    }
}

/// Playback lifecycle, as reported to the host.
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    Started { engine: String },
    Ended { engine: String },
    Failed { engine: String, error: SpeechError },
}

#[async_trait]
pub trait SpeechEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the backing API exists in this environment.
    fn is_available(&self) -> bool;

    /// Speak one utterance to completion.
    async fn speak(&self, text: &str, voice: &Voice) -> Result<(), SpeechError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_engine_is_preferred() {
        assert_eq!(select_engine(true, true), Some(EngineKind::Platform));
        assert_eq!(select_engine(true, false), Some(EngineKind::Platform));
    }

    #[test]
    fn synthesis_is_the_fallback() {
        assert_eq!(select_engine(false, true), Some(EngineKind::Synthesis));
    }

    #[test]
    fn no_engine_when_nothing_is_available() {
        assert_eq!(select_engine(false, false), None);
    }

    #[test]
    fn default_voice_is_the_placeholder() {
        assert_eq!(Voice::default(), Voice::placeholder());
        assert_eq!(Voice::default().to_string(), "default");
    }
}
