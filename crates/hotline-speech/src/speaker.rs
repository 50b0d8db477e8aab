//! Fallback speaker: first available engine wins, lifecycle on a bus.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::engine::{SpeechEngine, SpeechEvent, Voice};
use crate::SpeechError;

const EVENT_CAPACITY: usize = 32;

/// Speaks through the first available engine in an ordered list
/// (privileged first, standard synthesis after), publishing lifecycle
/// events to subscribers.
pub struct FallbackSpeaker {
    engines: Vec<Box<dyn SpeechEngine>>,
    events: broadcast::Sender<SpeechEvent>,
}

impl FallbackSpeaker {
    pub fn new(engines: Vec<Box<dyn SpeechEngine>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { engines, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.events.subscribe()
    }

    /// Speak one utterance. Unavailable engines are skipped; an erroring
    /// engine fails the utterance rather than double-speaking it through
    /// the next one.
    pub async fn speak(&self, text: &str, voice: &Voice) -> Result<(), SpeechError> {
        let Some(engine) = self.engines.iter().find(|e| e.is_available()) else {
            warn!("no speech engine available, dropping utterance");
            return Err(SpeechError::NoEngine);
        };

        let name = engine.name().to_string();
        debug!(engine = %name, voice = %voice, chars = text.len(), "speaking");
        let _ = self.events.send(SpeechEvent::Started {
            engine: name.clone(),
        });

        match engine.speak(text, voice).await {
            Ok(()) => {
                let _ = self.events.send(SpeechEvent::Ended { engine: name });
                Ok(())
            }
            Err(error) => {
                warn!(engine = %name, %error, "utterance failed");
                let _ = self.events.send(SpeechEvent::Failed {
                    engine: name,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;

    struct FakeEngine {
        name: &'static str,
        available: bool,
        fail: bool,
        spoken: Arc<AtomicUsize>,
    }

    impl FakeEngine {
        fn boxed(
            name: &'static str,
            available: bool,
            fail: bool,
            spoken: &Arc<AtomicUsize>,
        ) -> Box<dyn SpeechEngine> {
            Box::new(Self {
                name,
                available,
                fail,
                spoken: Arc::clone(spoken),
            })
        }
    }

    #[async_trait]
    impl SpeechEngine for FakeEngine {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn speak(&self, _text: &str, _voice: &Voice) -> Result<(), SpeechError> {
            self.spoken.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SpeechError::Engine("synthesis interrupted".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn unavailable_engines_are_skipped() {
        let platform_calls = Arc::new(AtomicUsize::new(0));
        let synthesis_calls = Arc::new(AtomicUsize::new(0));
        let speaker = FallbackSpeaker::new(vec![
            FakeEngine::boxed("platform", false, false, &platform_calls),
            FakeEngine::boxed("synthesis", true, false, &synthesis_calls),
        ]);

        speaker.speak("hello", &Voice::default()).await.unwrap();

        assert_eq!(platform_calls.load(Ordering::SeqCst), 0);
        assert_eq!(synthesis_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn first_available_engine_wins() {
        let platform_calls = Arc::new(AtomicUsize::new(0));
        let synthesis_calls = Arc::new(AtomicUsize::new(0));
        let speaker = FallbackSpeaker::new(vec![
            FakeEngine::boxed("platform", true, false, &platform_calls),
            FakeEngine::boxed("synthesis", true, false, &synthesis_calls),
        ]);

        speaker.speak("hello", &Voice::default()).await.unwrap();

        assert_eq!(platform_calls.load(Ordering::SeqCst), 1);
        assert_eq!(synthesis_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_emits_started_then_ended() {
        let calls = Arc::new(AtomicUsize::new(0));
        let speaker =
            FallbackSpeaker::new(vec![FakeEngine::boxed("platform", true, false, &calls)]);
        let mut rx = speaker.subscribe();

        speaker.speak("hello", &Voice::default()).await.unwrap();

        assert!(matches!(rx.try_recv().unwrap(), SpeechEvent::Started { .. }));
        assert!(matches!(rx.try_recv().unwrap(), SpeechEvent::Ended { .. }));
    }

    #[tokio::test]
    async fn failure_emits_started_then_failed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let speaker =
            FallbackSpeaker::new(vec![FakeEngine::boxed("platform", true, true, &calls)]);
        let mut rx = speaker.subscribe();

        let result = speaker.speak("hello", &Voice::default()).await;

        assert!(matches!(result, Err(SpeechError::Engine(_))));
        assert!(matches!(rx.try_recv().unwrap(), SpeechEvent::Started { .. }));
        assert!(matches!(rx.try_recv().unwrap(), SpeechEvent::Failed { .. }));
    }

    #[tokio::test]
    async fn no_engine_is_an_error_without_events() {
        let calls = Arc::new(AtomicUsize::new(0));
        let speaker =
            FallbackSpeaker::new(vec![FakeEngine::boxed("platform", false, false, &calls)]);
        let mut rx = speaker.subscribe();

        let result = speaker.speak("hello", &Voice::default()).await;

        assert_eq!(result, Err(SpeechError::NoEngine));
        assert!(rx.try_recv().is_err());
    }
}
