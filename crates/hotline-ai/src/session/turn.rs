//! Turn submission: streaming, phrase segmentation, retry, fallback.

use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::events::SessionEvent;
use crate::{ChatClient, ChatError, Role, Turn};

use super::manager::Session;
use super::types::BusyGuard;

impl Session {
    /// Feed one inbound utterance and stream the reply out as segment
    /// events. Failures never reach the caller; it observes events only.
    pub async fn submit_turn(
        &mut self,
        client: &dyn ChatClient,
        text: impl Into<String>,
        turn_number: u64,
    ) {
        self.submit_turn_as(client, text, turn_number, Role::User)
            .await;
    }

    /// General form of [`Session::submit_turn`] for non-user inbound roles.
    pub async fn submit_turn_as(
        &mut self,
        client: &dyn ChatClient,
        text: impl Into<String>,
        turn_number: u64,
        role: Role,
    ) {
        // At most one turn in flight; a new utterance while the bot is
        // still answering is dropped, not queued.
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            debug!(turn = turn_number, "session busy, dropping turn");
            return;
        };

        self.transcript.push(Turn {
            role,
            content: text.into(),
        });

        match self.run_exchange(client, turn_number).await {
            Ok(reply) => {
                self.transcript.push(Turn::assistant(reply));
            }
            Err(error) => {
                warn!(turn = turn_number, %error, "turn failed, speaking fallback");
                let fallback = self.config.fallback_reply.clone();
                self.emit_segment(fallback, turn_number);
                self.events.publish(SessionEvent::TurnFailed {
                    turn: turn_number,
                    error,
                });
            }
        }
    }

    /// Run one exchange with bounded retry, returning the full reply text.
    async fn run_exchange(
        &mut self,
        client: &dyn ChatClient,
        turn_number: u64,
    ) -> Result<String, ChatError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.stream_reply(client, turn_number).await {
                Ok(reply) => return Ok(reply),
                Err(error) if attempt < self.config.retry_limit => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        turn = turn_number,
                        attempt,
                        delay_secs = delay.as_secs(),
                        %error,
                        "stream failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// One streaming attempt: consume fragments, emitting a segment at
    /// every boundary marker and once more at stream end.
    async fn stream_reply(
        &mut self,
        client: &dyn ChatClient,
        turn_number: u64,
    ) -> Result<String, ChatError> {
        let marker = self.config.boundary_marker;
        let mut stream = client.stream_chat(&self.transcript).await?;

        let mut complete = String::new();
        let mut partial = String::new();

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            complete.push_str(&fragment);
            partial.push_str(&fragment);

            // Only the last character of the trimmed buffer counts as a
            // boundary; a marker buried mid-buffer is not a break.
            if partial.trim().ends_with(marker) {
                let segment = segment_text(&partial, marker);
                self.emit_segment(segment, turn_number);
                partial.clear();
            }
        }

        if !partial.trim().is_empty() {
            let segment = segment_text(&partial, marker);
            self.emit_segment(segment, turn_number);
        }

        Ok(complete)
    }

    fn emit_segment(&mut self, text: String, turn: u64) {
        self.events.publish(SessionEvent::ReplySegment {
            segment_index: self.reply_index,
            text,
            session_tag: self.session_tag.clone(),
            turn,
        });
        self.reply_index += 1;
    }
}

/// Trimmed buffer minus its trailing boundary marker, if present.
fn segment_text(buffer: &str, marker: char) -> String {
    let trimmed = buffer.trim();
    trimmed
        .strip_suffix(marker)
        .map_or(trimmed, str::trim_end)
        .to_string()
}
