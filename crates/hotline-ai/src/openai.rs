//! OpenAI-compatible chat-completions client.
//!
//! Implements [`ChatClient`] against a `/v1/chat/completions` endpoint with
//! `stream: true`. Fragments arrive as SSE `data:` lines; the `[DONE]`
//! sentinel ends the stream.

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::{ChatClient, ChatError, FragmentStream, Turn};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat-completions client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            max_tokens: 512,
            temperature: 0.7,
        }
    }

    /// Create config from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ChatError> {
        let key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ChatError::Api("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Chat-completions client.
pub struct OpenAiClient {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_request_body(&self, turns: &[Turn]) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": turns,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": true,
        })
    }
}

/// Extract the content delta from one SSE payload, if it carries any.
fn delta_content(payload: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(payload).ok()?;
    json["choices"][0]["delta"]["content"]
        .as_str()
        .map(String::from)
}

/// Read lines until the next content fragment, stream end, or error.
async fn next_fragment<R>(lines: &mut Lines<R>) -> Option<Result<String, ChatError>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match lines.next_line().await {
            Err(e) => return Some(Err(ChatError::Network(e.to_string()))),
            Ok(None) => return None,
            Ok(Some(line)) => {
                let Some(data) = line.strip_prefix("data:") else {
                    // Comments, event ids, blank keep-alives
                    continue;
                };
                let data = data.trim();
                if data.is_empty() {
                    continue;
                }
                if data == "[DONE]" {
                    return None;
                }
                match delta_content(data) {
                    Some(content) if !content.is_empty() => return Some(Ok(content)),
                    // Role announcements and finish_reason chunks carry no text
                    _ => continue,
                }
            }
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn stream_chat(&self, turns: &[Turn]) -> Result<FragmentStream, ChatError> {
        let body = self.build_request_body(turns);

        debug!(model = %self.config.model, turns = turns.len(), "chat completions request");

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ChatError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::Api(format!("HTTP {status}: {text}")));
        }

        let bytes = response
            .bytes_stream()
            .map(|result| result.map_err(std::io::Error::other));
        let lines = BufReader::new(StreamReader::new(bytes)).lines();

        let fragments = stream::unfold(lines, |mut lines| async move {
            next_fragment(&mut lines).await.map(|frag| (frag, lines))
        });

        Ok(fragments.boxed())
    }
}
