//! Chat-completion backend used to author the questions

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ClientSettings;
use crate::error::{QuizError, QuizResult};

/// Longest slice of an error body kept in transport errors
const ERROR_BODY_LIMIT: usize = 300;

/// Capability to turn a prompt pair into generated text
pub trait TextGenerator {
    fn generate_text(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> QuizResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    settings: ClientSettings,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, settings: ClientSettings) -> QuizResult<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                QuizError::Transport(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn map_send_error(&self, err: reqwest::Error) -> QuizError {
        if err.is_timeout() {
            QuizError::Timeout(self.settings.timeout)
        } else {
            QuizError::Transport(err.to_string())
        }
    }
}

impl TextGenerator for OpenAiClient {
    fn generate_text(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> QuizResult<String> {
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            temperature: self.settings.temperature,
        };

        tracing::debug!(endpoint = %self.endpoint(), model, "sending chat completion request");

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            let excerpt: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            tracing::warn!(%status, "chat completion request rejected");
            return Err(QuizError::Transport(format!(
                "API가 {} 상태를 반환했습니다: {}",
                status, excerpt
            )));
        }

        let parsed: ChatResponse = resp.json().map_err(|e| self.map_send_error(e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(QuizError::EmptyResponse)
    }
}
