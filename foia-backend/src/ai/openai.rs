//! OpenAI-compatible chat completions gateway

use crate::ai::retry::{self, Backoff};
use crate::ai::{Completion, LlmGateway};
use crate::config::Config;
use crate::error::AgentError;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest slice of a provider error body kept in error messages
const ERROR_BODY_LIMIT: usize = 300;

pub struct OpenAiGateway {
    client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    call_timeout: Duration,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: i64,
}

/// One failed attempt, with whether the retry loop may try again
struct AttemptError {
    error: AgentError,
    retryable: bool,
}

impl OpenAiGateway {
    pub fn new(
        api_key: &str,
        endpoint: &str,
        model: &str,
        max_tokens: u32,
        call_timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, AgentError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // Only add auth header if API key is provided and not empty
        if !api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| AgentError::Provider(format!("invalid API key format: {}", e)))?;
            headers.insert(header::AUTHORIZATION, auth_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(call_timeout)
            .build()
            .map_err(|e| AgentError::Provider(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            max_tokens,
            call_timeout,
            max_retries,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        Self::new(
            &config.llm_api_key,
            &config.llm_endpoint,
            &config.llm_model,
            config.llm_max_tokens,
            Duration::from_secs(config.gateway_timeout_secs),
            config.gateway_max_retries,
        )
    }

    async fn attempt(&self, body: &ChatRequest<'_>) -> Result<Completion, AttemptError> {
        let send = self.client.post(&self.endpoint).json(body).send();
        let response = tokio::time::timeout(self.call_timeout, send)
            .await
            .map_err(|_| AttemptError {
                error: AgentError::Timeout(self.call_timeout.as_secs()),
                retryable: true,
            })?
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptError {
                        error: AgentError::Timeout(self.call_timeout.as_secs()),
                        retryable: true,
                    }
                } else {
                    AttemptError {
                        error: AgentError::Provider(e.to_string()),
                        retryable: retry::is_retryable_transport(&e),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AttemptError {
                error: AgentError::Provider(format!("{}: {}", status, truncate(&detail))),
                retryable: retry::is_retryable_status(status.as_u16()),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| AttemptError {
            error: AgentError::Provider(format!("malformed completion response: {}", e)),
            retryable: false,
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AttemptError {
                error: AgentError::Provider("completion had no content".to_string()),
                retryable: false,
            })?;

        Ok(Completion {
            content,
            tokens_used: parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn generate(
        &self,
        system_prompt: Option<&str>,
        user_prompt: &str,
    ) -> Result<Completion, AgentError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };

        let mut backoff = Backoff::new();
        loop {
            match self.attempt(&body).await {
                Ok(completion) => return Ok(completion),
                Err(failed) => {
                    if !failed.retryable || backoff.attempts() >= self.max_retries {
                        return Err(failed.error);
                    }
                    let delay = backoff.next_delay_ms();
                    log::warn!(
                        "[GATEWAY] attempt {} failed ({}), retrying in {}ms",
                        backoff.attempts(),
                        failed.error,
                        delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_limits_error_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(truncate(&long).len(), ERROR_BODY_LIMIT);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_rejects_unusable_api_key() {
        let result = OpenAiGateway::new(
            "bad\nkey",
            "https://api.openai.com/v1/chat/completions",
            "gpt-4o",
            1024,
            Duration::from_secs(30),
            2,
        );
        assert!(matches!(result, Err(AgentError::Provider(_))));
    }
}
