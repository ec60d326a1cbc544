//! LLM gateway - opaque text generation behind a narrow seam
//!
//! Strategies depend on the trait only; the concrete transport lives in
//! openai.rs. Test doubles are compiled under cfg(test) in `testing`.

pub mod openai;
pub mod retry;

pub use openai::OpenAiGateway;

use crate::error::AgentError;
use async_trait::async_trait;

/// A single completion returned by the provider
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub tokens_used: i64,
}

/// Opaque text-generation capability
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a completion for the given prompts
    ///
    /// Fails with `Provider` on transport/auth/rate-limit failure and
    /// `Timeout` when the bounded per-call timeout elapses.
    async fn generate(
        &self,
        system_prompt: Option<&str>,
        user_prompt: &str,
    ) -> Result<Completion, AgentError>;
}

#[cfg(test)]
pub mod testing {
    //! Gateway doubles for strategy and sweep tests

    use super::*;

    /// Returns a fixed completion for every call
    pub struct StaticGateway {
        pub content: String,
        pub tokens: i64,
    }

    impl StaticGateway {
        pub fn new(content: impl Into<String>) -> Self {
            Self {
                content: content.into(),
                tokens: 100,
            }
        }
    }

    #[async_trait]
    impl LlmGateway for StaticGateway {
        async fn generate(
            &self,
            _system_prompt: Option<&str>,
            _user_prompt: &str,
        ) -> Result<Completion, AgentError> {
            Ok(Completion {
                content: self.content.clone(),
                tokens_used: self.tokens,
            })
        }
    }

    /// Fails every call with a provider error
    pub struct FailingGateway;

    #[async_trait]
    impl LlmGateway for FailingGateway {
        async fn generate(
            &self,
            _system_prompt: Option<&str>,
            _user_prompt: &str,
        ) -> Result<Completion, AgentError> {
            Err(AgentError::Provider("connection refused".to_string()))
        }
    }
}
