//! LLM Gateway port
//!
//! Defines the interface for sending assembled prompts to a model provider.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Timeout")]
    Timeout,

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectionError(_) | GatewayError::RateLimited(_) | GatewayError::Timeout
        )
    }
}

/// One prompt to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Resume key, also used for provider-side batch correlation
    pub request_id: String,
    pub problem_id: String,
    pub prompt: String,
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Provider name for logs and result metadata
    fn name(&self) -> &str;

    /// Send a prompt and return the raw response text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}
