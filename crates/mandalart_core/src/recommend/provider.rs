//! Provider SPI for text generation.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One chat-style generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Failure reported by a provider adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub provider_id: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            message: message.into(),
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "provider `{}` failed: {}", self.provider_id, self.message)
    }
}

impl Error for ProviderError {}

/// Text-generation backend.
///
/// Implementations make a single attempt per call; retries and timeouts are
/// the adapter's own concern.
pub trait TextGenerator {
    /// Stable id used in logs and errors.
    fn provider_id(&self) -> &str;

    /// Returns raw completion text, or `Ok(String::new())` for an empty reply.
    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        (**self).generate(request)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        (**self).generate(request)
    }
}
