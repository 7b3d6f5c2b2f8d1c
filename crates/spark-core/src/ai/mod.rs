//! Pluggable generative-text backend abstraction
//!
//! The social post recommender is the only caller. Backends are opaque
//! text-completion providers behind one trait, so the vendor is swappable
//! and tests run against the mock.
//!
//! # Architecture
//!
//! - `GenerativeBackend` trait: the single `generate` operation plus health
//! - `GenerativeClient` enum: concrete wrapper providing Clone +
//!   compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `GENAI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for generative-text backends
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Complete a prompt into styled text
    ///
    /// Failures surface as `Error::Service` or `Error::Http`; callers are
    /// expected to recover locally (the recommender falls back to its
    /// deterministic template).
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete generative client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum GenerativeClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl GenerativeClient {
    /// Create a client from environment variables
    ///
    /// Returns None when the required variables are not set; the
    /// recommender then uses its deterministic path only.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("GENAI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(GenerativeClient::Ollama),
            "mock" => Some(GenerativeClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown GENAI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(GenerativeClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        GenerativeClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        GenerativeClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl GenerativeBackend for GenerativeClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            GenerativeClient::Ollama(b) => b.generate(prompt).await,
            GenerativeClient::Mock(b) => b.generate(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            GenerativeClient::Ollama(b) => b.health_check().await,
            GenerativeClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            GenerativeClient::Ollama(b) => b.model(),
            GenerativeClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            GenerativeClient::Ollama(b) => b.host(),
            GenerativeClient::Mock(b) => b.host(),
        }
    }
}
