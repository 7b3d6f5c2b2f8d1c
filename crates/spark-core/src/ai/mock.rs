//! Mock backend for testing
//!
//! Returns a canned completion, or a configurable failure so callers can
//! exercise their fallback paths without a running text-completion server.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::GenerativeBackend;

/// Mock generative backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether generate should fail with a service error
    pub failing: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            failing: false,
        }
    }

    /// Create a mock backend whose generate call always fails
    pub fn failing() -> Self {
        Self {
            healthy: true,
            failing: true,
        }
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.failing {
            return Err(Error::Service("mock backend configured to fail".into()));
        }

        // Echo enough of the prompt that tests can assert the plumbing
        let summary: String = prompt.chars().take(160).collect();
        Ok(format!(
            "\u{2728} Tonight only - the truck is running hot! {}\u{2026}",
            summary.trim()
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generate_echoes_prompt() {
        let mock = MockBackend::new();
        let text = mock.generate("Queso birria almost out").await.unwrap();
        assert!(text.contains("Queso birria"));
    }

    #[tokio::test]
    async fn test_failing_mock_errors() {
        let mock = MockBackend::failing();
        let err = mock.generate("anything").await.unwrap_err();
        assert!(matches!(err, Error::Service(_)));
    }

    #[tokio::test]
    async fn test_health_modes() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
