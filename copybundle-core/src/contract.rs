//! # contract: provider interfaces for external collaborators
//!
//! The one external dependency of the core pipeline is a text-completion
//! service used for visual-concept extraction during prompt generation.
//! It is modeled as a single-method trait so production code can shell out
//! to a real tool while tests use deterministic stubs.
//!
//! ## Mocking & Testing
//! The trait is annotated for `mockall`, so consumers can generate
//! deterministic mocks for unit/integration tests (enabled by the
//! `test-export-mocks` feature, on by default, matching how the rest of the
//! pipeline is tested).

use async_trait::async_trait;
use thiserror::Error;

/// Failure kinds of a completion call. Prompt generation treats every one
/// of these as fatal: there is no algorithmic fallback.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The call did not finish within the provider's timeout.
    #[error("completion call timed out after {0} seconds")]
    Timeout(u64),
    /// The provider returned nothing at all.
    #[error("completion provider returned an empty response")]
    EmptyResponse,
    /// The provider returned text too short to extract concepts from.
    #[error("completion response unusable: {0}")]
    Unusable(String),
    /// The provider process or transport could not be started.
    #[error("failed to invoke completion provider: {0}")]
    Launch(String),
}

/// A text-completion capability: one prompt in, free text out, bounded by a
/// timeout owned by the implementation.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt`, returning the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
