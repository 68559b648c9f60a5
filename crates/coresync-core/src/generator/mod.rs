//! Plan generation through a hosted language model.
//!
//! The HTTP server holds an `Arc<dyn PlanGenerator>` so that tests can
//! swap in canned output.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::{GeneratorConfig, OpenAiCompatibleGenerator};

/// Errors surfaced by a plan generator. No retries are attempted.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("plan generator is not configured: {0}")]
    NotConfigured(String),

    #[error("failed to reach plan generator: {0}")]
    Request(#[from] reqwest::Error),

    #[error("plan generator returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected plan generator response: {0}")]
    InvalidResponse(String),
}

/// Produces raw plan content (JSON or prose) from a prompt.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}
