//! `storekeep-ai`
//!
//! **Responsibility:** language-model collaborator boundary.
//!
//! This crate is intentionally **not** part of the domain model:
//! - It must not depend on store records (Item/Sale).
//! - It must not mutate domain state.
//! - It exposes the contracts the core consumes; transports live in infra.

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a language-model collaborator.
#[derive(Debug, Error)]
pub enum AiError {
    /// Transport or timeout failure: the collaborator could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered, but not in a shape we can use.
    #[error("invalid collaborator response: {0}")]
    InvalidResponse(String),
}

/// Condenses a raw report into a short summary.
///
/// A hard dependency of report generation: if this fails, the report is not
/// produced.
#[async_trait]
pub trait Summarizer: Send + Sync + 'static {
    async fn summarize(&self, text: &str) -> Result<String, AiError>;
}

/// Answers a customer question, grounded in a snapshot of current inventory.
#[async_trait]
pub trait Assistant: Send + Sync + 'static {
    async fn answer(&self, query: &str, inventory: &str) -> Result<String, AiError>;
}
