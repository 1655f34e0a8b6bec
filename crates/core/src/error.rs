//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
///
/// Propagation is two-tier: everything in this enum aborts the operation and
/// is surfaced to the caller. Best-effort failures (a notification channel
/// going down, a dangling sale reference in a report) are *not* modelled here;
/// they are absorbed locally as structured outcomes or logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed or non-positive input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,

    /// Requested quantity exceeds the quantity on hand.
    #[error("insufficient stock: requested {requested}, on hand {on_hand}")]
    InsufficientStock { requested: i64, on_hand: i64 },

    /// A concurrent writer won the race; retries were exhausted.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The persistence collaborator failed.
    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
