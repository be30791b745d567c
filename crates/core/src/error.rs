//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// preconditions, stock). IO failures belong to the catalog and storage layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. negative price).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. empty fragment).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// An intent that needs an open product ran while none was open.
    #[error("no product selected")]
    NoProductSelected,

    /// The selected product has no stock left after reconciliation.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// A cart position outside `0..len`.
    #[error("cart index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
