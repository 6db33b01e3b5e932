//! Error types

mod api;
mod field;
mod validation;

pub use api::*;
pub use field::*;
pub use validation::*;

/// Any error produced by the pantry library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Request input was rejected before it was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A field could not be read or written.
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl Error {
    /// Returns `true` if the backend reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(ApiError::NotFound(_)))
    }

    /// Returns `true` if the backend reported a conflicting duplicate.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Api(ApiError::Conflict(_)))
    }

    /// Returns `true` if the call timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Api(ApiError::Timeout(_)))
    }
}
