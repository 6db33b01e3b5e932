//! Table error types

use std::time::Duration;

/// Errors building a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two columns share an id.
    #[error("Duplicate column id '{0}'")]
    DuplicateColumn(String),
}

/// Why an edit or row action did not take effect.
///
/// Always local to the cell or action that issued it.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The backend rejected the call.
    #[error(transparent)]
    Remote(#[from] pantry_lib::Error),

    /// No response within the configured request timeout.
    #[error("No response after {0:?}")]
    Timeout(Duration),

    /// The row is no longer in the table.
    #[error("Row {0} is not in the table")]
    RowNotFound(String),

    /// The row is already in the table.
    #[error("{0} is already in the pantry")]
    Duplicate(String),

    /// The column does not hold an editable field.
    #[error("Column '{0}' is not editable")]
    NotEditable(String),

    /// The table could not be built.
    #[error(transparent)]
    Table(#[from] TableError),
}

impl MutationError {
    /// Returns `true` if retrying the same interaction may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Remote(pantry_lib::Error::Api(e)) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<pantry_lib::error::ApiError> for MutationError {
    fn from(value: pantry_lib::error::ApiError) -> Self {
        Self::Remote(value.into())
    }
}
