//! Command-line error type.

use pantry_lib::error::ApiError;
use pantry_table::MutationError;

use crate::config::ConfigError;

/// Everything that can stop a `pantry` invocation.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Backend(#[from] pantry_lib::Error),

    #[error("Invalid backend: {0}")]
    Gateway(#[from] ApiError),

    #[error("Reverted: {0}")]
    Reverted(MutationError),

    #[error("'{0}' is not in this pantry")]
    NotInPantry(String),

    #[error("'{0}' is not in the catalog")]
    NotInCatalog(String),

    #[error("Invalid date '{input}': {source}")]
    InvalidDate {
        input: String,
        source: chrono::ParseError,
    },

    #[error("Filter '{0}' must be COLUMN=TEXT")]
    InvalidFilter(String),

    #[error("Column '{0}' cannot be filtered")]
    NotFilterable(String),

    #[error("--url requires --user and --pantry")]
    MissingIds,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_messages() {
        let reverted = CliError::Reverted(MutationError::Timeout(Duration::from_secs(10)));
        assert!(reverted.to_string().starts_with("Reverted: "));

        let err = chrono::NaiveDate::parse_from_str("soon", "%Y-%m-%d").unwrap_err();
        let date = CliError::InvalidDate {
            input: "soon".into(),
            source: err,
        };
        assert!(date.to_string().starts_with("Invalid date 'soon'"));

        let mutation: CliError = MutationError::RowNotFound("x".into()).into();
        assert!(matches!(mutation, CliError::Mutation(_)));
    }
}
