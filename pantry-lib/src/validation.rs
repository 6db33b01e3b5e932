//! Input validation for pantry requests.
//!
//! Rules are pure: anything time-dependent takes `today` as an argument.

use chrono::NaiveDate;

use crate::error::FieldValidationError;
use crate::error::ValidationError;

/// Minimum pantry name length, in characters.
pub const PANTRY_NAME_MIN: usize = 3;
/// Maximum pantry name length, in characters.
pub const PANTRY_NAME_MAX: usize = 16;
/// Minimum ingredient name length, in characters.
pub const INGREDIENT_NAME_MIN: usize = 3;

/// Collects field errors and reports them together.
///
/// # Example
///
/// ```
/// use pantry_lib::validation::Validator;
///
/// let result = Validator::new()
///     .check(false, "name", "Name must be between 3-16 characters")
///     .finish();
/// assert!(result.is_err());
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldValidationError>,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless `ok` holds.
    pub fn check(mut self, ok: bool, field: &str, message: impl Into<String>) -> Self {
        if !ok {
            self.errors.push(FieldValidationError::new(field, message));
        }
        self
    }

    /// Merges the result of a nested check.
    pub fn merge(mut self, result: Result<(), ValidationError>) -> Self {
        if let Err(e) = result {
            self.errors.extend(e.errors);
        }
        self
    }

    /// Finishes validation.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors: self.errors })
        }
    }
}

/// Pantry names are 3-16 characters.
pub fn validate_pantry_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    Validator::new()
        .check(
            (PANTRY_NAME_MIN..=PANTRY_NAME_MAX).contains(&len),
            "name",
            format!("Name must be between {}-{} characters", PANTRY_NAME_MIN, PANTRY_NAME_MAX),
        )
        .finish()
}

/// Ingredient names are at least 3 characters.
pub fn validate_ingredient_name(name: &str) -> Result<(), ValidationError> {
    Validator::new()
        .check(
            name.chars().count() >= INGREDIENT_NAME_MIN,
            "name",
            format!("Name must be at least {} characters", INGREDIENT_NAME_MIN),
        )
        .finish()
}

/// An expiration, when set, may not lie before `today`.
pub fn validate_expiration(expiration: Option<NaiveDate>, today: NaiveDate) -> Result<(), ValidationError> {
    Validator::new()
        .check(
            expiration.is_none_or(|d| d >= today),
            "expiration",
            "Expiration cannot be in the past",
        )
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_pantry_name_bounds() {
        assert!(validate_pantry_name("ab").is_err());
        assert!(validate_pantry_name("abc").is_ok());
        assert!(validate_pantry_name("sixteen chars ok").is_ok());
        assert!(validate_pantry_name("seventeen chars!!").is_err());
    }

    #[test]
    fn test_ingredient_name() {
        assert!(validate_ingredient_name("Ox").is_err());
        assert!(validate_ingredient_name("Egg").is_ok());
    }

    #[test]
    fn test_expiration_today_is_allowed() {
        assert!(validate_expiration(Some(today()), today()).is_ok());
        assert!(validate_expiration(None, today()).is_ok());
        let err = validate_expiration(today().pred_opt(), today()).unwrap_err();
        assert!(err.field("expiration").is_some());
    }

    #[test]
    fn test_validator_collects_all_errors() {
        let err = Validator::new()
            .check(false, "a", "bad a")
            .check(true, "b", "bad b")
            .merge(validate_pantry_name("x"))
            .finish()
            .unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert!(err.to_string().contains("a: bad a"));
    }
}
