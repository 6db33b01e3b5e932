//! Editable fields of an inventory row

use chrono::NaiveDate;

use crate::error::FieldError;

/// The fields of a [`PantryItem`](super::PantryItem) that the table can edit in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    InStock,
    Expiration,
}

impl ItemField {
    /// Returns the column id this field is displayed under.
    pub fn column_id(&self) -> &'static str {
        match self {
            Self::InStock => "inStock",
            Self::Expiration => "expiration",
        }
    }

    /// Resolves a column id back to a field.
    pub fn from_column_id(column_id: &str) -> Result<Self, FieldError> {
        match column_id {
            "inStock" => Ok(Self::InStock),
            "expiration" => Ok(Self::Expiration),
            other => Err(FieldError::unknown_column(other)),
        }
    }
}

/// A value for one of the editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Date(Option<NaiveDate>),
}

impl FieldValue {
    /// Returns the kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
        }
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the date, if this is a `Date`.
    pub fn as_date(&self) -> Option<Option<NaiveDate>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(value: Option<NaiveDate>) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(Some(value))
    }
}
