//! Ingredients and their categories

use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::error::FieldValidationError;

/// The closed set of ingredient categories.
///
/// The display string is also the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IngredientCategory {
    #[serde(rename = "Eggs & Dairy")]
    EggsAndDairy,
    #[serde(rename = "Beef")]
    Beef,
    #[serde(rename = "Poultry")]
    Poultry,
}

impl IngredientCategory {
    /// All categories, in display order.
    pub const ALL: [IngredientCategory; 3] = [Self::EggsAndDairy, Self::Beef, Self::Poultry];

    /// Returns the display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EggsAndDairy => "Eggs & Dairy",
            Self::Beef => "Beef",
            Self::Poultry => "Poultry",
        }
    }
}

impl std::fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngredientCategory {
    type Err = FieldValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| FieldValidationError::new("category", format!("Unknown category '{}'", s)))
    }
}

/// An ingredient that can be stocked in a pantry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub category: IngredientCategory,
}

impl Ingredient {
    /// Creates an ingredient with a fresh id.
    pub fn new(name: impl Into<String>, category: IngredientCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
        }
    }
}
