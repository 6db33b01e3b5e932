//! Inventory rows

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::FieldValue;
use super::Ingredient;
use super::ItemField;
use crate::error::FieldError;

/// One ingredient's presence in one pantry.
///
/// `ingredient` holds the joined display fields and is read-only from the
/// table's point of view. Only `in_stock` and `expiration` are edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    pub id: Uuid,
    pub pantry_id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient: Ingredient,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
}

impl PantryItem {
    /// Creates a new item for an ingredient in a pantry, not in stock and without expiration.
    pub fn new(pantry_id: Uuid, ingredient: Ingredient) -> Self {
        Self {
            id: Uuid::new_v4(),
            pantry_id,
            ingredient_id: ingredient.id,
            ingredient,
            in_stock: false,
            expiration: None,
        }
    }

    /// Sets the stock flag.
    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    /// Sets the expiration date.
    pub fn with_expiration(mut self, expiration: Option<NaiveDate>) -> Self {
        self.expiration = expiration;
        self
    }

    /// Returns the current value of an editable field.
    pub fn field(&self, field: ItemField) -> FieldValue {
        match field {
            ItemField::InStock => FieldValue::Bool(self.in_stock),
            ItemField::Expiration => FieldValue::Date(self.expiration),
        }
    }

    /// Replaces a single editable field.
    ///
    /// Fails without modifying the item if the value kind does not match the field.
    pub fn apply(&mut self, field: ItemField, value: FieldValue) -> Result<(), FieldError> {
        match (field, value) {
            (ItemField::InStock, FieldValue::Bool(b)) => self.in_stock = b,
            (ItemField::Expiration, FieldValue::Date(d)) => self.expiration = d,
            (field, value) => {
                let expected = match field {
                    ItemField::InStock => "bool",
                    ItemField::Expiration => "date",
                };
                return Err(FieldError::type_mismatch(field.column_id(), expected, value.kind()));
            }
        }
        Ok(())
    }

    /// Returns `true` if the item has an expiration strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration.is_some_and(|d| d < today)
    }
}
