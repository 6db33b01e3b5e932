//! Request and response payloads

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::model::FieldValue;
use crate::model::Ingredient;
use crate::model::ItemField;
use crate::model::PantryItem;
use crate::validation;
use crate::validation::Validator;

/// Inventory snapshot of one pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub inventory: Vec<PantryItem>,
}

/// Partial update of a row.
///
/// `expiration` distinguishes "leave alone" (`None`) from "clear"
/// (`Some(None)`); on the wire these are an absent key and `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventory {
    pub item_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub expiration: Option<Option<NaiveDate>>,
}

impl UpdateInventory {
    /// Sets the stock flag of a row.
    pub fn toggle_stock(item_id: Uuid, in_stock: bool) -> Self {
        Self {
            item_id,
            in_stock: Some(in_stock),
            expiration: None,
        }
    }

    /// Sets or clears the expiration of a row.
    pub fn set_expiration(item_id: Uuid, expiration: Option<NaiveDate>) -> Self {
        Self {
            item_id,
            in_stock: None,
            expiration: Some(expiration),
        }
    }

    /// Builds the update that writes `value` into `field`.
    pub fn for_field(item_id: Uuid, field: ItemField, value: FieldValue) -> Option<Self> {
        match (field, value) {
            (ItemField::InStock, FieldValue::Bool(b)) => Some(Self::toggle_stock(item_id, b)),
            (ItemField::Expiration, FieldValue::Date(d)) => Some(Self::set_expiration(item_id, d)),
            _ => None,
        }
    }

    /// Checks the request against the input rules.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        Validator::new()
            .check(
                self.in_stock.is_some() || self.expiration.is_some(),
                "itemId",
                "Nothing to update",
            )
            .merge(validation::validate_expiration(self.expiration.flatten(), today))
            .finish()
    }
}

/// Response to [`UpdateInventory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedItem {
    pub pantry_item: PantryItem,
}

/// Adds an ingredient to a pantry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddIngredient {
    pub pantry_id: Uuid,
    pub ingredient_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<NaiveDate>,
}

impl AddIngredient {
    /// Creates a request with default stock state and no expiration.
    pub fn new(pantry_id: Uuid, ingredient_id: Uuid) -> Self {
        Self {
            pantry_id,
            ingredient_id,
            in_stock: None,
            expiration: None,
        }
    }

    /// Sets the initial stock flag.
    pub fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    /// Sets the initial expiration.
    pub fn expiration(mut self, expiration: NaiveDate) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Checks the request against the input rules.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validation::validate_expiration(self.expiration, today)
    }
}

/// Response to [`AddIngredient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedItem {
    pub new_pantry_item: PantryItem,
}

/// Removes a row by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveIngredient {
    pub id: Uuid,
}

/// Response to [`RemoveIngredient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedItem {
    pub removed_ingredient: PantryItem,
}

/// Selects a pantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPantry {
    pub pantry_id: Uuid,
}

/// The ingredient catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientList {
    pub ingredients: Vec<Ingredient>,
    pub count: usize,
}

mod double_option {
    use chrono::NaiveDate;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serialize;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Option<Option<NaiveDate>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<NaiveDate>>, D::Error> {
        Option::<NaiveDate>::deserialize(d).map(Some)
    }
}
