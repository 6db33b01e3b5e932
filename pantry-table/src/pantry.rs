//! Pantry inventory rows in the table.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use pantry_lib::error::ApiError;
use pantry_lib::error::FieldError;
use pantry_lib::model::{FieldValue, ItemField, PantryItem, UserId};
use pantry_lib::{PantryGateway, UpdateInventory};
use uuid::Uuid;

use crate::column::{CellKind, ColumnDef};
use crate::editor::CellMutation;
use crate::row::{EditableRow, TableRow};
use crate::value::CellValue;

/// Column id of the remove-row action.
pub const TRASH: &str = "trash";
pub const IN_STOCK: &str = "inStock";
pub const NAME: &str = "name";
pub const CATEGORY: &str = "category";
pub const EXPIRATION: &str = "expiration";

impl TableRow for PantryItem {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

impl EditableRow for PantryItem {
    type Value = FieldValue;

    fn get_field(&self, column_id: &str) -> Option<FieldValue> {
        ItemField::from_column_id(column_id)
            .ok()
            .map(|field| self.field(field))
    }

    fn set_field(&mut self, column_id: &str, value: FieldValue) -> Result<(), FieldError> {
        self.apply(ItemField::from_column_id(column_id)?, value)
    }
}

/// The inventory table's columns.
pub fn pantry_columns() -> Vec<ColumnDef<PantryItem>> {
    vec![
        ColumnDef::new(TRASH, "[+]", |_: &PantryItem| CellValue::Empty)
            .kind(CellKind::custom(|_, _| "[-]".to_string()))
            .sortable(false)
            .filterable(false)
            .width(40),
        ColumnDef::new(IN_STOCK, "In Stock", |item: &PantryItem| CellValue::Bool(item.in_stock))
            .kind(CellKind::Toggle)
            .filterable(false)
            .width(100),
        ColumnDef::new(NAME, "Name", |item: &PantryItem| {
            CellValue::from(item.ingredient.name.as_str())
        })
        .width(300),
        ColumnDef::new(CATEGORY, "Category", |item: &PantryItem| {
            CellValue::from(item.ingredient.category.as_str())
        })
        .width(300),
        ColumnDef::new(EXPIRATION, "Expiration", |item: &PantryItem| {
            CellValue::from(item.expiration)
        })
        .kind(CellKind::Date)
        .filterable(false),
    ]
}

/// Commits cell edits through a [`PantryGateway`] on behalf of one user.
#[derive(Clone)]
pub struct GatewayMutation {
    gateway: Arc<dyn PantryGateway>,
    user: UserId,
}

impl GatewayMutation {
    pub fn new(gateway: Arc<dyn PantryGateway>, user: UserId) -> Self {
        Self { gateway, user }
    }
}

impl std::fmt::Debug for GatewayMutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayMutation")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CellMutation<PantryItem> for GatewayMutation {
    async fn commit(&self, key: &Uuid, column_id: &str, value: &FieldValue) -> Result<PantryItem, pantry_lib::Error> {
        let field = ItemField::from_column_id(column_id)?;
        let request = UpdateInventory::for_field(*key, field, *value).ok_or_else(|| {
            ApiError::BadRequest(format!("{} value for column '{}'", value.kind(), column_id))
        })?;
        debug!("update-inventory {:?}", request);
        let updated = self.gateway.update_inventory(self.user, request).await?;
        Ok(updated.pantry_item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pantry_lib::model::{Ingredient, IngredientCategory};

    fn item() -> PantryItem {
        PantryItem::new(Uuid::new_v4(), Ingredient::new("Chicken Breast", IngredientCategory::Poultry))
    }

    #[test]
    fn test_field_access_by_column() {
        let mut item = item();
        assert_eq!(item.get_field(IN_STOCK), Some(FieldValue::Bool(false)));
        assert_eq!(item.get_field(NAME), None);

        let date = NaiveDate::from_ymd_opt(2025, 3, 1);
        item.set_field(EXPIRATION, FieldValue::Date(date)).unwrap();
        assert_eq!(item.expiration, date);
        assert!(item.set_field(NAME, FieldValue::Bool(true)).is_err());
        assert!(item.set_field(IN_STOCK, FieldValue::Date(None)).is_err());
        assert!(!item.in_stock);
    }

    #[test]
    fn test_columns() {
        let columns = pantry_columns();
        let ids: Vec<&str> = columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![TRASH, IN_STOCK, NAME, CATEGORY, EXPIRATION]);

        let item = item();
        assert_eq!(columns[2].text(&item), "Chicken Breast");
        assert_eq!(columns[3].text(&item), "Poultry");
        assert_eq!(columns[4].value(&item), CellValue::Empty);
        assert_eq!(columns[4].initial_width, 150);
        assert!(!columns[0].sortable);
        assert!(columns[1].sortable && !columns[1].filterable);
    }
}
