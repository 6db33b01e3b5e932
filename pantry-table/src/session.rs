//! A mounted pantry inventory.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info, warn};
use pantry_lib::model::{FieldValue, ItemField, PantryItem, UserId};
use pantry_lib::{AddIngredient, PantryGateway};
use uuid::Uuid;

use crate::config::TableConfig;
use crate::editor::{CellEditor, EditOutcome};
use crate::error::MutationError;
use crate::pantry::{GatewayMutation, pantry_columns};
use crate::picker::IngredientPicker;
use crate::table::InventoryTable;

/// An inventory table bound to one pantry, one user and one gateway.
///
/// Owns the row-level actions (add and remove) and hands out cell editors
/// wired to the gateway.
#[derive(Clone)]
pub struct PantrySession {
    gateway: Arc<dyn PantryGateway>,
    user: UserId,
    pantry_id: Uuid,
    table: InventoryTable<PantryItem>,
    mutation: Arc<GatewayMutation>,
    /// Ingredient ids with an add in flight.
    adding: Arc<Mutex<HashSet<Uuid>>>,
}

impl PantrySession {
    /// Fetches the inventory snapshot and builds the table.
    pub async fn mount(
        gateway: Arc<dyn PantryGateway>,
        user: UserId,
        pantry_id: Uuid,
        config: TableConfig,
    ) -> Result<Self, MutationError> {
        let timeout = config.request_timeout;
        let inventory = bounded(timeout, gateway.get_inventory(user, pantry_id)).await?;
        info!("Mounted pantry {} with {} rows", pantry_id, inventory.inventory.len());

        let table = InventoryTable::new(pantry_columns(), inventory.inventory, config)?;
        let mutation = Arc::new(GatewayMutation::new(Arc::clone(&gateway), user));

        Ok(Self {
            gateway,
            user,
            pantry_id,
            table,
            mutation,
            adding: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    pub fn table(&self) -> &InventoryTable<PantryItem> {
        &self.table
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn pantry_id(&self) -> Uuid {
        self.pantry_id
    }

    fn timeout(&self) -> Duration {
        self.table.config().request_timeout
    }

    /// Re-fetches the inventory, replacing every row.
    pub async fn refresh(&self) -> Result<(), MutationError> {
        let inventory = bounded(self.timeout(), self.gateway.get_inventory(self.user, self.pantry_id)).await?;
        self.table.replace_rows(inventory.inventory);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cell edits
    // -------------------------------------------------------------------------

    /// Editor for one editable field of a row.
    pub fn editor(&self, item_id: Uuid, field: ItemField) -> CellEditor<PantryItem> {
        self.table.editor(item_id, field.column_id())
    }

    /// Writes a field optimistically and reconciles it with the backend.
    pub async fn edit(
        &self,
        item_id: Uuid,
        field: ItemField,
        value: FieldValue,
    ) -> Result<EditOutcome<FieldValue>, MutationError> {
        self.editor(item_id, field).edit(self.mutation.as_ref(), value).await
    }

    /// Flips the stock flag of a row.
    pub async fn toggle_stock(&self, item_id: Uuid) -> Result<EditOutcome<FieldValue>, MutationError> {
        let current = self
            .table
            .find(&item_id)
            .ok_or_else(|| MutationError::RowNotFound(item_id.to_string()))?
            .in_stock;
        self.edit(item_id, ItemField::InStock, FieldValue::Bool(!current)).await
    }

    /// Sets or clears the expiration of a row.
    pub async fn set_expiration(
        &self,
        item_id: Uuid,
        expiration: Option<NaiveDate>,
    ) -> Result<EditOutcome<FieldValue>, MutationError> {
        self.edit(item_id, ItemField::Expiration, FieldValue::Date(expiration)).await
    }

    // -------------------------------------------------------------------------
    // Row actions
    // -------------------------------------------------------------------------

    /// Returns `true` if the ingredient has a row or an add in flight.
    pub fn is_in_inventory(&self, ingredient_id: Uuid) -> bool {
        let in_table = self.table.rows().iter().any(|row| row.ingredient_id == ingredient_id);
        in_table
            || self
                .adding
                .lock()
                .map(|set| set.contains(&ingredient_id))
                .unwrap_or(false)
    }

    /// Loads the ingredient catalog for the add picker.
    pub async fn picker(&self) -> Result<IngredientPicker, MutationError> {
        let list = bounded(self.timeout(), self.gateway.all_ingredients(self.user)).await?;
        debug!("Loaded {} catalog ingredients", list.count);
        Ok(IngredientPicker::new(list.ingredients, |id| self.is_in_inventory(id)))
    }

    /// Adds an ingredient; the backend's row is appended on success.
    ///
    /// Refused locally when the ingredient is already present.
    pub async fn add(
        &self,
        ingredient_id: Uuid,
        in_stock: Option<bool>,
        expiration: Option<NaiveDate>,
    ) -> Result<PantryItem, MutationError> {
        {
            let Ok(mut adding) = self.adding.lock() else {
                return Err(MutationError::Duplicate(ingredient_id.to_string()));
            };
            let in_table = self.table.rows().iter().any(|row| row.ingredient_id == ingredient_id);
            if in_table || !adding.insert(ingredient_id) {
                return Err(MutationError::Duplicate(ingredient_id.to_string()));
            }
        }

        let mut request = AddIngredient::new(self.pantry_id, ingredient_id);
        request.in_stock = in_stock;
        request.expiration = expiration;

        let result = bounded(self.timeout(), self.gateway.add_ingredient(self.user, request)).await;
        if let Ok(mut adding) = self.adding.lock() {
            adding.remove(&ingredient_id);
        }

        let item = result?.new_pantry_item;
        if self.table.add_row(item.clone()) {
            info!("Added {} to pantry {}", item.ingredient.name, self.pantry_id);
        }
        Ok(item)
    }

    /// Removes a row; the local row goes once the backend confirms.
    ///
    /// A row the backend no longer has is dropped locally as well.
    pub async fn remove(&self, item_id: Uuid) -> Result<Option<PantryItem>, MutationError> {
        match bounded(self.timeout(), self.gateway.remove_ingredient(self.user, item_id)).await {
            Ok(removed) => {
                info!("Removed {} from pantry {}", removed.removed_ingredient.ingredient.name, self.pantry_id);
                Ok(self.table.remove_by_key(&item_id))
            }
            Err(MutationError::Remote(e)) if e.is_not_found() => {
                warn!("Pantry item {} was already removed", item_id);
                Ok(self.table.remove_by_key(&item_id))
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for PantrySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PantrySession")
            .field("user", &self.user)
            .field("pantry_id", &self.pantry_id)
            .field("rows", &self.table.len())
            .finish_non_exhaustive()
    }
}

/// Runs a gateway call under the request timeout.
async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, pantry_lib::Error>>,
) -> Result<T, MutationError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(MutationError::Remote),
        Err(_) => Err(MutationError::Timeout(timeout)),
    }
}
