//! Remote mutation gateway
//!
//! The table talks to the backend exclusively through [`PantryGateway`].
//! The trait is transport-agnostic; this module ships an in-memory backend
//! and an HTTP/JSON client.
//!
//! # Example
//!
//! ```ignore
//! use pantry_lib::{InMemoryGateway, PantryGateway, UpdateInventory};
//!
//! let gateway = InMemoryGateway::new();
//! let updated = gateway
//!     .update_inventory(user, UpdateInventory::toggle_stock(item_id, true))
//!     .await?;
//! assert!(updated.pantry_item.in_stock);
//! ```

mod http;
mod memory;
mod request;

pub use http::*;
pub use memory::*;
pub use request::*;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::model::UserId;

/// Typed request/response contract of the pantry backend.
///
/// Every call carries the acting user explicitly.
#[async_trait]
pub trait PantryGateway: Send + Sync {
    /// Fetches the inventory snapshot of a pantry.
    async fn get_inventory(&self, user: UserId, pantry_id: Uuid) -> Result<Inventory, Error>;

    /// Updates the stock flag and/or expiration of one row.
    ///
    /// Only fields present in the request are changed. The returned row is
    /// authoritative and may differ from what was sent.
    async fn update_inventory(&self, user: UserId, request: UpdateInventory) -> Result<UpdatedItem, Error>;

    /// Adds an ingredient to a pantry.
    ///
    /// Fails with a conflict if the ingredient is already in that pantry.
    async fn add_ingredient(&self, user: UserId, request: AddIngredient) -> Result<AddedItem, Error>;

    /// Removes a row. Fails with not-found if it was already removed.
    async fn remove_ingredient(&self, user: UserId, item_id: Uuid) -> Result<RemovedItem, Error>;

    /// Lists the ingredient catalog.
    async fn all_ingredients(&self, user: UserId) -> Result<IngredientList, Error>;
}

#[async_trait]
impl<G: PantryGateway + ?Sized> PantryGateway for Arc<G> {
    async fn get_inventory(&self, user: UserId, pantry_id: Uuid) -> Result<Inventory, Error> {
        (**self).get_inventory(user, pantry_id).await
    }

    async fn update_inventory(&self, user: UserId, request: UpdateInventory) -> Result<UpdatedItem, Error> {
        (**self).update_inventory(user, request).await
    }

    async fn add_ingredient(&self, user: UserId, request: AddIngredient) -> Result<AddedItem, Error> {
        (**self).add_ingredient(user, request).await
    }

    async fn remove_ingredient(&self, user: UserId, item_id: Uuid) -> Result<RemovedItem, Error> {
        (**self).remove_ingredient(user, item_id).await
    }

    async fn all_ingredients(&self, user: UserId) -> Result<IngredientList, Error> {
        (**self).all_ingredients(user).await
    }
}
