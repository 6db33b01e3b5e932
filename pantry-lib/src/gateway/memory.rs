//! In-memory pantry backend using DashMap

use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use log::debug;
use uuid::Uuid;

use super::AddIngredient;
use super::AddedItem;
use super::IngredientList;
use super::Inventory;
use super::PantryGateway;
use super::RemovedItem;
use super::UpdateInventory;
use super::UpdatedItem;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Ingredient;
use crate::model::IngredientCategory;
use crate::model::Pantry;
use crate::model::PantryItem;
use crate::model::UserId;
use crate::validation;

#[derive(Debug)]
struct PantryEntry {
    pantry: Pantry,
    tracked_by: HashSet<UserId>,
}

#[derive(Debug)]
struct ItemEntry {
    seq: u64,
    item: PantryItem,
}

/// A pantry backend held entirely in memory.
///
/// Enforces the same rules as the real backend: the acting user must track
/// the pantry, an ingredient appears at most once per pantry, and removed
/// rows are reported as not found. Failures and latency can be scripted for
/// the next calls, which is how tests exercise rollback and races.
///
/// # Example
///
/// ```
/// use pantry_lib::InMemoryGateway;
/// use pantry_lib::model::{IngredientCategory, UserId};
///
/// let gateway = InMemoryGateway::new();
/// let user = UserId::random();
/// let pantry = gateway.create_pantry(user, "Kitchen").unwrap();
/// let eggs = gateway.create_ingredient("Eggs", IngredientCategory::EggsAndDairy).unwrap();
/// assert_eq!(gateway.len(), 0);
/// # let _ = (pantry, eggs);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    pantries: DashMap<Uuid, PantryEntry>,
    ingredients: DashMap<Uuid, Ingredient>,
    items: DashMap<Uuid, ItemEntry>,
    seq: AtomicU64,
    failures: Mutex<VecDeque<ApiError>>,
    delays: Mutex<VecDeque<Duration>>,
    today: Option<NaiveDate>,
}

impl InMemoryGateway {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the date used for expiration validation.
    ///
    /// Defaults to the local calendar date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Returns the number of stored rows across all pantries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns a stored row by id.
    pub fn item(&self, id: Uuid) -> Option<PantryItem> {
        self.items.get(&id).map(|e| e.item.clone())
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Creates a pantry tracked by `user`.
    pub fn create_pantry(&self, user: UserId, name: &str) -> Result<Pantry, Error> {
        validation::validate_pantry_name(name)?;
        let pantry = Pantry::new(name);
        self.pantries.insert(
            pantry.id,
            PantryEntry {
                pantry: pantry.clone(),
                tracked_by: HashSet::from([user]),
            },
        );
        debug!("Created pantry {} for {}", pantry.id, user);
        Ok(pantry)
    }

    /// Lets `user` track an existing pantry, as accepting a share invite does.
    pub fn track(&self, user: UserId, pantry_id: Uuid) -> Result<(), Error> {
        let mut entry = self
            .pantries
            .get_mut(&pantry_id)
            .ok_or_else(|| ApiError::NotFound(format!("Pantry {}", pantry_id)))?;
        entry.tracked_by.insert(user);
        Ok(())
    }

    /// Stops `user` from tracking a pantry.
    pub fn untrack(&self, user: UserId, pantry_id: Uuid) -> Result<(), Error> {
        let mut entry = self
            .pantries
            .get_mut(&pantry_id)
            .ok_or_else(|| ApiError::NotFound(format!("Pantry {}", pantry_id)))?;
        entry.tracked_by.remove(&user);
        Ok(())
    }

    /// Adds an ingredient to the catalog.
    pub fn create_ingredient(&self, name: &str, category: IngredientCategory) -> Result<Ingredient, Error> {
        validation::validate_ingredient_name(name)?;
        let ingredient = Ingredient::new(name, category);
        self.ingredients.insert(ingredient.id, ingredient.clone());
        Ok(ingredient)
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Makes the next call fail with `error` after its delay.
    ///
    /// Queued failures are consumed in call order.
    pub fn fail_next(&self, error: ApiError) {
        if let Ok(mut queue) = self.failures.lock() {
            queue.push_back(error);
        }
    }

    /// Delays the next call by `delay`.
    ///
    /// Queued delays are consumed in call order.
    pub fn delay_next(&self, delay: Duration) {
        if let Ok(mut queue) = self.delays.lock() {
            queue.push_back(delay);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Applies scripted delay and failure for one call.
    async fn scripted(&self) -> Result<(), Error> {
        let delay = self.delays.lock().ok().and_then(|mut q| q.pop_front());
        let failure = self.failures.lock().ok().and_then(|mut q| q.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn ensure_tracked(&self, user: UserId, pantry_id: Uuid) -> Result<(), Error> {
        let entry = self
            .pantries
            .get(&pantry_id)
            .ok_or_else(|| ApiError::NotFound(format!("Pantry {}", pantry_id)))?;
        if entry.tracked_by.contains(&user) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("Pantry '{}' is not tracked by {}", entry.pantry.name, user)).into())
        }
    }

    fn pantry_of(&self, item_id: Uuid) -> Result<Uuid, Error> {
        self.items
            .get(&item_id)
            .map(|e| e.item.pantry_id)
            .ok_or_else(|| ApiError::NotFound(format!("Pantry item {}", item_id)).into())
    }
}

#[async_trait]
impl PantryGateway for InMemoryGateway {
    async fn get_inventory(&self, user: UserId, pantry_id: Uuid) -> Result<Inventory, Error> {
        self.scripted().await?;
        self.ensure_tracked(user, pantry_id)?;

        let mut entries: Vec<(u64, PantryItem)> = self
            .items
            .iter()
            .filter(|e| e.item.pantry_id == pantry_id)
            .map(|e| (e.seq, e.item.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);

        debug!("Inventory of {}: {} rows", pantry_id, entries.len());
        Ok(Inventory {
            inventory: entries.into_iter().map(|(_, item)| item).collect(),
        })
    }

    async fn update_inventory(&self, user: UserId, request: UpdateInventory) -> Result<UpdatedItem, Error> {
        self.scripted().await?;
        request.validate(self.today())?;
        let pantry_id = self.pantry_of(request.item_id)?;
        self.ensure_tracked(user, pantry_id)?;

        let mut entry = self
            .items
            .get_mut(&request.item_id)
            .ok_or_else(|| ApiError::NotFound(format!("Pantry item {}", request.item_id)))?;
        if let Some(in_stock) = request.in_stock {
            entry.item.in_stock = in_stock;
        }
        if let Some(expiration) = request.expiration {
            entry.item.expiration = expiration;
        }

        debug!("Updated pantry item {}", request.item_id);
        Ok(UpdatedItem {
            pantry_item: entry.item.clone(),
        })
    }

    async fn add_ingredient(&self, user: UserId, request: AddIngredient) -> Result<AddedItem, Error> {
        self.scripted().await?;
        request.validate(self.today())?;
        self.ensure_tracked(user, request.pantry_id)?;

        let ingredient = self
            .ingredients
            .get(&request.ingredient_id)
            .map(|i| i.clone())
            .ok_or_else(|| ApiError::NotFound(format!("Ingredient {}", request.ingredient_id)))?;

        let duplicate = self
            .items
            .iter()
            .any(|e| e.item.pantry_id == request.pantry_id && e.item.ingredient_id == request.ingredient_id);
        if duplicate {
            return Err(ApiError::Conflict(format!("'{}' is already in this pantry", ingredient.name)).into());
        }

        let item = PantryItem::new(request.pantry_id, ingredient)
            .with_in_stock(request.in_stock.unwrap_or(false))
            .with_expiration(request.expiration);
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.items.insert(
            item.id,
            ItemEntry {
                seq,
                item: item.clone(),
            },
        );

        debug!("Added {} to pantry {}", item.ingredient.name, request.pantry_id);
        Ok(AddedItem { new_pantry_item: item })
    }

    async fn remove_ingredient(&self, user: UserId, item_id: Uuid) -> Result<RemovedItem, Error> {
        self.scripted().await?;
        let pantry_id = self.pantry_of(item_id)?;
        self.ensure_tracked(user, pantry_id)?;

        let (_, entry) = self
            .items
            .remove(&item_id)
            .ok_or_else(|| ApiError::NotFound(format!("Pantry item {}", item_id)))?;

        debug!("Removed pantry item {}", item_id);
        Ok(RemovedItem {
            removed_ingredient: entry.item,
        })
    }

    async fn all_ingredients(&self, _user: UserId) -> Result<IngredientList, Error> {
        self.scripted().await?;
        let mut ingredients: Vec<Ingredient> = self.ingredients.iter().map(|i| i.clone()).collect();
        ingredients.sort_by(|a, b| (a.category, &a.name).cmp(&(b.category, &b.name)));
        let count = ingredients.len();
        Ok(IngredientList { ingredients, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        gateway: InMemoryGateway,
        user: UserId,
        pantry: Pantry,
        eggs: Ingredient,
    }

    fn fixture() -> Fixture {
        let gateway = InMemoryGateway::new().with_today(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let user = UserId::random();
        let pantry = gateway.create_pantry(user, "Kitchen").unwrap();
        let eggs = gateway.create_ingredient("Eggs", IngredientCategory::EggsAndDairy).unwrap();
        Fixture {
            gateway,
            user,
            pantry,
            eggs,
        }
    }

    #[tokio::test]
    async fn test_add_then_conflict() {
        let f = fixture();
        let request = AddIngredient::new(f.pantry.id, f.eggs.id).in_stock(true);
        let added = f.gateway.add_ingredient(f.user, request.clone()).await.unwrap();
        assert!(added.new_pantry_item.in_stock);
        assert_eq!(added.new_pantry_item.ingredient.name, "Eggs");

        let err = f.gateway.add_ingredient(f.user, request).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_remove_twice_is_not_found() {
        let f = fixture();
        let added = f
            .gateway
            .add_ingredient(f.user, AddIngredient::new(f.pantry.id, f.eggs.id))
            .await
            .unwrap();
        let id = added.new_pantry_item.id;
        f.gateway.remove_ingredient(f.user, id).await.unwrap();
        assert!(f.gateway.remove_ingredient(f.user, id).await.unwrap_err().is_not_found());
        assert!(f.gateway.is_empty());
    }

    #[tokio::test]
    async fn test_untracked_user_is_forbidden() {
        let f = fixture();
        let stranger = UserId::random();
        let err = f.gateway.get_inventory(stranger, f.pantry.id).await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Forbidden(_))));

        f.gateway.track(stranger, f.pantry.id).unwrap();
        assert!(f.gateway.get_inventory(stranger, f.pantry.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_inventory_keeps_insertion_order() {
        let f = fixture();
        let beef = f.gateway.create_ingredient("Brisket", IngredientCategory::Beef).unwrap();
        let chicken = f.gateway.create_ingredient("Chicken", IngredientCategory::Poultry).unwrap();
        for ingredient in [&chicken, &f.eggs, &beef] {
            f.gateway
                .add_ingredient(f.user, AddIngredient::new(f.pantry.id, ingredient.id))
                .await
                .unwrap();
        }
        let names: Vec<String> = f
            .gateway
            .get_inventory(f.user, f.pantry.id)
            .await
            .unwrap()
            .inventory
            .into_iter()
            .map(|i| i.ingredient.name)
            .collect();
        assert_eq!(names, vec!["Chicken", "Eggs", "Brisket"]);
    }

    #[tokio::test]
    async fn test_update_rejects_past_expiration() {
        let f = fixture();
        let added = f
            .gateway
            .add_ingredient(f.user, AddIngredient::new(f.pantry.id, f.eggs.id))
            .await
            .unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 12, 31);
        let err = f
            .gateway
            .update_inventory(f.user, UpdateInventory::set_expiration(added.new_pantry_item.id, past))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_scripted_failure_is_consumed_once() {
        let f = fixture();
        f.gateway.fail_next(ApiError::Internal("boom".into()));
        assert!(f.gateway.all_ingredients(f.user).await.is_err());
        let list = f.gateway.all_ingredients(f.user).await.unwrap();
        assert_eq!(list.count, 1);
    }
}
