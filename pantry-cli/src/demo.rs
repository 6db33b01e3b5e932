//! Demo backend seeded with a small pantry.

use chrono::Days;
use chrono::NaiveDate;
use pantry_lib::error::Error;
use pantry_lib::model::{IngredientCategory, UserId};
use pantry_lib::{AddIngredient, InMemoryGateway, PantryGateway};
use uuid::Uuid;

const CATALOG: &[(&str, IngredientCategory)] = &[
    ("Eggs", IngredientCategory::EggsAndDairy),
    ("Milk", IngredientCategory::EggsAndDairy),
    ("Butter", IngredientCategory::EggsAndDairy),
    ("Cheddar", IngredientCategory::EggsAndDairy),
    ("Ground Beef", IngredientCategory::Beef),
    ("Steak", IngredientCategory::Beef),
    ("Brisket", IngredientCategory::Beef),
    ("Chicken Breast", IngredientCategory::Poultry),
    ("Turkey", IngredientCategory::Poultry),
    ("Duck", IngredientCategory::Poultry),
];

/// Ingredients stocked in the demo pantry, with days until expiration.
const STOCKED: &[(&str, bool, Option<u64>)] = &[
    ("Eggs", true, Some(12)),
    ("Milk", false, Some(3)),
    ("Ground Beef", true, None),
    ("Chicken Breast", false, Some(30)),
    ("Cheddar", true, None),
];

/// Builds an in-memory backend with one pantry tracked by a fresh user.
pub async fn seed(today: NaiveDate) -> Result<(InMemoryGateway, UserId, Uuid), Error> {
    let gateway = InMemoryGateway::new().with_today(today);
    let user = UserId::random();
    let pantry = gateway.create_pantry(user, "Kitchen")?;

    let mut ingredients = Vec::with_capacity(CATALOG.len());
    for (name, category) in CATALOG {
        ingredients.push(gateway.create_ingredient(name, *category)?);
    }

    for (name, in_stock, days) in STOCKED {
        let Some(ingredient) = ingredients.iter().find(|i| i.name == *name) else {
            continue;
        };
        let mut request = AddIngredient::new(pantry.id, ingredient.id).in_stock(*in_stock);
        if let Some(date) = days.and_then(|d| today.checked_add_days(Days::new(d))) {
            request = request.expiration(date);
        }
        gateway.add_ingredient(user, request).await?;
    }

    Ok((gateway, user, pantry.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let (gateway, user, pantry_id) = seed(today).await.unwrap();
        let inventory = gateway.get_inventory(user, pantry_id).await.unwrap().inventory;
        assert_eq!(inventory.len(), STOCKED.len());
        assert_eq!(inventory[0].ingredient.name, "Eggs");
        assert_eq!(gateway.all_ingredients(user).await.unwrap().count, CATALOG.len());
    }
}
