//! Add-ingredient picker model.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use pantry_lib::model::{Ingredient, IngredientCategory};
use uuid::Uuid;

/// One selectable ingredient.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerEntry {
    pub ingredient: Ingredient,
    /// Already in the pantry; the entry is shown disabled.
    pub in_inventory: bool,
}

/// Catalog entries of one category, sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerGroup {
    pub category: IngredientCategory,
    pub entries: Vec<PickerEntry>,
}

/// The ingredient catalog grouped by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientPicker {
    groups: Vec<PickerGroup>,
}

impl IngredientPicker {
    /// Groups a catalog, flagging ingredients the pantry already holds.
    pub fn new(catalog: Vec<Ingredient>, in_inventory: impl Fn(Uuid) -> bool) -> Self {
        let mut groups: Vec<PickerGroup> = IngredientCategory::ALL
            .iter()
            .map(|&category| PickerGroup {
                category,
                entries: Vec::new(),
            })
            .collect();

        for ingredient in catalog {
            let entry = PickerEntry {
                in_inventory: in_inventory(ingredient.id),
                ingredient,
            };
            if let Some(group) = groups.iter_mut().find(|g| g.category == entry.ingredient.category) {
                group.entries.push(entry);
            }
        }

        for group in &mut groups {
            group.entries.sort_by(|a, b| a.ingredient.name.cmp(&b.ingredient.name));
        }
        groups.retain(|g| !g.entries.is_empty());

        Self { groups }
    }

    pub fn groups(&self) -> &[PickerGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Entries that can still be added.
    pub fn available(&self) -> impl Iterator<Item = &Ingredient> {
        self.groups
            .iter()
            .flat_map(|g| &g.entries)
            .filter(|e| !e.in_inventory)
            .map(|e| &e.ingredient)
    }

    /// Entry whose name equals `name`, ignoring case.
    pub fn find(&self, name: &str) -> Option<&PickerEntry> {
        self.groups
            .iter()
            .flat_map(|g| &g.entries)
            .find(|e| e.ingredient.name.eq_ignore_ascii_case(name))
    }

    /// Fuzzy search over ingredient names, best match first.
    ///
    /// An empty query returns every entry in group order.
    pub fn search(&self, query: &str) -> Vec<&PickerEntry> {
        let entries = self.groups.iter().flat_map(|g| &g.entries);
        if query.is_empty() {
            return entries.collect();
        }

        let mut matcher = Matcher::new(Config::DEFAULT);
        let pattern = Pattern::new(query, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy);
        let mut buf = Vec::new();

        let mut matches: Vec<(u32, &PickerEntry)> = entries
            .filter_map(|entry| {
                let haystack = Utf32Str::new(&entry.ingredient.name, &mut buf);
                pattern.score(haystack, &mut matcher).map(|score| (score, entry))
            })
            .collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0));
        matches.into_iter().map(|(_, entry)| entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Ingredient> {
        vec![
            Ingredient::new("Milk", IngredientCategory::EggsAndDairy),
            Ingredient::new("Ground Beef", IngredientCategory::Beef),
            Ingredient::new("Eggs", IngredientCategory::EggsAndDairy),
            Ingredient::new("Chicken Breast", IngredientCategory::Poultry),
        ]
    }

    #[test]
    fn test_grouped_by_category() {
        let picker = IngredientPicker::new(catalog(), |_| false);
        let groups = picker.groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category, IngredientCategory::EggsAndDairy);
        let names: Vec<&str> = groups[0].entries.iter().map(|e| e.ingredient.name.as_str()).collect();
        assert_eq!(names, vec!["Eggs", "Milk"]);
    }

    #[test]
    fn test_in_inventory_flagged() {
        let catalog = catalog();
        let milk = catalog[0].id;
        let picker = IngredientPicker::new(catalog, |id| id == milk);
        assert!(picker.find("milk").unwrap().in_inventory);
        assert_eq!(picker.available().count(), 3);
    }

    #[test]
    fn test_search() {
        let picker = IngredientPicker::new(catalog(), |_| false);
        let found = picker.search("chbr");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ingredient.name, "Chicken Breast");
        assert_eq!(picker.search("").len(), 4);
    }
}
