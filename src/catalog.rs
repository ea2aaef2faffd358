//! Item lookup and reverse recipe index

use std::collections::HashMap;

use crate::models::Item;

/// Immutable id-keyed item set with a reverse "used as ingredient" index.
///
/// Iteration follows the first position each id appeared at in the source
/// list. A repeated id replaces the earlier record in place.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    positions: HashMap<String, usize>,
    consumers: HashMap<String, Vec<String>>,
}

impl Catalog {
    pub fn build(items: Vec<Item>) -> Self {
        let mut catalog = Catalog::default();

        for item in items {
            match catalog.positions.get(&item.id) {
                Some(&pos) => {
                    log::debug!("Duplicate item id {}, keeping the later record", item.id);
                    catalog.items[pos] = item;
                }
                None => {
                    catalog.positions.insert(item.id.clone(), catalog.items.len());
                    catalog.items.push(item);
                }
            }
        }

        // Built after dedup so a consumer is listed once per ingredient
        for item in &catalog.items {
            for ingredient in item.recipe.keys() {
                catalog
                    .consumers
                    .entry(ingredient.clone())
                    .or_default()
                    .push(item.id.clone());
            }
        }

        catalog
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.positions.get(id).map(|&pos| &self.items[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids of items whose recipe consumes `ingredient_id`, in catalog order
    pub fn consumers_of(&self, ingredient_id: &str) -> &[String] {
        self.consumers
            .get(ingredient_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct items crafted from `ingredient_id`
    pub fn recipe_count(&self, ingredient_id: &str) -> usize {
        self.consumers_of(ingredient_id).len()
    }

    pub fn ingredient_count(&self) -> usize {
        self.consumers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, recipe: &[(&str, u32)]) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_string(),
            recipe: recipe.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn reverse_index_preserves_catalog_order() {
        let catalog = Catalog::build(vec![
            item("wires", &[]),
            item("trap", &[("wires", 2), ("metal", 1)]),
            item("metal", &[]),
            item("battery", &[("wires", 1)]),
        ]);

        assert_eq!(catalog.consumers_of("wires"), ["trap", "battery"]);
        assert_eq!(catalog.consumers_of("metal"), ["trap"]);
        assert!(catalog.consumers_of("battery").is_empty());
        assert_eq!(catalog.recipe_count("wires"), 2);
    }

    #[test]
    fn duplicate_ids_keep_first_position_and_last_record() {
        let catalog = Catalog::build(vec![
            item("a", &[("x", 1)]),
            item("b", &[]),
            item("a", &[("y", 1)]),
        ]);

        assert_eq!(catalog.len(), 2);
        let ids: Vec<_> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(catalog.consumers_of("x").is_empty());
        assert_eq!(catalog.consumers_of("y"), ["a"]);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let items = vec![item("a", &[("b", 1)]), item("b", &[])];
        let first = Catalog::build(items.clone());
        let second = Catalog::build(items);
        assert_eq!(first.consumers_of("b"), second.consumers_of("b"));
        assert_eq!(first.len(), second.len());
    }
}
