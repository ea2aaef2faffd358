//! Crafting and recycling value heuristics

use crate::catalog::Catalog;
use crate::models::{Item, OutputSource};

/// More consumers than this makes any ingredient worth holding on to
pub const CRAFTING_RECIPE_THRESHOLD: usize = 2;
/// Share of the item's own value its recycle output has to beat
pub const RECYCLE_VALUE_RATIO: f64 = 0.5;
pub const TRINKET_MIN_VALUE: u32 = 1000;

const TRINKET_TYPE_MARKERS: [&str; 3] = ["trinket", "misc", "collectible"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftingValue {
    pub valuable: bool,
    pub recipe_count: usize,
    pub descriptor: &'static str,
}

pub fn crafting_value(item: &Item, catalog: &Catalog) -> CraftingValue {
    let recipe_count = catalog.recipe_count(&item.id);
    let rare = item.rarity.is_some_and(|r| r.is_rare_or_better());

    CraftingValue {
        valuable: recipe_count > CRAFTING_RECIPE_THRESHOLD || (recipe_count > 0 && rare),
        recipe_count,
        descriptor: if rare {
            "Rare crafting material"
        } else {
            "Common crafting ingredient"
        },
    }
}

/// One line of a recycle breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct RecycleOutput {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_value: u32,
}

impl RecycleOutput {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.unit_value) * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecycleValue {
    pub valuable: bool,
    pub exceeds_item: bool,
    pub total_value: f64,
    pub source: Option<OutputSource>,
    pub outputs: Vec<RecycleOutput>,
}

/// Value of what the item breaks down into. Outputs missing from the
/// catalog contribute nothing.
pub fn recycle_value(item: &Item, catalog: &Catalog) -> RecycleValue {
    let mut outputs = Vec::new();
    let source = item.recycle_outputs().map(|(source, quantities)| {
        for (output_id, &quantity) in quantities {
            let Some(output) = catalog.get(output_id) else {
                log::trace!("{} recycles into unknown item {}", item.id, output_id);
                continue;
            };
            outputs.push(RecycleOutput {
                item_id: output.id.clone(),
                name: output.name.clone(),
                quantity,
                unit_value: output.value,
            });
        }
        source
    });

    let total_value: f64 = outputs.iter().map(RecycleOutput::subtotal).sum();
    let own_value = f64::from(item.value);

    RecycleValue {
        valuable: total_value > own_value * RECYCLE_VALUE_RATIO,
        exceeds_item: total_value > own_value,
        total_value,
        source,
        outputs,
    }
}

pub fn is_high_value_trinket(item: &Item) -> bool {
    if item.value < TRINKET_MIN_VALUE || item.has_recipe() || item.recycle_outputs().is_some() {
        return false;
    }
    let item_type = item.item_type.to_lowercase();
    TRINKET_TYPE_MARKERS
        .iter()
        .any(|marker| item_type.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rarity;

    fn priced(id: &str, value: u32) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_uppercase(),
            value,
            ..Default::default()
        }
    }

    fn consumer(id: &str, ingredient: &str) -> Item {
        let mut item = priced(id, 10);
        item.recipe.insert(ingredient.to_string(), 1);
        item
    }

    #[test]
    fn three_consumers_make_common_material_valuable() {
        let catalog = Catalog::build(vec![
            priced("wires", 5),
            consumer("a", "wires"),
            consumer("b", "wires"),
            consumer("c", "wires"),
        ]);
        let value = crafting_value(catalog.get("wires").unwrap(), &catalog);
        assert!(value.valuable);
        assert_eq!(value.recipe_count, 3);
        assert_eq!(value.descriptor, "Common crafting ingredient");
    }

    #[test]
    fn single_consumer_needs_rarity() {
        let mut lens = priced("lens", 5);
        let catalog = Catalog::build(vec![lens.clone(), consumer("scope", "lens")]);
        assert!(!crafting_value(&lens, &catalog).valuable);

        lens.rarity = Some(Rarity::Rare);
        let value = crafting_value(&lens, &catalog);
        assert!(value.valuable);
        assert_eq!(value.descriptor, "Rare crafting material");
    }

    #[test]
    fn recycle_math_sums_known_outputs() {
        let mut toaster = priced("toaster", 100);
        toaster.recycles_into.insert("a".to_string(), 2);
        toaster.recycles_into.insert("b".to_string(), 1);
        toaster.recycles_into.insert("ghost".to_string(), 50);
        let catalog = Catalog::build(vec![toaster.clone(), priced("a", 30), priced("b", 50)]);

        let value = recycle_value(&toaster, &catalog);
        assert_eq!(value.total_value, 110.0);
        assert!(value.valuable);
        assert!(value.exceeds_item);
        assert_eq!(value.outputs.len(), 2);
        assert_eq!(value.source, Some(OutputSource::Recycle));
    }

    #[test]
    fn half_value_threshold_is_strict() {
        let mut radio = priced("radio", 100);
        radio.salvages_into.insert("a".to_string(), 1);
        let catalog = Catalog::build(vec![radio.clone(), priced("a", 50)]);

        let value = recycle_value(&radio, &catalog);
        assert!(!value.valuable);
        assert!(!value.exceeds_item);
    }

    #[test]
    fn no_outputs_is_worthless() {
        let rock = priced("rock", 0);
        let catalog = Catalog::build(vec![rock.clone()]);
        let value = recycle_value(&rock, &catalog);
        assert_eq!(value.total_value, 0.0);
        assert!(!value.valuable);
        assert!(value.source.is_none());
    }

    #[test]
    fn trinket_requires_value_type_and_no_outputs() {
        let mut statue = priced("statue", 1500);
        statue.item_type = "Trinket".to_string();
        assert!(is_high_value_trinket(&statue));

        statue.item_type = "Misc Collectible".to_string();
        assert!(is_high_value_trinket(&statue));

        statue.value = 999;
        assert!(!is_high_value_trinket(&statue));

        statue.value = 1000;
        statue.recycles_into.insert("metal".to_string(), 1);
        assert!(!is_high_value_trinket(&statue));

        let mut gadget = priced("gadget", 5000);
        gadget.item_type = "Gadget".to_string();
        assert!(!is_high_value_trinket(&gadget));
    }
}
