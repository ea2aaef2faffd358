//! Data models for catalog items, progression content and verdicts

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Item id → quantity. Every requirement, recipe and output list is
/// normalized to this shape before it reaches the engine.
pub type Quantities = BTreeMap<String, u32>;

/// Add `qty` to the entry for `id`, saturating at `u32::MAX`
pub fn add_quantity(quantities: &mut Quantities, id: String, qty: u32) {
    let slot = quantities.entry(id).or_default();
    *slot = slot.saturating_add(qty);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// Case-insensitive parse; unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }

    /// Rare, epic and legendary.
    pub fn is_rare_or_better(self) -> bool {
        self >= Rarity::Rare
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub item_type: String,
    pub rarity: Option<Rarity>,
    pub value: u32, // coins
    pub weight_kg: f64,
    pub stack_size: u32,
    pub recipe: Quantities,
    pub recycles_into: Quantities,
    pub salvages_into: Quantities,
    pub crafts_into: Quantities,
    pub upgrade_cost: Quantities,
    pub craft_bench: Option<String>,
}

impl Item {
    pub fn has_recipe(&self) -> bool {
        !self.recipe.is_empty()
    }

    /// First non-empty of recycle, salvage and crafting outputs, in that order.
    pub fn recycle_outputs(&self) -> Option<(OutputSource, &Quantities)> {
        [
            (OutputSource::Recycle, &self.recycles_into),
            (OutputSource::Salvage, &self.salvages_into),
            (OutputSource::Craft, &self.crafts_into),
        ]
        .into_iter()
        .find(|(_, outputs)| !outputs.is_empty())
    }

    /// Type tag lowercased with `_` and `-` read as spaces.
    pub fn normalized_type(&self) -> String {
        self.item_type
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ")
    }
}

/// Which output mapping a recycle valuation was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Recycle,
    Salvage,
    Craft,
}

impl OutputSource {
    pub fn verb(self) -> &'static str {
        match self {
            OutputSource::Recycle => "Recycles into",
            OutputSource::Salvage => "Salvages into",
            OutputSource::Craft => "Breaks down into",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub requirements: Quantities,
    /// Some datasets encode required turn-ins as rewards of the unlocking quest.
    pub rewards: Quantities,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPhase {
    pub phase: u32,
    pub name: Option<String>,
    pub requirements: Quantities,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Flat requirement list used by older datasets
    pub requirements: Quantities,
    pub phases: Vec<ProjectPhase>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HideoutLevel {
    pub level: u32,
    pub requirements: Quantities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HideoutModule {
    pub id: String,
    pub name: String,
    /// Level assumed when the player has not recorded one. 0 = not unlocked.
    pub min_level: u32,
    pub max_level: u32,
    pub levels: Vec<HideoutLevel>,
}

impl Default for HideoutModule {
    fn default() -> Self {
        HideoutModule {
            id: String::new(),
            name: String::new(),
            min_level: 1,
            max_level: 1,
            levels: Vec::new(),
        }
    }
}

/// Everything the engine is constructed from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub items: Vec<Item>,
    pub quests: Vec<Quest>,
    pub projects: Vec<Project>,
    pub hideout_modules: Vec<HideoutModule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Keep,
    SellOrRecycle,
    Situational,
}

impl Decision {
    pub const ALL: [Decision; 3] = [Decision::Keep, Decision::SellOrRecycle, Decision::Situational];

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Keep => "keep",
            Decision::SellOrRecycle => "sell_or_recycle",
            Decision::Situational => "situational",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "keep" => Some(Decision::Keep),
            "sell_or_recycle" | "sell" | "recycle" => Some(Decision::SellOrRecycle),
            "situational" => Some(Decision::Situational),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation for a single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionVerdict {
    pub decision: Decision,
    pub reasons: Vec<String>,
    /// Quest, project or hideout-upgrade names that justified the verdict
    pub dependencies: Option<Vec<String>>,
    /// Combined recycle output is worth strictly more than the item itself
    pub recycle_value_exceeds_item: bool,
}

impl DecisionVerdict {
    pub fn new(decision: Decision, reasons: Vec<String>) -> Self {
        DecisionVerdict {
            decision,
            reasons,
            dependencies: None,
            recycle_value_exceeds_item: false,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }
}

/// Verdict tally across the catalog; all three buckets are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCounts {
    pub keep: usize,
    pub sell_or_recycle: usize,
    pub situational: usize,
}

impl DecisionCounts {
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Keep => self.keep += 1,
            Decision::SellOrRecycle => self.sell_or_recycle += 1,
            Decision::Situational => self.situational += 1,
        }
    }

    pub fn get(&self, decision: Decision) -> usize {
        match decision {
            Decision::Keep => self.keep,
            Decision::SellOrRecycle => self.sell_or_recycle,
            Decision::Situational => self.situational,
        }
    }

    pub fn total(&self) -> usize {
        self.keep + self.sell_or_recycle + self.situational
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_ordering_marks_rare_and_up() {
        assert!(!Rarity::Uncommon.is_rare_or_better());
        assert!(Rarity::Rare.is_rare_or_better());
        assert!(Rarity::Legendary.is_rare_or_better());
        assert_eq!(Rarity::parse(" Epic "), Some(Rarity::Epic));
        assert_eq!(Rarity::parse("mythic"), None);
    }

    #[test]
    fn recycle_outputs_prefer_recycle_then_salvage() {
        let mut item = Item {
            id: "fan".to_string(),
            ..Default::default()
        };
        assert!(item.recycle_outputs().is_none());

        item.crafts_into.insert("wires".to_string(), 1);
        item.salvages_into.insert("metal_parts".to_string(), 2);
        let (source, outputs) = item.recycle_outputs().unwrap();
        assert_eq!(source, OutputSource::Salvage);
        assert_eq!(outputs.get("metal_parts"), Some(&2));

        item.recycles_into.insert("plastic_parts".to_string(), 3);
        assert_eq!(item.recycle_outputs().unwrap().0, OutputSource::Recycle);
    }

    #[test]
    fn normalized_type_folds_separators() {
        let item = Item {
            item_type: "Quick_Use".to_string(),
            ..Default::default()
        };
        assert_eq!(item.normalized_type(), "quick use");
    }

    #[test]
    fn counts_cover_every_bucket() {
        let mut counts = DecisionCounts::default();
        counts.record(Decision::Keep);
        counts.record(Decision::Situational);
        counts.record(Decision::Situational);
        assert_eq!(counts.get(Decision::SellOrRecycle), 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(Decision::parse("sell-or-recycle"), Some(Decision::SellOrRecycle));
    }
}
