//! The priority cascade.
//!
//! Classification walks [`CASCADE`] top to bottom and stops at the first rule
//! that produces a verdict. Rules never score against each other: an earlier
//! match wins no matter how strong a later signal would have been.

use std::fmt;

use crate::catalog::Catalog;
use crate::evaluators::{crafting_value, is_high_value_trinket, recycle_value};
use crate::models::{Decision, DecisionVerdict, HideoutModule, Item, Project, Quest, Rarity};
use crate::progress::PlayerProgress;
use crate::resolvers::{hideout_usage, project_usage, quest_usage};
use crate::weapons::is_weapon_variant;

/// Items that are always worth keeping regardless of anything else
pub const ALWAYS_KEEP_IDS: [&str; 3] = ["coins", "cred", "raider_token"];

const WEAPON_TYPES: [&str; 1] = ["weapon"];
const AMMO_TYPES: [&str; 2] = ["ammunition", "ammo"];
const CONSUMABLE_TYPES: [&str; 3] = ["quick use", "quickuse", "consumable"];
const KEY_TYPES: [&str; 1] = ["key"];
const BLUEPRINT_TYPES: [&str; 1] = ["blueprint"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    AlwaysKeep,
    Legendary,
    Blueprint,
    Weapon,
    Ammunition,
    Consumable,
    Key,
    QuestUsage,
    ProjectUsage,
    HideoutUsage,
    CraftingValue,
    HighValueTrinket,
    RecycleValue,
    RareRarity,
    Fallback,
}

/// Canonical evaluation order
pub const CASCADE: [Rule; 15] = [
    Rule::AlwaysKeep,
    Rule::Legendary,
    Rule::Blueprint,
    Rule::Weapon,
    Rule::Ammunition,
    Rule::Consumable,
    Rule::Key,
    Rule::QuestUsage,
    Rule::ProjectUsage,
    Rule::HideoutUsage,
    Rule::CraftingValue,
    Rule::HighValueTrinket,
    Rule::RecycleValue,
    Rule::RareRarity,
    Rule::Fallback,
];

/// Everything a rule may consult for one item
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub item: &'a Item,
    pub progress: &'a PlayerProgress,
    pub catalog: &'a Catalog,
    pub quests: &'a [Quest],
    pub projects: &'a [Project],
    pub hideout_modules: &'a [HideoutModule],
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::AlwaysKeep => "always-keep",
            Rule::Legendary => "legendary",
            Rule::Blueprint => "blueprint",
            Rule::Weapon => "weapon",
            Rule::Ammunition => "ammunition",
            Rule::Consumable => "consumable",
            Rule::Key => "key",
            Rule::QuestUsage => "quest-usage",
            Rule::ProjectUsage => "project-usage",
            Rule::HideoutUsage => "hideout-usage",
            Rule::CraftingValue => "crafting-value",
            Rule::HighValueTrinket => "high-value-trinket",
            Rule::RecycleValue => "recycle-value",
            Rule::RareRarity => "rare-rarity",
            Rule::Fallback => "fallback",
        }
    }

    /// The verdict this rule gives, or `None` if it does not apply
    pub fn evaluate(self, ctx: &RuleContext<'_>) -> Option<DecisionVerdict> {
        let item = ctx.item;
        match self {
            Rule::AlwaysKeep => ALWAYS_KEEP_IDS.contains(&item.id.as_str()).then(|| {
                DecisionVerdict::new(Decision::Keep, vec!["Core currency - always keep".to_string()])
            }),

            Rule::Legendary => (item.rarity == Some(Rarity::Legendary)).then(|| {
                DecisionVerdict::new(
                    Decision::Keep,
                    vec!["Legendary rarity - extremely valuable".to_string()],
                )
            }),

            Rule::Blueprint => type_is(item, &BLUEPRINT_TYPES).then(|| {
                DecisionVerdict::new(
                    Decision::Situational,
                    vec!["Blueprint - learn it or keep for a future unlock".to_string()],
                )
            }),

            Rule::Weapon => (type_is(item, &WEAPON_TYPES) || is_weapon_variant(&item.id)).then(|| {
                DecisionVerdict::new(
                    Decision::Situational,
                    vec!["Weapon - keep if it fits your loadout or upgrade path".to_string()],
                )
            }),

            Rule::Ammunition => type_is(item, &AMMO_TYPES).then(|| {
                DecisionVerdict::new(
                    Decision::Situational,
                    vec!["Ammunition - keep what your weapons use".to_string()],
                )
            }),

            Rule::Consumable => type_is(item, &CONSUMABLE_TYPES).then(|| {
                DecisionVerdict::new(
                    Decision::Situational,
                    vec!["Quick-use item - keep a supply for raids".to_string()],
                )
            }),

            Rule::Key => type_is(item, &KEY_TYPES).then(|| {
                DecisionVerdict::new(
                    Decision::Situational,
                    vec!["Key - keep if you plan to open its door".to_string()],
                )
            }),

            Rule::QuestUsage => {
                let usage = quest_usage(item, ctx.progress, ctx.quests);
                usage.is_used.then(|| {
                    DecisionVerdict::new(
                        Decision::Keep,
                        vec![format!("Needed for quests: {}", usage.names.join(", "))],
                    )
                    .with_dependencies(usage.names)
                })
            }

            Rule::ProjectUsage => {
                let usage = project_usage(item, ctx.progress, ctx.projects);
                usage.is_used.then(|| {
                    DecisionVerdict::new(
                        Decision::Keep,
                        vec![format!("Needed for projects: {}", usage.names.join(", "))],
                    )
                    .with_dependencies(usage.names)
                })
            }

            Rule::HideoutUsage => {
                let usage = hideout_usage(item, ctx.progress, ctx.hideout_modules);
                usage.is_used.then(|| {
                    DecisionVerdict::new(
                        Decision::Keep,
                        vec![format!(
                            "Needed for hideout upgrades: {}",
                            usage.names.join(", ")
                        )],
                    )
                    .with_dependencies(usage.names)
                })
            }

            Rule::CraftingValue => {
                let value = crafting_value(item, ctx.catalog);
                value.valuable.then(|| {
                    DecisionVerdict::new(
                        Decision::Situational,
                        vec![
                            value.descriptor.to_string(),
                            format!("Used in {} crafting recipes", value.recipe_count),
                        ],
                    )
                })
            }

            Rule::HighValueTrinket => is_high_value_trinket(item).then(|| {
                DecisionVerdict::new(
                    Decision::SellOrRecycle,
                    vec![
                        "High-value trinket with no crafting use".to_string(),
                        format!("Sells for {} coins", item.value),
                    ],
                )
            }),

            Rule::RecycleValue => {
                let value = recycle_value(item, ctx.catalog);
                if !value.valuable {
                    return None;
                }
                let verb = value.source.map_or("Recycles into", |s| s.verb());
                let breakdown = value
                    .outputs
                    .iter()
                    .map(|o| format!("{}x {}", o.quantity, o.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(DecisionVerdict::new(
                    Decision::SellOrRecycle,
                    vec![
                        format!("{verb}: {breakdown}"),
                        format!(
                            "Recycle value {:.0} coins vs sell value {} coins",
                            value.total_value, item.value
                        ),
                    ],
                ))
            }

            Rule::RareRarity => matches!(item.rarity, Some(Rarity::Rare | Rarity::Epic)).then(|| {
                DecisionVerdict::new(
                    Decision::Situational,
                    vec![format!(
                        "{} rarity - may be useful later",
                        capitalize(item.rarity.map_or("", Rarity::as_str))
                    )],
                )
            }),

            Rule::Fallback => Some(DecisionVerdict::new(
                Decision::SellOrRecycle,
                vec!["No immediate use found".to_string()],
            )),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run `rules` in order and return the first verdict.
///
/// A rule list that does not end in [`Rule::Fallback`] still yields the
/// fallback verdict when nothing matches.
pub fn run_cascade(rules: &[Rule], ctx: &RuleContext<'_>) -> (Rule, DecisionVerdict) {
    for &rule in rules {
        if let Some(verdict) = rule.evaluate(ctx) {
            return (rule, verdict);
        }
    }
    let fallback = Rule::Fallback
        .evaluate(ctx)
        .unwrap_or_else(|| DecisionVerdict::new(Decision::SellOrRecycle, Vec::new()));
    (Rule::Fallback, fallback)
}

fn type_is(item: &Item, tags: &[&str]) -> bool {
    let item_type = item.normalized_type();
    tags.contains(&item_type.as_str())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
