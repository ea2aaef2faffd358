//! Tiered weapon variants: `<base>_<roman numeral>` ids

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{add_quantity, Item, Quantities};

static VARIANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+)_(x|ix|viii|vii|vi|v|iv|iii|ii|i)$").expect("variant pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponVariant {
    pub base: String,
    pub tier: u32,
}

/// Split a variant id into base and tier. Ids off the convention yield `None`.
pub fn parse_variant(id: &str) -> Option<WeaponVariant> {
    let caps = VARIANT_RE.captures(id)?;
    Some(WeaponVariant {
        base: caps[1].to_string(),
        tier: roman_to_int(&caps[2])?,
    })
}

pub fn is_weapon_variant(id: &str) -> bool {
    VARIANT_RE.is_match(id)
}

fn roman_to_int(numeral: &str) -> Option<u32> {
    let tier = match numeral.to_ascii_lowercase().as_str() {
        "i" => 1,
        "ii" => 2,
        "iii" => 3,
        "iv" => 4,
        "v" => 5,
        "vi" => 6,
        "vii" => 7,
        "viii" => 8,
        "ix" => 9,
        "x" => 10,
        _ => return None,
    };
    Some(tier)
}

/// All tiers of one base weapon, lowest tier first
#[derive(Debug, Clone)]
pub struct WeaponGroup<'a> {
    pub base: String,
    pub tiers: Vec<(u32, &'a Item)>,
}

impl WeaponGroup<'_> {
    /// Display name of the lowest tier, falling back to the base id
    pub fn name(&self) -> &str {
        self.tiers
            .first()
            .map(|(_, item)| item.name.as_str())
            .unwrap_or(&self.base)
    }

    /// Materials needed to climb from the first tier to the last
    pub fn total_upgrade_cost(&self) -> Quantities {
        let mut total = Quantities::new();
        for (_, item) in &self.tiers {
            for (id, qty) in &item.upgrade_cost {
                add_quantity(&mut total, id.clone(), *qty);
            }
        }
        total
    }
}

/// Group variant items by base id. Groups keep first-seen order.
pub fn group_variants<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<WeaponGroup<'a>> {
    let mut groups: Vec<WeaponGroup<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let Some(variant) = parse_variant(&item.id) else {
            continue;
        };
        let key = variant.base.to_ascii_lowercase();
        let pos = *index.entry(key).or_insert_with(|| {
            groups.push(WeaponGroup {
                base: variant.base.clone(),
                tiers: Vec::new(),
            });
            groups.len() - 1
        });
        groups[pos].tiers.push((variant.tier, item));
    }

    for group in &mut groups {
        group.tiers.sort_by_key(|(tier, _)| *tier);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tier_suffix_case_insensitively() {
        assert_eq!(
            parse_variant("rifle_iii"),
            Some(WeaponVariant {
                base: "rifle".to_string(),
                tier: 3
            })
        );
        assert_eq!(parse_variant("Rattler_IV").map(|v| v.tier), Some(4));
        assert_eq!(parse_variant("ferro_x").map(|v| v.tier), Some(10));
    }

    #[test]
    fn rejects_ids_off_the_convention() {
        assert!(!is_weapon_variant("rifle"));
        assert!(!is_weapon_variant("rifle_iiii"));
        assert!(!is_weapon_variant("_ii"));
        assert!(!is_weapon_variant("metal_parts"));
        assert!(is_weapon_variant("heavy_smg_v"));
    }

    fn tier(id: &str, cost: &[(&str, u32)]) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_string(),
            upgrade_cost: cost.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn groups_sort_tiers_and_sum_upgrade_costs() {
        let items = vec![
            tier("rifle_ii", &[("metal", 4)]),
            tier("pistol_i", &[]),
            tier("rifle_i", &[]),
            tier("rifle_iii", &[("metal", 6), ("springs", 2)]),
            tier("scrap", &[]),
        ];

        let groups = group_variants(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].base, "rifle");
        let tiers: Vec<_> = groups[0].tiers.iter().map(|(t, _)| *t).collect();
        assert_eq!(tiers, [1, 2, 3]);
        assert_eq!(groups[0].name(), "rifle_i");

        let cost = groups[0].total_upgrade_cost();
        assert_eq!(cost.get("metal"), Some(&10));
        assert_eq!(cost.get("springs"), Some(&2));
        assert_eq!(groups[1].base, "pistol");
    }

    #[test]
    fn upgrade_cost_totals_saturate() {
        let items = vec![
            tier("rifle_i", &[("metal", u32::MAX)]),
            tier("rifle_ii", &[("metal", 7)]),
        ];
        let groups = group_variants(&items);
        assert_eq!(groups[0].total_upgrade_cost().get("metal"), Some(&u32::MAX));
    }
}
