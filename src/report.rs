//! Text rendering of verdicts, summaries and crafting lookups

use crate::models::{Decision, DecisionCounts, DecisionVerdict, Item};
use crate::rules::Rule;
use crate::weapons::WeaponGroup;

fn badge(decision: Decision) -> &'static str {
    match decision {
        Decision::Keep => "KEEP",
        Decision::SellOrRecycle => "SELL/RECYCLE",
        Decision::Situational => "SITUATIONAL",
    }
}

/// Format one verdict with its reasons
pub fn format_verdict(item: &Item, rule: Option<Rule>, verdict: &DecisionVerdict) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} [{}]\n", item.name, item.id));
    output.push_str(&format!("  Decision: {}", badge(verdict.decision)));
    if let Some(rule) = rule {
        output.push_str(&format!(" (rule: {rule})"));
    }
    output.push('\n');

    let rarity = item.rarity.map_or("-", |r| r.as_str());
    output.push_str(&format!(
        "  Type: {}  Rarity: {}  Value: {} coins\n",
        item.item_type, rarity, item.value
    ));

    for reason in &verdict.reasons {
        output.push_str(&format!("  - {reason}\n"));
    }
    if let Some(deps) = &verdict.dependencies {
        output.push_str(&format!("  Needed by: {}\n", deps.join("; ")));
    }
    if verdict.recycle_value_exceeds_item {
        output.push_str("  Note: recycling yields more than the sell value\n");
    }

    output
}

/// One line per item, in the order given
pub fn format_verdict_table(rows: &[(&Item, DecisionVerdict)]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<30} {:<14} {:>8}  {}\n",
        "Item", "Decision", "Value", "Reason"
    ));
    output.push_str(&format!("{}\n", "-".repeat(80)));

    for (item, verdict) in rows {
        let reason = verdict.reasons.first().map(String::as_str).unwrap_or("");
        let marker = if verdict.recycle_value_exceeds_item { " *" } else { "" };
        output.push_str(&format!(
            "{:<30} {:<14} {:>8}  {}{}\n",
            item.name,
            badge(verdict.decision),
            item.value,
            reason,
            marker
        ));
    }
    output
}

/// Summary of a whole-catalog classification
#[derive(Debug)]
pub struct DecisionSummary {
    pub counts: DecisionCounts,
    pub recycle_upgrades: usize,
}

impl DecisionSummary {
    pub fn new(counts: DecisionCounts, rows: &[(&Item, DecisionVerdict)]) -> Self {
        DecisionSummary {
            counts,
            recycle_upgrades: rows
                .iter()
                .filter(|(_, v)| v.recycle_value_exceeds_item)
                .count(),
        }
    }
}

impl std::fmt::Display for DecisionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Stash Summary ===")?;
        writeln!(f, "Items classified: {}", self.counts.total())?;
        writeln!(f)?;

        let total = self.counts.total().max(1) as f64;
        for decision in Decision::ALL {
            let n = self.counts.get(decision);
            writeln!(
                f,
                "  {:<14} {:>5}  ({:.1}%)",
                badge(decision),
                n,
                n as f64 * 100.0 / total
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Worth more recycled than sold: {}", self.recycle_upgrades)?;

        Ok(())
    }
}

/// "Used to craft" listing for one ingredient
pub fn format_ingredient_usage(item: &Item, users: &[&Item]) -> String {
    let mut output = String::new();
    if users.is_empty() {
        output.push_str(&format!("{} is not used in any recipe\n", item.name));
        return output;
    }

    output.push_str(&format!("{} is used to craft:\n", item.name));
    for user in users {
        let qty = user.recipe.get(&item.id).copied().unwrap_or(0);
        let bench = user
            .craft_bench
            .as_deref()
            .map(|b| format!(" at {b}"))
            .unwrap_or_default();
        output.push_str(&format!("  {} (needs {}){}\n", user.name, qty, bench));
    }
    output
}

pub fn format_weapon_groups(groups: &[WeaponGroup<'_>]) -> String {
    let mut output = String::new();
    if groups.is_empty() {
        output.push_str("No tiered weapons in catalog\n");
        return output;
    }

    for group in groups {
        let tiers: Vec<String> = group.tiers.iter().map(|(tier, _)| tier.to_string()).collect();
        output.push_str(&format!("{} (tiers {})\n", group.name(), tiers.join(", ")));

        let cost = group.total_upgrade_cost();
        if cost.is_empty() {
            continue;
        }
        output.push_str("  Full upgrade cost:\n");
        for (id, qty) in &cost {
            output.push_str(&format!("    {qty}x {id}\n"));
        }
    }
    output
}
