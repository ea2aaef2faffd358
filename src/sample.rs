//! Small built-in dataset for trying the tool without a data export

use crate::models::{
    Dataset, HideoutLevel, HideoutModule, Item, Project, ProjectPhase, Quantities, Quest, Rarity,
};

fn qty(pairs: &[(&str, u32)]) -> Quantities {
    pairs.iter().map(|(id, n)| (id.to_string(), *n)).collect()
}

fn item(id: &str, name: &str, item_type: &str, rarity: Rarity, value: u32) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        item_type: item_type.to_string(),
        rarity: Some(rarity),
        value,
        weight_kg: 0.5,
        stack_size: 1,
        ..Default::default()
    }
}

fn crafted(mut item: Item, bench: &str, recipe: &[(&str, u32)]) -> Item {
    item.recipe = qty(recipe);
    item.craft_bench = Some(bench.to_string());
    item
}

fn recycles(mut item: Item, outputs: &[(&str, u32)]) -> Item {
    item.recycles_into = qty(outputs);
    item
}

fn upgrades(mut item: Item, cost: &[(&str, u32)]) -> Item {
    item.upgrade_cost = qty(cost);
    item
}

pub fn sample_items() -> Vec<Item> {
    use Rarity::*;

    vec![
        item("coins", "Coins", "Currency", Common, 1),
        item("metal_parts", "Metal Parts", "Basic Material", Common, 10),
        item("rubber_parts", "Rubber Parts", "Basic Material", Common, 8),
        item("fabric", "Fabric", "Basic Material", Common, 6),
        recycles(
            crafted(
                item("wires", "Wires", "Refined Material", Uncommon, 40),
                "refiner",
                &[("metal_parts", 2), ("rubber_parts", 1)],
            ),
            &[("metal_parts", 5)],
        ),
        crafted(
            item("battery", "Battery", "Refined Material", Rare, 120),
            "refiner",
            &[("wires", 2)],
        ),
        recycles(
            item("toaster", "Toaster", "Recyclable", Common, 100),
            &[("metal_parts", 5), ("wires", 2)],
        ),
        recycles(
            item("broken_radio", "Broken Radio", "Recyclable", Uncommon, 200),
            &[("metal_parts", 2)],
        ),
        item("gold_watch", "Gold Watch", "Trinket", Rare, 1500),
        item("ancient_relic", "Ancient Relic", "Trinket", Legendary, 5000),
        crafted(
            item("rifle_i", "Rifle I", "Weapon", Common, 300),
            "gunsmith",
            &[("metal_parts", 6)],
        ),
        upgrades(
            item("rifle_ii", "Rifle II", "Weapon", Uncommon, 700),
            &[("metal_parts", 4), ("wires", 1)],
        ),
        upgrades(
            item("rifle_iii", "Rifle III", "Rifle", Rare, 1400),
            &[("metal_parts", 6), ("battery", 1)],
        ),
        crafted(
            item("light_ammo", "Light Ammo", "Ammunition", Common, 4),
            "workbench",
            &[("metal_parts", 1)],
        ),
        crafted(
            item("bandage", "Bandage", "Quick Use", Common, 30),
            "workbench",
            &[("fabric", 2), ("rubber_parts", 1)],
        ),
        crafted(
            item("defibrillator", "Defibrillator", "Quick Use", Rare, 400),
            "medical_lab",
            &[("battery", 1)],
        ),
        crafted(
            item("door_key", "Storeroom Key", "Key", Uncommon, 150),
            "workbench",
            &[("metal_parts", 1)],
        ),
        item("trap_blueprint", "Trap Blueprint", "Blueprint", Rare, 500),
        item("sensor_array", "Sensor Array", "Advanced Material", Epic, 300),
        recycles(
            item("antenna", "Antenna", "Refined Material", Uncommon, 60),
            &[("wires", 1)],
        ),
        item("field_notes", "Field Notes", "Misc", Common, 20),
    ]
}

pub fn sample_quests() -> Vec<Quest> {
    vec![
        Quest {
            id: "rubber_run".to_string(),
            name: "Rubber Run".to_string(),
            requirements: qty(&[("rubber_parts", 5)]),
            rewards: qty(&[("coins", 500)]),
        },
        Quest {
            id: "into_the_field".to_string(),
            name: "Into the Field".to_string(),
            requirements: Quantities::new(),
            rewards: qty(&[("field_notes", 1)]),
        },
    ]
}

pub fn sample_projects() -> Vec<Project> {
    vec![Project {
        id: "expedition".to_string(),
        name: "Expedition".to_string(),
        requirements: Quantities::new(),
        phases: vec![
            ProjectPhase {
                phase: 1,
                name: Some("Foundation".to_string()),
                requirements: qty(&[("antenna", 2)]),
            },
            ProjectPhase {
                phase: 2,
                name: Some("Uplink".to_string()),
                requirements: qty(&[("antenna", 3)]),
            },
        ],
    }]
}

pub fn sample_hideout_modules() -> Vec<HideoutModule> {
    vec![
        HideoutModule {
            id: "workbench".to_string(),
            name: "Workbench".to_string(),
            min_level: 1,
            max_level: 3,
            levels: vec![
                HideoutLevel {
                    level: 1,
                    requirements: Quantities::new(),
                },
                HideoutLevel {
                    level: 2,
                    requirements: qty(&[("fabric", 10)]),
                },
                HideoutLevel {
                    level: 3,
                    requirements: qty(&[("fabric", 20)]),
                },
            ],
        },
        HideoutModule {
            id: "stash".to_string(),
            name: "Stash".to_string(),
            min_level: 1,
            max_level: 2,
            levels: vec![
                HideoutLevel {
                    level: 1,
                    requirements: qty(&[("wires", 5)]),
                },
                HideoutLevel {
                    level: 2,
                    requirements: qty(&[("wires", 10)]),
                },
            ],
        },
    ]
}

pub fn sample_dataset() -> Dataset {
    Dataset {
        items: sample_items(),
        quests: sample_quests(),
        projects: sample_projects(),
        hideout_modules: sample_hideout_modules(),
    }
}
