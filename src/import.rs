//! Dataset import from a directory of JSON files
//!
//! Source datasets drift in shape: requirement lists show up as `{id: qty}`
//! maps or as arrays of `{itemId, quantity}` records, names can be plain or
//! localized, and keys come in both camelCase and snake_case. Everything is
//! normalized here so the engine only ever sees [`Quantities`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use crate::db;
use crate::error::DataError;
use crate::models::{
    add_quantity, Dataset, HideoutLevel, HideoutModule, Item, Project, ProjectPhase, Quantities,
    Quest, Rarity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Items,
    Quests,
    Projects,
    Hideout,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl RawText {
    /// English when localized, else whatever language comes first
    fn resolve(self) -> Option<String> {
        match self {
            RawText::Plain(s) => Some(s),
            RawText::Localized(mut map) => map
                .remove("en")
                .or_else(|| map.into_values().next()),
        }
    }
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Id(String),
    Pair {
        #[serde(alias = "itemId", alias = "id")]
        item_id: String,
        #[serde(default = "default_quantity", alias = "qty", alias = "amount")]
        quantity: u32,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantities {
    Map(BTreeMap<String, u32>),
    List(Vec<RawEntry>),
}

impl RawQuantities {
    fn normalize(self) -> Quantities {
        match self {
            RawQuantities::Map(map) => map,
            RawQuantities::List(entries) => {
                let mut out = Quantities::new();
                for entry in entries {
                    let (id, qty) = match entry {
                        RawEntry::Id(id) => (id, 1),
                        RawEntry::Pair { item_id, quantity } => (item_id, quantity),
                    };
                    add_quantity(&mut out, id, qty);
                }
                out
            }
        }
    }
}

fn quantities(raw: Option<RawQuantities>) -> Quantities {
    raw.map(RawQuantities::normalize).unwrap_or_default()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBench {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: Option<String>,
    name: Option<RawText>,
    #[serde(rename = "type", alias = "itemType", alias = "item_type", alias = "category")]
    item_type: Option<String>,
    rarity: Option<String>,
    value: Option<f64>,
    #[serde(alias = "weight", alias = "weight_kg")]
    weight_kg: Option<f64>,
    #[serde(alias = "stack_size")]
    stack_size: Option<u32>,
    recipe: Option<RawQuantities>,
    #[serde(alias = "recycles_into")]
    recycles_into: Option<RawQuantities>,
    #[serde(alias = "salvages_into")]
    salvages_into: Option<RawQuantities>,
    #[serde(alias = "crafts_into")]
    crafts_into: Option<RawQuantities>,
    #[serde(alias = "upgrade_cost")]
    upgrade_cost: Option<RawQuantities>,
    #[serde(alias = "craft_bench")]
    craft_bench: Option<RawBench>,
}

impl RawItem {
    fn into_item(self, path: &Path) -> Result<Item, DataError> {
        let id = self.id.ok_or_else(|| DataError::MissingId {
            path: path.to_path_buf(),
        })?;
        let name = self.name.and_then(RawText::resolve).unwrap_or_else(|| id.clone());
        let craft_bench = self.craft_bench.and_then(|bench| match bench {
            RawBench::One(b) => Some(b),
            RawBench::Many(b) => b.into_iter().next(),
        });

        Ok(Item {
            name,
            item_type: self.item_type.unwrap_or_default(),
            rarity: self.rarity.as_deref().and_then(Rarity::parse),
            value: coins(self.value.unwrap_or(0.0)),
            weight_kg: self.weight_kg.unwrap_or(0.0),
            stack_size: self.stack_size.unwrap_or(1),
            recipe: quantities(self.recipe),
            recycles_into: quantities(self.recycles_into),
            salvages_into: quantities(self.salvages_into),
            crafts_into: quantities(self.crafts_into),
            upgrade_cost: quantities(self.upgrade_cost),
            craft_bench,
            id,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuest {
    id: Option<String>,
    name: Option<RawText>,
    #[serde(alias = "requiredItemIds", alias = "requiredItems", alias = "required_items")]
    requirements: Option<RawQuantities>,
    #[serde(alias = "rewardItemIds", alias = "rewardItems", alias = "reward_items")]
    rewards: Option<RawQuantities>,
}

impl RawQuest {
    fn into_quest(self, path: &Path) -> Result<Quest, DataError> {
        let id = self.id.ok_or_else(|| DataError::MissingId {
            path: path.to_path_buf(),
        })?;
        Ok(Quest {
            name: self.name.and_then(RawText::resolve).unwrap_or_else(|| id.clone()),
            requirements: quantities(self.requirements),
            rewards: quantities(self.rewards),
            id,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPhase {
    #[serde(alias = "phaseNumber", alias = "phase_number")]
    phase: Option<u32>,
    name: Option<RawText>,
    #[serde(alias = "requirementItemIds", alias = "requiredItemIds", alias = "requirement_item_ids")]
    requirements: Option<RawQuantities>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    id: Option<String>,
    name: Option<RawText>,
    #[serde(alias = "requirementItemIds", alias = "requiredItemIds", alias = "requirement_item_ids")]
    requirements: Option<RawQuantities>,
    #[serde(default)]
    phases: Vec<RawPhase>,
}

impl RawProject {
    fn into_project(self, path: &Path) -> Result<Project, DataError> {
        let id = self.id.ok_or_else(|| DataError::MissingId {
            path: path.to_path_buf(),
        })?;
        let phases = self
            .phases
            .into_iter()
            .enumerate()
            .map(|(i, raw)| ProjectPhase {
                phase: raw.phase.unwrap_or(i as u32 + 1),
                name: raw.name.and_then(RawText::resolve),
                requirements: quantities(raw.requirements),
            })
            .collect();

        Ok(Project {
            name: self.name.and_then(RawText::resolve).unwrap_or_else(|| id.clone()),
            requirements: quantities(self.requirements),
            phases,
            id,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLevel {
    level: u32,
    #[serde(alias = "requirementItemIds", alias = "requiredItemIds", alias = "requirement_item_ids")]
    requirements: Option<RawQuantities>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModule {
    id: Option<String>,
    name: Option<RawText>,
    #[serde(alias = "min_level")]
    min_level: Option<u32>,
    #[serde(alias = "max_level")]
    max_level: Option<u32>,
    #[serde(default)]
    levels: Vec<RawLevel>,
}

impl RawModule {
    fn into_module(self, path: &Path) -> Result<HideoutModule, DataError> {
        let id = self.id.ok_or_else(|| DataError::MissingId {
            path: path.to_path_buf(),
        })?;
        let mut levels: Vec<HideoutLevel> = self
            .levels
            .into_iter()
            .map(|raw| HideoutLevel {
                level: raw.level,
                requirements: quantities(raw.requirements),
            })
            .collect();
        levels.sort_by_key(|l| l.level);
        merge_duplicate_levels(&mut levels, &id);

        let highest = levels.last().map_or(1, |l| l.level);
        Ok(HideoutModule {
            name: self.name.and_then(RawText::resolve).unwrap_or_else(|| id.clone()),
            min_level: self.min_level.unwrap_or(1),
            max_level: self.max_level.unwrap_or(highest),
            levels,
            id,
        })
    }
}

/// Fold repeated level numbers into one entry with summed requirements.
/// `levels` must already be sorted by level.
fn merge_duplicate_levels(levels: &mut Vec<HideoutLevel>, module_id: &str) {
    let mut merged: Vec<HideoutLevel> = Vec::with_capacity(levels.len());
    for level in levels.drain(..) {
        match merged.last_mut() {
            Some(last) if last.level == level.level => {
                log::warn!("Hideout module {} lists level {} twice, merging", module_id, level.level);
                for (item_id, qty) in level.requirements {
                    add_quantity(&mut last.requirements, item_id, qty);
                }
            }
            _ => merged.push(level),
        }
    }
    *levels = merged;
}

/// Coin values are whole and non-negative
fn coins(raw: f64) -> u32 {
    if raw.is_finite() && raw > 0.0 {
        raw.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Decide what a file holds from its top-level directory, or from its own
/// name when it sits directly in the data directory.
fn file_kind(root: &Path, path: &Path) -> Option<FileKind> {
    let rel = path.strip_prefix(root).ok()?;
    let mut components = rel.components();
    let first = components.next()?.as_os_str().to_str()?;
    let tag = if components.next().is_some() {
        first.to_string()
    } else {
        Path::new(first).file_stem()?.to_str()?.to_string()
    };

    match tag.to_ascii_lowercase().replace('-', "_").as_str() {
        "items" => Some(FileKind::Items),
        "quests" => Some(FileKind::Quests),
        "projects" => Some(FileKind::Projects),
        "hideout" | "hideout_modules" | "hideoutmodules" => Some(FileKind::Hideout),
        _ => None,
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: OneOrMany<T> = serde_json::from_str(&content).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(records.into_vec())
}

/// Parse one file into `dataset`, returning the number of records added.
/// A file is all-or-nothing: one bad record rejects the whole file.
fn parse_file(path: &Path, kind: FileKind, dataset: &mut Dataset) -> Result<usize, DataError> {
    match kind {
        FileKind::Items => {
            let items = read_records::<RawItem>(path)?
                .into_iter()
                .map(|raw| raw.into_item(path))
                .collect::<Result<Vec<_>, _>>()?;
            let n = items.len();
            dataset.items.extend(items);
            Ok(n)
        }
        FileKind::Quests => {
            let quests = read_records::<RawQuest>(path)?
                .into_iter()
                .map(|raw| raw.into_quest(path))
                .collect::<Result<Vec<_>, _>>()?;
            let n = quests.len();
            dataset.quests.extend(quests);
            Ok(n)
        }
        FileKind::Projects => {
            let projects = read_records::<RawProject>(path)?
                .into_iter()
                .map(|raw| raw.into_project(path))
                .collect::<Result<Vec<_>, _>>()?;
            let n = projects.len();
            dataset.projects.extend(projects);
            Ok(n)
        }
        FileKind::Hideout => {
            let modules = read_records::<RawModule>(path)?
                .into_iter()
                .map(|raw| raw.into_module(path))
                .collect::<Result<Vec<_>, _>>()?;
            let n = modules.len();
            dataset.hideout_modules.extend(modules);
            Ok(n)
        }
    }
}

/// Find every JSON file under the data directory, in a stable order
pub fn find_data_files(data_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(data_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect()
}

/// Load a full dataset from a data directory. Unreadable files are logged
/// and counted, never fatal.
pub fn load_data_dir(data_dir: &Path) -> (Dataset, ImportStats) {
    let mut dataset = Dataset::default();
    let mut stats = ImportStats::default();

    log::info!("Scanning {} for dataset files...", data_dir.display());
    for path in find_data_files(data_dir) {
        let Some(kind) = file_kind(data_dir, &path) else {
            log::debug!("Skipping {}", path.display());
            stats.skipped += 1;
            continue;
        };

        match parse_file(&path, kind, &mut dataset) {
            Ok(n) => {
                log::debug!("  Parsed {} ({} records)", path.display(), n);
                stats.files += 1;
            }
            Err(e) => {
                log::warn!("  {}", e);
                stats.errors += 1;
            }
        }
    }

    stats.items = dataset.items.len();
    stats.quests = dataset.quests.len();
    stats.projects = dataset.projects.len();
    stats.hideout_modules = dataset.hideout_modules.len();
    (dataset, stats)
}

/// Read a `{item_id: coins}` override file
pub fn load_price_overrides(path: &Path) -> Result<BTreeMap<String, u32>, DataError> {
    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: BTreeMap<String, f64> =
        serde_json::from_str(&content).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(raw.into_iter().map(|(id, v)| (id, coins(v))).collect())
}

/// Produce re-priced items. Returns the items and how many were changed.
pub fn apply_price_overrides(
    items: Vec<Item>,
    overrides: &BTreeMap<String, u32>,
) -> (Vec<Item>, usize) {
    let mut applied = 0;
    let items = items
        .into_iter()
        .map(|item| match overrides.get(&item.id) {
            Some(&value) => {
                applied += 1;
                Item { value, ..item }
            }
            None => item,
        })
        .collect();
    (items, applied)
}

/// Import a data directory into the database, replacing what was there
pub fn import_to_database(
    conn: &Connection,
    data_dir: &Path,
    price_file: Option<&Path>,
) -> Result<ImportStats> {
    let (mut dataset, mut stats) = load_data_dir(data_dir);

    if let Some(price_file) = price_file {
        let overrides = load_price_overrides(price_file)
            .with_context(|| format!("Failed to load price overrides from {}", price_file.display()))?;
        let (items, applied) = apply_price_overrides(dataset.items, &overrides);
        dataset.items = items;
        stats.price_overrides = applied;
    }

    db::clear_dataset(conn)?;
    db::store_dataset(conn, &dataset)?;
    Ok(stats)
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub files: usize,
    pub items: usize,
    pub quests: usize,
    pub projects: usize,
    pub hideout_modules: usize,
    pub price_overrides: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} items, {} quests, {} projects, {} hideout modules from {} files ({} price overrides). Skipped: {}, Errors: {}",
            self.items,
            self.quests,
            self.projects,
            self.hideout_modules,
            self.files,
            self.price_overrides,
            self.skipped,
            self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn requirement_shapes_normalize_to_one_map() {
        let map: RawQuantities = serde_json::from_str(r#"{"gear": 2}"#).unwrap();
        let pairs: RawQuantities =
            serde_json::from_str(r#"[{"itemId": "gear", "quantity": 1}, {"item_id": "gear", "quantity": 1}]"#)
                .unwrap();
        let ids: RawQuantities = serde_json::from_str(r#"["gear", "gear"]"#).unwrap();

        assert_eq!(map.normalize().get("gear"), Some(&2));
        assert_eq!(pairs.normalize().get("gear"), Some(&2));
        assert_eq!(ids.normalize().get("gear"), Some(&2));
    }

    #[test]
    fn repeated_entries_saturate_instead_of_overflowing() {
        let raw = format!(
            r#"[{{"itemId": "gear", "quantity": {max}}}, {{"itemId": "gear", "quantity": 5}}, "gear"]"#,
            max = u32::MAX
        );
        let pairs: RawQuantities = serde_json::from_str(&raw).unwrap();
        assert_eq!(pairs.normalize().get("gear"), Some(&u32::MAX));
    }

    #[test]
    fn duplicate_hideout_levels_are_merged() {
        let raw: RawModule = serde_json::from_str(
            r#"{"id": "stash", "levels": [
                {"level": 2, "requirementItemIds": {"wires": 4}},
                {"level": 1, "requirementItemIds": ["fabric"]},
                {"level": 2, "requirementItemIds": {"wires": 1, "gear": 2}}
            ]}"#,
        )
        .unwrap();
        let module = raw.into_module(Path::new("stash.json")).unwrap();

        let levels: Vec<_> = module.levels.iter().map(|l| l.level).collect();
        assert_eq!(levels, [1, 2]);
        assert_eq!(
            module.levels[1].requirements,
            Quantities::from([("gear".to_string(), 2), ("wires".to_string(), 5)])
        );
        assert_eq!(module.max_level, 2);
    }

    #[test]
    fn localized_names_prefer_english() {
        let raw: RawItem = serde_json::from_str(
            r#"{"id": "gear", "name": {"de": "Zahnrad", "en": "Gear"}, "type": "Material",
                "rarity": "Uncommon", "value": 12.4, "weightKg": 0.2, "recyclesInto": {"metal": 1}}"#,
        )
        .unwrap();
        let item = raw.into_item(Path::new("gear.json")).unwrap();
        assert_eq!(item.name, "Gear");
        assert_eq!(item.value, 12);
        assert_eq!(item.rarity, Some(Rarity::Uncommon));
        assert_eq!(item.recycles_into.get("metal"), Some(&1));
        assert_eq!(item.stack_size, 1);
    }

    #[test]
    fn missing_id_is_reported() {
        let raw: RawQuest = serde_json::from_str(r#"{"name": "Nameless"}"#).unwrap();
        let err = raw.into_quest(Path::new("q.json")).unwrap_err();
        assert!(matches!(err, DataError::MissingId { .. }));
    }

    #[test]
    fn loads_directory_by_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "items/b_gear.json", r#"{"id": "gear", "name": "Gear", "value": 10}"#);
        write(root, "items/a_wires.json", r#"[{"id": "wires", "value": 5}]"#);
        write(
            root,
            "quests.json",
            r#"[{"id": "q1", "name": "First", "requiredItemIds": [{"itemId": "gear", "quantity": 2}]}]"#,
        );
        write(
            root,
            "hideout/workbench.json",
            r#"{"id": "workbench", "name": "Workbench", "levels": [{"level": 3, "requirementItemIds": {"gear": 3}}, {"level": 2}]}"#,
        );
        write(root, "projects/broken.json", "{ not json");
        write(root, "notes/readme.json", "{}");

        let (dataset, stats) = load_data_dir(root);
        let ids: Vec<_> = dataset.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["wires", "gear"]);
        assert_eq!(dataset.quests[0].requirements.get("gear"), Some(&2));
        let module = &dataset.hideout_modules[0];
        assert_eq!(module.max_level, 3);
        assert_eq!(module.levels[0].level, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.files, 4);
    }

    #[test]
    fn price_overrides_replace_values() {
        let items = vec![
            Item {
                id: "gear".to_string(),
                value: 10,
                ..Default::default()
            },
            Item {
                id: "wires".to_string(),
                value: 5,
                ..Default::default()
            },
        ];
        let overrides = BTreeMap::from([("gear".to_string(), 40)]);
        let (items, applied) = apply_price_overrides(items, &overrides);
        assert_eq!(applied, 1);
        assert_eq!(items[0].value, 40);
        assert_eq!(items[1].value, 5);
    }
}
