//! Database schema and operations for the imported dataset

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{Connection, params};

use crate::models::{
    Dataset, HideoutLevel, HideoutModule, Item, Project, ProjectPhase, Quantities, Quest, Rarity,
};

const RECIPE: &str = "recipe";
const RECYCLE: &str = "recycle";
const SALVAGE: &str = "salvage";
const CRAFT: &str = "craft";
const UPGRADE: &str = "upgrade";
const REQUIREMENT: &str = "requirement";
const REWARD: &str = "reward";

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Catalog items in source order; ids may repeat
        CREATE TABLE IF NOT EXISTS items (
            position INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            item_type TEXT NOT NULL,
            rarity TEXT,
            value INTEGER NOT NULL,
            weight_kg REAL NOT NULL,
            stack_size INTEGER NOT NULL,
            craft_bench TEXT
        );

        -- Recipe, recycle, salvage, craft and upgrade mappings
        CREATE TABLE IF NOT EXISTS item_quantities (
            item_position INTEGER NOT NULL,
            relation TEXT NOT NULL,
            target_id TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            PRIMARY KEY (item_position, relation, target_id)
        );

        CREATE TABLE IF NOT EXISTS quests (
            position INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS quest_items (
            quest_position INTEGER NOT NULL,
            relation TEXT NOT NULL,
            item_id TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            PRIMARY KEY (quest_position, relation, item_id)
        );

        CREATE TABLE IF NOT EXISTS projects (
            position INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS project_phases (
            project_position INTEGER NOT NULL,
            ordinal INTEGER NOT NULL,
            phase INTEGER NOT NULL,
            name TEXT,
            PRIMARY KEY (project_position, ordinal)
        );

        -- phase_ordinal NULL = flat (legacy) requirement list
        CREATE TABLE IF NOT EXISTS project_items (
            project_position INTEGER NOT NULL,
            phase_ordinal INTEGER,
            item_id TEXT NOT NULL,
            quantity INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS hideout_modules (
            position INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            min_level INTEGER NOT NULL,
            max_level INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS hideout_levels (
            module_position INTEGER NOT NULL,
            ordinal INTEGER NOT NULL,
            level INTEGER NOT NULL,
            PRIMARY KEY (module_position, ordinal)
        );

        CREATE TABLE IF NOT EXISTS hideout_requirements (
            module_position INTEGER NOT NULL,
            level_ordinal INTEGER NOT NULL,
            item_id TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            PRIMARY KEY (module_position, level_ordinal, item_id)
        );

        CREATE INDEX IF NOT EXISTS idx_item_quantities_item ON item_quantities(item_position);
        CREATE INDEX IF NOT EXISTS idx_quest_items_quest ON quest_items(quest_position);
        CREATE INDEX IF NOT EXISTS idx_project_items_project ON project_items(project_position);
        CREATE INDEX IF NOT EXISTS idx_hideout_requirements_module ON hideout_requirements(module_position);
        "#,
    )?;
    Ok(())
}

/// Clear all imported data (for re-import)
pub fn clear_dataset(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM hideout_requirements;
        DELETE FROM hideout_levels;
        DELETE FROM hideout_modules;
        DELETE FROM project_items;
        DELETE FROM project_phases;
        DELETE FROM projects;
        DELETE FROM quest_items;
        DELETE FROM quests;
        DELETE FROM item_quantities;
        DELETE FROM items;
        "#,
    )?;
    Ok(())
}

/// Append a dataset in one transaction
pub fn store_dataset(conn: &Connection, dataset: &Dataset) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for item in &dataset.items {
        insert_item(&tx, item)?;
    }
    for quest in &dataset.quests {
        insert_quest(&tx, quest)?;
    }
    for project in &dataset.projects {
        insert_project(&tx, project)?;
    }
    for module in &dataset.hideout_modules {
        insert_hideout_module(&tx, module)?;
    }
    tx.commit()?;
    Ok(())
}

/// Insert an item with all its quantity mappings
pub fn insert_item(conn: &Connection, item: &Item) -> Result<()> {
    conn.execute(
        "INSERT INTO items (id, name, item_type, rarity, value, weight_kg, stack_size, craft_bench)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.id,
            item.name,
            item.item_type,
            item.rarity.map(Rarity::as_str),
            item.value,
            item.weight_kg,
            item.stack_size,
            item.craft_bench,
        ],
    )?;
    let position = conn.last_insert_rowid();

    for (relation, quantities) in [
        (RECIPE, &item.recipe),
        (RECYCLE, &item.recycles_into),
        (SALVAGE, &item.salvages_into),
        (CRAFT, &item.crafts_into),
        (UPGRADE, &item.upgrade_cost),
    ] {
        for (target_id, quantity) in quantities {
            conn.execute(
                "INSERT INTO item_quantities (item_position, relation, target_id, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                params![position, relation, target_id, quantity],
            )?;
        }
    }
    Ok(())
}

/// Insert a quest with its requirement and reward lists
pub fn insert_quest(conn: &Connection, quest: &Quest) -> Result<()> {
    conn.execute(
        "INSERT INTO quests (id, name) VALUES (?1, ?2)",
        params![quest.id, quest.name],
    )?;
    let position = conn.last_insert_rowid();

    for (relation, quantities) in [(REQUIREMENT, &quest.requirements), (REWARD, &quest.rewards)] {
        for (item_id, quantity) in quantities {
            conn.execute(
                "INSERT INTO quest_items (quest_position, relation, item_id, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                params![position, relation, item_id, quantity],
            )?;
        }
    }
    Ok(())
}

/// Insert a project with its flat list and phases
pub fn insert_project(conn: &Connection, project: &Project) -> Result<()> {
    conn.execute(
        "INSERT INTO projects (id, name) VALUES (?1, ?2)",
        params![project.id, project.name],
    )?;
    let position = conn.last_insert_rowid();

    let insert_items = |ordinal: Option<i64>, quantities: &Quantities| -> Result<()> {
        for (item_id, quantity) in quantities {
            conn.execute(
                "INSERT INTO project_items (project_position, phase_ordinal, item_id, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                params![position, ordinal, item_id, quantity],
            )?;
        }
        Ok(())
    };

    insert_items(None, &project.requirements)?;
    for (ordinal, phase) in project.phases.iter().enumerate() {
        let ordinal = ordinal as i64;
        conn.execute(
            "INSERT INTO project_phases (project_position, ordinal, phase, name)
             VALUES (?1, ?2, ?3, ?4)",
            params![position, ordinal, phase.phase, phase.name],
        )?;
        insert_items(Some(ordinal), &phase.requirements)?;
    }
    Ok(())
}

/// Insert a hideout module with its levels
pub fn insert_hideout_module(conn: &Connection, module: &HideoutModule) -> Result<()> {
    conn.execute(
        "INSERT INTO hideout_modules (id, name, min_level, max_level) VALUES (?1, ?2, ?3, ?4)",
        params![module.id, module.name, module.min_level, module.max_level],
    )?;
    let position = conn.last_insert_rowid();

    for (ordinal, level) in module.levels.iter().enumerate() {
        let ordinal = ordinal as i64;
        conn.execute(
            "INSERT INTO hideout_levels (module_position, ordinal, level) VALUES (?1, ?2, ?3)",
            params![position, ordinal, level.level],
        )?;
        for (item_id, quantity) in &level.requirements {
            conn.execute(
                "INSERT INTO hideout_requirements (module_position, level_ordinal, item_id, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                params![position, ordinal, item_id, quantity],
            )?;
        }
    }
    Ok(())
}

/// Load the whole dataset in insertion order
pub fn load_dataset(conn: &Connection) -> Result<Dataset> {
    Ok(Dataset {
        items: load_items(conn)?,
        quests: load_quests(conn)?,
        projects: load_projects(conn)?,
        hideout_modules: load_hideout_modules(conn)?,
    })
}

/// Read `(owner, key, item, quantity)` rows into per-owner, per-key maps
fn load_grouped<K>(
    conn: &Connection,
    sql: &str,
    key: impl Fn(&rusqlite::Row<'_>) -> rusqlite::Result<K>,
) -> Result<HashMap<(i64, K), Quantities>>
where
    K: std::hash::Hash + Eq,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            key(row)?,
            row.get::<_, String>(2)?,
            row.get::<_, u32>(3)?,
        ))
    })?;

    let mut grouped: HashMap<(i64, K), Quantities> = HashMap::new();
    for row in rows {
        let (owner, k, item_id, quantity) = row?;
        grouped.entry((owner, k)).or_default().insert(item_id, quantity);
    }
    Ok(grouped)
}

fn load_items(conn: &Connection) -> Result<Vec<Item>> {
    let mut quantities = load_grouped(
        conn,
        "SELECT item_position, relation, target_id, quantity FROM item_quantities",
        |row| row.get::<_, String>(1),
    )?;
    let mut take = |position: i64, relation: &str| {
        quantities
            .remove(&(position, relation.to_string()))
            .unwrap_or_default()
    };

    let mut stmt = conn.prepare(
        "SELECT position, id, name, item_type, rarity, value, weight_kg, stack_size, craft_bench
         FROM items ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            Item {
                id: row.get(1)?,
                name: row.get(2)?,
                item_type: row.get(3)?,
                rarity: row
                    .get::<_, Option<String>>(4)?
                    .as_deref()
                    .and_then(Rarity::parse),
                value: row.get(5)?,
                weight_kg: row.get(6)?,
                stack_size: row.get(7)?,
                craft_bench: row.get(8)?,
                ..Default::default()
            },
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (position, mut item) = row?;
        item.recipe = take(position, RECIPE);
        item.recycles_into = take(position, RECYCLE);
        item.salvages_into = take(position, SALVAGE);
        item.crafts_into = take(position, CRAFT);
        item.upgrade_cost = take(position, UPGRADE);
        results.push(item);
    }
    Ok(results)
}

fn load_quests(conn: &Connection) -> Result<Vec<Quest>> {
    let mut lists = load_grouped(
        conn,
        "SELECT quest_position, relation, item_id, quantity FROM quest_items",
        |row| row.get::<_, String>(1),
    )?;

    let mut stmt = conn.prepare("SELECT position, id, name FROM quests ORDER BY position")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (position, id, name) = row?;
        results.push(Quest {
            id,
            name,
            requirements: lists
                .remove(&(position, REQUIREMENT.to_string()))
                .unwrap_or_default(),
            rewards: lists.remove(&(position, REWARD.to_string())).unwrap_or_default(),
        });
    }
    Ok(results)
}

fn load_projects(conn: &Connection) -> Result<Vec<Project>> {
    let mut lists = load_grouped(
        conn,
        "SELECT project_position, phase_ordinal, item_id, quantity FROM project_items",
        |row| row.get::<_, Option<i64>>(1),
    )?;

    let mut phases: HashMap<i64, Vec<(i64, u32, Option<String>)>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT project_position, ordinal, phase, name FROM project_phases
             ORDER BY project_position, ordinal",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;
        for row in rows {
            let (project, ordinal, phase, name) = row?;
            phases.entry(project).or_default().push((ordinal, phase, name));
        }
    }

    let mut stmt = conn.prepare("SELECT position, id, name FROM projects ORDER BY position")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (position, id, name) = row?;
        let project_phases = phases
            .remove(&position)
            .unwrap_or_default()
            .into_iter()
            .map(|(ordinal, phase, name)| ProjectPhase {
                phase,
                name,
                requirements: lists.remove(&(position, Some(ordinal))).unwrap_or_default(),
            })
            .collect();

        results.push(Project {
            id,
            name,
            requirements: lists.remove(&(position, None)).unwrap_or_default(),
            phases: project_phases,
        });
    }
    Ok(results)
}

fn load_hideout_modules(conn: &Connection) -> Result<Vec<HideoutModule>> {
    let mut requirements = load_grouped(
        conn,
        "SELECT module_position, level_ordinal, item_id, quantity FROM hideout_requirements",
        |row| row.get::<_, i64>(1),
    )?;

    let mut levels: HashMap<i64, Vec<(i64, u32)>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT module_position, ordinal, level FROM hideout_levels
             ORDER BY module_position, ordinal",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, u32>(2)?))
        })?;
        for row in rows {
            let (module, ordinal, level) = row?;
            levels.entry(module).or_default().push((ordinal, level));
        }
    }

    let mut stmt = conn.prepare(
        "SELECT position, id, name, min_level, max_level FROM hideout_modules ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            HideoutModule {
                id: row.get(1)?,
                name: row.get(2)?,
                min_level: row.get(3)?,
                max_level: row.get(4)?,
                levels: Vec::new(),
            },
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (position, mut module) = row?;
        module.levels = levels
            .remove(&position)
            .unwrap_or_default()
            .into_iter()
            .map(|(ordinal, level)| HideoutLevel {
                level,
                requirements: requirements.remove(&(position, ordinal)).unwrap_or_default(),
            })
            .collect();
        results.push(module);
    }
    Ok(results)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DatasetCounts {
    pub items: usize,
    pub quests: usize,
    pub projects: usize,
    pub hideout_modules: usize,
}

/// Row counts of the top-level tables
pub fn dataset_counts(conn: &Connection) -> Result<DatasetCounts> {
    let count = |table: &str| -> Result<usize> {
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n as usize)
    };
    Ok(DatasetCounts {
        items: count("items")?,
        quests: count("quests")?,
        projects: count("projects")?,
        hideout_modules: count("hideout_modules")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_dataset;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn stored_dataset_loads_back_unchanged() {
        let conn = open();
        let dataset = sample_dataset();
        store_dataset(&conn, &dataset).unwrap();

        let loaded = load_dataset(&conn).unwrap();
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn duplicate_item_ids_survive_storage() {
        let conn = open();
        let item = |value| Item {
            id: "gear".to_string(),
            name: "Gear".to_string(),
            value,
            stack_size: 1,
            ..Default::default()
        };
        let dataset = Dataset {
            items: vec![item(1), item(2)],
            ..Default::default()
        };
        store_dataset(&conn, &dataset).unwrap();

        let loaded = load_dataset(&conn).unwrap();
        let values: Vec<_> = loaded.items.iter().map(|i| i.value).collect();
        assert_eq!(values, [1, 2]);
    }

    #[test]
    fn repeated_hideout_levels_survive_storage() {
        let conn = open();
        let level = |n: u32, item_id: &str| HideoutLevel {
            level: n,
            requirements: Quantities::from([(item_id.to_string(), n)]),
        };
        let dataset = Dataset {
            hideout_modules: vec![HideoutModule {
                id: "stash".to_string(),
                name: "Stash".to_string(),
                min_level: 1,
                max_level: 2,
                levels: vec![level(2, "wires"), level(2, "fabric"), level(1, "gear")],
            }],
            ..Default::default()
        };
        store_dataset(&conn, &dataset).unwrap();

        let loaded = load_dataset(&conn).unwrap();
        assert_eq!(loaded.hideout_modules[0].levels.len(), 3);
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn clear_empties_every_table() {
        let conn = open();
        store_dataset(&conn, &sample_dataset()).unwrap();
        assert!(dataset_counts(&conn).unwrap().items > 0);

        clear_dataset(&conn).unwrap();
        assert_eq!(dataset_counts(&conn).unwrap(), DatasetCounts::default());
    }
}
