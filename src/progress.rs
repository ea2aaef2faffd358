//! Player progress snapshot and its JSON load boundary

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DataError;
use crate::models::HideoutModule;

/// Quest/project completion and hideout levels. Owned by the caller; the
/// engine only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProgress {
    #[serde(deserialize_with = "string_set")]
    pub completed_quests: BTreeSet<String>,
    #[serde(deserialize_with = "string_set")]
    pub completed_projects: BTreeSet<String>,
    #[serde(deserialize_with = "integer_levels")]
    pub hideout_levels: BTreeMap<String, i64>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

fn string_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(id) => Some(id),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    };
    Ok(ids)
}

/// Accepts an RFC 3339 string or epoch milliseconds; anything else is unset.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let stamp = match Value::deserialize(deserializer)? {
        Value::String(text) => DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    Ok(stamp)
}

/// Keeps only entries whose level is an integer; the rest fall back to the
/// module minimum at lookup time.
fn integer_levels<'de, D>(deserializer: D) -> Result<BTreeMap<String, i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => return Ok(BTreeMap::new()),
    };
    Ok(raw
        .into_iter()
        .filter_map(|(module, level)| match level.as_i64() {
            Some(level) => Some((module, level)),
            None => {
                log::debug!("Ignoring non-integer hideout level for {}: {}", module, level);
                None
            }
        })
        .collect())
}

impl PlayerProgress {
    /// Read a snapshot from disk. A missing file is a fresh start, and
    /// missing fields fall back to empty collections.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| DataError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No progress file at {}, starting fresh", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(DataError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DataError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_quest_completed(&self, quest_id: &str) -> bool {
        self.completed_quests.contains(quest_id)
    }

    pub fn is_project_completed(&self, project_id: &str) -> bool {
        self.completed_projects.contains(project_id)
    }

    /// Current level of a module. Unrecorded or negative levels resolve to
    /// the module's minimum.
    pub fn hideout_level(&self, module: &HideoutModule) -> u32 {
        match self.hideout_levels.get(&module.id) {
            Some(&level) if level >= 0 => u32::try_from(level).unwrap_or(u32::MAX),
            _ => module.min_level,
        }
    }

    pub fn complete_quest(&mut self, quest_id: &str) -> bool {
        let changed = self.completed_quests.insert(quest_id.to_string());
        self.touch(changed)
    }

    pub fn reopen_quest(&mut self, quest_id: &str) -> bool {
        let changed = self.completed_quests.remove(quest_id);
        self.touch(changed)
    }

    pub fn complete_project(&mut self, project_id: &str) -> bool {
        let changed = self.completed_projects.insert(project_id.to_string());
        self.touch(changed)
    }

    pub fn reopen_project(&mut self, project_id: &str) -> bool {
        let changed = self.completed_projects.remove(project_id);
        self.touch(changed)
    }

    pub fn set_hideout_level(&mut self, module_id: &str, level: i64) -> bool {
        let previous = self.hideout_levels.insert(module_id.to_string(), level);
        self.touch(previous != Some(level))
    }

    fn touch(&mut self, changed: bool) -> bool {
        if changed {
            self.last_updated = Some(Utc::now());
        }
        changed
    }
}
