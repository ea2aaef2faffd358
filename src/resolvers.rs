//! Quest, project and hideout usage lookups against a progress snapshot

use crate::models::{HideoutModule, Item, Project, Quest};
use crate::progress::PlayerProgress;

/// Whether an item is still needed, and by what
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub is_used: bool,
    pub names: Vec<String>,
}

impl Usage {
    fn from_names(names: Vec<String>) -> Self {
        Usage {
            is_used: !names.is_empty(),
            names,
        }
    }
}

/// Open quests that require the item or hand it out as a reward.
///
/// Rewards count because some datasets model the turn-in for the next step
/// as a reward of the quest that unlocks it.
pub fn quest_usage(item: &Item, progress: &PlayerProgress, quests: &[Quest]) -> Usage {
    let names = quests
        .iter()
        .filter(|quest| !progress.is_quest_completed(&quest.id))
        .filter(|quest| {
            quest.requirements.contains_key(&item.id) || quest.rewards.contains_key(&item.id)
        })
        .map(|quest| quest.name.clone())
        .collect();

    Usage::from_names(names)
}

/// Open projects that need the item, either in the flat list or in a phase
pub fn project_usage(item: &Item, progress: &PlayerProgress, projects: &[Project]) -> Usage {
    let names = projects
        .iter()
        .filter(|project| !progress.is_project_completed(&project.id))
        .filter(|project| {
            project.requirements.contains_key(&item.id)
                || project
                    .phases
                    .iter()
                    .any(|phase| phase.requirements.contains_key(&item.id))
        })
        .map(|project| project.name.clone())
        .collect();

    Usage::from_names(names)
}

/// Pending hideout upgrades needing the item, one entry per future level.
/// Modules already at max level contribute nothing.
pub fn hideout_usage(item: &Item, progress: &PlayerProgress, modules: &[HideoutModule]) -> Usage {
    let mut names = Vec::new();

    for module in modules {
        let current = progress.hideout_level(module);
        if current >= module.max_level {
            continue;
        }

        for level in &module.levels {
            if level.level > current && level.requirements.contains_key(&item.id) {
                names.push(format!("{} (Level {})", module.name, level.level));
            }
        }
    }

    Usage::from_names(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HideoutLevel, ProjectPhase, Quantities};

    fn qty(pairs: &[(&str, u32)]) -> Quantities {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn gear() -> Item {
        Item {
            id: "gear".to_string(),
            name: "Gear".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn quest_usage_counts_requirements_and_rewards() {
        let quests = vec![
            Quest {
                id: "q1".to_string(),
                name: "Parts Run".to_string(),
                requirements: qty(&[("gear", 3)]),
                rewards: Quantities::new(),
            },
            Quest {
                id: "q2".to_string(),
                name: "Unrelated".to_string(),
                requirements: qty(&[("cloth", 1)]),
                rewards: Quantities::new(),
            },
            Quest {
                id: "q3".to_string(),
                name: "Handover".to_string(),
                requirements: Quantities::new(),
                rewards: qty(&[("gear", 1)]),
            },
        ];
        let mut progress = PlayerProgress::default();

        let usage = quest_usage(&gear(), &progress, &quests);
        assert!(usage.is_used);
        assert_eq!(usage.names, ["Parts Run", "Handover"]);

        progress.complete_quest("q1");
        progress.complete_quest("q3");
        let usage = quest_usage(&gear(), &progress, &quests);
        assert_eq!(usage, Usage::default());
    }

    #[test]
    fn project_recorded_once_across_phases() {
        let projects = vec![Project {
            id: "expedition".to_string(),
            name: "Expedition".to_string(),
            requirements: Quantities::new(),
            phases: vec![
                ProjectPhase {
                    phase: 1,
                    name: None,
                    requirements: qty(&[("gear", 5)]),
                },
                ProjectPhase {
                    phase: 2,
                    name: None,
                    requirements: qty(&[("gear", 10)]),
                },
            ],
        }];
        let mut progress = PlayerProgress::default();

        let usage = project_usage(&gear(), &progress, &projects);
        assert_eq!(usage.names, ["Expedition"]);

        progress.complete_project("expedition");
        assert!(!project_usage(&gear(), &progress, &projects).is_used);
    }

    #[test]
    fn project_legacy_requirements_match() {
        let projects = vec![Project {
            id: "p".to_string(),
            name: "Legacy".to_string(),
            requirements: qty(&[("gear", 1)]),
            phases: Vec::new(),
        }];
        let usage = project_usage(&gear(), &PlayerProgress::default(), &projects);
        assert_eq!(usage.names, ["Legacy"]);
    }

    fn workbench() -> HideoutModule {
        HideoutModule {
            id: "workbench".to_string(),
            name: "Workbench".to_string(),
            min_level: 1,
            max_level: 3,
            levels: vec![
                HideoutLevel {
                    level: 1,
                    requirements: qty(&[("gear", 1)]),
                },
                HideoutLevel {
                    level: 2,
                    requirements: qty(&[("gear", 4)]),
                },
                HideoutLevel {
                    level: 3,
                    requirements: qty(&[("gear", 8)]),
                },
            ],
        }
    }

    #[test]
    fn hideout_lists_every_future_level() {
        let modules = vec![workbench()];
        let usage = hideout_usage(&gear(), &PlayerProgress::default(), &modules);
        assert_eq!(usage.names, ["Workbench (Level 2)", "Workbench (Level 3)"]);
    }

    #[test]
    fn hideout_at_max_level_is_excluded() {
        let mut module = workbench();
        // A level past max still must not count once the module is maxed
        module.levels.push(HideoutLevel {
            level: 4,
            requirements: qty(&[("gear", 1)]),
        });
        let mut progress = PlayerProgress::default();
        progress.set_hideout_level("workbench", 3);

        assert!(!hideout_usage(&gear(), &progress, &[module]).is_used);
    }

    #[test]
    fn unknown_module_levels_are_ignored() {
        let mut progress = PlayerProgress::default();
        progress.set_hideout_level("no_such_module", 9);
        let usage = hideout_usage(&gear(), &progress, &[workbench()]);
        assert_eq!(usage.names.len(), 2);
    }
}
