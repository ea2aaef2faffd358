//! Decision engine: the catalog plus reference data, queried per progress snapshot

use crate::catalog::Catalog;
use crate::evaluators::recycle_value;
use crate::models::{Dataset, DecisionCounts, DecisionVerdict, HideoutModule, Item, Project, Quest};
use crate::progress::PlayerProgress;
use crate::rules::{run_cascade, Rule, RuleContext, CASCADE};

/// Built once per dataset and immutable afterwards. Progress is passed into
/// every call, so one engine can serve any number of snapshots.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    catalog: Catalog,
    quests: Vec<Quest>,
    projects: Vec<Project>,
    hideout_modules: Vec<HideoutModule>,
}

impl DecisionEngine {
    pub fn new(dataset: Dataset) -> Self {
        let catalog = Catalog::build(dataset.items);
        log::debug!(
            "Catalog built: {} items, {} ingredients, {} quests, {} projects, {} hideout modules",
            catalog.len(),
            catalog.ingredient_count(),
            dataset.quests.len(),
            dataset.projects.len(),
            dataset.hideout_modules.len()
        );

        DecisionEngine {
            catalog,
            quests: dataset.quests,
            projects: dataset.projects,
            hideout_modules: dataset.hideout_modules,
        }
    }

    pub fn classify(&self, item: &Item, progress: &PlayerProgress) -> DecisionVerdict {
        self.explain(item, progress).1
    }

    /// Classify and report which rule decided
    pub fn explain(&self, item: &Item, progress: &PlayerProgress) -> (Rule, DecisionVerdict) {
        let ctx = RuleContext {
            item,
            progress,
            catalog: &self.catalog,
            quests: &self.quests,
            projects: &self.projects,
            hideout_modules: &self.hideout_modules,
        };
        let (rule, mut verdict) = run_cascade(&CASCADE, &ctx);

        // Applies to every verdict, including early keeps
        verdict.recycle_value_exceeds_item = recycle_value(item, &self.catalog).exceeds_item;

        log::trace!("{} -> {} ({})", item.id, verdict.decision, rule);
        (rule, verdict)
    }

    /// Every catalog item with its verdict, in catalog order
    pub fn classify_all(&self, progress: &PlayerProgress) -> Vec<(&Item, DecisionVerdict)> {
        self.catalog
            .iter()
            .map(|item| (item, self.classify(item, progress)))
            .collect()
    }

    pub fn count_by_decision(&self, progress: &PlayerProgress) -> DecisionCounts {
        let mut counts = DecisionCounts::default();
        for item in self.catalog.iter() {
            counts.record(self.classify(item, progress).decision);
        }
        counts
    }

    /// Items whose recipe consumes `item_id`
    pub fn items_using_ingredient(&self, item_id: &str) -> Vec<&Item> {
        self.catalog
            .consumers_of(item_id)
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.catalog.get(id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn hideout_modules(&self) -> &[HideoutModule] {
        &self.hideout_modules
    }
}
