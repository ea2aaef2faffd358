//! Keep / sell / situational recommendations for a raider game's item catalog.
//!
//! The [`engine::DecisionEngine`] is built once from a [`models::Dataset`] and
//! then classifies items against any [`progress::PlayerProgress`] snapshot.
//! Classification is a fixed priority cascade ([`rules::CASCADE`]) over the
//! catalog's reverse recipe index, the quest/project/hideout resolvers and
//! the value heuristics. Importing, storage and text reports sit around it.

pub mod catalog;
pub mod db;
pub mod engine;
pub mod error;
pub mod evaluators;
pub mod import;
pub mod models;
pub mod progress;
pub mod report;
pub mod resolvers;
pub mod rules;
pub mod sample;
pub mod weapons;

pub use engine::DecisionEngine;
pub use models::{Decision, DecisionCounts, DecisionVerdict, Item};
pub use progress::PlayerProgress;
