use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::GatewayError;
use crate::registry::Snapshot;

/// Task names grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl Catalog {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut categories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for task in snapshot.workers().flat_map(|(_, tasks)| tasks) {
            categories
                .entry(task.category.clone())
                .or_default()
                .insert(task.name.clone());
        }
        Catalog { categories }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.categories
            .iter()
            .map(|(category, names)| (category.as_str(), names))
    }

    pub fn names(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(category)
    }

    /// Every distinct task name, in name order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
    }

    /// Category of `task_name`.
    ///
    /// A name registered under two categories resolves to the one that sorts
    /// first.
    pub fn role(&self, task_name: &str) -> Result<&str, GatewayError> {
        self.categories
            .iter()
            .find(|(_, names)| names.contains(task_name))
            .map(|(category, _)| category.as_str())
            .ok_or_else(|| GatewayError::NotFound(task_name.to_string()))
    }
}
