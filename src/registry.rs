use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::GatewayError;
use crate::traits::ControlPlane;

/// Routable base address of a worker, e.g. `divik-worker`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WorkerId(String);

impl WorkerId {
    /// Strips the `@<host>` qualifier the control plane appends.
    pub fn from_identity(identity: &str) -> Self {
        let id = identity.split_once('@').map_or(identity, |(id, _)| id);
        WorkerId(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Task {
    pub category: String,
    pub name: String,
}

impl Task {
    /// Splits `<category>.<name>` on the first dot.
    pub fn parse(identifier: &str) -> Result<Self, GatewayError> {
        match identifier.split_once('.') {
            Some((category, name)) if !category.is_empty() && !name.is_empty() => Ok(Task {
                category: category.to_string(),
                name: name.to_string(),
            }),
            _ => Err(GatewayError::MalformedTask(identifier.to_string())),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.category, self.name)
    }
}

/// Workers and their tasks as reported by one control-plane query.
///
/// Keyed by `WorkerId` in sorted order, so any first-match lookup over a
/// snapshot is reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    workers: BTreeMap<WorkerId, Vec<Task>>,
}

impl Snapshot {
    pub fn from_registered<I, S>(registered: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: AsRef<str>,
    {
        let mut workers: BTreeMap<WorkerId, Vec<Task>> = BTreeMap::new();
        for (identity, identifiers) in registered {
            let tasks = identifiers
                .iter()
                .map(|identifier| Task::parse(identifier))
                .collect::<Result<Vec<_>, _>>()?;
            // Hosts sharing a node name (`celery@a`, `celery@b`) pool their tasks.
            workers
                .entry(WorkerId::from_identity(identity.as_ref()))
                .or_default()
                .extend(tasks);
        }
        for tasks in workers.values_mut() {
            tasks.sort();
            tasks.dedup();
        }
        Ok(Snapshot { workers })
    }

    pub fn workers(&self) -> impl Iterator<Item = (&WorkerId, &[Task])> {
        self.workers.iter().map(|(id, tasks)| (id, tasks.as_slice()))
    }

    pub fn tasks_of(&self, worker: &WorkerId) -> Option<&[Task]> {
        self.workers.get(worker).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// First worker, in `WorkerId` order, that advertises `task_name`.
    pub fn backend(&self, task_name: &str) -> Result<&WorkerId, GatewayError> {
        self.workers
            .iter()
            .find(|(_, tasks)| tasks.iter().any(|task| task.name == task_name))
            .map(|(id, _)| id)
            .ok_or_else(|| GatewayError::NotFound(task_name.to_string()))
    }
}

/// Queries the control plane for a fresh snapshot.
pub async fn workers(control_plane: &dyn ControlPlane) -> Result<Snapshot, GatewayError> {
    let registered = control_plane
        .registered()
        .await
        .map_err(|e| GatewayError::ControlPlane(format!("{e:#}")))?;
    let snapshot = Snapshot::from_registered(registered)?;
    debug!(workers = snapshot.len(), "discovered workers");
    Ok(snapshot)
}
