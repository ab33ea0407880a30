use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::registry::Snapshot;

/// Finished analyses per task name. Entries are whatever the worker lists.
pub type FinishedAnalyses = BTreeMap<String, Vec<Value>>;

impl Gateway {
    pub async fn finished_analyses(&self) -> Result<FinishedAnalyses, GatewayError> {
        let snapshot = self.workers().await?;
        self.finished_analyses_in(&snapshot).await
    }

    /// Asks one worker per known task for its finished results, in catalog
    /// order and one call at a time.
    ///
    /// Every task gets an entry; a worker that answers with a failure status
    /// contributes an empty list.
    pub async fn finished_analyses_in(&self, snapshot: &Snapshot) -> Result<FinishedAnalyses, GatewayError> {
        let catalog = Catalog::from_snapshot(snapshot);
        let mut analyses = FinishedAnalyses::new();
        for task_name in catalog.task_names() {
            let worker = snapshot.backend(task_name)?;
            let url = self.worker_url(worker, &format!("/results/{task_name}"));
            let response = self
                .transport
                .get(&url)
                .await
                .map_err(|e| GatewayError::Backend(format!("{url}: {e:#}")))?;

            let finished = if !response.ok() {
                warn!(%url, status = response.status, "could not list finished results");
                Vec::new()
            } else {
                match response.body {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) => Vec::new(),
                    _ => {
                        return Err(GatewayError::Backend(format!(
                            "{url} did not answer with a list"
                        )));
                    }
                }
            };
            debug!(task = task_name, count = finished.len(), "finished results");
            analyses.insert(task_name.to_string(), finished);
        }
        Ok(analyses)
    }
}
