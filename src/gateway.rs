use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::GatewayError;
use crate::registry::{self, Snapshot, Task, WorkerId};
use crate::traits::{ControlPlane, Submission, TaskQueue, WorkerTransport};

/// Routes requests for a task name to a worker that advertises it.
///
/// Holds no discovery state: every operation starts from a fresh snapshot of
/// the control plane, or from one the caller supplies.
pub struct Gateway {
    control_plane: Arc<dyn ControlPlane>,
    pub(crate) transport: Arc<dyn WorkerTransport>,
    task_queue: Arc<dyn TaskQueue>,
    protocol: String,
    route_to_task_queue: bool,
}

impl Gateway {
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        transport: Arc<dyn WorkerTransport>,
        task_queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Gateway {
            control_plane,
            transport,
            task_queue,
            protocol: "http".to_string(),
            route_to_task_queue: false,
        }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Submit each task to a queue named after it instead of the default queue.
    pub fn with_task_queue_routing(mut self, enabled: bool) -> Self {
        self.route_to_task_queue = enabled;
        self
    }

    pub async fn workers(&self) -> Result<Snapshot, GatewayError> {
        registry::workers(self.control_plane.as_ref()).await
    }

    pub async fn tasks(&self) -> Result<Catalog, GatewayError> {
        Ok(Catalog::from_snapshot(&self.workers().await?))
    }

    pub async fn role(&self, task_name: &str) -> Result<String, GatewayError> {
        self.tasks().await?.role(task_name).map(str::to_string)
    }

    pub async fn backend(&self, task_name: &str) -> Result<WorkerId, GatewayError> {
        self.workers().await?.backend(task_name).cloned()
    }

    pub(crate) fn worker_url(&self, worker: &WorkerId, path: &str) -> String {
        format!("{}://{}{}", self.protocol, worker, path)
    }

    /// Hands `task_name` to the task queue under its full `<category>.<name>`.
    pub async fn schedule(&self, task_name: &str, kwargs: &Value) -> Result<Submission, GatewayError> {
        let catalog = self.tasks().await?;
        let task = Task {
            category: catalog.role(task_name)?.to_string(),
            name: task_name.to_string(),
        };
        let full_name = task.full_name();
        let queue = self.route_to_task_queue.then_some(task_name);
        debug!(task = %full_name, queue = ?queue, "submitting task");

        let submission = self
            .task_queue
            .send_task(&full_name, kwargs, queue)
            .await
            .map_err(|e| GatewayError::Scheduler(format!("{e:#}")))?;
        info!(task = %full_name, id = %submission.task_id, state = %submission.state, "task submitted");
        Ok(submission)
    }
}
