use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Receipt for a task handed to the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub task_id: String,
    pub state: String,
}

impl Submission {
    pub fn failed(&self) -> bool {
        self.state == "FAILURE"
    }
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Submit `full_name` (`<category>.<name>`) with `kwargs`, optionally
    /// pinned to a named queue.
    async fn send_task(&self, full_name: &str, kwargs: &Value, queue: Option<&str>)
        -> Result<Submission>;
}
