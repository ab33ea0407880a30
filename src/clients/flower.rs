//! Client for the Flower monitor of the task-queue cluster.
//!
//! Flower answers both questions the gateway asks of the cluster: which
//! workers are alive with which tasks, and "please run this task".

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traits::{ControlPlane, Submission, TaskQueue};

pub struct Flower {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct WorkerInfo {
    #[serde(default)]
    registered: Vec<String>,
}

#[derive(Serialize)]
struct SendTask<'a> {
    kwargs: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue: Option<&'a str>,
}

#[derive(Deserialize)]
struct SendTaskReply {
    #[serde(rename = "task-id")]
    task_id: String,
    #[serde(default)]
    state: Option<String>,
}

impl Flower {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Flower {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn workers_url(&self) -> String {
        format!("{}/api/workers?refresh=true", self.base_url)
    }

    fn send_task_url(&self, full_name: &str) -> String {
        format!("{}/api/task/send-task/{}", self.base_url, full_name)
    }
}

#[async_trait]
impl ControlPlane for Flower {
    async fn registered(&self) -> Result<HashMap<String, Vec<String>>> {
        let url = self.workers_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("querying {url}"))?;
        if !response.status().is_success() {
            bail!("{url} answered {}", response.status());
        }
        let workers: HashMap<String, WorkerInfo> = response
            .json()
            .await
            .with_context(|| format!("decoding worker list from {url}"))?;
        Ok(workers
            .into_iter()
            .map(|(identity, info)| (identity, info.registered))
            .collect())
    }
}

#[async_trait]
impl TaskQueue for Flower {
    async fn send_task(&self, full_name: &str, kwargs: &Value, queue: Option<&str>) -> Result<Submission> {
        let url = self.send_task_url(full_name);
        let response = self
            .client
            .post(&url)
            .json(&SendTask { kwargs, queue })
            .send()
            .await
            .with_context(|| format!("submitting {full_name}"))?;
        if !response.status().is_success() {
            bail!("{url} answered {}", response.status());
        }
        let reply: SendTaskReply = response
            .json()
            .await
            .with_context(|| format!("decoding submission of {full_name}"))?;
        Ok(Submission {
            task_id: reply.task_id,
            state: reply.state.unwrap_or_else(|| "PENDING".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_endpoint_urls() {
        let flower = Flower::new("http://flower:5555/", Client::new());
        assert_eq!(flower.workers_url(), "http://flower:5555/api/workers?refresh=true");
        assert_eq!(
            flower.send_task_url("analysis.divik"),
            "http://flower:5555/api/task/send-task/analysis.divik"
        );
    }

    #[test]
    fn reads_registered_tasks_and_tolerates_missing_field() {
        let raw = json!({
            "divik-worker@host": {"registered": ["analysis.divik"], "stats": {}},
            "idle-worker@host": {"stats": {}}
        });
        let workers: HashMap<String, WorkerInfo> = serde_json::from_value(raw).unwrap();
        assert_eq!(workers["divik-worker@host"].registered, vec!["analysis.divik"]);
        assert!(workers["idle-worker@host"].registered.is_empty());
    }

    #[test]
    fn send_task_body_omits_queue_when_unrouted() {
        let kwargs = json!({"max_k": 5});
        let body = serde_json::to_value(SendTask { kwargs: &kwargs, queue: None }).unwrap();
        assert_eq!(body, json!({"kwargs": {"max_k": 5}}));
        let body = serde_json::to_value(SendTask { kwargs: &kwargs, queue: Some("divik") }).unwrap();
        assert_eq!(body, json!({"kwargs": {"max_k": 5}, "queue": "divik"}));
    }

    #[test]
    fn reply_without_state_is_pending() {
        let reply: SendTaskReply = serde_json::from_value(json!({"task-id": "abc"})).unwrap();
        assert_eq!(reply.task_id, "abc");
        assert_eq!(reply.state, None);
    }
}
