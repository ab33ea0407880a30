use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// What a worker answered: its status code and the body, if the body was JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl BackendResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait WorkerTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<BackendResponse>;

    async fn post(&self, url: &str, body: &Value) -> Result<BackendResponse>;
}
