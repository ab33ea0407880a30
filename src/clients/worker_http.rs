use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use crate::traits::{BackendResponse, WorkerTransport};

/// Plain reqwest transport to worker HTTP endpoints.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        HttpTransport { client }
    }
}

#[async_trait]
impl WorkerTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<BackendResponse> {
        let response = self.client.get(url).send().await?;
        read(response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<BackendResponse> {
        let response = self.client.post(url).json(body).send().await?;
        read(response).await
    }
}

async fn read(response: Response) -> Result<BackendResponse> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;
    Ok(BackendResponse {
        status,
        body: serde_json::from_slice(&bytes).ok(),
    })
}
