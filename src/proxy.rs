use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::selector::{self, Selector};
use crate::traits::BackendResponse;

/// Outbound call made on behalf of a client.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// GET, projecting the JSON reply through `selectors` when any are given.
    Get { selectors: Vec<Selector> },
    Post { body: Value },
}

impl Call {
    pub fn get() -> Self {
        Call::Get { selectors: Vec::new() }
    }

    pub fn select(selectors: Vec<Selector>) -> Self {
        Call::Get { selectors }
    }

    pub fn post(body: Value) -> Self {
        Call::Post { body }
    }
}

/// Worker reply in the shape handed back to clients.
///
/// `body` is `None` only for an unresolvable task, which renders as an empty
/// response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResult {
    pub body: Option<Value>,
    pub status: u16,
}

impl ProxyResult {
    pub fn not_found() -> Self {
        ProxyResult {
            body: None,
            status: 404,
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A failed backend call only keeps its status; the body becomes `{}`.
    fn from_backend(
        response: BackendResponse,
        selectors: &[Selector],
        url: &str,
    ) -> Result<Self, GatewayError> {
        if !response.ok() {
            warn!(%url, status = response.status, "backend call failed");
            return Ok(ProxyResult {
                body: Some(json!({})),
                status: response.status,
            });
        }
        let body = response.body.ok_or_else(|| {
            GatewayError::Backend(format!("{url} answered {} without a JSON body", response.status))
        })?;
        Ok(ProxyResult {
            body: Some(selector::select(body, selectors)?),
            status: response.status,
        })
    }
}

impl Gateway {
    /// Forwards `call` to `<protocol>://<worker><path>` for a worker that
    /// advertises `task_name`.
    ///
    /// An unknown task is not an error: it yields [`ProxyResult::not_found`]
    /// without touching the network.
    pub async fn proxy(&self, task_name: &str, path: &str, call: Call) -> Result<ProxyResult, GatewayError> {
        let worker = match self.backend(task_name).await {
            Ok(worker) => worker,
            Err(GatewayError::NotFound(_)) => {
                debug!(task = task_name, "no worker for task");
                return Ok(ProxyResult::not_found());
            }
            Err(e) => return Err(e),
        };
        let url = self.worker_url(&worker, path);
        debug!(task = task_name, %url, "proxying");

        let response = match &call {
            Call::Get { .. } => self.transport.get(&url).await,
            Call::Post { body } => self.transport.post(&url, body).await,
        }
        .map_err(|e| GatewayError::Backend(format!("{url}: {e:#}")))?;
        let selectors: &[Selector] = match &call {
            Call::Get { selectors } => selectors,
            Call::Post { .. } => &[],
        };
        ProxyResult::from_backend(response, selectors, &url)
    }
}
