//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::Value;

use crate::gateway::Gateway;
use crate::traits::{BackendResponse, ControlPlane, Submission, TaskQueue, WorkerTransport};

pub fn sample_registry() -> HashMap<String, Vec<String>> {
    HashMap::from([
        ("divik-worker@blah".to_string(), vec!["analysis.divik".to_string()]),
        ("gmm-worker@blah".to_string(), vec!["modelling.gmm".to_string()]),
        (
            "multitask-worker@blah".to_string(),
            vec!["analysis.gasvm".to_string(), "modelling.gmm".to_string()],
        ),
    ])
}

pub struct FakeControlPlane {
    registered: Option<HashMap<String, Vec<String>>>,
    queries: AtomicUsize,
}

impl FakeControlPlane {
    pub fn new<I, K, V>(registered: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let registered = registered
            .into_iter()
            .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
            .collect();
        FakeControlPlane {
            registered: Some(registered),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        FakeControlPlane {
            registered: None,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn registered(&self) -> Result<HashMap<String, Vec<String>>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.registered
            .clone()
            .ok_or_else(|| anyhow!("connection refused"))
    }
}

/// Answers only the URLs it has been primed with; anything else fails the
/// way an unreachable host would.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, BackendResponse>>,
    requests: Mutex<Vec<(String, Option<Value>)>>,
}

impl FakeTransport {
    pub fn respond(&self, url: &str, status: u16, body: Value) {
        self.respond_raw(url, status, Some(body));
    }

    pub fn respond_raw(&self, url: &str, status: u16, body: Option<Value>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), BackendResponse { status, body });
    }

    pub fn requests(&self) -> Vec<(String, Option<Value>)> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, url: &str, body: Option<&Value>) -> Result<BackendResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.cloned()));
        match self.responses.lock().unwrap().get(url) {
            Some(response) => Ok(response.clone()),
            None => bail!("error sending request for url ({url})"),
        }
    }
}

#[async_trait]
impl WorkerTransport for FakeTransport {
    async fn get(&self, url: &str) -> Result<BackendResponse> {
        self.answer(url, None)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<BackendResponse> {
        self.answer(url, Some(body))
    }
}

pub struct FakeTaskQueue {
    available: bool,
    sent: Mutex<Vec<(String, Value, Option<String>)>>,
}

impl FakeTaskQueue {
    pub fn new() -> Self {
        FakeTaskQueue {
            available: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        FakeTaskQueue {
            available: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, Value, Option<String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskQueue for FakeTaskQueue {
    async fn send_task(&self, full_name: &str, kwargs: &Value, queue: Option<&str>) -> Result<Submission> {
        if !self.available {
            bail!("broker unreachable");
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((full_name.to_string(), kwargs.clone(), queue.map(str::to_string)));
        Ok(Submission {
            task_id: format!("task-{}", sent.len()),
            state: "PENDING".to_string(),
        })
    }
}

pub struct Fakes {
    pub control_plane: Arc<FakeControlPlane>,
    pub transport: Arc<FakeTransport>,
    pub task_queue: Arc<FakeTaskQueue>,
}

fn assemble(control_plane: FakeControlPlane, task_queue: FakeTaskQueue) -> (Gateway, Fakes) {
    let fakes = Fakes {
        control_plane: Arc::new(control_plane),
        transport: Arc::new(FakeTransport::default()),
        task_queue: Arc::new(task_queue),
    };
    let gateway = Gateway::new(
        fakes.control_plane.clone(),
        fakes.transport.clone(),
        fakes.task_queue.clone(),
    );
    (gateway, fakes)
}

/// Gateway over [`sample_registry`].
pub fn gateway() -> (Gateway, Fakes) {
    assemble(FakeControlPlane::new(sample_registry()), FakeTaskQueue::new())
}

pub fn gateway_on(control_plane: FakeControlPlane) -> (Gateway, Fakes) {
    assemble(control_plane, FakeTaskQueue::new())
}

pub fn gateway_with(task_queue: FakeTaskQueue) -> (Gateway, Fakes) {
    assemble(FakeControlPlane::new(sample_registry()), task_queue)
}
