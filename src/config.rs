use std::net::SocketAddr;

use anyhow::{Context, Result, bail};

const DEFAULT_BIND: &str = "0.0.0.0:5000";
const DEFAULT_CONTROL_PLANE_URL: &str = "http://flower:5555";
const DEFAULT_WORKER_PROTOCOL: &str = "http";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    pub control_plane_url: String,
    pub worker_protocol: String,
    pub route_to_task_queue: bool,
}

impl Config {
    /// Reads `RELAY_*` variables from the process environment.
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("RELAY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind
            .parse()
            .with_context(|| format!("RELAY_BIND is not a socket address: {bind}"))?;
        let route_to_task_queue = match lookup("RELAY_ROUTE_TO_TASK_QUEUE") {
            None => false,
            Some(flag) => parse_flag(&flag).context("RELAY_ROUTE_TO_TASK_QUEUE")?,
        };
        Ok(Config {
            bind,
            control_plane_url: lookup("RELAY_CONTROL_PLANE_URL")
                .unwrap_or_else(|| DEFAULT_CONTROL_PLANE_URL.to_string()),
            worker_protocol: lookup("RELAY_WORKER_PROTOCOL")
                .unwrap_or_else(|| DEFAULT_WORKER_PROTOCOL.to_string()),
            route_to_task_queue,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got `{other}`"),
    }
}
