use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay::clients::{Flower, HttpTransport};
use relay::config::Config;
use relay::routes;
use relay::Gateway;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relay=info")),
        )
        .init();

    let config = Config::from_env().context("reading configuration")?;
    let client = Client::new();
    let flower = Arc::new(Flower::new(config.control_plane_url.clone(), client.clone()));
    let gateway = Gateway::new(
        flower.clone(),
        Arc::new(HttpTransport::new(client)),
        flower,
    )
    .with_protocol(config.worker_protocol.clone())
    .with_task_queue_routing(config.route_to_task_queue);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(bind = %config.bind, control_plane = %config.control_plane_url, "relay listening");
    axum::serve(listener, routes::router(Arc::new(gateway)))
        .await
        .context("serving")?;
    Ok(())
}
