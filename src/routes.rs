use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get, post};
use axum::Json;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::proxy::{Call, ProxyResult};
use crate::selector::Selector;

/// Read-only worker document served under the same path on the gateway.
pub struct MetadataEndpoint {
    pub route: &'static str,
    pub worker_prefix: &'static str,
}

inventory::collect!(MetadataEndpoint);

inventory::submit! {
    MetadataEndpoint { route: "/schema/inputs/{task}", worker_prefix: "/schema/inputs/" }
}
inventory::submit! {
    MetadataEndpoint { route: "/schema/outputs/{task}", worker_prefix: "/schema/outputs/" }
}
inventory::submit! {
    MetadataEndpoint { route: "/layout/inputs/{task}", worker_prefix: "/layout/inputs/" }
}
inventory::submit! {
    MetadataEndpoint { route: "/layout/outputs/{task}", worker_prefix: "/layout/outputs/" }
}

type Shared = Arc<Gateway>;

pub fn router(gateway: Shared) -> Router {
    let mut router = Router::new();
    router = route(router, "/algorithms", get(algorithms));
    for endpoint in inventory::iter::<MetadataEndpoint> {
        let prefix = endpoint.worker_prefix;
        router = route(
            router,
            endpoint.route,
            get(move |State(gateway): State<Shared>, Path(task): Path<String>| async move {
                gateway
                    .proxy(&task, &format!("{prefix}{task}"), Call::get())
                    .await
                    .map_err(ApiError::from)
            }),
        );
    }
    router = route(router, "/schema/outputs/{task}/{aspect}", get(aspect_query_format));
    router = route(router, "/results", get(finished_analyses));
    router = route(router, "/results/{task}/{id}/{aspect}", post(result));
    router = route(router, "/schedule/{task}", post(schedule));
    router.layer(CorsLayer::permissive()).with_state(gateway)
}

/// Mounts `handler` on `path` with and without a trailing slash.
fn route(router: Router<Shared>, path: &str, handler: MethodRouter<Shared>) -> Router<Shared> {
    router
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}

async fn algorithms(State(gateway): State<Shared>) -> Result<Response, ApiError> {
    Ok(Json(gateway.tasks().await?).into_response())
}

async fn aspect_query_format(
    State(gateway): State<Shared>,
    Path((task, aspect)): Path<(String, String)>,
) -> Result<ProxyResult, ApiError> {
    let call = Call::select(vec![
        Selector::field_equals("aspect", aspect),
        Selector::project("query_format"),
    ]);
    Ok(gateway
        .proxy(&task, &format!("/schema/outputs/{task}"), call)
        .await?)
}

async fn finished_analyses(State(gateway): State<Shared>) -> Result<Response, ApiError> {
    Ok(Json(gateway.finished_analyses().await?).into_response())
}

async fn result(
    State(gateway): State<Shared>,
    Path((task, id, aspect)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<ProxyResult, ApiError> {
    let Some(query) = json_body(&body) else {
        return Err(ApiError::BadRequest);
    };
    let path = format!("/results/{task}/{id}/{aspect}");
    Ok(gateway.proxy(&task, &path, Call::post(query)).await?)
}

async fn schedule(
    State(gateway): State<Shared>,
    Path(task): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(kwargs) = json_body(&body) else {
        return Err(ApiError::BadRequest);
    };
    let submission = gateway.schedule(&task, &kwargs).await?;
    let status = if submission.failed() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    Ok((status, submission.state).into_response())
}

/// Empty body reads as `{}`; anything else must be JSON.
fn json_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return Some(json!({}));
    }
    serde_json::from_slice(body).ok()
}

impl IntoResponse for ProxyResult {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        match self.body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

pub enum ApiError {
    Gateway(GatewayError),
    BadRequest,
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        ApiError::Gateway(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            ApiError::BadRequest => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "request body is not JSON"})),
                )
                    .into_response();
            }
            ApiError::Gateway(error) => error,
        };
        let status = match &error {
            GatewayError::NotFound(_) => return StatusCode::NOT_FOUND.into_response(),
            GatewayError::ControlPlane(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Selector(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::MalformedTask(_)
            | GatewayError::Backend(_)
            | GatewayError::Scheduler(_) => StatusCode::BAD_GATEWAY,
        };
        warn!(%error, status = status.as_u16(), "request failed");
        (status, Json(json!({"error": error.to_string()}))).into_response()
    }
}
