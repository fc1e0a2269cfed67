use super::{encode_outcome, ProxyRequest};
use crate::request::{Credential, RequestSpec};
use crate::transport::{DirectTransport, Transport};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use reqwest::{Method, Url};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const PROXY_PATH: &str = "/api/proxy";

/// Shared state for the relay handlers.
pub struct RelayState {
    pub upstream: DirectTransport,
}

pub struct RelayServer;

impl RelayServer {
    pub fn build(upstream: DirectTransport) -> Router {
        let state = Arc::new(RelayState { upstream });
        Router::new()
            .route(PROXY_PATH, post(proxy_handler))
            .route("/health", get(health_handler))
            .with_state(state)
    }

    /// Serve until Ctrl-C.
    pub async fn run(addr: SocketAddr, upstream: DirectTransport) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, path = PROXY_PATH, "relay listening");
        axum::serve(listener, Self::build(upstream))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("relay shutting down");
            })
            .await?;
        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "fiesta"}))
}

fn message(status: StatusCode, msg: String) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": msg })))
}

fn parse_request(body: &str) -> Result<RequestSpec, String> {
    let req: ProxyRequest = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let url = Url::parse(&req.url).map_err(|e| format!("url: {e}"))?;
    let method = Method::from_bytes(req.method.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("method: {e}"))?;
    Ok(RequestSpec {
        url,
        method,
        payload: req.data,
        credential: Credential::new(&req.auth_token),
    })
}

/// Route: `POST /api/proxy`
async fn proxy_handler(State(state): State<Arc<RelayState>>, body: String) -> impl IntoResponse {
    let spec = match parse_request(&body) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "rejecting relay request");
            return message(StatusCode::BAD_REQUEST, format!("Invalid relay request: {e}"));
        }
    };

    info!(url = %spec.url, method = %spec.method, "relaying request");

    match state.upstream.execute(&spec).await {
        Ok(outcome) => (StatusCode::OK, Json(encode_outcome(&outcome))),
        Err(e) if e.status().is_some() => {
            let status = e
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            message(status, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "relay failed");
            message(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Proxy server error: {e}"),
            )
        }
    }
}
