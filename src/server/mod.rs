// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP surface of the proxy
//!
//! A single route does the work: `POST` executes a job, `GET` redirects
//! to the documentation. Every response is JSON; classified failures
//! are 400, internal faults are 500, never a mix of envelope kinds.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::proxy::{self, ErrorEnvelope, HostPolicy, Job, ResponseEnvelope};

/// Shared, immutable handler state
#[derive(Clone)]
pub struct AppState {
    config: Arc<ProxyConfig>,
    policy: Arc<HostPolicy>,
}

impl AppState {
    /// Build state for a config, deriving the policy gate from it
    pub fn new(config: ProxyConfig) -> Self {
        let policy = HostPolicy::from_config(&config);
        Self {
            config: Arc::new(config),
            policy: Arc::new(policy),
        }
    }
}

/// Build the proxy router
pub fn router(config: ProxyConfig) -> Router {
    let state = AppState::new(config);

    Router::new()
        .route("/", get(docs_redirect).post(execute))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Bind the configured address and serve until shutdown
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let addr = config.bind_addr;
    let app = router(config);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn docs_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::permanent(&state.config.docs_url)
}

async fn execute(State(state): State<AppState>, body: Bytes) -> Response {
    match run_job(&state, &body).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(error) => {
            if error.is_client_error() {
                tracing::warn!(%error, "proxy job rejected");
            } else {
                tracing::error!(%error, "proxy job failed");
            }

            // reqwest and axum disagree on the http crate version, so
            // the status crosses as a bare u16
            let status = StatusCode::from_u16(error.http_status().as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let envelope =
                ErrorEnvelope::from_error(&error, state.config.expose_internal_errors);
            (status, Json(envelope)).into_response()
        }
    }
}

async fn run_job(state: &AppState, body: &[u8]) -> Result<ResponseEnvelope> {
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|_| Error::payload("Error decoding proxy job payload."))?;
    let job = Job::decode(payload)?;
    proxy::execute_job(&state.config, &state.policy, job).await
}
