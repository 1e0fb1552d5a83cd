//! Surface HTTP : `POST /simulate` et `GET /health`
//!
//! Le pipeline est bloquant ; chaque requête tourne sur `spawn_blocking`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::task::JoinError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::report::SimulationReport;
use crate::request::SimulationRequest;

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

/// Routeur de l'application
pub fn router(pipeline: Pipeline) -> Router {
    Router::new()
        .route("/simulate", post(simulate))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState {
            pipeline: Arc::new(pipeline),
        })
}

/// Écoute sur `bind` jusqu'à l'arrêt du processus
pub async fn serve(pipeline: Pipeline, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .context(format!("Failed to bind {}", bind))?;
    info!(addr = %listener.local_addr()?, "bbox-sim listening");

    axum::serve(listener, router(pipeline))
        .await
        .context("Server exited unexpectedly")?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn simulate(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected simulation request: {}", e);
            return respond(SimulationReport::from_error(&e));
        }
    };

    let pipeline = state.pipeline.clone();
    let report = match tokio::task::spawn_blocking(move || pipeline.run(&request)).await {
        Ok(result) => SimulationReport::from_result(result),
        Err(e) => {
            let detail = describe_join_error(e);
            error!("Simulation task aborted: {}", detail);
            SimulationReport::from_panic(detail)
        }
    };

    respond(report)
}

fn parse_request(body: &[u8]) -> Result<SimulationRequest, PipelineError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| PipelineError::invalid_input(format!("Invalid JSON body: {}", e)))?;
    SimulationRequest::from_json(&value)
}

fn respond(report: SimulationReport) -> Response {
    let status =
        StatusCode::from_u16(report.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(report)).into_response()
}

fn describe_join_error(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {}", message)
    } else {
        "panic with non-string payload".to_string()
    }
}
