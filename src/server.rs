//! HTTP delivery surface.
//!
//! `POST /scrape-bills` runs one aggregation pass and answers with the per-provider
//! results and the household summary. `GET /health` reports liveness.

use crate::model::{AggregateSummary, BillResult, RunConfig};
use crate::orchestrator::Orchestrator;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_derive::Serialize;
use std::future::Future;
use std::sync::Arc;

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub run_config: RunConfig,
}

#[derive(Debug, Serialize)]
struct ScrapeResponse {
    success: bool,
    results: Vec<BillResult>,
    summary: AggregateSummary,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scrape-bills", post(scrape_bills))
        .route("/health", get(health))
        .with_state(state)
}

async fn scrape_bills(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("Received scrape request");
    let task_state = Arc::clone(&state);
    let pass = tokio::spawn(async move {
        task_state
            .orchestrator
            .run_pass(&task_state.run_config)
            .await
    });

    match pass.await {
        Ok(outcome) => Json(ScrapeResponse {
            success: true,
            results: outcome.results,
            summary: outcome.summary,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Scrape pass failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Serves the router on `bind_address` until `shutdown` resolves.
pub async fn serve<F>(state: Arc<AppState>, bind_address: &str, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!(address = %bind_address, "Bill scraper API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}
