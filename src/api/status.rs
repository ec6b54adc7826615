use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{metrics, models::EmittedEvent, ProducerError, Result};

/// Holds the most recent event the runner handed to the sink.
#[derive(Clone, Default)]
pub struct StatusState {
    last_event: Arc<RwLock<Option<EmittedEvent>>>,
}

impl StatusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: EmittedEvent) {
        *self.last_event.write() = Some(event);
    }

    pub fn last_event(&self) -> Option<EmittedEvent> {
        self.last_event.read().clone()
    }
}

pub fn router(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .route("/events/last", get(last_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn prometheus_metrics() -> String {
    metrics::gather_text()
}

async fn last_event(State(state): State<StatusState>) -> Result<Json<EmittedEvent>> {
    state
        .last_event()
        .map(Json)
        .ok_or_else(|| ProducerError::NotFound("no event emitted yet".to_string()))
}

pub async fn serve(state: StatusState, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting status server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
