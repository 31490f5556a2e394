// Router assembly
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    ask_query, component_levels, health_check, hourly_distribution, list_logs, log_counts, log_stats,
    time_series, top_components, top_events,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/logs", get(list_logs))
        .route("/api/logs/counts", get(log_counts))
        .route("/api/logs/stats", get(log_stats))
        .route("/api/logs/components", get(top_components))
        .route("/api/logs/components/levels", get(component_levels))
        .route("/api/logs/events", get(top_events))
        .route("/api/logs/hourly", get(hourly_distribution))
        .route("/api/logs/timeseries", get(time_series))
        .route("/api/query", post(ask_query))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
