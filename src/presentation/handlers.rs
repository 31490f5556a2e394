// HTTP request handlers
use crate::domain::chart::ChartKind;
use crate::domain::filter::{Page, RecordFilter};
use crate::domain::log_record::LogLevel;
use crate::domain::time_bucket::TimeUnit;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub level: Option<String>,
    pub component: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
}

impl FilterQuery {
    fn into_filter(self) -> Result<RecordFilter, ApiError> {
        let level = match self.level.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(name) => Some(
                LogLevel::from_name(&name.to_ascii_uppercase())
                    .ok_or_else(|| ApiError::BadRequest(format!("unknown level '{}'", name)))?,
            ),
            None => None,
        };

        Ok(RecordFilter::from_params(
            level,
            self.component,
            self.from.as_deref(),
            self.to.as_deref(),
            self.search,
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TimeSeriesQuery {
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub chart_kind: Option<String>,
}

async fn respond<T: Serialize>(headers: &HeaderMap, data: &T) -> Response {
    match json_response(data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Paginated, filtered log records
pub async fn list_logs(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let page = Page::new(page.page, page.page_size);
    let records = state
        .log_service
        .list_records(&filter, page)
        .await
        .map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &records).await)
}

/// `{total, INFO, WARN, ERROR, DEBUG}`
pub async fn log_counts(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let counts = state.log_service.counts(&filter).await.map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &counts).await)
}

pub async fn log_stats(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let stats = state.log_service.stats(&filter).await.map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &stats).await)
}

/// Top-5 components as `[{name, value}]`
pub async fn top_components(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let components = state
        .log_service
        .top_components(&filter)
        .await
        .map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &components).await)
}

pub async fn component_levels(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let points = state
        .log_service
        .component_levels(&filter)
        .await
        .map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &points).await)
}

/// Top-10 events as `[{eventId, count}]`
pub async fn top_events(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let events = state.log_service.top_events(&filter).await.map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &events).await)
}

pub async fn hourly_distribution(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let hourly = state.log_service.hourly(&filter).await.map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &hourly).await)
}

/// Time series bucketed by `unit` (second..year, default hour)
pub async fn time_series(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FilterQuery>,
    Query(query): Query<TimeSeriesQuery>,
) -> Result<Response, ApiError> {
    let filter = filter.into_filter()?;
    let unit = query.unit.as_deref().map(TimeUnit::from_name).unwrap_or_default();
    let points = state
        .log_service
        .time_series(&filter, unit)
        .await
        .map_err(ApiError::LogSource)?;
    Ok(respond(&headers, &points).await)
}

/// Natural-language query, answered by the analytics backend and shaped for charts
pub async fn ask_query(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Response, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let chart_kind = request.chart_kind.as_deref().map(ChartKind::from_name);
    let insight = state
        .query_service
        .ask(question, chart_kind)
        .await
        .map_err(ApiError::Backend)?;
    Ok(respond(&headers, &insight).await)
}
