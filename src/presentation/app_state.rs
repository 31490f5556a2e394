// Application state for HTTP handlers
use crate::application::log_service::LogAnalyticsService;
use crate::application::query_service::QueryService;

#[derive(Clone)]
pub struct AppState {
    pub log_service: LogAnalyticsService,
    pub query_service: QueryService,
}
