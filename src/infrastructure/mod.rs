// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_repository;
pub mod http_query_backend;
pub mod http_response;
