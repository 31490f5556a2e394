// Application layer - Use cases and the ports they depend on
pub mod log_repository;
pub mod log_service;
pub mod query_backend;
pub mod query_service;
