// Domain layer - Log records and the pure aggregation core
pub mod chart;
pub mod filter;
pub mod log_record;
pub mod query_frame;
pub mod ranking;
pub mod stats;
pub mod time_bucket;
