pub mod rate_limit;
pub mod request_metrics;
pub mod route_guard;
