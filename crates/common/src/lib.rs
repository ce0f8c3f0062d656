//! CampaignHub Common Library
//!
//! Shared code for the CampaignHub gateway including:
//! - Database models and the `Store` abstraction
//! - Campaign, application, submission and onboarding services
//! - Request/response schemas and the response envelope
//! - Error types and handling
//! - Configuration management
//! - Identity resolution
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod response;
pub mod schema;
pub mod services;

// Re-export commonly used types
pub use auth::{AuthProvider, Identity};
pub use config::AppConfig;
pub use db::{MemoryStore, Repository, Store};
pub use errors::{AppError, Result};
pub use response::ApiResponse;
pub use services::Services;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
