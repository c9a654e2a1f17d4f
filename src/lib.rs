//! Quota Manager Client Library
//!
//! Layered configuration resolution, an envelope-aware HTTP client and the
//! strategy/quota resource facades for the Quota Manager backend

pub mod api;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export common types
pub use api::{Api, QuotaApi, StrategyApi};
pub use config::{ConfigResolver, Environment, SettingKey};
pub use models::{Envelope, ListParams};
pub use routes::{RouteMatch, RouteTable};
pub use services::{ApiClient, Notifier, RequestOptions};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
