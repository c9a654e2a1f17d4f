//! Resource API facades
//!
//! Each facade maps named operations to an HTTP method and a path under the
//! resolved API prefix, then delegates to the shared [`ApiClient`].
//! Identifiers are percent-encoded with [`encode_segment`] before they are
//! placed in a path.

pub mod quota;
pub mod strategy;

pub use quota::QuotaApi;
pub use strategy::StrategyApi;

use crate::services::ApiClient;
use std::sync::Arc;

/// Both facades over one shared client
#[derive(Debug, Clone)]
pub struct Api {
    pub strategies: StrategyApi,
    pub quota: QuotaApi,
}

impl Api {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            strategies: StrategyApi::new(client.clone()),
            quota: QuotaApi::new(client),
        }
    }
}

/// Percent-encode a value so it forms exactly one path segment
pub fn encode_segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
