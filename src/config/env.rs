//! Environment-supplied configuration
//!
//! Values are captured once at start-up; the resolver never reads the process
//! environment directly.

use super::settings::{FeatureFlags, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

pub const API_BASE_URL_VAR: &str = "QUOTA_API_BASE_URL";
pub const API_TIMEOUT_VAR: &str = "QUOTA_API_TIMEOUT";
pub const ENABLE_AUTO_REFRESH_VAR: &str = "QUOTA_ENABLE_AUTO_REFRESH";
pub const ENABLE_DARK_MODE_VAR: &str = "QUOTA_ENABLE_DARK_MODE";
pub const DEBUG_MODE_VAR: &str = "QUOTA_DEBUG_MODE";
pub const API_MOCK_VAR: &str = "QUOTA_API_MOCK";
pub const APP_ENV_VAR: &str = "QUOTA_ENV";

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") => AppEnv::Production,
            Some("test") => AppEnv::Test,
            _ => AppEnv::Development,
        }
    }
}

/// Snapshot of the environment layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub api_base_url: Option<String>,
    pub api_timeout: Option<String>,
    pub enable_auto_refresh: Option<String>,
    pub enable_dark_mode: Option<String>,
    pub debug_mode: Option<String>,
    pub api_mock: Option<String>,
    pub app_env: Option<String>,
}

impl Environment {
    /// Capture the process environment, loading `.env` first if it exists
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Capture values through an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_base_url: lookup(API_BASE_URL_VAR),
            api_timeout: lookup(API_TIMEOUT_VAR),
            enable_auto_refresh: lookup(ENABLE_AUTO_REFRESH_VAR),
            enable_dark_mode: lookup(ENABLE_DARK_MODE_VAR),
            debug_mode: lookup(DEBUG_MODE_VAR),
            api_mock: lookup(API_MOCK_VAR),
            app_env: lookup(APP_ENV_VAR),
        }
    }

    /// Environment base URL, else the compiled default
    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    /// Environment timeout, else the compiled default
    ///
    /// Non-numeric and zero values fall through to the default.
    pub fn api_timeout_ms(&self) -> u64 {
        self.api_timeout
            .as_deref()
            .and_then(parse_positive)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// Feature switches
    ///
    /// Auto refresh is on unless explicitly `"false"`; every other switch is
    /// off unless explicitly `"true"`.
    pub fn feature_flags(&self) -> FeatureFlags {
        FeatureFlags {
            auto_refresh: self.enable_auto_refresh.as_deref() != Some("false"),
            dark_mode: self.enable_dark_mode.as_deref() == Some("true"),
            debug_mode: self.debug_mode.as_deref() == Some("true"),
            api_mock: self.api_mock.as_deref() == Some("true"),
        }
    }

    /// Deployment environment, development unless stated otherwise
    pub fn app_env(&self) -> AppEnv {
        AppEnv::parse(self.app_env.as_deref())
    }
}

/// Parse the leading digits of a value as a positive integer
///
/// Surrounding whitespace is ignored and parsing stops at the first non-digit,
/// so `"25px"` reads as 25. No leading digits, zero and overflow yield `None`.
pub(crate) fn parse_positive<T>(value: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let value = value.trim();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());

    value[..end]
        .parse::<T>()
        .ok()
        .filter(|v| *v > T::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(pairs: &[(&str, &str)]) -> Environment {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let env = env_with(&[]);
        assert_eq!(env.api_base_url(), DEFAULT_BASE_URL);
        assert_eq!(env.api_timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(env.feature_flags(), FeatureFlags::default());
        assert_eq!(env.app_env(), AppEnv::Development);
    }

    #[test]
    fn test_values_from_lookup() {
        let env = env_with(&[
            (API_BASE_URL_VAR, "https://quota.example.com"),
            (API_TIMEOUT_VAR, "30000"),
            (ENABLE_AUTO_REFRESH_VAR, "false"),
            (ENABLE_DARK_MODE_VAR, "true"),
            (APP_ENV_VAR, "production"),
        ]);
        assert_eq!(env.api_base_url(), "https://quota.example.com");
        assert_eq!(env.api_timeout_ms(), 30_000);

        let flags = env.feature_flags();
        assert!(!flags.auto_refresh);
        assert!(flags.dark_mode);
        assert!(!flags.debug_mode);
        assert_eq!(env.app_env(), AppEnv::Production);
    }

    #[test]
    fn test_malformed_timeout_falls_back() {
        assert_eq!(env_with(&[(API_TIMEOUT_VAR, "soon")]).api_timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(env_with(&[(API_TIMEOUT_VAR, "0")]).api_timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_flag_values_are_exact() {
        let env = env_with(&[(DEBUG_MODE_VAR, "TRUE"), (ENABLE_AUTO_REFRESH_VAR, "no")]);
        let flags = env.feature_flags();
        assert!(!flags.debug_mode);
        assert!(flags.auto_refresh);
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive::<u32>(" 25 "), Some(25));
        assert_eq!(parse_positive::<u32>("0"), None);
        assert_eq!(parse_positive::<u32>("-5"), None);
        assert_eq!(parse_positive::<u32>("25abc"), Some(25));
        assert_eq!(parse_positive::<u32>("25.5"), Some(25));
        assert_eq!(parse_positive::<u32>("25px"), Some(25));
        assert_eq!(parse_positive::<u32>("abc"), None);
        assert_eq!(parse_positive::<u32>(""), None);
        assert_eq!(parse_positive::<u8>("300"), None);
    }
}
