//! Layered configuration resolution
//!
//! Every read resolves persisted override > environment value > compiled
//! default. Nothing is cached: a value written to the store is visible to the
//! next read.

use super::env::{parse_positive, Environment};
use super::settings::{
    keys, validation_errors, ApiConfig, EffectiveConfig, Feature, FeatureConfig, UiConfig,
};
use crate::storage::Storage;
use crate::utils::error::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info};

/// User-editable settings and their override slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ApiBaseUrl,
    ApiPrefix,
    ApiTimeout,
    PageSize,
    AutoRefresh,
    RefreshInterval,
}

impl SettingKey {
    /// Every editable setting
    pub const ALL: [SettingKey; 6] = [
        SettingKey::ApiBaseUrl,
        SettingKey::ApiPrefix,
        SettingKey::ApiTimeout,
        SettingKey::PageSize,
        SettingKey::AutoRefresh,
        SettingKey::RefreshInterval,
    ];

    /// Name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::ApiBaseUrl => "base-url",
            SettingKey::ApiPrefix => "api-prefix",
            SettingKey::ApiTimeout => "timeout",
            SettingKey::PageSize => "page-size",
            SettingKey::AutoRefresh => "auto-refresh",
            SettingKey::RefreshInterval => "refresh-interval",
        }
    }

    /// Persisted override slot
    pub fn storage_key(&self) -> &'static str {
        match self {
            SettingKey::ApiBaseUrl => keys::API_BASE_URL,
            SettingKey::ApiPrefix => keys::API_PREFIX,
            SettingKey::ApiTimeout => keys::API_TIMEOUT,
            SettingKey::PageSize => keys::APP_PAGE_SIZE,
            SettingKey::AutoRefresh => keys::APP_AUTO_REFRESH,
            SettingKey::RefreshInterval => keys::APP_REFRESH_INTERVAL,
        }
    }

    /// Whether the setting affects the HTTP client
    pub fn affects_client(&self) -> bool {
        matches!(
            self,
            SettingKey::ApiBaseUrl | SettingKey::ApiPrefix | SettingKey::ApiTimeout
        )
    }

    /// Check a value before it is written
    ///
    /// Numbers must be all digits here even though reads accept a digit prefix.
    fn check(&self, value: &str) -> AppResult<()> {
        let digits = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
        let ok = match self {
            SettingKey::ApiBaseUrl => value.starts_with("http"),
            SettingKey::ApiPrefix => !value.is_empty(),
            SettingKey::ApiTimeout => digits && parse_positive::<u64>(value).is_some(),
            SettingKey::PageSize | SettingKey::RefreshInterval => {
                digits && parse_positive::<u32>(value).is_some()
            }
            SettingKey::AutoRefresh => value == "true" || value == "false",
        };

        if ok {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Invalid value for {}: '{}'",
                self.name(),
                value
            )))
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s || key.storage_key() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = SettingKey::ALL.iter().map(SettingKey::name).collect();
                format!("unknown setting '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Configuration resolver
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    storage: Arc<dyn Storage>,
    env: Environment,
}

impl ConfigResolver {
    /// Create a resolver over a store and an environment snapshot
    pub fn new(storage: Arc<dyn Storage>, env: Environment) -> Self {
        Self { storage, env }
    }

    /// Underlying store
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Environment layer
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Effective API configuration
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self
                .override_string(keys::API_BASE_URL)
                .unwrap_or_else(|| self.env.api_base_url()),
            api_prefix: self
                .override_string(keys::API_PREFIX)
                .unwrap_or_else(|| ApiConfig::default().api_prefix),
            timeout_ms: self
                .override_positive(keys::API_TIMEOUT)
                .unwrap_or_else(|| self.env.api_timeout_ms()),
        }
    }

    /// Effective UI configuration
    pub fn ui_config(&self) -> UiConfig {
        let mut ui = UiConfig::default();
        if let Some(page_size) = self.override_positive(keys::APP_PAGE_SIZE) {
            ui.table.default_page_size = page_size;
        }
        ui
    }

    /// Effective feature configuration
    pub fn feature_config(&self) -> FeatureConfig {
        let mut feature = FeatureConfig {
            features: self.env.feature_flags(),
            ..FeatureConfig::default()
        };

        if self.storage.get(keys::APP_AUTO_REFRESH).as_deref() == Some("true") {
            feature.auto_refresh.default_enabled = true;
        }
        if let Some(interval) = self.override_positive(keys::APP_REFRESH_INTERVAL) {
            feature.auto_refresh.default_interval_secs = interval;
        }

        feature
    }

    /// Full snapshot of every effective setting
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            api: self.api_config(),
            ui: self.ui_config(),
            feature: self.feature_config(),
        }
    }

    /// `{api_prefix}{path}` from a fresh resolution
    pub fn api_path(&self, path: &str) -> String {
        format!("{}{}", self.api_config().api_prefix, path)
    }

    /// `{base_url}{api_prefix}{path}` from a fresh resolution
    pub fn api_url(&self, path: &str) -> String {
        let config = self.api_config();
        format!("{}{}{}", config.base_url, config.api_prefix, path)
    }

    /// Whether a feature switch is on
    pub fn is_feature_enabled(&self, feature: Feature) -> bool {
        self.env.feature_flags().is_enabled(feature)
    }

    /// Stored auth token, if any
    pub fn token(&self) -> Option<String> {
        self.override_string(keys::TOKEN)
    }

    /// Store an auth token
    pub fn set_token(&self, token: &str) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Validation("Token cannot be empty".to_string()));
        }
        self.storage.set(keys::TOKEN, token)
    }

    /// Forget the auth token
    pub fn clear_token(&self) -> AppResult<()> {
        self.storage.remove(keys::TOKEN)
    }

    /// Read a JSON-encoded value; missing or malformed values yield `None`
    pub fn get_cache_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.storage.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Ignoring malformed cached value for '{}': {}", key, e);
                None
            }
        }
    }

    /// Write a JSON-encoded value; failures are logged, not returned
    pub fn set_cache_value<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(AppError::from)
            .and_then(|raw| self.storage.set(key, &raw));

        if let Err(e) = result {
            error!("Failed to set cache value '{}': {}", key, e);
        }
    }

    /// Check and persist a user setting
    pub fn set_setting(&self, key: SettingKey, value: &str) -> AppResult<()> {
        let value = value.trim();
        key.check(value)?;
        self.storage.set(key.storage_key(), value)?;
        info!("Setting '{}' saved", key);
        Ok(())
    }

    /// Remove a user setting so the lower layers apply again
    pub fn clear_setting(&self, key: SettingKey) -> AppResult<()> {
        self.storage.remove(key.storage_key())?;
        info!("Setting '{}' cleared", key);
        Ok(())
    }

    /// Remove every user setting
    pub fn clear_all_settings(&self) -> AppResult<()> {
        for key in SettingKey::ALL {
            self.storage.remove(key.storage_key())?;
        }
        info!("All settings cleared");
        Ok(())
    }

    /// Validate the effective configuration
    pub fn validate(&self) -> AppResult<()> {
        let errors = validation_errors(&self.api_config(), &self.ui_config());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors.join("; ")))
        }
    }

    fn override_string(&self, key: &str) -> Option<String> {
        self.storage.get(key).filter(|v| !v.is_empty())
    }

    fn override_positive<T>(&self, key: &str) -> Option<T>
    where
        T: FromStr + PartialOrd + Default,
    {
        let raw = self.storage.get(key)?;
        let parsed = parse_positive(&raw);
        if parsed.is_none() {
            debug!("Ignoring unparsable override '{}' = '{}'", key, raw);
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{DEFAULT_API_PREFIX, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
    use crate::storage::MemoryStorage;

    fn resolver(entries: &[(&str, &str)], env: Environment) -> ConfigResolver {
        let storage = MemoryStorage::with_entries(entries.iter().copied());
        ConfigResolver::new(Arc::new(storage), env)
    }

    #[test]
    fn test_defaults() {
        let resolver = resolver(&[], Environment::default());
        let api = resolver.api_config();
        assert_eq!(api.base_url, DEFAULT_BASE_URL);
        assert_eq!(api.api_prefix, DEFAULT_API_PREFIX);
        assert_eq!(api.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(resolver.ui_config().table.default_page_size, 10);
    }

    #[test]
    fn test_empty_override_falls_through() {
        let resolver = resolver(
            &[("api_base_url", ""), ("api_prefix", "")],
            Environment::default(),
        );
        let api = resolver.api_config();
        assert_eq!(api.base_url, DEFAULT_BASE_URL);
        assert_eq!(api.api_prefix, DEFAULT_API_PREFIX);
    }

    #[test]
    fn test_auto_refresh_override() {
        let resolver = resolver(
            &[("app_auto_refresh", "true"), ("app_refresh_interval", "120")],
            Environment::default(),
        );
        let feature = resolver.feature_config();
        assert!(feature.auto_refresh.default_enabled);
        assert_eq!(feature.auto_refresh.default_interval_secs, 120);

        let resolver = self::resolver(&[("app_auto_refresh", "yes")], Environment::default());
        assert!(!resolver.feature_config().auto_refresh.default_enabled);
    }

    #[test]
    fn test_set_setting_validation() {
        let resolver = resolver(&[], Environment::default());
        assert!(resolver.set_setting(SettingKey::PageSize, "abc").is_err());
        assert!(resolver.set_setting(SettingKey::ApiBaseUrl, "quota.internal").is_err());
        assert!(resolver.set_setting(SettingKey::AutoRefresh, "maybe").is_err());

        resolver.set_setting(SettingKey::PageSize, " 50 ").unwrap();
        assert_eq!(resolver.ui_config().table.default_page_size, 50);

        resolver.clear_setting(SettingKey::PageSize).unwrap();
        assert_eq!(resolver.ui_config().table.default_page_size, 10);
    }

    #[test]
    fn test_setting_key_parse() {
        assert_eq!("base-url".parse::<SettingKey>(), Ok(SettingKey::ApiBaseUrl));
        assert_eq!("app_page_size".parse::<SettingKey>(), Ok(SettingKey::PageSize));
        assert!("colour".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_cache_values() {
        let resolver = resolver(&[("user_settings", "{broken")], Environment::default());
        assert_eq!(resolver.get_cache_value::<serde_json::Value>("user_settings"), None);
        assert_eq!(resolver.get_cache_value::<u32>("missing"), None);

        resolver.set_cache_value("user_settings", &serde_json::json!({"theme": "dark"}));
        let value: serde_json::Value = resolver.get_cache_value("user_settings").unwrap();
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn test_token() {
        let resolver = resolver(&[], Environment::default());
        assert_eq!(resolver.token(), None);
        assert!(resolver.set_token("  ").is_err());

        resolver.set_token("tok-123").unwrap();
        assert_eq!(resolver.token(), Some("tok-123".to_string()));

        resolver.clear_token().unwrap();
        assert_eq!(resolver.token(), None);
    }
}
