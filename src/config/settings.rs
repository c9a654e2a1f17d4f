//! Application configuration settings
//!
//! Compiled-in defaults and the effective configuration structures

use serde::{Deserialize, Serialize};

/// Application name
pub const APP_NAME: &str = "Quota Manager";
/// Application version
pub const APP_VERSION: &str = "1.0.0";
/// Application description
pub const APP_DESCRIPTION: &str = "Quota Management System";

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8099";
/// Default API path prefix
pub const DEFAULT_API_PREFIX: &str = "/quota-manager/api/v1";
/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Reserved: no retry is performed
pub const RETRY_COUNT: u32 = 3;
/// Reserved: no retry is performed
pub const RETRY_DELAY_MS: u64 = 1_000;

/// Header carrying the auth token
pub const TOKEN_HEADER: &str = "Authorization";
/// Auth scheme prefix
pub const TOKEN_PREFIX: &str = "Bearer ";

/// Page title template; `{title}` is replaced by the route title
pub const TITLE_TEMPLATE: &str = "{title} - Quota Manager";
/// Route a bare `/` redirects to
pub const DEFAULT_ROUTE: &str = "/dashboard";

/// Persisted override slots
pub mod keys {
    pub const API_BASE_URL: &str = "api_base_url";
    pub const API_PREFIX: &str = "api_prefix";
    pub const API_TIMEOUT: &str = "api_timeout";
    pub const APP_PAGE_SIZE: &str = "app_page_size";
    pub const APP_AUTO_REFRESH: &str = "app_auto_refresh";
    pub const APP_REFRESH_INTERVAL: &str = "app_refresh_interval";
    pub const USER_SETTINGS: &str = "user_settings";
    /// Auth token read by the HTTP client
    pub const TOKEN: &str = "token";
}

/// Effective API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend address
    pub base_url: String,
    /// Path prefix prepended to every resource path
    pub api_prefix: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Effective UI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub layout: LayoutConfig,
    pub table: TableConfig,
    pub form: FormConfig,
    pub button: ButtonConfig,
    pub message: MessageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub sidebar_width: String,
    pub header_height: String,
    pub main_padding: String,
    pub header_padding: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sidebar_width: "200px".to_string(),
            header_height: "60px".to_string(),
            main_padding: "20px 20px 20px 40px".to_string(),
            header_padding: "0 20px 0 40px".to_string(),
        }
    }
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows per page; overridable through `app_page_size`
    pub default_page_size: u32,
    /// Page sizes offered to the user
    pub page_sizes: Vec<u32>,
    pub max_page_size: u32,
    pub stripe: bool,
    pub border: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_sizes: vec![10, 20, 50, 100],
            max_page_size: 100,
            stripe: true,
            border: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub label_width: String,
    pub size: String,
    pub validate_on_rule_change: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            label_width: "150px".to_string(),
            size: "default".to_string(),
            validate_on_rule_change: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub action_button_min_width: String,
    pub action_button_height: String,
    pub action_buttons_gap: String,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            action_button_min_width: "70px".to_string(),
            action_button_height: "32px".to_string(),
            action_buttons_gap: "8px".to_string(),
        }
    }
}

/// Transient notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageConfig {
    /// How long a notification stays visible, in milliseconds
    pub duration_ms: u64,
    pub show_close: bool,
    pub center: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3_000,
            show_close: true,
            center: false,
        }
    }
}

/// Effective feature configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub features: FeatureFlags,
    pub auto_refresh: AutoRefreshConfig,
    pub strategy: StrategyConfig,
}

/// Feature switches supplied by the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub auto_refresh: bool,
    pub dark_mode: bool,
    pub debug_mode: bool,
    pub api_mock: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            dark_mode: false,
            debug_mode: false,
            api_mock: false,
        }
    }
}

/// Named feature switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    AutoRefresh,
    DarkMode,
    DebugMode,
    ApiMock,
}

impl FeatureFlags {
    /// Whether a feature switch is on
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::AutoRefresh => self.auto_refresh,
            Feature::DarkMode => self.dark_mode,
            Feature::DebugMode => self.debug_mode,
            Feature::ApiMock => self.api_mock,
        }
    }
}

/// Auto refresh settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRefreshConfig {
    /// Overridable through `app_auto_refresh`
    pub default_enabled: bool,
    /// Seconds; overridable through `app_refresh_interval`
    pub default_interval_secs: u32,
    pub min_interval_secs: u32,
    pub max_interval_secs: u32,
}

impl Default for AutoRefreshConfig {
    fn default() -> Self {
        Self {
            default_enabled: false,
            default_interval_secs: 60,
            min_interval_secs: 30,
            max_interval_secs: 600,
        }
    }
}

/// Strategy form constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub types: Vec<String>,
    pub default_type: String,
    pub default_amount: u32,
    pub min_amount: u32,
    pub max_amount: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            types: vec!["single".to_string(), "periodic".to_string()],
            default_type: "single".to_string(),
            default_amount: 100,
            min_amount: 1,
            max_amount: 10_000,
        }
    }
}

/// Full effective configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub feature: FeatureConfig,
}

/// Collect every problem with an effective configuration
pub fn validation_errors(api: &ApiConfig, ui: &UiConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if api.base_url.is_empty() {
        errors.push("API base URL is required".to_string());
    } else if !api.base_url.starts_with("http") {
        errors.push(format!(
            "Invalid API base URL format, should start with 'http': {}",
            api.base_url
        ));
    }

    if api.api_prefix.is_empty() {
        errors.push("API prefix is required".to_string());
    }

    if api.timeout_ms == 0 {
        errors.push("API timeout must be greater than 0".to_string());
    }

    if ui.table.default_page_size == 0 {
        errors.push("Default page size must be greater than 0".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validation_errors(&ApiConfig::default(), &UiConfig::default()).is_empty());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let api = ApiConfig {
            base_url: "quota.internal".to_string(),
            api_prefix: String::new(),
            timeout_ms: 0,
        };
        let mut ui = UiConfig::default();
        ui.table.default_page_size = 0;

        let errors = validation_errors(&api, &ui);
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("should start with 'http'"));
    }

    #[test]
    fn test_feature_flags() {
        let flags = FeatureFlags::default();
        assert!(flags.is_enabled(Feature::AutoRefresh));
        assert!(!flags.is_enabled(Feature::DarkMode));
        assert!(!flags.is_enabled(Feature::ApiMock));
    }
}
