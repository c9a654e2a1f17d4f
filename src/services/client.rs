//! HTTP client service
//!
//! Encapsulates HTTP communication with the Quota Manager backend: token
//! injection, envelope unwrapping and failure notification.

use crate::config::settings::{ApiConfig, TOKEN_HEADER, TOKEN_PREFIX};
use crate::config::ConfigResolver;
use crate::models::Envelope;
use crate::services::notify::{Notification, Notifier};
use crate::utils::error::{best_message, AppError, AppResult, TransportKind, REQUEST_FAILED};
use crate::utils::logging::mask_token;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Per-call request options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query string pairs
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append several query parameters
    pub fn with_query(mut self, pairs: &[(String, String)]) -> Self {
        self.query.extend_from_slice(pairs);
        self
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> AppResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Connection settings currently in use
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSettings {
    base_url: String,
    timeout: Duration,
}

impl From<&ApiConfig> for ActiveSettings {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Quota Manager API client
///
/// Base URL and timeout are captured at construction and only change through
/// [`ApiClient::refresh`]. The token is read from the store on every request.
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    resolver: ConfigResolver,
    notifier: Arc<dyn Notifier>,
    active: RwLock<ActiveSettings>,
    message_duration: Duration,
}

impl ApiClient {
    /// Create a new client instance
    pub fn new(resolver: ConfigResolver, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("quota-manager/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(anyhow::anyhow!("Failed to create HTTP client: {}", e)))?;

        let config = resolver.api_config();
        let message_duration = Duration::from_millis(resolver.ui_config().message.duration_ms);

        debug!(
            "API client created for {} (timeout {}ms)",
            config.base_url, config.timeout_ms
        );

        Ok(Self {
            http,
            resolver,
            notifier,
            active: RwLock::new(ActiveSettings::from(&config)),
            message_duration,
        })
    }

    /// Configuration resolver used by this client
    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Base URL currently in use
    pub fn base_url(&self) -> String {
        self.active_settings().base_url
    }

    /// Timeout currently in use
    pub fn timeout(&self) -> Duration {
        self.active_settings().timeout
    }

    /// Re-resolve the configuration and replace the active settings
    ///
    /// Expected to be called from a single control point (e.g. after settings
    /// are saved); concurrent refreshes are last-writer-wins.
    pub fn refresh(&self) -> ApiConfig {
        let config = self.resolver.api_config();
        *self.active.write().unwrap_or_else(PoisonError::into_inner) =
            ActiveSettings::from(&config);

        info!(
            "API configuration updated: base_url={}, timeout={}ms",
            config.base_url, config.timeout_ms
        );
        config
    }

    /// GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> AppResult<T> {
        self.request(Method::GET, path, options).await
    }

    /// POST request
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> AppResult<T> {
        self.request(Method::POST, path, options).await
    }

    /// PUT request
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> AppResult<T> {
        self.request(Method::PUT, path, options).await
    }

    /// DELETE request
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> AppResult<T> {
        self.request(Method::DELETE, path, options).await
    }

    /// Send a request and unwrap the response envelope
    ///
    /// Failures are reported to the notifier before being returned.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> AppResult<T> {
        let settings = self.active_settings();
        let url = join_url(&settings.base_url, path);
        let request_id = Uuid::new_v4().to_string();

        let span = tracing::debug_span!(
            "api_request",
            request_id = %request_id,
            method = %method,
            url = %url,
        );

        let data = self
            .send(method, &url, &request_id, settings.timeout, options)
            .instrument(span)
            .await
            .map_err(|e| self.fail(e))?;

        serde_json::from_value(data).map_err(AppError::from)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        request_id: &str,
        timeout: Duration,
        options: RequestOptions,
    ) -> AppResult<Value> {
        let mut builder = self
            .http
            .request(method, url)
            .timeout(timeout)
            .header(REQUEST_ID_HEADER, request_id);

        if let Some(token) = self.resolver.token() {
            debug!("Attaching token {}", mask_token(&token));
            builder = builder.header(TOKEN_HEADER, format!("{}{}", TOKEN_PREFIX, token));
        }

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }

        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        debug!("Sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(&e, None))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::from_reqwest(&e, None))?;

        if !status.is_success() {
            let server_message = serde_json::from_slice::<Envelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            let library_message = format!("Request failed with status code {}", status.as_u16());

            warn!("Request failed with status {}", status);
            return Err(AppError::Transport {
                message: best_message(server_message.as_deref(), Some(&library_message)),
                status: Some(status.as_u16()),
                kind: TransportKind::Status,
            });
        }

        let envelope = match serde_json::from_slice::<Envelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Response is not a valid envelope: {}", e);
                Envelope::failure(REQUEST_FAILED)
            }
        };

        debug!("Request completed, success={}", envelope.success);
        envelope.into_result()
    }

    fn fail(&self, err: AppError) -> AppError {
        self.notifier
            .notify(Notification::error(err.to_string(), self.message_duration));
        err
    }

    fn active_settings(&self) -> ActiveSettings {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Join a request path onto the base URL
///
/// Absolute URLs are used as-is; otherwise exactly one `/` separates the parts.
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
