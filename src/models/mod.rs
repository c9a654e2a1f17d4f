//! Data models module
//!
//! Defines the backend response envelope and request parameter types

use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform backend response wrapper
///
/// `success == true` means `data` is the payload; otherwise `message` is
/// user-facing text and `data` is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Whether the operation succeeded
    #[serde(default)]
    pub success: bool,
    /// Payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// User-facing message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Failure envelope carrying `message`
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl Envelope<Value> {
    /// Unwrap the payload or turn the failure into an application error
    ///
    /// A missing payload on success is `null`.
    pub fn into_result(self) -> AppResult<Value> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(AppError::application(self.message))
        }
    }
}

/// Query parameters for list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pairs: Vec<(String, String)>,
}

impl ListParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Page number
    pub fn page(self, page: u32) -> Self {
        self.param("page", page)
    }

    /// Rows per page
    pub fn page_size(self, page_size: u32) -> Self {
        self.param("page_size", page_size)
    }

    /// Arbitrary filter parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Whether no parameter has been set
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Key/value pairs in insertion order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
