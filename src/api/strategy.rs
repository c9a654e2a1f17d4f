//! Strategy endpoints

use super::encode_segment;
use crate::models::ListParams;
use crate::services::{ApiClient, RequestOptions};
use crate::utils::error::AppResult;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Strategy management facade
///
/// Strategy ids are percent-encoded into a single path segment, so `a/b` is
/// sent as `a%2Fb`.
#[derive(Debug, Clone)]
pub struct StrategyApi {
    client: Arc<ApiClient>,
}

impl StrategyApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn path(&self, suffix: &str) -> String {
        self.client.resolver().api_path(suffix)
    }

    /// GET `/strategies`
    pub async fn list_strategies(&self, params: &ListParams) -> AppResult<Value> {
        let options = RequestOptions::new().with_query(params.pairs());
        self.client.get(&self.path("/strategies"), options).await
    }

    /// GET `/strategies/{id}`
    pub async fn get_strategy(&self, id: &str) -> AppResult<Value> {
        let path = self.path(&format!("/strategies/{}", encode_segment(id)));
        self.client.get(&path, RequestOptions::new()).await
    }

    /// POST `/strategies`
    pub async fn create_strategy<B: Serialize + ?Sized>(&self, strategy: &B) -> AppResult<Value> {
        let options = RequestOptions::new().json(strategy)?;
        self.client.post(&self.path("/strategies"), options).await
    }

    /// PUT `/strategies/{id}`
    pub async fn update_strategy<B: Serialize + ?Sized>(
        &self,
        id: &str,
        strategy: &B,
    ) -> AppResult<Value> {
        let path = self.path(&format!("/strategies/{}", encode_segment(id)));
        let options = RequestOptions::new().json(strategy)?;
        self.client.put(&path, options).await
    }

    /// DELETE `/strategies/{id}`
    pub async fn delete_strategy(&self, id: &str) -> AppResult<Value> {
        let path = self.path(&format!("/strategies/{}", encode_segment(id)));
        self.client.delete(&path, RequestOptions::new()).await
    }

    /// POST `/strategies/{id}/enable`
    pub async fn enable_strategy(&self, id: &str) -> AppResult<Value> {
        let path = self.path(&format!("/strategies/{}/enable", encode_segment(id)));
        self.client.post(&path, RequestOptions::new()).await
    }

    /// POST `/strategies/{id}/disable`
    pub async fn disable_strategy(&self, id: &str) -> AppResult<Value> {
        let path = self.path(&format!("/strategies/{}/disable", encode_segment(id)));
        self.client.post(&path, RequestOptions::new()).await
    }

    /// POST `/strategies/scan`
    pub async fn trigger_scan(&self) -> AppResult<Value> {
        debug!("Triggering strategy scan");
        self.client
            .post(&self.path("/strategies/scan"), RequestOptions::new())
            .await
    }

    /// GET `/strategies/{id}/executions`
    pub async fn get_strategy_executions(&self, id: &str, params: &ListParams) -> AppResult<Value> {
        let path = self.path(&format!("/strategies/{}/executions", encode_segment(id)));
        let options = RequestOptions::new().with_query(params.pairs());
        self.client.get(&path, options).await
    }
}
