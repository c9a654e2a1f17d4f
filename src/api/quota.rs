//! Quota endpoints

use super::encode_segment;
use crate::models::ListParams;
use crate::services::{ApiClient, RequestOptions};
use crate::utils::error::AppResult;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Quota facade
///
/// User ids are percent-encoded into a single path segment.
#[derive(Debug, Clone)]
pub struct QuotaApi {
    client: Arc<ApiClient>,
}

impl QuotaApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn path(&self, suffix: &str) -> String {
        self.client.resolver().api_path(suffix)
    }

    /// GET `/quota`, quota of the authenticated user
    pub async fn get_user_quota(&self) -> AppResult<Value> {
        self.client
            .get(&self.path("/quota"), RequestOptions::new())
            .await
    }

    /// GET `/quota/audit`, audit records of the authenticated user
    pub async fn get_quota_audit_records(&self, params: &ListParams) -> AppResult<Value> {
        let options = RequestOptions::new().with_query(params.pairs());
        self.client.get(&self.path("/quota/audit"), options).await
    }

    /// GET `/quota/audit/{userId}`, admin lookup of another user's records
    pub async fn get_user_quota_audit_records(
        &self,
        user_id: &str,
        params: &ListParams,
    ) -> AppResult<Value> {
        let path = self.path(&format!("/quota/audit/{}", encode_segment(user_id)));
        let options = RequestOptions::new().with_query(params.pairs());
        self.client.get(&path, options).await
    }

    /// POST `/quota/transfer-out`
    pub async fn transfer_out<B: Serialize + ?Sized>(&self, transfer: &B) -> AppResult<Value> {
        let options = RequestOptions::new().json(transfer)?;
        self.client
            .post(&self.path("/quota/transfer-out"), options)
            .await
    }

    /// POST `/quota/transfer-in`
    pub async fn transfer_in<B: Serialize + ?Sized>(&self, transfer: &B) -> AppResult<Value> {
        let options = RequestOptions::new().json(transfer)?;
        self.client
            .post(&self.path("/quota/transfer-in"), options)
            .await
    }
}
