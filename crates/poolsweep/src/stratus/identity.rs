//! REST client for the identity service.
//!
//! Each pooled resource has a service identity of the same name; credential
//! rotation retires that identity's API keys and issues a fresh one.

use serde::Deserialize;
use serde_json::json;

use super::context::StratusContext;
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceId {
    pub id: String,
    /// IAM handle API keys are attached under, distinct from `id`.
    pub iam_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
}

/// A newly created key. The secret is only ever returned at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedApiKey {
    pub id: String,
    pub name: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
struct KeyDetails {
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct ServiceIdList {
    #[serde(default)]
    service_ids: Vec<ServiceId>,
}

#[derive(Debug, Deserialize)]
struct ApiKeyList {
    #[serde(default)]
    api_keys: Vec<ApiKey>,
}

/// Client for the global identity service.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    ctx: StratusContext,
    base: String,
}

impl IdentityClient {
    pub fn new(ctx: &StratusContext) -> Self {
        let base = ctx.iam_endpoint();
        Self {
            ctx: ctx.clone(),
            base,
        }
    }

    /// Account owning the API key this daemon authenticates with.
    pub async fn account_id(&self) -> Result<String, ApiError> {
        let details: KeyDetails = self
            .ctx
            .get_json(&format!("{}/api_keys/details", self.base), &[])
            .await?;
        Ok(details.account_id)
    }

    /// Service identities in `account_id` with exactly the given name.
    pub async fn list_service_ids(
        &self,
        account_id: &str,
        name: &str,
    ) -> Result<Vec<ServiceId>, ApiError> {
        let query = [
            ("account_id", account_id.to_string()),
            ("name", name.to_string()),
        ];
        let list: ServiceIdList = self
            .ctx
            .get_json(&format!("{}/service_ids", self.base), &query)
            .await?;
        Ok(list.service_ids)
    }

    /// API keys attached to a service identity.
    pub async fn list_api_keys(
        &self,
        account_id: &str,
        iam_id: &str,
    ) -> Result<Vec<ApiKey>, ApiError> {
        let query = [
            ("account_id", account_id.to_string()),
            ("iam_id", iam_id.to_string()),
        ];
        let list: ApiKeyList = self
            .ctx
            .get_json(&format!("{}/api_keys", self.base), &query)
            .await?;
        Ok(list.api_keys)
    }

    pub async fn delete_api_key(&self, id: &str) -> Result<(), ApiError> {
        self.ctx.delete(&format!("{}/api_keys/{id}", self.base)).await
    }

    pub async fn create_api_key(
        &self,
        name: &str,
        iam_id: &str,
    ) -> Result<CreatedApiKey, ApiError> {
        let body = json!({ "name": name, "iam_id": iam_id });
        self.ctx
            .post_json(&format!("{}/api_keys", self.base), &body)
            .await
    }
}
