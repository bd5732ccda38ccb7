//! Shared connection context for the Stratus APIs.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::error::{classify_response, ApiError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One HTTP client plus the daemon's API key, shared by every service
/// client.
///
/// Cloning is cheap; per-family clients are built from this per cleanup
/// attempt with whatever scope the acquired resource carries.
#[derive(Clone)]
pub struct StratusContext {
    http: reqwest::Client,
    api_key: String,
    debug: bool,
}

impl StratusContext {
    pub fn new(api_key: String, debug: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build the HTTP client")?;
        Ok(Self {
            http,
            api_key,
            debug,
        })
    }

    /// Regional endpoint of the VPC service.
    pub fn vpc_endpoint(&self, region: &str) -> String {
        format!("https://{region}.vpc.stratus.cloud/v1")
    }

    /// Zonal endpoint of the bare metal service.
    pub fn metal_endpoint(&self, zone: &str) -> String {
        format!("https://{zone}.metal.stratus.cloud/v1")
    }

    /// Global endpoint of the identity service.
    pub fn iam_endpoint(&self) -> String {
        "https://iam.stratus.cloud/v1".to_string()
    }

    /// Global endpoint of the tagging service.
    pub fn tags_endpoint(&self) -> String {
        "https://tags.stratus.cloud/v3".to_string()
    }

    pub(crate) async fn get_json<T>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = self.ensure_success("GET", url, response).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = self.ensure_success("POST", url, response).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn delete(&self, url: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        self.ensure_success("DELETE", url, response).await?;
        Ok(())
    }

    async fn ensure_success(
        &self,
        method: &'static str,
        url: &str,
        response: Response,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if self.debug {
            debug!(method, url, status = status.as_u16(), "stratus api call");
        }
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_response(status.as_u16(), &body))
    }
}

impl fmt::Debug for StratusContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The API key stays out of debug output.
        f.debug_struct("StratusContext")
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_the_scope() {
        let ctx = StratusContext::new("test-key".to_string(), false).unwrap();
        assert_eq!(ctx.vpc_endpoint("eu-de"), "https://eu-de.vpc.stratus.cloud/v1");
        assert_eq!(
            ctx.metal_endpoint("dal10"),
            "https://dal10.metal.stratus.cloud/v1"
        );
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let ctx = StratusContext::new("do-not-print-me".to_string(), true).unwrap();
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("do-not-print-me"));
    }
}
