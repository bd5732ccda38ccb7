//! Pool broker client.
//!
//! The broker owns resource identity and lifecycle state; the daemon only
//! checks resources out for cleaning and back in through this small HTTP
//! API. An acquire that matches nothing is an expected outcome, not a
//! failure, and keeps its own variant so callers can tell the two apart.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use thiserror::Error;
use tracing::debug;

use poolsweep_common::PoolResource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from broker calls.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No resource matched the requested kind and state.
    #[error("no {rtype} resource available in state {state}")]
    NoResource { rtype: String, state: String },
    /// The broker rejected the request.
    #[error("pool api error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The request never reached the broker.
    #[error("pool transport error")]
    Transport(#[from] reqwest::Error),
}

impl PoolError {
    /// Whether this is the expected "nothing to hand out" outcome.
    pub fn is_no_resource(&self) -> bool {
        matches!(self, PoolError::NoResource { .. })
    }
}

/// Checkout and state-transition operations against the pool broker.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Check out one resource of `rtype`, moving it from `from` to `to`.
    async fn acquire(&self, rtype: &str, from: &str, to: &str)
        -> Result<PoolResource, PoolError>;

    /// Persist a checked-out resource's state and attributes.
    async fn update(
        &self,
        name: &str,
        state: &str,
        user_data: &BTreeMap<String, String>,
    ) -> Result<(), PoolError>;

    /// Check a resource back in, leaving it in `dest`.
    async fn release(&self, name: &str, dest: &str) -> Result<(), PoolError>;
}

#[async_trait]
impl<B: Broker + ?Sized> Broker for Arc<B> {
    async fn acquire(
        &self,
        rtype: &str,
        from: &str,
        to: &str,
    ) -> Result<PoolResource, PoolError> {
        (**self).acquire(rtype, from, to).await
    }

    async fn update(
        &self,
        name: &str,
        state: &str,
        user_data: &BTreeMap<String, String>,
    ) -> Result<(), PoolError> {
        (**self).update(name, state, user_data).await
    }

    async fn release(&self, name: &str, dest: &str) -> Result<(), PoolError> {
        (**self).release(name, dest).await
    }
}

/// HTTP client for the pool broker.
pub struct PoolClient {
    http: reqwest::Client,
    base: String,
    owner: String,
    password: String,
}

impl PoolClient {
    /// Build a client for the broker at `base_url`, authenticating as
    /// `owner`.
    pub fn new(base_url: &str, owner: &str, password: &str) -> Result<Self, PoolError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            password: password.to_string(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/{path}", self.base))
            .basic_auth(&self.owner, Some(&self.password))
    }
}

async fn api_error(response: Response) -> PoolError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    PoolError::Api {
        status,
        message: message.trim().to_string(),
    }
}

#[async_trait]
impl Broker for PoolClient {
    async fn acquire(
        &self,
        rtype: &str,
        from: &str,
        to: &str,
    ) -> Result<PoolResource, PoolError> {
        let response = self
            .post("acquire")
            .query(&[
                ("type", rtype),
                ("state", from),
                ("dest", to),
                ("owner", &self.owner),
            ])
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(PoolError::NoResource {
                rtype: rtype.to_string(),
                state: from.to_string(),
            }),
            status if status.is_success() => {
                let resource: PoolResource = response.json().await?;
                debug!(resource = %resource.name, rtype, "acquired resource");
                Ok(resource)
            }
            _ => Err(api_error(response).await),
        }
    }

    async fn update(
        &self,
        name: &str,
        state: &str,
        user_data: &BTreeMap<String, String>,
    ) -> Result<(), PoolError> {
        let response = self
            .post("update")
            .query(&[("name", name), ("state", state), ("owner", &self.owner)])
            .json(user_data)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        debug!(resource = %name, state, "updated resource");
        Ok(())
    }

    async fn release(&self, name: &str, dest: &str) -> Result<(), PoolError> {
        let response = self
            .post("release")
            .query(&[("name", name), ("dest", dest), ("owner", &self.owner)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        debug!(resource = %name, dest, "released resource");
        Ok(())
    }
}
