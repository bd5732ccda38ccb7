//! Per-attempt cleanup state.

use anyhow::{Context, Result};

use poolsweep_common::PoolResource;

use crate::stratus::IdentityClient;

/// Options applied to every cleanup attempt, fixed at startup.
#[derive(Debug, Clone)]
pub struct AttemptOptions {
    /// Fixed account id, skipping per-attempt resolution.
    pub account_id: Option<String>,
    /// Log provider API calls.
    pub debug: bool,
    /// Rotate the resource's API key after kind-specific cleanup.
    pub rotate_credentials: bool,
}

impl Default for AttemptOptions {
    fn default() -> Self {
        Self {
            account_id: None,
            debug: false,
            rotate_credentials: true,
        }
    }
}

/// State owned by a single cleanup attempt.
///
/// Built fresh for every acquired resource and threaded mutably through the
/// teardown steps, so one attempt can never observe another attempt's
/// lookups or attribute rewrites.
#[derive(Debug)]
pub struct CleanupContext {
    /// The acquired resource; steps may rewrite its attributes.
    pub resource: PoolResource,
    /// Log provider interactions for this attempt.
    pub debug: bool,
    /// Run the credential rotation steps after kind cleanup.
    pub rotate_credentials: bool,
    account: Option<String>,
}

impl CleanupContext {
    pub fn new(resource: PoolResource, options: &AttemptOptions) -> Self {
        Self {
            resource,
            debug: options.debug,
            rotate_credentials: options.rotate_credentials,
            account: options.account_id.clone(),
        }
    }

    /// Account owning the pooled resources.
    ///
    /// The configured override wins; otherwise the account is resolved from
    /// the daemon's own API key once and cached for the rest of the attempt.
    pub async fn account_id(&mut self, identity: &IdentityClient) -> Result<String> {
        if let Some(account) = &self.account {
            return Ok(account.clone());
        }
        let account = identity
            .account_id()
            .await
            .context("failed to resolve the account from the API key")?;
        self.account = Some(account.clone());
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::stratus::StratusContext;

    use super::*;

    fn resource() -> PoolResource {
        PoolResource {
            name: "pool-01".to_string(),
            rtype: "vpc-sandbox".to_string(),
            state: "cleaning".to_string(),
            owner: "poolsweep".to_string(),
            user_data: BTreeMap::new(),
        }
    }

    #[test]
    fn context_copies_the_attempt_options() {
        let options = AttemptOptions {
            account_id: Some("acct-1".to_string()),
            debug: true,
            rotate_credentials: false,
        };
        let ctx = CleanupContext::new(resource(), &options);
        assert!(ctx.debug);
        assert!(!ctx.rotate_credentials);
    }

    #[tokio::test]
    async fn a_fixed_account_id_skips_resolution() {
        let stratus = StratusContext::new("test-key".to_string(), false).unwrap();
        let identity = IdentityClient::new(&stratus);
        let options = AttemptOptions {
            account_id: Some("acct-1".to_string()),
            ..Default::default()
        };
        let mut ctx = CleanupContext::new(resource(), &options);
        let account = ctx.account_id(&identity).await.unwrap();
        assert_eq!(account, "acct-1");
    }

    #[test]
    fn rotation_is_on_by_default() {
        assert!(AttemptOptions::default().rotate_credentials);
    }
}
