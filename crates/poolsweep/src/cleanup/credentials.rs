//! API key rotation for pooled resources.
//!
//! Every pooled resource has a service identity of the same name. After a
//! resource is cleaned, all of that identity's keys are retired and one
//! fresh key is issued, so no test job ever starts with a credential a
//! previous job held. The new secret goes into the resource's attributes
//! and reaches the broker with the next update.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use poolsweep_common::scope::ATTR_API_KEY;

use super::{CleanupContext, TeardownStep};
use crate::stratus::{IdentityClient, StratusContext};

/// Rotates the API key of the resource's service identity.
pub struct RotateApiKey {
    identity: IdentityClient,
}

impl RotateApiKey {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            identity: IdentityClient::new(stratus),
        }
    }
}

/// Key names carry a short random suffix so every rotation is traceable.
fn fresh_key_name() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("test-key-{}", &suffix[..8])
}

#[async_trait]
impl TeardownStep for RotateApiKey {
    fn name(&self) -> &'static str {
        "rotate-api-key"
    }

    async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        info!(resource = %ctx.resource.name, "rotating the resource API key");
        let account = ctx.account_id(&self.identity).await?;
        let name = ctx.resource.name.clone();

        let mut matches = self
            .identity
            .list_service_ids(&account, &name)
            .await
            .context("failed to list the service identities")?;
        let service = match matches.len() {
            0 => bail!("no service identity named {name:?}"),
            1 => matches.remove(0),
            n => bail!("expected one service identity named {name:?}, found {n}"),
        };

        let keys = self
            .identity
            .list_api_keys(&account, &service.iam_id)
            .await
            .context("failed to list the service identity's API keys")?;
        for key in keys {
            self.identity
                .delete_api_key(&key.id)
                .await
                .with_context(|| format!("failed to delete API key {:?}", key.name))?;
        }

        let created = self
            .identity
            .create_api_key(&fresh_key_name(), &service.iam_id)
            .await
            .context("failed to create a replacement API key")?;
        ctx.resource
            .user_data
            .insert(ATTR_API_KEY.to_string(), created.api_key);
        info!(resource = %ctx.resource.name, key = %created.name, "issued a fresh API key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_are_prefixed_and_unique() {
        let first = fresh_key_name();
        let second = fresh_key_name();
        assert!(first.starts_with("test-key-"));
        assert_eq!(first.len(), "test-key-".len() + 8);
        assert_ne!(first, second);
    }
}
