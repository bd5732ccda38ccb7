//! Compute instance teardown for the metal family.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use poolsweep_common::MetalScope;

use super::{CleanupContext, TeardownStep};
use crate::stratus::{MetalClient, StratusContext};

/// Deletes every instance in the scoped workspace.
pub struct MetalInstances {
    stratus: StratusContext,
}

impl MetalInstances {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            stratus: stratus.clone(),
        }
    }
}

#[async_trait]
impl TeardownStep for MetalInstances {
    fn name(&self) -> &'static str {
        "metal-instances"
    }

    async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        info!(resource = %ctx.resource.name, "cleaning up the metal instances");
        let scope = MetalScope::from_resource(&ctx.resource)?;
        let client = MetalClient::new(&self.stratus, scope);

        let instances = client
            .list_instances()
            .await
            .context("failed to list the instances")?;
        for instance in instances {
            client
                .delete_instance(&instance.id)
                .await
                .with_context(|| format!("failed to delete the instance {:?}", instance.name))?;
            info!(resource = %ctx.resource.name, instance = %instance.name, "deleted the instance");
        }
        info!(resource = %ctx.resource.name, "cleaned up the metal instances");
        Ok(())
    }
}
