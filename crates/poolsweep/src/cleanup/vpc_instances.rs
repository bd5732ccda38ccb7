//! Virtual server instance teardown for the VPC family.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use poolsweep_common::VpcScope;

use super::{CleanupContext, TeardownStep};
use crate::stratus::{paging, StratusContext, VpcClient};

/// Deletes every virtual server instance in the scoped resource group.
pub struct VpcInstances {
    stratus: StratusContext,
}

impl VpcInstances {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            stratus: stratus.clone(),
        }
    }
}

#[async_trait]
impl TeardownStep for VpcInstances {
    fn name(&self) -> &'static str {
        "vpc-instances"
    }

    async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        info!(resource = %ctx.resource.name, "cleaning up the virtual server instances");
        let scope = VpcScope::from_resource(&ctx.resource)?;
        let client = VpcClient::new(&self.stratus, scope);

        let instances = paging::collect_all(|cursor| client.list_instances(cursor))
            .await
            .context("failed to list the instances")?;
        for instance in instances {
            client
                .delete_instance(&instance.id)
                .await
                .with_context(|| format!("failed to delete the instance {:?}", instance.name))?;
            info!(resource = %ctx.resource.name, instance = %instance.name, "deleted the instance");
        }
        info!(resource = %ctx.resource.name, "cleaned up the virtual server instances");
        Ok(())
    }
}
