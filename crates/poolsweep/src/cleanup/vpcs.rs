//! VPC teardown, the last step of the VPC family.
//!
//! Only runs after instances, load balancers, and subnets are gone; the
//! API refuses to delete a network that still contains anything.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use poolsweep_common::VpcScope;

use super::{CleanupContext, TeardownStep};
use crate::stratus::{paging, StratusContext, VpcClient};

/// Deletes every emptied VPC in the scoped resource group.
pub struct Vpcs {
    stratus: StratusContext,
}

impl Vpcs {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            stratus: stratus.clone(),
        }
    }
}

#[async_trait]
impl TeardownStep for Vpcs {
    fn name(&self) -> &'static str {
        "vpcs"
    }

    async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        info!(resource = %ctx.resource.name, "cleaning up the VPCs");
        let scope = VpcScope::from_resource(&ctx.resource)?;
        let client = VpcClient::new(&self.stratus, scope);

        let vpcs = paging::collect_all(|cursor| client.list_vpcs(cursor))
            .await
            .context("failed to list the VPCs")?;
        for vpc in vpcs {
            client
                .delete_vpc(&vpc.id)
                .await
                .with_context(|| format!("failed to delete the VPC {:?}", vpc.name))?;
            info!(resource = %ctx.resource.name, vpc = %vpc.name, "deleted the VPC");
        }
        info!(resource = %ctx.resource.name, "cleaned up the VPCs");
        Ok(())
    }
}
