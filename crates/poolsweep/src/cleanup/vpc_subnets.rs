//! Subnet, public gateway, and floating IP teardown for the VPC family.
//!
//! A subnet cannot be deleted while a public gateway hangs off it, so the
//! gateway is detached and deleted first. Floating IPs come afterwards:
//! instance teardown strands the addresses that were bound to deleted
//! interfaces, and stranded addresses bill until someone removes them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use poolsweep_common::VpcScope;

use super::{CleanupContext, TeardownStep};
use crate::stratus::{paging, StratusContext, VpcClient};

/// Deletes the scoped subnets, their gateways, and leftover floating IPs.
pub struct VpcSubnets {
    stratus: StratusContext,
}

impl VpcSubnets {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            stratus: stratus.clone(),
        }
    }
}

#[async_trait]
impl TeardownStep for VpcSubnets {
    fn name(&self) -> &'static str {
        "vpc-subnets"
    }

    async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        info!(resource = %ctx.resource.name, "cleaning up the subnets");
        let scope = VpcScope::from_resource(&ctx.resource)?;
        let client = VpcClient::new(&self.stratus, scope);

        let subnets = paging::collect_all(|cursor| client.list_subnets(cursor))
            .await
            .context("failed to list the subnets")?;
        for subnet in subnets {
            let gateway = match client.subnet_public_gateway(&subnet.id).await {
                Ok(gateway) => Some(gateway),
                Err(e) if e.is_not_found() => None,
                Err(e) => {
                    return Err(anyhow::Error::from(e).context(format!(
                        "failed to look up the gateway of subnet {:?}",
                        subnet.name
                    )));
                }
            };
            if let Some(gateway) = gateway {
                client
                    .detach_subnet_public_gateway(&subnet.id)
                    .await
                    .with_context(|| {
                        format!("failed to detach the gateway from subnet {:?}", subnet.name)
                    })?;
                client
                    .delete_public_gateway(&gateway.id)
                    .await
                    .with_context(|| {
                        format!("failed to delete the public gateway {:?}", gateway.name)
                    })?;
                info!(resource = %ctx.resource.name, gateway = %gateway.name, "deleted the public gateway");
            }
            client
                .delete_subnet(&subnet.id)
                .await
                .with_context(|| format!("failed to delete the subnet {:?}", subnet.name))?;
            info!(resource = %ctx.resource.name, subnet = %subnet.name, "deleted the subnet");
        }

        // With a protected network in scope, bound addresses belong to it
        // and stay; without one, the whole group is being emptied.
        let keep_bound = client.scope().vpc_id.is_some();
        let addresses = paging::collect_all(|cursor| client.list_floating_ips(cursor))
            .await
            .context("failed to list the floating IPs")?;
        for address in addresses {
            if keep_bound && address.target.is_some() {
                continue;
            }
            client
                .delete_floating_ip(&address.id)
                .await
                .with_context(|| format!("failed to delete the floating IP {:?}", address.name))?;
            info!(resource = %ctx.resource.name, floating_ip = %address.name, "deleted the floating IP");
        }

        info!(resource = %ctx.resource.name, "cleaned up the subnets");
        Ok(())
    }
}
