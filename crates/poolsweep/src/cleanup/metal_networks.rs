//! Network teardown for the metal family.
//!
//! A network cannot be deleted while ports are still attached to it, so
//! every port goes first.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use poolsweep_common::MetalScope;

use super::{CleanupContext, TeardownStep};
use crate::stratus::{MetalClient, StratusContext};

/// Deletes every network in the scoped workspace, ports included.
pub struct MetalNetworks {
    stratus: StratusContext,
}

impl MetalNetworks {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            stratus: stratus.clone(),
        }
    }
}

#[async_trait]
impl TeardownStep for MetalNetworks {
    fn name(&self) -> &'static str {
        "metal-networks"
    }

    async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        info!(resource = %ctx.resource.name, "cleaning up the metal networks");
        let scope = MetalScope::from_resource(&ctx.resource)?;
        let client = MetalClient::new(&self.stratus, scope);

        let networks = client
            .list_networks()
            .await
            .context("failed to list the networks")?;
        for network in networks {
            let ports = client.list_ports(&network.id).await.with_context(|| {
                format!("failed to list the ports of network {:?}", network.name)
            })?;
            for port in ports {
                client
                    .delete_port(&network.id, &port.id)
                    .await
                    .with_context(|| {
                        format!(
                            "failed to delete port {:?} of network {:?}",
                            port.id, network.name
                        )
                    })?;
            }
            client
                .delete_network(&network.id)
                .await
                .with_context(|| format!("failed to delete the network {:?}", network.name))?;
            info!(resource = %ctx.resource.name, network = %network.name, "deleted the network");
        }
        info!(resource = %ctx.resource.name, "cleaned up the metal networks");
        Ok(())
    }
}
