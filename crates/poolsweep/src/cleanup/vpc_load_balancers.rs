//! Load balancer teardown for the VPC family.
//!
//! Two things make this step the odd one out. The load balancer API cannot
//! filter listings server-side, so scope filtering happens here: without a
//! protected network the owning resource group decides, with one every
//! balancer touching that network is left alone. And deletion is
//! asynchronous on the provider side, so triggered deletions are confirmed
//! gone before the step reports success; subnet teardown would otherwise
//! trip over balancers still draining.
//!
//! Failures on individual balancers are collected rather than aborting, so
//! one stuck balancer cannot shield the rest of the region from cleanup.

use anyhow::Result;
use async_trait::async_trait;
use futures::{pin_mut, TryStreamExt};
use tracing::{info, warn};

use poolsweep_common::VpcScope;

use super::{CleanupContext, TeardownStep};
use crate::stratus::vpc::LoadBalancer;
use crate::stratus::{paging, StratusContext, VpcClient};
use crate::wait::{self, MultiError, PollConfig};

/// Deletes every in-scope load balancer and waits the deletions out.
pub struct VpcLoadBalancers {
    stratus: StratusContext,
    poll: PollConfig,
}

impl VpcLoadBalancers {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            stratus: stratus.clone(),
            poll: PollConfig::default(),
        }
    }

    /// Resolve which network each subnet of `lb` sits on and decide whether
    /// the balancer is out of scope. Resolution failures are collected and
    /// do not veto the remaining subnets.
    async fn should_skip(
        &self,
        client: &VpcClient,
        lb: &LoadBalancer,
        errs: &mut Vec<anyhow::Error>,
    ) -> bool {
        let Some(protected) = client.scope().vpc_id.as_deref() else {
            return !owned_by_group(lb, &client.scope().resource_group);
        };

        if lb.subnets.is_empty() {
            warn!(load_balancer = %lb.name, "load balancer has no attached subnets, assuming stale");
        }
        let mut resolved = Vec::new();
        for subnet_ref in &lb.subnets {
            match client.subnet(&subnet_ref.id).await {
                Ok(subnet) => {
                    if let Some(vpc) = subnet.vpc {
                        resolved.push(vpc.id);
                    }
                }
                Err(e) => {
                    warn!(load_balancer = %lb.name, subnet = %subnet_ref.id, error = ?e, "failed to resolve a load balancer subnet");
                    errs.push(anyhow::Error::from(e).context(format!(
                        "failed to resolve subnet {} of load balancer {}",
                        subnet_ref.id, lb.name
                    )));
                }
            }
        }
        attached_to_network(&resolved, protected)
    }
}

/// Whether any resolved subnet puts the balancer on the protected network.
fn attached_to_network(resolved_vpcs: &[String], protected_vpc: &str) -> bool {
    resolved_vpcs.iter().any(|vpc| vpc == protected_vpc)
}

/// Whether the balancer is owned by the scoped resource group.
fn owned_by_group(lb: &LoadBalancer, resource_group: &str) -> bool {
    lb.resource_group
        .as_ref()
        .is_some_and(|group| group.id == resource_group)
}

#[async_trait]
impl TeardownStep for VpcLoadBalancers {
    fn name(&self) -> &'static str {
        "vpc-load-balancers"
    }

    async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        info!(resource = %ctx.resource.name, "cleaning up the load balancers");
        let scope = VpcScope::from_resource(&ctx.resource)?;
        let client = VpcClient::new(&self.stratus, scope);

        let mut deleted: Vec<String> = Vec::new();
        let mut errs: Vec<anyhow::Error> = Vec::new();

        let pages = paging::pages(|cursor| client.list_load_balancers(cursor));
        pin_mut!(pages);
        loop {
            let balancers = match pages.try_next().await {
                Ok(Some(balancers)) => balancers,
                Ok(None) => break,
                Err(e) => {
                    errs.push(e.context("failed to list the load balancers"));
                    break;
                }
            };
            for lb in balancers {
                if self.should_skip(&client, &lb, &mut errs).await {
                    continue;
                }
                match client.delete_load_balancer(&lb.id).await {
                    Ok(()) => {
                        info!(resource = %ctx.resource.name, load_balancer = %lb.name, "triggered load balancer deletion");
                        deleted.push(lb.id);
                    }
                    Err(e) => {
                        warn!(load_balancer = %lb.name, error = ?e, "failed to delete the load balancer");
                        errs.push(anyhow::Error::from(e).context(format!(
                            "failed to delete load balancer {:?}",
                            lb.name
                        )));
                    }
                }
            }
        }

        let confirmations = wait::confirm_all_deleted(self.poll, "load balancer", deleted, |id| {
            let client = &client;
            async move {
                match client.load_balancer(&id).await {
                    Ok(_) => Ok(false),
                    Err(e) if e.is_not_found() => Ok(true),
                    Err(e) => Err(e.into()),
                }
            }
        })
        .await;
        errs.extend(confirmations);

        MultiError::check(errs)?;
        info!(resource = %ctx.resource.name, "cleaned up the load balancers");
        Ok(())
    }
}
