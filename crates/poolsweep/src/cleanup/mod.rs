//! Teardown steps and their per-kind dispatch.
//!
//! Cleanup of one resource is an ordered sequence of steps resolved from
//! the resource's kind family, followed by global steps that apply to every
//! kind. Step order within a family is load-bearing and registered in one
//! place, [`CleanupPlan::new`].

pub mod context;
mod credentials;
mod eligibility;
mod metal_instances;
mod metal_networks;
mod vpc_instances;
mod vpc_load_balancers;
mod vpc_subnets;
mod vpcs;

pub use context::{AttemptOptions, CleanupContext};
pub use eligibility::EligibilityChecker;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use poolsweep_common::{Family, PoolResource};

use crate::stratus::StratusContext;

/// One unit of provider-side cleanup.
#[async_trait]
pub trait TeardownStep: Send + Sync {
    /// Step name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Run the step against the attempt's resource.
    async fn run(&self, ctx: &mut CleanupContext) -> Result<()>;
}

/// Cleans acquired resources and judges their parking eligibility.
///
/// The orchestrator loops only ever see this trait, which keeps them
/// testable without a cloud behind them.
#[async_trait]
pub trait Cleaner: Send + Sync {
    /// Tear down everything a test job left inside the resource's scope.
    async fn clean(&self, ctx: &mut CleanupContext) -> Result<()>;

    /// Whether the resource should be parked instead of returned to use.
    async fn is_no_schedule(&self, resource: &PoolResource) -> Result<bool>;
}

#[async_trait]
impl<C: Cleaner + ?Sized> Cleaner for Arc<C> {
    async fn clean(&self, ctx: &mut CleanupContext) -> Result<()> {
        (**self).clean(ctx).await
    }

    async fn is_no_schedule(&self, resource: &PoolResource) -> Result<bool> {
        (**self).is_no_schedule(resource).await
    }
}

/// Ordered teardown steps per kind family, plus trailing global steps.
pub struct CleanupPlan {
    kind_steps: HashMap<Family, Vec<Box<dyn TeardownStep>>>,
    global_steps: Vec<Box<dyn TeardownStep>>,
}

impl CleanupPlan {
    /// Register the teardown steps for both provider families.
    ///
    /// VPC order matters: load balancers hold subnets, so they are deleted
    /// and confirmed gone before subnet teardown, and VPCs go last once
    /// emptied. Metal networks likewise outlive their instances.
    pub fn new(stratus: &StratusContext) -> Self {
        let mut kind_steps: HashMap<Family, Vec<Box<dyn TeardownStep>>> = HashMap::new();
        kind_steps.insert(
            Family::Vpc,
            vec![
                Box::new(vpc_instances::VpcInstances::new(stratus)),
                Box::new(vpc_load_balancers::VpcLoadBalancers::new(stratus)),
                Box::new(vpc_subnets::VpcSubnets::new(stratus)),
                Box::new(vpcs::Vpcs::new(stratus)),
            ],
        );
        kind_steps.insert(
            Family::Metal,
            vec![
                Box::new(metal_instances::MetalInstances::new(stratus)),
                Box::new(metal_networks::MetalNetworks::new(stratus)),
            ],
        );
        let global_steps: Vec<Box<dyn TeardownStep>> =
            vec![Box::new(credentials::RotateApiKey::new(stratus))];
        Self {
            kind_steps,
            global_steps,
        }
    }

    /// Run every step for the resource's kind, then the global steps.
    ///
    /// Steps run strictly in registration order and the first failure
    /// aborts everything after it. Global steps are skipped when the
    /// attempt has credential rotation disabled.
    pub async fn run(&self, ctx: &mut CleanupContext) -> Result<()> {
        let family = Family::of(&ctx.resource.rtype)?;
        let steps = self
            .kind_steps
            .get(&family)
            .with_context(|| format!("no teardown steps registered for the {family} family"))?;

        for step in steps {
            if ctx.debug {
                debug!(resource = %ctx.resource.name, step = step.name(), "starting teardown step");
            }
            step.run(ctx)
                .await
                .with_context(|| format!("teardown step {:?} failed", step.name()))?;
        }

        if !ctx.rotate_credentials {
            info!(resource = %ctx.resource.name, "credential rotation disabled, skipping global steps");
            return Ok(());
        }
        for step in &self.global_steps {
            step.run(ctx)
                .await
                .with_context(|| format!("global step {:?} failed", step.name()))?;
        }
        Ok(())
    }
}

/// The production cleaner: the startup-built plan plus the tag-driven
/// eligibility check.
pub struct StratusCleaner {
    plan: CleanupPlan,
    eligibility: EligibilityChecker,
}

impl StratusCleaner {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            plan: CleanupPlan::new(stratus),
            eligibility: EligibilityChecker::new(stratus),
        }
    }
}

#[async_trait]
impl Cleaner for StratusCleaner {
    async fn clean(&self, ctx: &mut CleanupContext) -> Result<()> {
        self.plan.run(ctx).await
    }

    async fn is_no_schedule(&self, resource: &PoolResource) -> Result<bool> {
        self.eligibility.is_no_schedule(resource).await
    }
}
