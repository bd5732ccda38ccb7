//! The primary acquire, clean, release loop.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use poolsweep_common::resource::state;

use crate::cleanup::{AttemptOptions, Cleaner, CleanupContext};
use crate::pool::Broker;

/// The primary cleanup loop.
///
/// One pass visits every configured kind and processes at most one resource
/// per kind. A kind with nothing to clean delays the pass by the sweep
/// interval; any other failure aborts the loop. The daemon runs under
/// supervision that restarts it, and an aborted attempt deliberately leaves
/// its resource checked out in the cleaning state for an operator to
/// inspect.
pub struct Sweeper<B, C> {
    broker: B,
    cleaner: C,
    resource_types: Vec<String>,
    interval: Duration,
    options: AttemptOptions,
}

impl<B: Broker, C: Cleaner> Sweeper<B, C> {
    pub fn new(
        broker: B,
        cleaner: C,
        resource_types: Vec<String>,
        interval: Duration,
        options: AttemptOptions,
    ) -> Self {
        Self {
            broker,
            cleaner,
            resource_types,
            interval,
            options,
        }
    }

    /// Run until the first fatal error.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.pass().await?;
        }
    }

    /// One round-robin pass over the configured kinds.
    pub async fn pass(&self) -> Result<()> {
        for rtype in &self.resource_types {
            self.sweep_kind(rtype).await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(resource = tracing::field::Empty))]
    async fn sweep_kind(&self, rtype: &str) -> Result<()> {
        let resource = match self
            .broker
            .acquire(rtype, state::DIRTY, state::CLEANING)
            .await
        {
            Ok(resource) => resource,
            Err(e) if e.is_no_resource() => {
                info!(rtype, "no dirty resource to clean, sleeping");
                tokio::time::sleep(self.interval).await;
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to acquire a dirty {rtype} resource"));
            }
        };
        tracing::Span::current().record("resource", tracing::field::display(&resource.name));
        info!(resource = %resource.name, "acquired resource for cleaning");

        let mut ctx = CleanupContext::new(resource, &self.options);
        self.cleaner
            .clean(&mut ctx)
            .await
            .with_context(|| format!("failed to clean resource {:?}", ctx.resource.name))?;

        // Rotation may have rewritten attributes; persist them before the
        // resource can change hands.
        self.broker
            .update(&ctx.resource.name, state::CLEANING, &ctx.resource.user_data)
            .await
            .with_context(|| format!("failed to update resource {:?}", ctx.resource.name))?;

        let parked = self
            .cleaner
            .is_no_schedule(&ctx.resource)
            .await
            .with_context(|| {
                format!(
                    "failed to check schedule eligibility of {:?}",
                    ctx.resource.name
                )
            })?;
        let dest = if parked {
            state::NO_SCHEDULE
        } else {
            state::FREE
        };

        self.broker
            .release(&ctx.resource.name, dest)
            .await
            .with_context(|| format!("failed to release resource {:?} to {dest}", ctx.resource.name))?;
        info!(resource = %ctx.resource.name, state = dest, "released resource");
        Ok(())
    }
}
