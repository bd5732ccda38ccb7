//! Periodic re-evaluation of parked resources.
//!
//! Parking is driven by an out-of-band workspace tag, so nothing notifies
//! the daemon when an operator removes it. The monitor wakes once a period,
//! pulls one parked resource per kind, and either re-parks it or hands it
//! back to the cleanup rotation.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use poolsweep_common::resource::state;

use crate::cleanup::Cleaner;
use crate::pool::Broker;

/// The parked-resource re-check loop.
///
/// Unlike the sweeper, every failure here is logged and swallowed: a broker
/// hiccup or one misconfigured kind must not stall re-checks for the rest,
/// and nothing the monitor does is urgent enough to die for.
pub struct Monitor<B, C> {
    broker: B,
    cleaner: C,
    resource_types: Vec<String>,
    period: Duration,
}

impl<B: Broker, C: Cleaner> Monitor<B, C> {
    pub fn new(broker: B, cleaner: C, resource_types: Vec<String>, period: Duration) -> Self {
        Self {
            broker,
            cleaner,
            resource_types,
            period,
        }
    }

    /// Run forever.
    pub async fn run(&self) {
        loop {
            self.tick().await;
            info!("parked resource re-check done, sleeping");
            tokio::time::sleep(self.period).await;
        }
    }

    /// One re-check sweep over the configured kinds.
    pub async fn tick(&self) {
        for rtype in &self.resource_types {
            if let Err(e) = self.recheck_kind(rtype).await {
                warn!(rtype, error = ?e, "parked resource re-check failed");
            }
        }
    }

    #[tracing::instrument(skip(self), fields(resource = tracing::field::Empty))]
    async fn recheck_kind(&self, rtype: &str) -> Result<()> {
        let resource = match self
            .broker
            .acquire(rtype, state::NO_SCHEDULE, state::CLEANING)
            .await
        {
            Ok(resource) => resource,
            Err(e) if e.is_no_resource() => {
                info!(rtype, "no parked resource to re-check");
                return Ok(());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to acquire a parked {rtype} resource"));
            }
        };
        tracing::Span::current().record("resource", tracing::field::display(&resource.name));

        let parked = self
            .cleaner
            .is_no_schedule(&resource)
            .await
            .with_context(|| {
                format!("failed to check schedule eligibility of {:?}", resource.name)
            })?;

        if parked {
            // Still tagged; parking again is idempotent.
            self.broker
                .release(&resource.name, state::NO_SCHEDULE)
                .await
                .with_context(|| format!("failed to re-park resource {:?}", resource.name))?;
            info!(resource = %resource.name, "workspace still tagged, left parked");
        } else {
            self.broker
                .release(&resource.name, state::DIRTY)
                .await
                .with_context(|| {
                    format!("failed to return resource {:?} for cleanup", resource.name)
                })?;
            info!(resource = %resource.name, "tag removed, returned to the cleanup rotation");
        }
        Ok(())
    }
}
