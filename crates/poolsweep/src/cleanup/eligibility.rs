//! Schedule-eligibility checking.
//!
//! Operators park a pooled resource by tagging its workspace no-schedule;
//! the daemon then keeps it out of the free pool until the tag disappears.
//! Only the metal family has a tagging-aware backend, so every other kind
//! reports "not parked" without any provider call.

use anyhow::{Context, Result};
use tracing::debug;

use poolsweep_common::defaults::NO_SCHEDULE_TAG;
use poolsweep_common::{Family, MetalScope, PoolResource};

use crate::stratus::{MetalClient, StratusContext, TagsClient};

/// Decides whether a resource should be parked instead of freed.
pub struct EligibilityChecker {
    stratus: StratusContext,
}

impl EligibilityChecker {
    pub fn new(stratus: &StratusContext) -> Self {
        Self {
            stratus: stratus.clone(),
        }
    }

    /// Whether the resource's workspace carries the no-schedule tag.
    pub async fn is_no_schedule(&self, resource: &PoolResource) -> Result<bool> {
        match Family::of(&resource.rtype) {
            Ok(Family::Metal) => {}
            _ => return Ok(false),
        }

        let scope = MetalScope::from_resource(resource)?;
        let workspace = MetalClient::new(&self.stratus, scope)
            .workspace()
            .await
            .with_context(|| format!("failed to fetch the workspace of {:?}", resource.name))?;
        let tags = TagsClient::new(&self.stratus)
            .attached_tags(&workspace.crn)
            .await
            .with_context(|| format!("failed to list tags of workspace {:?}", workspace.name))?;

        let parked = tags.iter().any(|tag| tag == NO_SCHEDULE_TAG);
        debug!(resource = %resource.name, workspace = %workspace.name, parked, "checked schedule eligibility");
        Ok(parked)
    }
}
