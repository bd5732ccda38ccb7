//! Deletion-confirmation polling.
//!
//! Several provider deletions only trigger the removal; the entity lingers
//! until the backend finishes draining it. Steps that must not hand work to
//! their successors early poll here until the entity is gone or a deadline
//! passes.

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Result};
use thiserror::Error;
use tracing::{debug, warn};

use poolsweep_common::defaults;

/// Timing of one deadline-bounded poll.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Fixed delay between checks.
    pub interval: Duration,
    /// Total time allowed before the wait fails.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: defaults::CONFIRM_INTERVAL,
            timeout: defaults::CONFIRM_TIMEOUT,
        }
    }
}

/// Poll `check` at a fixed interval until it reports done or the deadline
/// passes.
///
/// The first check runs immediately. `check` returns `Ok(true)` when the
/// condition holds, `Ok(false)` to keep waiting, and `Err` to abort the
/// whole wait.
pub async fn poll_until<F, Fut>(config: PollConfig, check: F, what: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = tokio::time::Instant::now();
    let mut attempts = 0u32;

    loop {
        if start.elapsed() >= config.timeout {
            bail!(
                "timed out waiting for {what} after {:?} ({attempts} attempts)",
                config.timeout
            );
        }
        attempts += 1;
        match check().await {
            Ok(true) => {
                debug!(what, attempts, "condition met");
                return Ok(());
            }
            Ok(false) => tokio::time::sleep(config.interval).await,
            Err(e) => {
                warn!(what, error = ?e, "poll check failed");
                return Err(e);
            }
        }
    }
}

/// Confirm a batch of triggered deletions, one poll per identifier.
///
/// `gone` reports whether the identified entity has disappeared. All polls
/// run concurrently; per-identifier failures are collected rather than
/// short-circuiting, so one stuck entity cannot hide another.
pub async fn confirm_all_deleted<F, Fut>(
    config: PollConfig,
    entity_kind: &str,
    ids: Vec<String>,
    gone: F,
) -> Vec<anyhow::Error>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let gone = &gone;
    let checks = ids.into_iter().map(|id| async move {
        let what = format!("{entity_kind} {id} to disappear");
        poll_until(config, || gone(id.clone()), &what)
            .await
            .map_err(|e| e.context(format!("deletion of {entity_kind} {id} was not confirmed")))
            .err()
    });
    futures::future::join_all(checks)
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Failures collected from independent operations within one step.
#[derive(Debug, Error)]
#[error("{} operation(s) failed: [{}]", errors.len(), render(errors))]
pub struct MultiError {
    errors: Vec<anyhow::Error>,
}

impl MultiError {
    /// Wrap the collected failures, or `Ok` when there are none.
    pub fn check(errors: Vec<anyhow::Error>) -> Result<(), MultiError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MultiError { errors })
        }
    }

    pub fn errors(&self) -> &[anyhow::Error] {
        &self.errors
    }
}

fn render(errors: &[anyhow::Error]) -> String {
    errors
        .iter()
        .map(|e| format!("{e:#}"))
        .collect::<Vec<_>>()
        .join("; ")
}
