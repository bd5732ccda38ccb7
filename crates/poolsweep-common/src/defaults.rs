//! Defaults and well-known names used across the daemon.

use std::time::Duration;

/// Resource kinds managed when none are configured.
pub const DEFAULT_RESOURCE_TYPES: &[&str] = &["metal-sandbox", "vpc-sandbox"];

/// Identity the daemon presents to the pool broker.
pub const DEFAULT_OWNER: &str = "poolsweep";

/// Wait between sweep passes when a kind has nothing to clean.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Period of the parked-resource monitor.
pub const MONITOR_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Delay between checks when confirming an asynchronous deletion.
pub const CONFIRM_INTERVAL: Duration = Duration::from_secs(30);

/// Total time allowed for one asynchronous deletion to be confirmed.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(4 * 60);

/// Workspace tag that keeps a resource out of normal scheduling.
pub const NO_SCHEDULE_TAG: &str = "no-schedule";
