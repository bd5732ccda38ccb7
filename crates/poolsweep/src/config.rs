//! Daemon configuration.

use std::path::PathBuf;
use std::time::Duration;

use poolsweep_common::defaults;

use crate::cleanup::AttemptOptions;

/// Connection settings for the pool broker.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Broker base URL.
    pub url: String,
    /// Identity the daemon presents to the broker.
    pub owner: String,
    /// File holding the broker password.
    pub password_file: PathBuf,
}

/// Provider access settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// File holding the provider API key.
    pub credentials_file: PathBuf,
    /// Log provider API calls.
    pub debug: bool,
}

/// Everything the daemon needs to run.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub pool: PoolConfig,
    pub provider: ProviderConfig,
    /// Resource kinds to manage, in pass order.
    pub resource_types: Vec<String>,
    /// Wait between passes when a kind has nothing to clean.
    pub sweep_interval: Duration,
    /// Period of the parked-resource monitor.
    pub monitor_period: Duration,
    /// Fixed account id; resolved per attempt when absent.
    pub account_id: Option<String>,
    /// Skip API key rotation after cleanup.
    pub skip_rotation: bool,
}

impl SweepConfig {
    /// Per-attempt options derived from the configuration.
    pub fn attempt_options(&self) -> AttemptOptions {
        AttemptOptions {
            account_id: self.account_id.clone(),
            debug: self.provider.debug,
            rotate_credentials: !self.skip_rotation,
        }
    }

    /// Resource kinds to manage, falling back to the defaults.
    pub fn effective_resource_types(kinds: Vec<String>) -> Vec<String> {
        if kinds.is_empty() {
            defaults::DEFAULT_RESOURCE_TYPES
                .iter()
                .map(|kind| kind.to_string())
                .collect()
        } else {
            kinds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(skip_rotation: bool) -> SweepConfig {
        SweepConfig {
            pool: PoolConfig {
                url: "http://broker.test".to_string(),
                owner: "poolsweep".to_string(),
                password_file: PathBuf::from("/etc/poolsweep/password"),
            },
            provider: ProviderConfig {
                credentials_file: PathBuf::from("/etc/poolsweep/api-key"),
                debug: true,
            },
            resource_types: vec!["vpc-sandbox".to_string()],
            sweep_interval: defaults::SWEEP_INTERVAL,
            monitor_period: defaults::MONITOR_PERIOD,
            account_id: Some("acct-1".to_string()),
            skip_rotation,
        }
    }

    #[test]
    fn attempt_options_mirror_the_config() {
        let options = config(false).attempt_options();
        assert_eq!(options.account_id.as_deref(), Some("acct-1"));
        assert!(options.debug);
        assert!(options.rotate_credentials);

        assert!(!config(true).attempt_options().rotate_credentials);
    }

    #[test]
    fn empty_kind_lists_fall_back_to_the_defaults() {
        let kinds = SweepConfig::effective_resource_types(Vec::new());
        assert_eq!(kinds, vec!["metal-sandbox", "vpc-sandbox"]);

        let explicit =
            SweepConfig::effective_resource_types(vec!["metal-large".to_string()]);
        assert_eq!(explicit, vec!["metal-large"]);
    }
}
