//! The pooled resource record, as served by the pool broker.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Broker-side lifecycle states the daemon cares about.
pub mod state {
    /// Clean and ready to be handed to a test job.
    pub const FREE: &str = "free";
    /// Returned by a test job, awaiting cleanup.
    pub const DIRTY: &str = "dirty";
    /// Checked out by the daemon for cleanup.
    pub const CLEANING: &str = "cleaning";
    /// Parked: held out of scheduling until its tag is removed.
    pub const NO_SCHEDULE: &str = "no-schedule";
}

/// One pooled resource.
///
/// The broker owns the record; the daemon only ever mutates `user_data`
/// (credential rotation rewrites the stored API key) and hands the record
/// back via update and release calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolResource {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub state: String,
    #[serde(default)]
    pub owner: String,
    /// Provider identifiers and credentials, keyed by attribute name.
    #[serde(default, rename = "userdata")]
    pub user_data: BTreeMap<String, String>,
}

impl PoolResource {
    /// Look up a single attribute from the resource's user data.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.user_data.get(key).map(String::as_str)
    }
}
