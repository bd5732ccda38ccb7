//! Fake broker and cleaner for loop scenario tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use poolsweep::cleanup::{Cleaner, CleanupContext};
use poolsweep::pool::{Broker, PoolError};
use poolsweep_common::PoolResource;

/// Build a resource record with the given attributes.
pub fn resource(name: &str, rtype: &str, state: &str, attrs: &[(&str, &str)]) -> PoolResource {
    PoolResource {
        name: name.to_string(),
        rtype: rtype.to_string(),
        state: state.to_string(),
        owner: "poolsweep".to_string(),
        user_data: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// Every broker interaction, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerCall {
    Acquire {
        rtype: String,
        from: String,
        to: String,
    },
    Update {
        name: String,
        state: String,
        user_data: BTreeMap<String, String>,
    },
    Release {
        name: String,
        dest: String,
    },
}

/// In-memory broker with scripted acquire responses.
///
/// Unscripted acquires report "no resource", matching a broker with an
/// empty pool; updates and releases always succeed and are recorded.
#[derive(Default)]
pub struct FakeBroker {
    scripted: Mutex<HashMap<(String, String), VecDeque<Result<PoolResource, PoolError>>>>,
    calls: Mutex<Vec<BrokerCall>>,
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next acquire of (`rtype`, `from`).
    pub fn push_acquire(&self, rtype: &str, from: &str, result: Result<PoolResource, PoolError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry((rtype.to_string(), from.to_string()))
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<BrokerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The (name, dest) of every release, in order.
    pub fn released(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BrokerCall::Release { name, dest } => Some((name, dest)),
                _ => None,
            })
            .collect()
    }

    /// The (name, state) of every update, in order.
    pub fn updated(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BrokerCall::Update { name, state, .. } => Some((name, state)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Broker for FakeBroker {
    async fn acquire(&self, rtype: &str, from: &str, to: &str) -> Result<PoolResource, PoolError> {
        self.calls.lock().unwrap().push(BrokerCall::Acquire {
            rtype: rtype.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(&(rtype.to_string(), from.to_string()))
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| {
            Err(PoolError::NoResource {
                rtype: rtype.to_string(),
                state: from.to_string(),
            })
        })
    }

    async fn update(
        &self,
        name: &str,
        state: &str,
        user_data: &BTreeMap<String, String>,
    ) -> Result<(), PoolError> {
        self.calls.lock().unwrap().push(BrokerCall::Update {
            name: name.to_string(),
            state: state.to_string(),
            user_data: user_data.clone(),
        });
        Ok(())
    }

    async fn release(&self, name: &str, dest: &str) -> Result<(), PoolError> {
        self.calls.lock().unwrap().push(BrokerCall::Release {
            name: name.to_string(),
            dest: dest.to_string(),
        });
        Ok(())
    }
}

/// Scriptable cleaner that records what it was asked to clean.
#[derive(Default)]
pub struct FakeCleaner {
    pub cleaned: Mutex<Vec<String>>,
    /// Resource names whose cleanup fails.
    pub fail_clean: Vec<String>,
    /// Resource names whose eligibility check fails.
    pub fail_eligibility: Vec<String>,
    /// Resource names considered tagged for parking.
    pub parked: Vec<String>,
    /// Attribute written during cleanup, standing in for key rotation.
    pub inject_attr: Option<(String, String)>,
}

impl FakeCleaner {
    pub fn cleaned(&self) -> Vec<String> {
        self.cleaned.lock().unwrap().clone()
    }
}

#[async_trait]
impl Cleaner for FakeCleaner {
    async fn clean(&self, ctx: &mut CleanupContext) -> Result<()> {
        let name = ctx.resource.name.clone();
        self.cleaned.lock().unwrap().push(name.clone());
        if self.fail_clean.contains(&name) {
            bail!("cleanup of {name} exploded");
        }
        if let Some((key, value)) = &self.inject_attr {
            ctx.resource.user_data.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn is_no_schedule(&self, resource: &PoolResource) -> Result<bool> {
        if self.fail_eligibility.contains(&resource.name) {
            bail!("eligibility check for {} exploded", resource.name);
        }
        Ok(self.parked.contains(&resource.name))
    }
}
