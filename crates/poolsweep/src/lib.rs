//! Cleanup daemon for pooled Stratus test resources.
//!
//! The daemon sits between a resource pool broker and the Stratus cloud
//! APIs: it checks dirty resources out of the pool, tears down everything a
//! test job left behind inside the resource's scope, rotates the resource's
//! API key, and checks the resource back in as free (or parked, when its
//! workspace is tagged to stay out of scheduling).
//!
//! - [`pool`]: the broker client and its checkout operations
//! - [`stratus`]: REST clients for the provider APIs
//! - [`cleanup`]: teardown steps and their per-kind dispatch
//! - [`orchestrator`]: the sweep and monitor loops
//! - [`wait`]: deletion-confirmation polling
//! - [`auth`]: secret file loading
//! - [`config`]: daemon configuration

pub mod auth;
pub mod cleanup;
pub mod config;
pub mod orchestrator;
pub mod pool;
pub mod stratus;
pub mod wait;
