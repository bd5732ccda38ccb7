//! Types shared by the poolsweep daemon and its tooling.
//!
//! - [`resource`]: the pooled resource record as the broker serves it
//! - [`scope`]: provider scopes parsed out of resource attributes
//! - [`defaults`]: timing constants, default kinds, and well-known names

pub mod defaults;
pub mod resource;
pub mod scope;

pub use resource::PoolResource;
pub use scope::{Family, MetalScope, ScopeError, VpcScope};
