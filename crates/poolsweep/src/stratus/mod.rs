//! REST clients for the Stratus cloud APIs.
//!
//! One shared [`StratusContext`] holds the HTTP client and API key; the
//! per-service clients are built from it with the scope an acquired
//! resource carries in its attributes.

pub mod context;
pub mod error;
pub mod identity;
pub mod metal;
pub mod paging;
pub mod tags;
pub mod vpc;

pub use context::StratusContext;
pub use error::ApiError;
pub use identity::IdentityClient;
pub use metal::MetalClient;
pub use tags::TagsClient;
pub use vpc::VpcClient;
