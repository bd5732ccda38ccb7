//! The daemon's two long-running loops.
//!
//! The [`Sweeper`] turns dirty resources into free ones; the [`Monitor`]
//! periodically re-examines parked resources. Both see the broker and the
//! cleaner only through their traits.

mod monitor;
mod sweeper;

pub use monitor::Monitor;
pub use sweeper::Sweeper;
