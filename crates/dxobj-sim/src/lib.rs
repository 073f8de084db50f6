//! In-memory simulation of the object platform for tests.
//!
//! [`SimPlatform`] implements [`dxobj_remote::Transport`], so any handle built on a
//! [`dxobj_remote::KindClient`] can run against it unchanged.

mod platform;
mod state;

pub use platform::SimPlatform;
pub use state::SimConfig;
