//! Handles to remote, versioned data objects.
//!
//! [`DataObject`] carries the identity and metadata operations every object kind shares;
//! [`Record`] and [`Job`] are the concrete kinds built on it. All calls block the invoking
//! thread and go through a [`dxobj_remote::RemoteCall`] implementation.

mod error;

pub mod handle;
pub mod job;
pub mod record;
pub mod waiter;

pub use dxobj_core::{
    Description, ObjectId, ObjectLink, ObjectState, ProjectId, Workspace, make_link,
};
pub use error::HandleError;
pub use handle::{DataObject, DescribeOptions};
pub use job::{Job, NewJob};
pub use record::{NewRecord, Record};
pub use waiter::{
    Clock, DEFAULT_WAIT_TIMEOUT, MIN_POLL_INTERVAL, PollPolicy, StateProbe, StateWaiter,
    SystemClock,
};
