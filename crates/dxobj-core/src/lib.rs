//! Identifiers, links and payload types shared by every object handle.

pub mod errors;
pub mod ids;
pub mod link;
pub mod protocol;
pub mod time;
pub mod workspace;

pub use errors::{ErrorCode, IdError, RemoteError};
pub use ids::{ObjectId, ObjectKind, ProjectId};
pub use link::{LINK_KEY, ObjectLink, make_link};
pub use protocol::{Description, JobDescription, JobState, ObjectState, Operation};
pub use time::now_ms;
pub use workspace::Workspace;
