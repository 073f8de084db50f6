//! Remote call interface between object handles and the platform transport.

mod error;

pub mod call;
pub mod client;
pub mod codec;
pub mod transport;

pub use call::RemoteCall;
pub use client::KindClient;
pub use error::CodecError;
pub use transport::Transport;
