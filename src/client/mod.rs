//! Client side of the protocol: transport, session handles, and debug
//! artifact routing.
//!
//! The client performs no retries and no polling. Pool saturation and
//! session expiry surface as typed errors ([`crate::Error`]) for the
//! caller to handle; backing off after a concurrency rejection is the
//! caller's responsibility.

pub mod artifacts;
pub mod session;
pub mod transport;


pub use artifacts::{DebugSink, FsDebugSink};
pub use session::{
    CourierClient, DataOptions, InteractOptions, NavigateOptions, OpenSessionOptions,
    SessionHandle,
};
pub use transport::{RawResponse, Transport};
