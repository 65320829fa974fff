//! Wire protocol: methods, typed request bodies, actions, and the
//! response envelope.
//!
//! The service multiplexes all operations behind one HTTP endpoint
//! shape (`POST <base>/<method>?key=<api_key>`, JSON body). This module
//! is shared by the server and the client so both sides agree on field
//! names, strict option typing, and artifact encoding.

pub mod action;
pub mod envelope;
pub mod method;
pub mod request;


pub use action::{Action, ActionResult, CaptchaType};
pub use envelope::{
    decode, decode_artifact, encode_artifact, DebugArtifacts, Envelope, ExtractedData,
    ExtractedNode,
};
pub use method::Method;
pub use request::{
    CaptureRequest, DataRequest, ExtractRules, InteractRequest, NavigateRequest, SessionRequest,
};
