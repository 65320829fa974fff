//! Action pipeline: ordered execution of navigation, interactions, and
//! extraction within one call.
//!
//! The pipeline owns no state between calls; the session's page backend
//! carries the page from one call to the next.

pub mod executor;
pub mod extract;

#[cfg(test)]
pub mod tests;

pub use executor::{run, PipelineCall, PipelineOutcome};
