//! Form relay client module for HTTP submission

mod client;
mod traits;

pub use client::{classify_response, HttpRelay, IdOrigin, RelayPayload, SubmissionId};
pub use traits::SubmissionClient;

#[cfg(test)]
pub use traits::MockSubmissionClient;
