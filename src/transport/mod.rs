//! # Transport
//!
//! The network seam between the controller and the remote assistant service.
//! The controller only ever sees [`Transport`]; [`HttpTransport`] is the
//! production implementation and tests plug in scripted ones.

pub mod http;

pub use http::HttpTransport;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while exchanging a message with the service.
/// All of them are recoverable: the user may simply resubmit.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset mid-body, etc.
    #[error("network error: {0}")]
    Network(String),
    /// No answer within the configured deadline; the request was dropped.
    #[error("no reply within {}s", .0.as_secs())]
    Timeout(Duration),
    /// The service answered with a non-success HTTP status.
    #[error("server error (HTTP {status}): {body}")]
    Status { status: u16, body: String },
    /// The body could not be decoded as a chat reply.
    #[error("malformed reply: {0}")]
    Payload(String),
}

/// A successful answer: the raw reply text and the step the server moved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub step: i64,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Sends one user message tagged with the current step.
    async fn send(&self, message: &str, step: i64) -> Result<Reply, TransportError>;
}
