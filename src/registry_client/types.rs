//! Registry wire and error types

use serde::Deserialize;

/// One registered device as returned by `registerManyDevices`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredDevice {
    pub id: String,
}

/// One entry of a GraphQL `errors` list.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Registry call failure, fatal to one half of a reconciliation cycle.
///
/// The reconciler records it and leaves the store untouched for that
/// half, so the next snapshot recomputes and retries the same work.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Transport failure, including timeouts.
    #[error("registry transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status outside the GraphQL envelope.
    #[error("registry returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The registry processed the request and rejected it.
    #[error("registry rejected request: {}", .messages.join("; "))]
    Graphql { messages: Vec<String> },

    /// Envelope carried neither data nor errors.
    #[error("registry response carried no data")]
    MissingData,

    /// Response length does not line up with the request, so positional
    /// correlation is impossible.
    #[error("registry confirmed {received} registrations for {sent} devices")]
    Correlation { sent: usize, received: usize },
}
