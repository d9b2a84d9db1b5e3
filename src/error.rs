//! Error taxonomy for provider requests.

use thiserror::Error;

/// Failure modes of a symbol-list or conversion request.
///
/// Invalid user input (empty or non-positive amount) is not an error: the
/// conversion trigger short-circuits it without issuing a request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete (DNS, connect, TLS, body read).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The response parsed, but an expected field is absent.
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// The provider reported a failure, via its error envelope or a
    /// non-success HTTP status.
    #[error("provider error: {0}")]
    Provider(String),
}
