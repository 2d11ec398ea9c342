//! Errors from the acquirer HTTP layer.

#[derive(Debug, thiserror::Error)]
pub enum AcquiringError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The acquirer returned a non-2xx status code.
    #[error("Acquirer API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The acquirer answered with a payload we cannot interpret.
    #[error("Unexpected acquirer response: {0}")]
    UnexpectedResponse(String),

    /// The client is missing credentials or per-purpose settings.
    #[error("Acquirer is not configured: {0}")]
    Configuration(String),
}
