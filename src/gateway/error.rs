/// Errors returned by an [`ActivityGateway`](super::ActivityGateway).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request did not complete (connection, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend rejected the request (4xx), typically a validation failure.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the status text.
        message: String,
    },

    /// The backend failed to handle the request (5xx).
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the status text.
        message: String,
    },
}

impl GatewayError {
    /// Builds the error for a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        if (400..500).contains(&status) {
            Self::Rejected { status, message }
        } else {
            Self::Server { status, message }
        }
    }
}
