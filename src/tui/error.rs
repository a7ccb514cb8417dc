use crate::gateway::GatewayError;

/// Errors that can occur in the TUI layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An I/O error occurred (terminal, event reading, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend client could not be set up.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}
