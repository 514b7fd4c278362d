//! Error type for gateway implementations.

use gangway_core::error::CoreError;

/// Errors surfaced by gateway implementations.
///
/// Wraps [`CoreError`] for domain-level rejections (not found, conflicts)
/// and adds the transport-shaped variants the client store reacts to.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A domain-level error from the backend.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Opening a realtime subscription failed.
    #[error("Subscription setup failed: {0}")]
    Subscription(String),

    /// The backend rejected a mutating call.
    #[error("Gateway call rejected: {0}")]
    Rejected(String),

    /// Invalid gateway configuration.
    #[error("Invalid gateway configuration: {0}")]
    Config(String),
}

/// Convenience alias for gateway call results.
pub type GatewayResult<T> = Result<T, GatewayError>;
