//! Error type for store operations.

use gangway_core::error::CoreError;
use gangway_gateway::GatewayError;

/// Failure of a store operation.
///
/// `Domain` failures reject before any state change or gateway call (no
/// rollback happened because nothing was applied); `Gateway` failures are
/// re-signalled to the caller after the slice has already rolled its state
/// back. Feature code decides how to surface either — the store's job ends
/// at an accurate error value over an accurately-rolled-back state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Validation or capability rejection, raised before any effect.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// A gateway call failed; affected state has been rolled back.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
