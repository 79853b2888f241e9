//! Unified error type for the Loreforge server.

use loreforge_model::ModelError;
use loreforge_protocol::ProtocolError;
use loreforge_transfer::TransferError;
use loreforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LoreforgeError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, legacy call).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A model-level error (bad update, missing entity).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A transfer-level error (stale chunk pull).
    #[error(transparent)]
    Transfer(#[from] TransferError),
}
