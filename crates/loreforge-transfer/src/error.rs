use loreforge_model::AssetKey;
use loreforge_transport::ClientId;

/// Errors raised by the transfer layer.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// A chunk was pulled for a transfer that does not exist (never
    /// started, already completed, or released at disconnect). Fails
    /// closed instead of resurrecting the producer.
    #[error("no active transfer of {key} for {client}")]
    UnknownTransfer { client: ClientId, key: AssetKey },
}
