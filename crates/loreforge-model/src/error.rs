//! Error types for the campaign model.

use crate::{TokenId, ZoneId};

/// Errors raised by model mutations.
///
/// Most handlers treat a missing zone/token as a safe no-op rather than
/// an error — in a distributed session, state can legitimately vanish
/// between a client sending a message and the server applying it. These
/// variants exist for the cases where the caller needs to know.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The referenced zone does not exist (anymore).
    #[error("zone {0} not found")]
    ZoneNotFound(ZoneId),

    /// The referenced token does not exist (anymore).
    #[error("token {0} not found")]
    TokenNotFound(TokenId),

    /// A token update carried malformed arguments.
    #[error("bad token update: {0}")]
    BadUpdate(String),

    /// An asset key string was not 64 hex characters.
    #[error("malformed asset key: {0:?}")]
    BadAssetKey(String),
}
