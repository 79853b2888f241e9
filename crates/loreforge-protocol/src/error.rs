//! Error types for the protocol layer.

use crate::legacy::CallError;

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A legacy positional call could not be turned into a typed message.
    #[error(transparent)]
    Call(#[from] CallError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_error_converts_and_keeps_message() {
        let err = ProtocolError::from(CallError::UnknownMethod(
            "warpReality".into(),
        ));
        assert!(matches!(err, ProtocolError::Call(_)));
        assert!(err.to_string().contains("warpReality"));
    }
}
