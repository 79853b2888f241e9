//! Per-call context threaded explicitly through the router.

use loreforge_transport::ClientId;

/// Everything a handler needs to know about the call it is servicing.
///
/// Built by the router for each decoded message and passed by value;
/// it lives exactly as long as the handler invocation. The raw envelope
/// is kept so fan-out can forward the sender's bytes verbatim instead
/// of re-encoding.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// The client the message came from.
    pub sender: ClientId,
    /// The wire discriminator, for logging.
    pub method: &'static str,
    /// The encoded envelope exactly as it arrived.
    pub raw: Vec<u8>,
}

impl CallContext {
    pub fn new(sender: ClientId, method: &'static str, raw: Vec<u8>) -> Self {
        Self { sender, method, raw }
    }
}
