//! Live transfer bookkeeping, keyed by (client, asset).

use std::collections::HashMap;

use loreforge_model::{Asset, AssetKey};
use loreforge_protocol::{AssetChunk, AssetHeader};
use loreforge_transport::ClientId;

use crate::{AssetProducer, TransferError, DEFAULT_CHUNK_SIZE};

/// Tracks one [`AssetProducer`] per (client, asset) request.
///
/// Producers are created when a client requests an asset and destroyed
/// when the final chunk is handed out or the client disconnects. A pull
/// against a producer that is gone fails closed with
/// [`TransferError::UnknownTransfer`].
#[derive(Debug)]
pub struct TransferManager {
    producers: HashMap<(ClientId, AssetKey), AssetProducer>,
    chunk_size: usize,
}

impl TransferManager {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            producers: HashMap::new(),
            chunk_size,
        }
    }

    /// Starts a transfer of `asset` to `client`, returning the header
    /// to announce it with.
    ///
    /// A repeated request for the same asset restarts the transfer from
    /// offset zero.
    pub fn begin(&mut self, client: ClientId, asset: Asset) -> AssetHeader {
        let producer = AssetProducer::new(asset, self.chunk_size);
        let header = producer.header();
        tracing::debug!(
            %client,
            key = %header.key,
            size = header.size,
            "starting asset transfer"
        );
        self.producers.insert((client, header.key), producer);
        header
    }

    /// Pulls the next chunk for an active transfer.
    ///
    /// The producer is removed once its last chunk is handed out, so a
    /// stale follow-up pull gets [`TransferError::UnknownTransfer`].
    pub fn next_chunk(
        &mut self,
        client: ClientId,
        key: AssetKey,
    ) -> Result<AssetChunk, TransferError> {
        let producer = self
            .producers
            .get_mut(&(client, key))
            .ok_or(TransferError::UnknownTransfer { client, key })?;

        match producer.next_chunk() {
            Some(chunk) => {
                if chunk.last {
                    tracing::debug!(%client, %key, "asset transfer complete");
                    self.producers.remove(&(client, key));
                }
                Ok(chunk)
            }
            None => {
                // Exhausted producer that was not reaped; drop it now.
                self.producers.remove(&(client, key));
                Err(TransferError::UnknownTransfer { client, key })
            }
        }
    }

    /// Drops every producer belonging to a disconnected client.
    pub fn release_client(&mut self, client: ClientId) {
        let before = self.producers.len();
        self.producers.retain(|(owner, _), _| *owner != client);
        let dropped = before - self.producers.len();
        if dropped > 0 {
            tracing::debug!(%client, dropped, "released client transfers");
        }
    }

    pub fn active_transfers(&self) -> usize {
        self.producers.len()
    }
}

impl Default for TransferManager {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(bytes: usize) -> Asset {
        Asset::new("fixture", vec![0xab; bytes])
    }

    #[test]
    fn test_begin_then_pull_to_completion() {
        let mut manager = TransferManager::new(16);
        let client = ClientId::new(1);
        let header = manager.begin(client, asset(40));

        let mut total = 0;
        loop {
            let chunk = manager.next_chunk(client, header.key).unwrap();
            total += chunk.data.len();
            if chunk.last {
                break;
            }
        }
        assert_eq!(total, 40);
        assert_eq!(manager.active_transfers(), 0);

        // Pulling past the end fails closed.
        let err = manager.next_chunk(client, header.key).unwrap_err();
        assert!(matches!(err, TransferError::UnknownTransfer { .. }));
    }

    #[test]
    fn test_pull_without_begin_fails_closed() {
        let mut manager = TransferManager::default();
        let err = manager
            .next_chunk(ClientId::new(9), AssetKey::of(b"never requested"))
            .unwrap_err();
        assert!(matches!(err, TransferError::UnknownTransfer { .. }));
    }

    #[test]
    fn test_release_client_drops_only_its_producers() {
        let mut manager = TransferManager::new(8);
        let alice = ClientId::new(1);
        let bob = ClientId::new(2);
        let header = manager.begin(alice, asset(100));
        manager.begin(bob, asset(100));
        assert_eq!(manager.active_transfers(), 2);

        manager.release_client(alice);
        assert_eq!(manager.active_transfers(), 1);
        assert!(manager.next_chunk(alice, header.key).is_err());
        assert!(manager.next_chunk(bob, header.key).is_ok());
    }

    #[test]
    fn test_repeated_begin_restarts_from_zero() {
        let mut manager = TransferManager::new(8);
        let client = ClientId::new(3);
        let header = manager.begin(client, asset(24));
        let first = manager.next_chunk(client, header.key).unwrap();
        assert_eq!(first.offset, 0);

        manager.begin(client, asset(24));
        let restarted = manager.next_chunk(client, header.key).unwrap();
        assert_eq!(restarted.offset, 0);
    }
}
