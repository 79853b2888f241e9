//! Fan-out primitives: delivering accepted changes to clients.
//!
//! Each connected client has an unbounded channel feeding its writer
//! task. Handlers never touch sockets directly; they call exactly one
//! of the primitives here and the writer tasks do the network I/O. A
//! send to a client whose channel is gone is silently dropped (the
//! disconnect path cleans up the entry).

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

use loreforge_protocol::{Codec, ProtocolError};
use loreforge_transport::ClientId;

/// Registry of connected clients and the encode-once fan-out over them.
pub struct Broadcaster<C: Codec> {
    codec: C,
    clients: Mutex<HashMap<ClientId, mpsc::UnboundedSender<Vec<u8>>>>,
}

impl<C: Codec> Broadcaster<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a client, returning the receiving end for its writer
    /// task.
    pub async fn register(
        &self,
        client: ClientId,
    ) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.lock().await.insert(client, tx);
        rx
    }

    /// Removes a client. Queued frames in its channel are dropped with
    /// the receiver.
    pub async fn unregister(&self, client: ClientId) {
        self.clients.lock().await.remove(&client);
    }

    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Sends a message to one client only.
    pub async fn reply_to<T: Serialize>(
        &self,
        target: ClientId,
        message: &T,
    ) -> Result<(), ProtocolError> {
        let bytes = self.codec.encode(message)?;
        if let Some(tx) = self.clients.lock().await.get(&target) {
            let _ = tx.send(bytes);
        }
        Ok(())
    }

    /// Sends a message to every client except one.
    pub async fn broadcast_except<T: Serialize>(
        &self,
        except: ClientId,
        message: &T,
    ) -> Result<(), ProtocolError> {
        let bytes = self.codec.encode(message)?;
        for (client, tx) in self.clients.lock().await.iter() {
            if *client != except {
                let _ = tx.send(bytes.clone());
            }
        }
        Ok(())
    }

    /// Sends a message to every client, the sender included.
    pub async fn broadcast_all<T: Serialize>(
        &self,
        message: &T,
    ) -> Result<(), ProtocolError> {
        let bytes = self.codec.encode(message)?;
        for tx in self.clients.lock().await.values() {
            let _ = tx.send(bytes.clone());
        }
        Ok(())
    }

    /// Re-sends the original encoded envelope to every client except
    /// the sender, without re-encoding.
    pub async fn forward_except(&self, except: ClientId, raw: &[u8]) {
        for (client, tx) in self.clients.lock().await.iter() {
            if *client != except {
                let _ = tx.send(raw.to_vec());
            }
        }
    }

    /// Re-sends the original encoded envelope to every client.
    pub async fn forward_all(&self, raw: &[u8]) {
        for tx in self.clients.lock().await.values() {
            let _ = tx.send(raw.to_vec());
        }
    }
}
