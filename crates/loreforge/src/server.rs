//! `LoreforgeServer` builder and server loop.
//!
//! This is the entry point for running a campaign server. It ties the
//! layers together: transport → protocol → router → model. Each
//! accepted connection gets a reader loop (dispatching into the router)
//! and a writer task (draining its broadcast channel).

use std::sync::Arc;

use tokio::sync::Mutex;

use loreforge_model::{Campaign, ServerPolicy};
use loreforge_protocol::{Codec, JsonCodec};
use loreforge_transfer::{AssetStore, TransferManager, DEFAULT_CHUNK_SIZE};
use loreforge_transport::{
    Connection, Transport, WebSocketConnection, WebSocketTransport,
};

use crate::broadcast::Broadcaster;
use crate::router;
use crate::LoreforgeError;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Asset transfer chunk size in bytes.
    pub chunk_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// The campaign sits behind one mutex: every ordering-sensitive
/// mutation (z-order reassignment in particular) runs as a single
/// atomic operation under it. Locks are never held across network I/O;
/// fan-out happens through the [`Broadcaster`] channels after the
/// critical section.
pub struct ServerState<C: Codec> {
    pub campaign: Mutex<Campaign>,
    pub policy: Mutex<ServerPolicy>,
    pub assets: Mutex<AssetStore>,
    pub transfers: Mutex<TransferManager>,
    pub broadcaster: Broadcaster<C>,
    pub codec: C,
}

impl<C: Codec + Clone> ServerState<C> {
    pub fn new(codec: C, config: &ServerConfig) -> Self {
        Self {
            campaign: Mutex::new(Campaign::default()),
            policy: Mutex::new(ServerPolicy::default()),
            assets: Mutex::new(AssetStore::new()),
            transfers: Mutex::new(TransferManager::new(config.chunk_size)),
            broadcaster: Broadcaster::new(codec.clone()),
            codec,
        }
    }

    pub fn with_campaign(self, campaign: Campaign) -> Self {
        Self {
            campaign: Mutex::new(campaign),
            ..self
        }
    }
}

/// Builder for configuring and starting a Loreforge server.
///
/// # Example
///
/// ```rust,ignore
/// use loreforge::prelude::*;
///
/// let server = LoreforgeServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct LoreforgeServerBuilder {
    config: ServerConfig,
    campaign: Campaign,
}

impl LoreforgeServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            campaign: Campaign::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the asset transfer chunk size.
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.config.chunk_size = bytes;
        self
    }

    /// Seeds the server with an initial campaign.
    pub fn campaign(mut self, campaign: Campaign) -> Self {
        self.campaign = campaign;
        self
    }

    /// Builds the server. Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(
        self,
    ) -> Result<LoreforgeServer<JsonCodec>, LoreforgeError> {
        let transport =
            WebSocketTransport::bind(&self.config.bind_addr).await?;
        let state = Arc::new(
            ServerState::new(JsonCodec, &self.config)
                .with_campaign(self.campaign),
        );
        Ok(LoreforgeServer { transport, state })
    }
}

impl Default for LoreforgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running campaign server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LoreforgeServer<C: Codec + Clone> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl LoreforgeServer<JsonCodec> {
    pub fn builder() -> LoreforgeServerBuilder {
        LoreforgeServerBuilder::new()
    }
}

impl<C: Codec + Clone> LoreforgeServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(
        &self,
    ) -> Result<std::net::SocketAddr, LoreforgeError> {
        Ok(self.transport.local_addr()?)
    }

    /// Shared state handle, for embedding the server in a larger app.
    pub fn state(&self) -> Arc<ServerState<C>> {
        Arc::clone(&self.state)
    }

    /// Runs the server accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), LoreforgeError> {
        tracing::info!("Loreforge server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let client = conn.id();
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                %client,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Handles a single connection from accept to close.
///
/// Registers the client with the broadcaster, spawns its writer task,
/// then runs the reader loop. Teardown unregisters the client and
/// releases any asset transfers it had in flight.
pub(crate) async fn handle_connection<C: Codec + Clone>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), LoreforgeError> {
    let client = conn.id();
    tracing::info!(%client, "client connected");

    let mut outbound = state.broadcaster.register(client).await;
    let writer_conn = conn.clone();
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if writer_conn.send(&frame).await.is_err() {
                break;
            }
        }
    });

    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                router::dispatch(&state, client, &data).await;
            }
            Ok(None) => {
                tracing::info!(%client, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%client, error = %e, "recv error");
                break;
            }
        }
    }

    state.broadcaster.unregister(client).await;
    state.transfers.lock().await.release_client(client);
    writer.abort();
    tracing::info!(%client, "client disconnected");
    Ok(())
}
