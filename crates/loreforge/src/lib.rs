//! # Loreforge
//!
//! Authoritative multi-client campaign server for virtual tabletops.
//!
//! Loreforge keeps one shared [`Campaign`](loreforge_model::Campaign) —
//! zones, tokens, drawings, fog-of-war, initiative, assets — and routes
//! every client mutation through a single server-side model so all
//! connected clients converge on the same state. Clients speak a tagged
//! JSON envelope over WebSockets; an older positional call form is
//! accepted on the same socket.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loreforge::prelude::*;
//!
//! # async fn run() -> Result<(), LoreforgeError> {
//! let server = LoreforgeServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod broadcast;
mod context;
mod error;
mod router;
mod server;

pub use broadcast::Broadcaster;
pub use context::CallContext;
pub use error::LoreforgeError;
pub use router::dispatch;
pub use server::{
    LoreforgeServer, LoreforgeServerBuilder, ServerConfig, ServerState,
};

pub mod prelude {
    pub use crate::{LoreforgeError, LoreforgeServer, ServerConfig};
    pub use loreforge_model::{Campaign, Token, Zone};
    pub use loreforge_protocol::Message;
}
