//! Asset storage and chunked transfer for Loreforge.
//!
//! Assets (map images, token art, sounds) are content-addressed blobs
//! that can be large, so they never travel inline with campaign traffic.
//! A client that needs an asset requests it; the server answers with a
//! header and then hands out chunks as the client pulls them, so one
//! giant map image cannot starve everyone else's updates.
//!
//! - [`AssetStore`] — content-addressed blob storage (hash = dedup key)
//! - [`AssetProducer`] — per-request cursor over one asset's bytes
//! - [`TransferManager`] — live producers keyed by (client, asset)

mod error;
mod manager;
mod producer;
mod store;

pub use error::TransferError;
pub use manager::TransferManager;
pub use producer::AssetProducer;
pub use store::AssetStore;

/// Default transfer chunk size (bytes). Matches a comfortable WebSocket
/// frame without fragmentation on common deployments.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;
