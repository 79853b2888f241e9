//! Wire protocol for Loreforge.
//!
//! This crate defines the language clients and the server speak:
//!
//! - **Types** ([`Message`], [`AssetHeader`], [`AssetChunk`]) — the
//!   tagged envelope and transfer frames that travel on the wire.
//! - **Legacy calls** ([`LegacyCall`], [`ServerMethod`]) — the older
//!   positional form, decoded into the same typed [`Message`].
//! - **DTOs & mapper** ([`dto`], [`mapper`]) — loose wire shapes for
//!   geometry, pens, paints, and policy, plus the pure conversions.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how messages become bytes.
//!
//! The protocol layer sits between transport (raw bytes) and the server
//! core (campaign state). It knows nothing about connections or zones;
//! it only defines shapes and conversions.

mod codec;
pub mod dto;
mod error;
pub mod legacy;
pub mod mapper;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use legacy::{CallError, LegacyCall, ServerMethod};
pub use types::{AddOnLibrary, AssetChunk, AssetHeader, Message};
