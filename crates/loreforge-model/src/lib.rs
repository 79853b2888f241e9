//! Authoritative campaign state for Loreforge.
//!
//! This crate is the server's single source of truth: one [`Campaign`]
//! holding [`Zone`]s, each zone holding tokens, drawn elements, fog-of-war
//! regions, topology, and auxiliary per-zone state. Handlers in the server
//! crate mutate this model and then fan the accepted change out to clients.
//!
//! # Key types
//!
//! - [`Campaign`] — the whole shared workspace (one per server)
//! - [`Zone`] — a sub-area (one map) with tokens, drawings, and fog
//! - [`Token`] — a placeable element with a signed z-order
//! - [`DrawnElement`] — an immutable (drawable, pen) pairing
//! - [`Region`] — a reconstructed planar fog/topology region
//! - [`Asset`] — a content-addressed binary blob
//!
//! # Ordering-sensitive mutations
//!
//! Z-order reassignment ([`Zone::bring_to_front`], [`Zone::send_to_back`])
//! and new-token z-order assignment ([`Zone::put_token`]) are whole
//! operations on the zone's interface, not lock-then-poke sequences.
//! Callers serialize access with a single mutex around the campaign and
//! cannot interleave the read-max / assign / write-back steps.

mod asset;
mod campaign;
mod drawing;
mod error;
mod geometry;
mod ids;
mod policy;
mod token;
mod zone;

pub use asset::{Asset, AssetKey, BROKEN_IMAGE_PNG};
pub use campaign::{Campaign, DataStore, MacroButton};
pub use drawing::{DrawnElement, Drawable, Layer, Paint, Pen, PenMode, Rect};
pub use error::ModelError;
pub use geometry::{Point, Region, Ring, Winding};
pub use ids::{DrawableId, LabelId, TokenId, ZoneId};
pub use policy::{MovementMetric, ServerPolicy};
pub use token::{Token, TokenUpdate, TokenUpdateKind};
pub use zone::{
    Board, ExposedAreaMeta, Grid, InitiativeEntry, InitiativeList, Label,
    PutTokenOutcome, TopologyType, VisionType, Zone,
};
