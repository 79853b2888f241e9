//! Identity newtypes for campaign entities.
//!
//! Entity ids are client-generated UUIDs: a client creates a token or
//! drawing locally and ships it to the server with its id already set,
//! so ids must be globally unique without coordination.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a [`Zone`](crate::Zone).
    ZoneId,
    "zone"
);
entity_id!(
    /// Unique identifier for a [`Token`](crate::Token).
    TokenId,
    "token"
);
entity_id!(
    /// Unique identifier for a [`DrawnElement`](crate::DrawnElement).
    DrawableId,
    "drawable"
);
entity_id!(
    /// Unique identifier for a map [`Label`](crate::Label).
    LabelId,
    "label"
);
