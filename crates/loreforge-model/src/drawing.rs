//! Drawn elements: shapes, pens, and paints.
//!
//! A [`DrawnElement`] is the immutable pairing of a [`Drawable`] shape and
//! the [`Pen`] it was drawn with. Zones keep them in draw order per
//! [`Layer`]; removal is by id, which is what client-side undo sends.

use serde::{Deserialize, Serialize};

use crate::{AssetKey, DrawableId, Point, Region};

/// An axis-aligned rectangle in zone coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// The zone layer an element is drawn on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    #[default]
    Token,
    GmNotes,
    Object,
    Background,
}

/// What a pen draws with: a solid color or a scaled texture asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paint {
    /// Packed ARGB color.
    Color { argb: u32 },
    /// Tiled texture, referenced by asset hash.
    Texture { asset: AssetKey, scale: f64 },
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Color { argb: 0xff00_0000 }
    }
}

/// Stroke/fill mode flags for a pen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PenMode {
    #[default]
    Solid,
    Transparent,
}

/// The pen used to render a drawable: stroke, fill, and mode flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub eraser: bool,
    pub foreground_mode: PenMode,
    pub background_mode: PenMode,
    pub thickness: f32,
    pub opacity: f32,
    pub square_cap: bool,
    pub paint: Paint,
    pub background_paint: Paint,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            eraser: false,
            foreground_mode: PenMode::Solid,
            background_mode: PenMode::Solid,
            thickness: 2.0,
            opacity: 1.0,
            square_cap: false,
            paint: Paint::default(),
            background_paint: Paint::default(),
        }
    }
}

/// A drawable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Drawable {
    Rectangle { bounds: Rect },
    Oval { bounds: Rect },
    Cross { bounds: Rect },
    LineSegment { points: Vec<Point> },
    /// Freeform shape, already reconstructed into a region.
    ShapePath { region: Region },
}

/// An immutable drawable+pen pairing owned by a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnElement {
    pub id: DrawableId,
    pub layer: Layer,
    pub drawable: Drawable,
    pub pen: Pen,
}

impl DrawnElement {
    pub fn new(layer: Layer, drawable: Drawable, pen: Pen) -> Self {
        Self {
            id: DrawableId::new(),
            layer,
            drawable,
            pen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_json_shape() {
        let json =
            serde_json::to_value(&Paint::Color { argb: 0xffff0000 }).unwrap();
        assert_eq!(json["type"], "color");

        let tex = Paint::Texture {
            asset: AssetKey::of(b"tex"),
            scale: 0.5,
        };
        let json = serde_json::to_value(&tex).unwrap();
        assert_eq!(json["type"], "texture");
        assert_eq!(json["scale"], 0.5);
    }

    #[test]
    fn test_drawn_element_round_trip() {
        let element = DrawnElement::new(
            Layer::Token,
            Drawable::Oval {
                bounds: Rect::new(0.0, 0.0, 30.0, 20.0),
            },
            Pen::default(),
        );
        let bytes = serde_json::to_vec(&element).unwrap();
        let decoded: DrawnElement = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(element, decoded);
    }

    #[test]
    fn test_shape_path_round_trip() {
        let element = DrawnElement::new(
            Layer::Background,
            Drawable::ShapePath {
                region: Region::rect(1.0, 2.0, 3.0, 4.0),
            },
            Pen {
                eraser: true,
                ..Pen::default()
            },
        );
        let bytes = serde_json::to_vec(&element).unwrap();
        let decoded: DrawnElement = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(element, decoded);
    }
}
