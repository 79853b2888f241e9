//! Wire DTOs for geometry, pens, paints, and server policy.
//!
//! These types are deliberately looser than their model counterparts:
//! geometry arrives as raw path segments (including curves the model
//! never stores), and extensible unions carry an `Unknown` catch-all so
//! a newer client's shapes degrade gracefully instead of failing the
//! whole envelope. The pure conversions live in [`crate::mapper`].

use serde::{Deserialize, Serialize};

use loreforge_model::{AssetKey, Winding};

/// One step of a wire path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentDto {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
    CubicTo {
        cx1: f64,
        cy1: f64,
        cx2: f64,
        cy2: f64,
        x: f64,
        y: f64,
    },
    Close,
}

/// A planar area as it crosses the wire: path segments plus the winding
/// rule to interpret them with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDto {
    #[serde(default)]
    pub winding: Winding,
    pub segments: Vec<SegmentDto>,
}

/// Paint on the wire. Unknown paint kinds decode to [`PaintDto::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaintDto {
    Color { argb: u32 },
    Texture { asset: AssetKey, scale: f64 },
    #[serde(other)]
    Unknown,
}

/// Pen on the wire. Every field is defaulted so sparse senders work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenDto {
    pub eraser: bool,
    pub foreground_transparent: bool,
    pub background_transparent: bool,
    pub thickness: f32,
    pub opacity: f32,
    pub square_cap: bool,
    pub paint: PaintDto,
    pub background_paint: PaintDto,
}

impl Default for PenDto {
    fn default() -> Self {
        Self {
            eraser: false,
            foreground_transparent: false,
            background_transparent: false,
            thickness: 2.0,
            opacity: 1.0,
            square_cap: false,
            paint: PaintDto::Color { argb: 0xff00_0000 },
            background_paint: PaintDto::Color { argb: 0xff00_0000 },
        }
    }
}

/// A drawable shape on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawableDto {
    Rectangle { x: f64, y: f64, width: f64, height: f64 },
    Oval { x: f64, y: f64, width: f64, height: f64 },
    Cross { x: f64, y: f64, width: f64, height: f64 },
    LineSegment { points: Vec<PointDto> },
    ShapePath { area: AreaDto },
    #[serde(other)]
    Unknown,
}

/// A 2D point on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub x: f64,
    pub y: f64,
}

/// Topology category on the wire. Unknown kinds degrade instead of
/// failing the envelope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum TopologyTypeDto {
    Wall,
    Hill,
    Pit,
    Cover,
    Unknown,
}

impl From<String> for TopologyTypeDto {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "wall" => Self::Wall,
            "hill" => Self::Hill,
            "pit" => Self::Pit,
            "cover" => Self::Cover,
            _ => Self::Unknown,
        }
    }
}

/// Server policy on the wire. Defaulted per field so older clients that
/// omit newer flags still decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyDto {
    pub strict_token_management: bool,
    pub movement_locked: bool,
    pub token_editor_locked: bool,
    pub players_can_reveal_vision: bool,
    pub gm_reveals_vision_for_unowned: bool,
    pub use_individual_views: bool,
    pub use_individual_fow: bool,
    pub auto_reveal_on_movement: bool,
    pub include_owned_npcs: bool,
    pub use_astar_pathfinding: bool,
    pub vision_blocks_movement: bool,
    pub movement_metric: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_paint_degrades() {
        let paint: PaintDto = serde_json::from_value(json!({
            "type": "gradient",
            "stops": [0, 1],
        }))
        .unwrap();
        assert_eq!(paint, PaintDto::Unknown);
    }

    #[test]
    fn test_unknown_drawable_degrades() {
        let drawable: DrawableDto = serde_json::from_value(json!({
            "type": "bezierBlob",
        }))
        .unwrap();
        assert_eq!(drawable, DrawableDto::Unknown);
    }

    #[test]
    fn test_sparse_pen_decodes_with_defaults() {
        let pen: PenDto =
            serde_json::from_value(json!({ "eraser": true })).unwrap();
        assert!(pen.eraser);
        assert_eq!(pen.thickness, 2.0);
        assert_eq!(pen.paint, PaintDto::Color { argb: 0xff00_0000 });
    }

    #[test]
    fn test_area_dto_round_trip() {
        let area = AreaDto {
            winding: Winding::EvenOdd,
            segments: vec![
                SegmentDto::MoveTo { x: 0.0, y: 0.0 },
                SegmentDto::LineTo { x: 10.0, y: 0.0 },
                SegmentDto::QuadTo {
                    cx: 10.0,
                    cy: 10.0,
                    x: 0.0,
                    y: 10.0,
                },
                SegmentDto::Close,
            ],
        };
        let bytes = serde_json::to_vec(&area).unwrap();
        let decoded: AreaDto = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(area, decoded);
    }

    #[test]
    fn test_unknown_topology_type_degrades() {
        let kind: TopologyTypeDto =
            serde_json::from_value(json!("force_field")).unwrap();
        assert_eq!(kind, TopologyTypeDto::Unknown);

        let kind: TopologyTypeDto =
            serde_json::from_value(json!("wall")).unwrap();
        assert_eq!(kind, TopologyTypeDto::Wall);
    }

    #[test]
    fn test_policy_dto_tolerates_missing_fields() {
        let policy: PolicyDto = serde_json::from_value(json!({
            "movementLocked": true,
        }))
        .unwrap();
        assert!(policy.movement_locked);
        assert!(!policy.strict_token_management);
    }
}
