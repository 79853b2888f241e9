//! Pure conversions between wire DTOs and model types.
//!
//! Geometry is flattened here: curve segments are sampled into polyline
//! points, so the model only ever stores closed polyline rings. Unknown
//! wire variants convert to `None` (with a `warn!`) rather than failing
//! the whole message.

use loreforge_model::{
    Drawable, MovementMetric, Paint, Pen, PenMode, Point, Rect, Region,
    Ring, ServerPolicy, TopologyType,
};

use crate::dto::{
    AreaDto, DrawableDto, PaintDto, PenDto, PointDto, PolicyDto,
    SegmentDto, TopologyTypeDto,
};

/// Sample count for flattening one curve segment.
const CURVE_STEPS: usize = 8;

// ---------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------

/// Flattens a wire path into a region.
///
/// `MoveTo` starts a ring (implicitly closing any open one), `Close`
/// closes it, and curve segments are sampled into line points. Ring
/// orientation encodes fill: positive signed area is filled, negative
/// is a hole.
pub fn area_to_region(dto: &AreaDto) -> Region {
    let mut rings: Vec<Ring> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut cursor = Point::new(0.0, 0.0);

    let mut finish =
        |points: &mut Vec<Point>, rings: &mut Vec<Ring>| {
            if points.len() >= 3 {
                let pts = std::mem::take(points);
                let hole = signed_area(&pts) < 0.0;
                rings.push(Ring { points: pts, hole });
            } else {
                points.clear();
            }
        };

    for segment in &dto.segments {
        match *segment {
            SegmentDto::MoveTo { x, y } => {
                finish(&mut current, &mut rings);
                cursor = Point::new(x, y);
                current.push(cursor);
            }
            SegmentDto::LineTo { x, y } => {
                cursor = Point::new(x, y);
                current.push(cursor);
            }
            SegmentDto::QuadTo { cx, cy, x, y } => {
                let (from, ctrl, to) =
                    (cursor, Point::new(cx, cy), Point::new(x, y));
                for step in 1..=CURVE_STEPS {
                    let t = step as f64 / CURVE_STEPS as f64;
                    current.push(quad_point(from, ctrl, to, t));
                }
                cursor = to;
            }
            SegmentDto::CubicTo {
                cx1,
                cy1,
                cx2,
                cy2,
                x,
                y,
            } => {
                let (from, c1, c2, to) = (
                    cursor,
                    Point::new(cx1, cy1),
                    Point::new(cx2, cy2),
                    Point::new(x, y),
                );
                for step in 1..=CURVE_STEPS {
                    let t = step as f64 / CURVE_STEPS as f64;
                    current.push(cubic_point(from, c1, c2, to, t));
                }
                cursor = to;
            }
            SegmentDto::Close => {
                finish(&mut current, &mut rings);
            }
        }
    }
    finish(&mut current, &mut rings);
    Region::new(dto.winding, rings)
}

/// Emits a region as a wire path: one move/line/close run per ring,
/// with orientation normalized so [`area_to_region`] reads the hole
/// flag back out.
pub fn region_to_area(region: &Region) -> AreaDto {
    let mut segments = Vec::new();
    for ring in &region.rings {
        if ring.is_degenerate() {
            continue;
        }
        let mut points = ring.points.clone();
        let negative = signed_area(&points) < 0.0;
        if negative != ring.hole {
            points.reverse();
        }
        let mut iter = points.into_iter();
        if let Some(first) = iter.next() {
            segments.push(SegmentDto::MoveTo {
                x: first.x,
                y: first.y,
            });
        }
        for point in iter {
            segments.push(SegmentDto::LineTo {
                x: point.x,
                y: point.y,
            });
        }
        segments.push(SegmentDto::Close);
    }
    AreaDto {
        winding: region.winding,
        segments,
    }
}

/// Shoelace formula. Positive for counter-clockwise vertex order under
/// the shoelace convention; sign is all that matters here.
fn signed_area(points: &[Point]) -> f64 {
    let mut sum = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        sum += p.x * q.y - q.x * p.y;
    }
    sum / 2.0
}

fn quad_point(from: Point, ctrl: Point, to: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * from.x + 2.0 * u * t * ctrl.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * ctrl.y + t * t * to.y,
    )
}

fn cubic_point(
    from: Point,
    c1: Point,
    c2: Point,
    to: Point,
    t: f64,
) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * u * from.x
            + 3.0 * u * u * t * c1.x
            + 3.0 * u * t * t * c2.x
            + t * t * t * to.x,
        u * u * u * from.y
            + 3.0 * u * u * t * c1.y
            + 3.0 * u * t * t * c2.y
            + t * t * t * to.y,
    )
}

// ---------------------------------------------------------------------
// Paint / pen / drawable
// ---------------------------------------------------------------------

/// Converts a wire paint. `None` for kinds this server does not know.
pub fn paint_to_model(dto: &PaintDto) -> Option<Paint> {
    match *dto {
        PaintDto::Color { argb } => Some(Paint::Color { argb }),
        PaintDto::Texture { asset, scale } => {
            Some(Paint::Texture { asset, scale })
        }
        PaintDto::Unknown => {
            tracing::warn!("unknown paint kind on the wire, dropping");
            None
        }
    }
}

pub fn paint_from_model(paint: &Paint) -> PaintDto {
    match *paint {
        Paint::Color { argb } => PaintDto::Color { argb },
        Paint::Texture { asset, scale } => {
            PaintDto::Texture { asset, scale }
        }
    }
}

/// Converts a wire pen. Unknown paints fall back to the default paint
/// so one exotic brush cannot drop a whole drawing.
pub fn pen_to_model(dto: &PenDto) -> Pen {
    Pen {
        eraser: dto.eraser,
        foreground_mode: mode(dto.foreground_transparent),
        background_mode: mode(dto.background_transparent),
        thickness: dto.thickness,
        opacity: dto.opacity,
        square_cap: dto.square_cap,
        paint: paint_to_model(&dto.paint).unwrap_or_default(),
        background_paint: paint_to_model(&dto.background_paint)
            .unwrap_or_default(),
    }
}

pub fn pen_from_model(pen: &Pen) -> PenDto {
    PenDto {
        eraser: pen.eraser,
        foreground_transparent: pen.foreground_mode
            == PenMode::Transparent,
        background_transparent: pen.background_mode
            == PenMode::Transparent,
        thickness: pen.thickness,
        opacity: pen.opacity,
        square_cap: pen.square_cap,
        paint: paint_from_model(&pen.paint),
        background_paint: paint_from_model(&pen.background_paint),
    }
}

fn mode(transparent: bool) -> PenMode {
    if transparent {
        PenMode::Transparent
    } else {
        PenMode::Solid
    }
}

/// Converts a wire drawable. `None` for kinds this server does not know.
pub fn drawable_to_model(dto: &DrawableDto) -> Option<Drawable> {
    match dto {
        DrawableDto::Rectangle { x, y, width, height } => {
            Some(Drawable::Rectangle {
                bounds: Rect::new(*x, *y, *width, *height),
            })
        }
        DrawableDto::Oval { x, y, width, height } => {
            Some(Drawable::Oval {
                bounds: Rect::new(*x, *y, *width, *height),
            })
        }
        DrawableDto::Cross { x, y, width, height } => {
            Some(Drawable::Cross {
                bounds: Rect::new(*x, *y, *width, *height),
            })
        }
        DrawableDto::LineSegment { points } => {
            Some(Drawable::LineSegment {
                points: points
                    .iter()
                    .map(|p| Point::new(p.x, p.y))
                    .collect(),
            })
        }
        DrawableDto::ShapePath { area } => Some(Drawable::ShapePath {
            region: area_to_region(area),
        }),
        DrawableDto::Unknown => {
            tracing::warn!("unknown drawable kind on the wire, dropping");
            None
        }
    }
}

pub fn drawable_from_model(drawable: &Drawable) -> DrawableDto {
    match drawable {
        Drawable::Rectangle { bounds } => DrawableDto::Rectangle {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        },
        Drawable::Oval { bounds } => DrawableDto::Oval {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        },
        Drawable::Cross { bounds } => DrawableDto::Cross {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        },
        Drawable::LineSegment { points } => DrawableDto::LineSegment {
            points: points
                .iter()
                .map(|p| PointDto { x: p.x, y: p.y })
                .collect(),
        },
        Drawable::ShapePath { region } => DrawableDto::ShapePath {
            area: region_to_area(region),
        },
    }
}

// ---------------------------------------------------------------------
// Topology / policy
// ---------------------------------------------------------------------

pub fn topology_to_model(dto: TopologyTypeDto) -> Option<TopologyType> {
    match dto {
        TopologyTypeDto::Wall => Some(TopologyType::Wall),
        TopologyTypeDto::Hill => Some(TopologyType::Hill),
        TopologyTypeDto::Pit => Some(TopologyType::Pit),
        TopologyTypeDto::Cover => Some(TopologyType::Cover),
        TopologyTypeDto::Unknown => {
            tracing::warn!("unknown topology type on the wire, dropping");
            None
        }
    }
}

pub fn topology_from_model(kind: TopologyType) -> TopologyTypeDto {
    match kind {
        TopologyType::Wall => TopologyTypeDto::Wall,
        TopologyType::Hill => TopologyTypeDto::Hill,
        TopologyType::Pit => TopologyTypeDto::Pit,
        TopologyType::Cover => TopologyTypeDto::Cover,
    }
}

/// Converts a wire policy. An unrecognized movement metric falls back
/// to the default with a `warn!`.
pub fn policy_to_model(dto: &PolicyDto) -> ServerPolicy {
    let movement_metric = match dto.movement_metric.as_str() {
        "" | "one_two_one" => MovementMetric::OneTwoOne,
        "one_one_one" => MovementMetric::OneOneOne,
        "manhattan" => MovementMetric::Manhattan,
        "no_diagonals" => MovementMetric::NoDiagonals,
        other => {
            tracing::warn!(metric = other, "unknown movement metric");
            MovementMetric::default()
        }
    };
    ServerPolicy {
        strict_token_management: dto.strict_token_management,
        movement_locked: dto.movement_locked,
        token_editor_locked: dto.token_editor_locked,
        players_can_reveal_vision: dto.players_can_reveal_vision,
        gm_reveals_vision_for_unowned: dto.gm_reveals_vision_for_unowned,
        use_individual_views: dto.use_individual_views,
        use_individual_fow: dto.use_individual_fow,
        auto_reveal_on_movement: dto.auto_reveal_on_movement,
        include_owned_npcs: dto.include_owned_npcs,
        use_astar_pathfinding: dto.use_astar_pathfinding,
        vision_blocks_movement: dto.vision_blocks_movement,
        movement_metric,
    }
}

pub fn policy_from_model(policy: &ServerPolicy) -> PolicyDto {
    let movement_metric = match policy.movement_metric {
        MovementMetric::OneTwoOne => "one_two_one",
        MovementMetric::OneOneOne => "one_one_one",
        MovementMetric::Manhattan => "manhattan",
        MovementMetric::NoDiagonals => "no_diagonals",
    };
    PolicyDto {
        strict_token_management: policy.strict_token_management,
        movement_locked: policy.movement_locked,
        token_editor_locked: policy.token_editor_locked,
        players_can_reveal_vision: policy.players_can_reveal_vision,
        gm_reveals_vision_for_unowned: policy.gm_reveals_vision_for_unowned,
        use_individual_views: policy.use_individual_views,
        use_individual_fow: policy.use_individual_fow,
        auto_reveal_on_movement: policy.auto_reveal_on_movement,
        include_owned_npcs: policy.include_owned_npcs,
        use_astar_pathfinding: policy.use_astar_pathfinding,
        vision_blocks_movement: policy.vision_blocks_movement,
        movement_metric: movement_metric.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loreforge_model::Winding;

    fn square_path() -> AreaDto {
        AreaDto {
            winding: Winding::NonZero,
            segments: vec![
                SegmentDto::MoveTo { x: 0.0, y: 0.0 },
                SegmentDto::LineTo { x: 10.0, y: 0.0 },
                SegmentDto::LineTo { x: 10.0, y: 10.0 },
                SegmentDto::LineTo { x: 0.0, y: 10.0 },
                SegmentDto::Close,
            ],
        }
    }

    #[test]
    fn test_square_path_becomes_filled_ring() {
        let region = area_to_region(&square_path());
        assert_eq!(region.rings.len(), 1);
        assert!(!region.rings[0].hole);
        assert_eq!(region.rings[0].points.len(), 4);
    }

    #[test]
    fn test_reversed_path_becomes_hole_ring() {
        let area = AreaDto {
            winding: Winding::NonZero,
            segments: vec![
                SegmentDto::MoveTo { x: 0.0, y: 10.0 },
                SegmentDto::LineTo { x: 10.0, y: 10.0 },
                SegmentDto::LineTo { x: 10.0, y: 0.0 },
                SegmentDto::LineTo { x: 0.0, y: 0.0 },
                SegmentDto::Close,
            ],
        };
        let region = area_to_region(&area);
        assert_eq!(region.rings.len(), 1);
        assert!(region.rings[0].hole);
    }

    #[test]
    fn test_move_to_implicitly_closes_open_ring() {
        let mut area = square_path();
        area.segments.pop(); // drop the Close
        area.segments.push(SegmentDto::MoveTo { x: 50.0, y: 50.0 });
        area.segments.push(SegmentDto::LineTo { x: 60.0, y: 50.0 });
        area.segments.push(SegmentDto::LineTo { x: 60.0, y: 60.0 });
        area.segments.push(SegmentDto::Close);

        let region = area_to_region(&area);
        assert_eq!(region.rings.len(), 2);
    }

    #[test]
    fn test_curves_are_flattened_into_points() {
        let area = AreaDto {
            winding: Winding::NonZero,
            segments: vec![
                SegmentDto::MoveTo { x: 0.0, y: 0.0 },
                SegmentDto::QuadTo {
                    cx: 10.0,
                    cy: 0.0,
                    x: 10.0,
                    y: 10.0,
                },
                SegmentDto::LineTo { x: 0.0, y: 10.0 },
                SegmentDto::Close,
            ],
        };
        let region = area_to_region(&area);
        assert_eq!(region.rings.len(), 1);
        // 1 start + CURVE_STEPS samples + 1 line point
        assert_eq!(region.rings[0].points.len(), 2 + CURVE_STEPS);
        // Curve endpoint is hit exactly.
        let end = region.rings[0].points[1 + CURVE_STEPS - 1];
        assert_eq!((end.x, end.y), (10.0, 10.0));
    }

    #[test]
    fn test_degenerate_subpath_dropped() {
        let area = AreaDto {
            winding: Winding::NonZero,
            segments: vec![
                SegmentDto::MoveTo { x: 1.0, y: 1.0 },
                SegmentDto::LineTo { x: 2.0, y: 2.0 },
                SegmentDto::Close,
            ],
        };
        assert!(area_to_region(&area).is_empty());
    }

    #[test]
    fn test_region_area_round_trip() {
        let mut region = Region::rect(0.0, 0.0, 20.0, 20.0);
        region.subtract(&Region::rect(5.0, 5.0, 2.0, 2.0));
        let round_tripped = area_to_region(&region_to_area(&region));
        assert_eq!(region.rings.len(), round_tripped.rings.len());
        assert_eq!(
            region.rings[1].hole,
            round_tripped.rings[1].hole
        );
    }

    #[test]
    fn test_unknown_paint_maps_to_none() {
        assert!(paint_to_model(&PaintDto::Unknown).is_none());
    }

    #[test]
    fn test_pen_round_trip() {
        let pen = Pen {
            eraser: true,
            foreground_mode: PenMode::Transparent,
            thickness: 5.0,
            ..Pen::default()
        };
        assert_eq!(pen_to_model(&pen_from_model(&pen)), pen);
    }

    #[test]
    fn test_policy_round_trip() {
        let policy = ServerPolicy {
            movement_locked: true,
            movement_metric: MovementMetric::NoDiagonals,
            ..ServerPolicy::default()
        };
        assert_eq!(policy_to_model(&policy_from_model(&policy)), policy);
    }

    #[test]
    fn test_unknown_movement_metric_falls_back_to_default() {
        let dto = PolicyDto {
            movement_metric: "teleport".into(),
            ..PolicyDto::default()
        };
        assert_eq!(
            policy_to_model(&dto).movement_metric,
            MovementMetric::OneTwoOne
        );
    }
}
