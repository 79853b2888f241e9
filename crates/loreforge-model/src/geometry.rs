//! Planar regions for fog-of-war and vision-blocking topology.
//!
//! Geometry crosses the wire as a path-segment stream (move/line/quad/
//! cubic/close plus a winding rule). The server never stores that stream:
//! the protocol mapper flattens it into a [`Region`] — a winding rule and
//! a list of closed polyline [`Ring`]s — and only the region is kept on
//! the zone.
//!
//! Region algebra here is structural, not a computational-geometry
//! kernel: exposing more area appends rings, hiding area appends hole
//! rings. Clients rebuild the real planar shape when rendering; the
//! server only needs a faithful, equality-comparable container.

use serde::{Deserialize, Serialize};

/// A 2D point in zone coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fill rule for a region's rings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    #[default]
    NonZero,
    EvenOdd,
}

/// A single closed polyline.
///
/// `hole` rings subtract from the region instead of adding to it. The
/// closing edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub points: Vec<Point>,
    #[serde(default)]
    pub hole: bool,
}

impl Ring {
    /// A filled (additive) ring.
    pub fn filled(points: Vec<Point>) -> Self {
        Self { points, hole: false }
    }

    /// A hole (subtractive) ring.
    pub fn hole(points: Vec<Point>) -> Self {
        Self { points, hole: true }
    }

    /// Degenerate rings (fewer than 3 vertices) enclose no area.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }
}

/// A planar region: winding rule plus closed rings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub winding: Winding,
    pub rings: Vec<Ring>,
}

impl Region {
    /// The empty region.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a region from rings, dropping degenerate ones.
    pub fn new(winding: Winding, rings: Vec<Ring>) -> Self {
        let rings =
            rings.into_iter().filter(|r| !r.is_degenerate()).collect();
        Self { winding, rings }
    }

    /// A single axis-aligned rectangle, for tests and templates.
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(
            Winding::NonZero,
            vec![Ring::filled(vec![
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ])],
        )
    }

    /// Returns `true` if the region encloses no area.
    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(Ring::is_degenerate)
    }

    /// Adds `other`'s area to this region.
    pub fn union(&mut self, other: &Region) {
        for ring in &other.rings {
            if !ring.is_degenerate() {
                let mut ring = ring.clone();
                ring.hole = false;
                self.rings.push(ring);
            }
        }
    }

    /// Removes `other`'s area from this region.
    ///
    /// Subtracting from an empty region stays empty — there is nothing
    /// to punch a hole in.
    pub fn subtract(&mut self, other: &Region) {
        if self.is_empty() {
            return;
        }
        for ring in &other.rings {
            if !ring.is_degenerate() {
                let mut ring = ring.clone();
                ring.hole = true;
                self.rings.push(ring);
            }
        }
    }

    /// Clears the region entirely.
    pub fn clear(&mut self) {
        self.rings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_region_is_empty() {
        assert!(Region::empty().is_empty());
    }

    #[test]
    fn test_rect_region_not_empty() {
        assert!(!Region::rect(0.0, 0.0, 10.0, 10.0).is_empty());
    }

    #[test]
    fn test_degenerate_rings_dropped_on_construction() {
        let region = Region::new(
            Winding::NonZero,
            vec![Ring::filled(vec![Point::new(1.0, 1.0)])],
        );
        assert!(region.is_empty());
    }

    #[test]
    fn test_union_appends_filled_rings() {
        let mut a = Region::rect(0.0, 0.0, 5.0, 5.0);
        let b = Region::rect(10.0, 10.0, 5.0, 5.0);
        a.union(&b);
        assert_eq!(a.rings.len(), 2);
        assert!(a.rings.iter().all(|r| !r.hole));
    }

    #[test]
    fn test_subtract_appends_hole_rings() {
        let mut a = Region::rect(0.0, 0.0, 20.0, 20.0);
        a.subtract(&Region::rect(5.0, 5.0, 2.0, 2.0));
        assert_eq!(a.rings.len(), 2);
        assert!(a.rings[1].hole);
    }

    #[test]
    fn test_subtract_from_empty_stays_empty() {
        let mut empty = Region::empty();
        empty.subtract(&Region::rect(0.0, 0.0, 5.0, 5.0));
        assert!(empty.is_empty());
        assert_eq!(empty.rings.len(), 0);
    }

    #[test]
    fn test_clear_removes_all_rings() {
        let mut region = Region::rect(0.0, 0.0, 5.0, 5.0);
        region.clear();
        assert!(region.is_empty());
    }

    #[test]
    fn test_region_round_trip() {
        let mut region = Region::rect(0.0, 0.0, 20.0, 20.0);
        region.subtract(&Region::rect(2.0, 2.0, 3.0, 3.0));
        let bytes = serde_json::to_vec(&region).unwrap();
        let decoded: Region = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(region, decoded);
    }
}
