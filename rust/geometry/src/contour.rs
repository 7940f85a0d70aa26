// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed 2D outlines with DXF-style bulge arcs.
//!
//! DSTV contours arrive as point arrays with an optional bulge per edge
//! (`bulge = tan(arc_angle / 4)`, 0 for a straight segment). Everything
//! downstream works on sampled polylines; this module owns the sampling
//! and the winding/containment hygiene.

use crate::error::{Error, Result};
use crate::triangulation::{triangulate, triangulate_with_holes};
use nalgebra::Point2;
use smallvec::SmallVec;

/// Minimum area below which a contour is considered degenerate
const MIN_AREA: f64 = 1e-10;

/// Closed 2D outline with optional holes.
///
/// Outer boundary counter-clockwise, holes clockwise.
#[derive(Debug, Clone, Default)]
pub struct Outline2D {
    pub outer: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
}

/// Triangulated outline: all vertices (outer + holes) plus triangle indices
#[derive(Debug, Clone)]
pub struct OutlineTriangulation {
    pub points: Vec<Point2<f64>>,
    pub indices: Vec<usize>,
}

impl Outline2D {
    /// Create an outline from an outer boundary
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Centered axis-aligned rectangle
    pub fn rectangle(width: f64, height: f64) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self::new(vec![
            Point2::new(-half_w, -half_h),
            Point2::new(half_w, -half_h),
            Point2::new(half_w, half_h),
            Point2::new(-half_w, half_h),
        ])
    }

    /// Rectangle from corner coordinates
    pub fn rect_from_corners(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(vec![
            Point2::new(min_x, min_y),
            Point2::new(max_x, min_y),
            Point2::new(max_x, max_y),
            Point2::new(min_x, max_y),
        ])
    }

    /// Add a hole (winding is normalized to clockwise)
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(ensure_cw(&hole));
    }

    /// 2D bounds as (min, max)
    pub fn bounds(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = Point2::new(f64::MAX, f64::MAX);
        let mut max = Point2::new(f64::MIN, f64::MIN);
        for p in &self.outer {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Signed area of the outer boundary
    pub fn area(&self) -> f64 {
        signed_area(&self.outer)
    }

    /// Whether the outline encloses a usable area
    pub fn is_valid(&self) -> bool {
        self.outer.len() >= 3 && self.area().abs() > MIN_AREA
    }

    /// Triangulate outer boundary and holes
    pub fn triangulate(&self) -> Result<OutlineTriangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidOutline(
                "Outline must have at least 3 vertices".to_string(),
            ));
        }

        let indices = if self.holes.is_empty() {
            triangulate(&self.outer)?
        } else {
            triangulate_with_holes(&self.outer, &self.holes)?
        };

        let mut points =
            Vec::with_capacity(self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>());
        points.extend_from_slice(&self.outer);
        for hole in &self.holes {
            points.extend_from_slice(hole);
        }

        Ok(OutlineTriangulation { points, indices })
    }
}

/// Compute the signed area of a closed contour.
/// Positive = counter-clockwise, negative = clockwise.
pub fn signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let n = contour.len();
    let mut area = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Point-in-polygon via ray casting
pub fn point_in_outline(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Sample a bulged contour into a plain polyline.
///
/// `bulges[i]` applies to the edge from `points[i]` to `points[i+1]`
/// (wrapping). A bulge of 0 keeps the straight segment; otherwise the edge
/// is replaced by an arc with included angle `4·atan(bulge)`, bowing left
/// of the edge direction for positive values.
pub fn sample_bulged_contour(points: &[Point2<f64>], bulges: &[f64]) -> Vec<Point2<f64>> {
    if points.len() < 3 || bulges.iter().all(|b| b.abs() < 1e-12) {
        return points.to_vec();
    }

    let n = points.len();
    let mut sampled = Vec::with_capacity(n * 4);

    for i in 0..n {
        let start = points[i];
        let end = points[(i + 1) % n];
        let bulge = bulges.get(i).copied().unwrap_or(0.0);

        sampled.push(start);

        if bulge.abs() < 1e-12 {
            continue;
        }

        let arc_points = sample_arc(start, end, bulge);
        sampled.extend(arc_points);
    }

    sampled
}

/// Intermediate points of a bulge arc, excluding both endpoints
fn sample_arc(start: Point2<f64>, end: Point2<f64>, bulge: f64) -> SmallVec<[Point2<f64>; 8]> {
    let mut result = SmallVec::new();

    let chord = end - start;
    let chord_len = chord.norm();
    if chord_len < 1e-12 {
        return result;
    }

    // Included angle and radius from the bulge value
    let theta = 4.0 * bulge.atan();
    let radius = chord_len / (2.0 * (theta / 2.0).sin().abs());

    // Arc center: perpendicular offset from the chord midpoint. A positive
    // bulge sweeps counter-clockwise, which puts the center on the left of
    // the travel direction (and the arc bowing right); minor arcs keep the
    // center on that side, major arcs flip it.
    let mid = Point2::new((start.x + end.x) * 0.5, (start.y + end.y) * 0.5);
    let left_normal = Point2::new(-chord.y / chord_len, chord.x / chord_len);
    let center_dist = (radius * radius - (chord_len / 2.0).powi(2)).max(0.0).sqrt();
    let side = if theta > 0.0 { 1.0 } else { -1.0 };
    let flip = if theta.abs() > std::f64::consts::PI {
        -1.0
    } else {
        1.0
    };
    let center = Point2::new(
        mid.x + left_normal.x * center_dist * side * flip,
        mid.y + left_normal.y * center_dist * side * flip,
    );

    let start_angle = (start.y - center.y).atan2(start.x - center.x);

    // Segment count scales with arc sweep
    let segments = ((theta.abs() / (2.0 * std::f64::consts::PI)) * 32.0).ceil() as usize;
    let segments = segments.clamp(2, 32);

    for k in 1..segments {
        let angle = start_angle + theta * (k as f64 / segments as f64);
        result.push(Point2::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }

    result
}

/// Check whether a contour matches an axis-aligned rectangular frame within
/// a per-edge tolerance.
///
/// Used to detect exterior contours that trace the profile outline exactly:
/// every contour point must lie within `tolerance` of the frame perimeter,
/// and the contour bounds must reach all four frame edges.
pub fn matches_rect_frame(
    contour: &[Point2<f64>],
    min: Point2<f64>,
    max: Point2<f64>,
    tolerance: f64,
) -> bool {
    if contour.len() < 4 {
        return false;
    }

    let mut touches_left = false;
    let mut touches_right = false;
    let mut touches_bottom = false;
    let mut touches_top = false;

    for p in contour {
        let on_left = (p.x - min.x).abs() <= tolerance;
        let on_right = (p.x - max.x).abs() <= tolerance;
        let on_bottom = (p.y - min.y).abs() <= tolerance;
        let on_top = (p.y - max.y).abs() <= tolerance;

        let inside_x = p.x >= min.x - tolerance && p.x <= max.x + tolerance;
        let inside_y = p.y >= min.y - tolerance && p.y <= max.y + tolerance;

        // Every point must sit on the frame perimeter
        if !((on_left || on_right) && inside_y || (on_bottom || on_top) && inside_x) {
            return false;
        }

        touches_left |= on_left;
        touches_right |= on_right;
        touches_bottom |= on_bottom;
        touches_top |= on_top;
    }

    touches_left && touches_right && touches_bottom && touches_top
}
