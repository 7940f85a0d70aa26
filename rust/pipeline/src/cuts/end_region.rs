// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-region cut family.
//!
//! Five flavors for contours parked at one extremity, distinguished by
//! which section edges they touch: L-shape (corner step), top, bottom,
//! full-height and simple (keeps both edges). All of them reduce to one or
//! two axis-aligned boxes through the section width; the L-shape builder
//! merges two boxes into the step solid.

use super::{CutContext, CutHandler, CutSolid};
use crate::cut_classifier::CutClass;
use crate::error::{Error, Result};
use nalgebra::{Point2, Point3};
use steelfab_geometry::{box_from_bounds, Mesh};

/// Contour bounds in DSTV face coordinates
fn dstv_bounds(ctx: &CutContext) -> Result<(Point2<f64>, Point2<f64>)> {
    let points = ctx.feature.params.points2();
    if points.len() < 3 {
        return Err(Error::InvalidFeatureParams {
            feature_id: ctx.feature.id.clone(),
            reasons: vec!["end-region cut requires a contour".to_string()],
        });
    }

    let mut min = Point2::new(f64::MAX, f64::MAX);
    let mut max = Point2::new(f64::MIN, f64::MIN);
    for p in &points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Ok((min, max))
}

/// Box through the full width for a DSTV x/y rectangle on the section plane
fn section_box(ctx: &CutContext, x0: f64, x1: f64, y0: f64, y1: f64) -> Mesh {
    let dims = &ctx.profile.dimensions;
    let half_l = dims.length / 2.0;
    let half_h = dims.height / 2.0;
    // Over-wide so the tool clears the section regardless of jitter
    let z_reach = dims.width;

    box_from_bounds(
        Point3::new(x0 - half_l, y0 - half_h, -z_reach),
        Point3::new(x1 - half_l, y1 - half_h, z_reach),
    )
}

/// Overshoot applied past the piece end and the section edges (mm)
const EDGE_OVERSHOOT: f64 = 5.0;

/// Extend an end-region x range past the nearer piece end
fn with_end_overshoot(ctx: &CutContext, min_x: f64, max_x: f64) -> (f64, f64) {
    let length = ctx.profile.dimensions.length;
    if min_x <= length - max_x {
        (min_x.min(0.0) - EDGE_OVERSHOOT, max_x)
    } else {
        (min_x, max_x.max(length) + EDGE_OVERSHOOT)
    }
}

/// Corner step keeping one edge: the union of two boxes
pub struct LShapeCutHandler;

impl CutHandler for LShapeCutHandler {
    fn class(&self) -> CutClass {
        CutClass::LShape
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let dims = &ctx.profile.dimensions;
        let (min, max) = dstv_bounds(ctx)?;
        let (x0, x1) = with_end_overshoot(ctx, min.x, max.x);

        // Locate the step: the contour's interior corner splits the region
        // into a full-height strip plus a partial-height strip
        let points = ctx.feature.params.points2();
        let mut step_x = (min.x + max.x) / 2.0;
        let mut step_y = (min.y + max.y) / 2.0;
        for p in &points {
            let interior_x = p.x > min.x + 1.0 && p.x < max.x - 1.0;
            let interior_y = p.y > min.y + 1.0 && p.y < max.y - 1.0;
            if interior_x || interior_y {
                step_x = p.x;
                step_y = p.y;
            }
        }

        let at_start = min.x <= dims.length - max.x;
        let (strip_x0, strip_x1) = if at_start { (x0, step_x) } else { (step_x, x1) };

        // Full-height strip nearest the end, partial strip up to the step
        let mut solid = section_box(
            ctx,
            strip_x0,
            strip_x1,
            min.y - EDGE_OVERSHOOT,
            max.y + EDGE_OVERSHOOT,
        );
        let partial = if at_start {
            section_box(ctx, step_x, x1, min.y - EDGE_OVERSHOOT, step_y)
        } else {
            section_box(ctx, x0, step_x, min.y - EDGE_OVERSHOOT, step_y)
        };
        solid.merge(&partial);

        Ok(CutSolid::subtract(solid))
    }
}

/// Removes the top edge at an extremity
pub struct TopCutHandler;

impl CutHandler for TopCutHandler {
    fn class(&self) -> CutClass {
        CutClass::TopCut
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let (min, max) = dstv_bounds(ctx)?;
        let (x0, x1) = with_end_overshoot(ctx, min.x, max.x);
        let solid = section_box(
            ctx,
            x0,
            x1,
            min.y,
            ctx.profile.dimensions.height + EDGE_OVERSHOOT,
        );
        Ok(CutSolid::subtract(solid))
    }
}

/// Removes the bottom edge at an extremity
pub struct BottomCutHandler;

impl CutHandler for BottomCutHandler {
    fn class(&self) -> CutClass {
        CutClass::BottomCut
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let (min, max) = dstv_bounds(ctx)?;
        let (x0, x1) = with_end_overshoot(ctx, min.x, max.x);
        let solid = section_box(ctx, x0, x1, -EDGE_OVERSHOOT, max.y);
        Ok(CutSolid::subtract(solid))
    }
}

/// Removes the full section height over the contour's length
pub struct FullCutHandler;

impl CutHandler for FullCutHandler {
    fn class(&self) -> CutClass {
        CutClass::FullCut
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let (min, max) = dstv_bounds(ctx)?;
        let (x0, x1) = with_end_overshoot(ctx, min.x, max.x);
        let solid = section_box(
            ctx,
            x0,
            x1,
            -EDGE_OVERSHOOT,
            ctx.profile.dimensions.height + EDGE_OVERSHOOT,
        );
        Ok(CutSolid::subtract(solid))
    }
}

/// Keeps both edges: removes only the contour's own band
pub struct SimpleCutHandler;

impl CutHandler for SimpleCutHandler {
    fn class(&self) -> CutClass {
        CutClass::SimpleCut
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let (min, max) = dstv_bounds(ctx)?;
        let (x0, x1) = with_end_overshoot(ctx, min.x, max.x);
        let solid = section_box(ctx, x0, x1, min.y, max.y);
        Ok(CutSolid::subtract(solid))
    }
}
