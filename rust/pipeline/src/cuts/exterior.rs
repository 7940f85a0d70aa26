// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exterior (AK) contour handling.
//!
//! An AK block describes the material that remains. When the contour traces
//! the profile outline within tolerance the cut is a no-op; otherwise the
//! complement of the contour inside the face frame is extruded and removed.

use super::{through_span, CutContext, CutHandler, CutSolid};
use crate::cut_classifier::CutClass;
use crate::error::Result;
use crate::resolver::face_frame;
use nalgebra::Point2;
use steelfab_geometry::{
    complement_in_frame, extrude_outline, matches_rect_frame, sample_bulged_contour, Mesh,
};
use tracing::debug;

/// Tolerance for the outline-match no-op check (mm)
const OUTLINE_MATCH_TOLERANCE: f64 = 1.0;

pub struct ExteriorCutHandler;

impl CutHandler for ExteriorCutHandler {
    fn class(&self) -> CutClass {
        CutClass::Exterior
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let dims = &ctx.profile.dimensions;
        let frame = face_frame(ctx.resolved.face, ctx.profile);

        let contour = sample_bulged_contour(
            &ctx.feature.params.points2(),
            &ctx.feature.params.bulges,
        );

        // Face footprint in DSTV coordinates: x along the length, y across
        // the face span
        let face_span = face_span_for(ctx);
        let frame_min = Point2::new(0.0, 0.0);
        let frame_max = Point2::new(dims.length, face_span);

        if matches_rect_frame(&contour, frame_min, frame_max, OUTLINE_MATCH_TOLERANCE) {
            debug!(
                feature = %ctx.feature.id,
                "exterior contour matches the profile outline, skipping"
            );
            return Ok(CutSolid::skip(
                "exterior contour matches profile outline within tolerance",
            ));
        }

        // Removal region = face frame minus the contour
        let regions = complement_in_frame(&contour, frame_min, frame_max)?;
        if regions.is_empty() {
            return Ok(CutSolid::skip("exterior contour leaves nothing to remove"));
        }

        let (back_off, depth) = through_span(&ctx.resolved);
        let transform = frame.extrusion_transform(back_off);

        let mut solid = Mesh::new();
        for region in &regions {
            // Contours arrive in DSTV face coordinates; remap into the
            // outline plane of the frame before extrusion
            let mut outline = region.clone();
            remap_outline(&mut outline, &frame);
            let part = extrude_outline(&outline, depth, Some(transform))?;
            solid.merge(&part);
        }

        Ok(CutSolid::subtract(solid))
    }
}

/// Span of the DSTV y axis on the bound face
fn face_span_for(ctx: &CutContext) -> f64 {
    use steelfab_core::Face;
    match ctx.resolved.face {
        Face::Web | Face::Front | Face::Back | Face::Left | Face::Right | Face::LeftLeg => {
            ctx.profile.dimensions.height
        }
        _ => ctx.profile.dimensions.width,
    }
}

/// Remap DSTV face coordinates (x-along-length, y-across) into the frame's
/// (u, v) outline plane. Swapped frames mirror the contour, so windings are
/// re-normalized afterwards.
fn remap_outline(outline: &mut steelfab_geometry::Outline2D, frame: &crate::resolver::FaceFrame) {
    let remap = |points: &mut Vec<Point2<f64>>| {
        for p in points.iter_mut() {
            *p = frame.outline_point(p.x, p.y);
        }
    };

    remap(&mut outline.outer);
    outline.outer = steelfab_geometry::ensure_ccw(&outline.outer);
    for hole in &mut outline.holes {
        remap(hole);
        *hole = steelfab_geometry::contour::ensure_cw(hole);
    }
}
