// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight and angled end cuts.

use super::{CutContext, CutHandler, CutSolid, DEFAULT_CHAMFER_LENGTH};
use crate::cut_classifier::CutClass;
use crate::error::Result;
use nalgebra::{Point3, Rotation3, Vector3};
use steelfab_geometry::box_solid;

/// Builds a box spanning the full section at an extremity, rotated about Y
/// by the cut angle.
pub struct StraightEndHandler;

impl CutHandler for StraightEndHandler {
    fn class(&self) -> CutClass {
        CutClass::StraightEnd
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let dims = &ctx.profile.dimensions;
        let half_l = dims.length / 2.0;

        let chamfer = ctx
            .feature
            .params
            .chamfer_length
            .unwrap_or(DEFAULT_CHAMFER_LENGTH);
        let angle_deg = ctx.feature.params.angle.unwrap_or(0.0);

        // Which end: prefer the contour bounds, fall back to the anchor
        let points = ctx.feature.params.points2();
        let at_start = if points.is_empty() {
            ctx.feature.position[0] < dims.length / 2.0
        } else {
            let min_x = points.iter().map(|p| p.x).fold(f64::MAX, f64::min);
            min_x <= 1.0
        };

        // Box covers the chamfer length plus generous margins beyond the
        // section so the rotated tool still swallows the whole end
        let margin = dims.height.max(dims.width);
        let box_len = chamfer + margin;

        let center_x = if at_start {
            -half_l + chamfer - box_len / 2.0
        } else {
            half_l - chamfer + box_len / 2.0
        };

        let mut solid = box_solid(
            Point3::new(center_x, 0.0, 0.0),
            Vector3::new(box_len, dims.height + margin, dims.width + margin),
        );

        if angle_deg.abs() > 1e-9 {
            // Rotate around the vertical axis through the cut plane
            let pivot_x = if at_start {
                -half_l + chamfer
            } else {
                half_l - chamfer
            };
            let rotation =
                Rotation3::from_axis_angle(&Vector3::y_axis(), angle_deg.to_radians())
                    .to_homogeneous();

            solid.translate(Vector3::new(-pivot_x, 0.0, 0.0));
            solid.apply_transform(&rotation);
            solid.translate(Vector3::new(pivot_x, 0.0, 0.0));
        }

        Ok(CutSolid::subtract(solid))
    }
}
