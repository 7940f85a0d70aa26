// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chamfers and bevels.
//!
//! Both remove a right-triangle prism along a long edge of the bound face.
//! A chamfer's legs come from `width` and `angle` (45 degrees when omitted);
//! a bevel is the same wedge driven by `angle` and `depth`, typically used
//! as a weld preparation. The prism runs along the piece length, over
//! `params.length` when given or the full edge otherwise.

use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::{Error, Result};
use nalgebra::{Matrix4, Vector3};
use steelfab_core::{Feature, FeatureKind, SteelProfile};
use steelfab_geometry::wedge;

/// Default chamfer angle (degrees)
const DEFAULT_ANGLE: f64 = 45.0;

/// Overshoot past the edge faces (mm)
const EDGE_OVERSHOOT: f64 = 0.5;

pub struct ChamferProcessor;

impl ChamferProcessor {
    /// Outer corner of the long edge nearest the anchor, with the inward
    /// lateral direction.
    ///
    /// Horizontal faces have edges at `z = +-W/2`; vertical faces at
    /// `y = +-H/2`. The anchor's lateral coordinate picks the nearer one.
    fn edge_for(ctx: &ProcessorContext) -> (nalgebra::Point3<f64>, Vector3<f64>) {
        let dims = &ctx.profile.dimensions;
        let resolved = &ctx.resolved;
        let surface = resolved.surface_point();

        if resolved.normal.y.abs() > 0.5 {
            // Horizontal face: edges run at z = +-W/2
            let edge_z = if surface.z >= 0.0 {
                dims.width / 2.0
            } else {
                -dims.width / 2.0
            };
            let corner = nalgebra::Point3::new(surface.x, surface.y, edge_z);
            let inward = Vector3::new(0.0, 0.0, -edge_z.signum());
            (corner, inward)
        } else {
            // Vertical face: edges run at y = +-H/2
            let edge_y = if surface.y >= 0.0 {
                dims.height / 2.0
            } else {
                -dims.height / 2.0
            };
            let corner = nalgebra::Point3::new(surface.x, edge_y, surface.z);
            let inward = Vector3::new(0.0, -edge_y.signum(), 0.0);
            (corner, inward)
        }
    }
}

impl FeatureProcessor for ChamferProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Chamfer, FeatureKind::Bevel]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        let has_width = feature.params.width.unwrap_or(0.0) > 0.0;
        let has_depth = feature.params.depth.unwrap_or(0.0) > 0.0;
        if !has_width && !has_depth {
            issues.push("chamfer requires a positive width or depth".to_string());
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let params = &ctx.feature.params;
        let angle = params.angle.unwrap_or(DEFAULT_ANGLE).to_radians();

        // Legs: lateral inset on the surface, depth into the material
        let (inset, depth) = match (params.width, params.depth) {
            (Some(w), Some(d)) => (w, d),
            (Some(w), None) => (w, w * angle.tan()),
            (None, Some(d)) => (d / angle.tan(), d),
            (None, None) => {
                return Err(Error::InvalidFeatureParams {
                    feature_id: ctx.feature.id.clone(),
                    reasons: vec!["chamfer requires width or depth".to_string()],
                })
            }
        };

        let run = params.length.unwrap_or(ctx.profile.dimensions.length) + 2.0 * EDGE_OVERSHOOT;
        let solid_raw = wedge(depth + EDGE_OVERSHOOT, inset + EDGE_OVERSHOOT, run)?;

        let (corner, inward) = Self::edge_for(ctx);
        let down = -ctx.resolved.normal;

        // Wedge legs: +X -> down into the material, +Y -> inward along the
        // surface; prism axis follows from the right-handed basis
        let axis = down.cross(&inward);
        let mut lift = corner + ctx.resolved.normal * EDGE_OVERSHOOT + inward * (-EDGE_OVERSHOOT);
        // Full-edge runs center on the piece, partial runs on the anchor
        lift.x = if params.length.is_some() {
            ctx.resolved.position.x
        } else {
            0.0
        };
        let place = Matrix4::new(
            down.x, inward.x, axis.x, lift.x,
            down.y, inward.y, axis.y, lift.y,
            down.z, inward.z, axis.z, lift.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let mut solid = solid_raw;
        solid.apply_transform(&place);

        Ok(FeatureEffect::Cut(solid))
    }
}
