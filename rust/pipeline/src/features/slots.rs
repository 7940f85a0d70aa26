// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slots and cutouts.
//!
//! A slot is a rectangular or oblong band at the anchor; a cutout is an
//! arbitrary contour. Both extrude through the face depth and subtract.

use super::holes::{bore_outline, bore_solid};
use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::{Error, Result};
use crate::resolver::face_frame;
use nalgebra::Point2;
use steelfab_core::{Feature, FeatureKind, HoleType, SteelProfile};
use steelfab_geometry::sample_bulged_contour;

/// Rectangular or oblong band at the anchor
pub struct SlotProcessor;

impl FeatureProcessor for SlotProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Slot]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        let width = feature.params.width.or(feature.params.diameter);
        if width.unwrap_or(0.0) <= 0.0 {
            issues.push("slot requires a positive width or diameter".to_string());
        }
        if feature.params.length.unwrap_or(0.0) <= 0.0 {
            issues.push("slot requires a positive length".to_string());
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let params = &ctx.feature.params;
        let width = params
            .width
            .or(params.diameter)
            .ok_or_else(|| Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["slot requires a width or diameter".to_string()],
            })?;
        let length = params.length.ok_or_else(|| Error::InvalidFeatureParams {
            feature_id: ctx.feature.id.clone(),
            reasons: vec!["slot requires a length".to_string()],
        })?;

        // Rounded ends by default; square when explicitly rectangular
        let hole_type = match params.hole_type {
            Some(HoleType::Square) | Some(HoleType::Rectangular) => HoleType::Rectangular,
            _ => HoleType::Slotted,
        };

        let frame = face_frame(ctx.resolved.face, ctx.profile);
        let mut outline = bore_outline(
            hole_type,
            ctx.feature.position[0],
            ctx.feature.position[1],
            width,
            Some(length),
            Some(length),
            Some(width),
        );

        // In-face rotation about the anchor (T-slots cross their bars)
        let spin = ctx.feature.rotation[2];
        if spin.abs() > 1e-9 {
            let (sin, cos) = spin.sin_cos();
            let (cx, cy) = (ctx.feature.position[0], ctx.feature.position[1]);
            for p in outline.iter_mut() {
                let dx = p.x - cx;
                let dy = p.y - cy;
                p.x = cx + dx * cos - dy * sin;
                p.y = cy + dx * sin + dy * cos;
            }
        }

        let solid = bore_solid(&frame, &ctx.resolved, &outline, params.depth)?;
        Ok(FeatureEffect::Cut(solid))
    }
}

/// Arbitrary contour opening; also serves DSTV PU volume blocks
pub struct CutoutProcessor;

impl FeatureProcessor for CutoutProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Cutout, FeatureKind::Volume]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);
        if feature.params.distinct_point_count() < 3 {
            issues.push("cutout requires at least 3 distinct contour points".to_string());
        }
        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let points = ctx.feature.params.points2();
        if points.len() < 3 {
            return Err(Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["cutout requires a contour".to_string()],
            });
        }

        let sampled = sample_bulged_contour(&points, &ctx.feature.params.bulges);

        // Contour points are face-relative to the anchor
        let anchored: Vec<Point2<f64>> = sampled
            .iter()
            .map(|p| {
                Point2::new(
                    p.x + ctx.feature.position[0],
                    p.y + ctx.feature.position[1],
                )
            })
            .collect();

        let frame = face_frame(ctx.resolved.face, ctx.profile);
        let solid = bore_solid(&frame, &ctx.resolved, &anchored, ctx.feature.params.depth)?;
        Ok(FeatureEffect::Cut(solid))
    }
}
