// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Markings and text.
//!
//! By default a marking never touches the geometry: it is recorded in the
//! mesh sidecar for the renderer, anchored just above the face surface.
//! The optional engraving mode additionally produces a shallow box along
//! the outward normal for subtraction.

use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::Result;
use nalgebra::Vector3;
use steelfab_core::{Feature, FeatureKind, SteelProfile};
use steelfab_geometry::{box_solid, MarkingRecord};

/// Lift of the marking anchor above the surface (mm)
const SURFACE_LIFT: f64 = 0.1;

/// Default glyph height (mm)
const DEFAULT_SIZE: f64 = 10.0;

/// Default engraving depth (mm)
const ENGRAVE_DEPTH: f64 = 0.3;

/// Glyph aspect ratio used to estimate text extents
const GLYPH_ASPECT: f64 = 0.6;

pub struct MarkingProcessor;

impl FeatureProcessor for MarkingProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Marking, FeatureKind::Text]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        if let Some(size) = feature.params.size {
            if size <= 0.0 {
                issues.push(format!("marking size must be positive, got {size}"));
            }
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let params = &ctx.feature.params;
        let text = params.text.clone().unwrap_or_default();
        let size = params.size.unwrap_or(DEFAULT_SIZE);

        let anchor = ctx.resolved.surface_point() + ctx.resolved.normal * SURFACE_LIFT;
        let record = MarkingRecord {
            id: ctx.feature.id.clone(),
            text: text.clone(),
            size,
            face: Some(ctx.resolved.face),
            position: [anchor.x, anchor.y, anchor.z],
            engraved: params.engrave,
        };

        let engrave = if params.engrave {
            // Shallow box covering the text footprint, biting along -normal
            let run = (text.chars().count().max(1) as f64) * size * GLYPH_ASPECT;
            let depth = params.depth.unwrap_or(ENGRAVE_DEPTH);

            let half_depth_dir = ctx.resolved.normal * (depth / 2.0);
            let center = ctx.resolved.surface_point() - half_depth_dir;

            // Extents: run along the face, glyph height across, shallow
            // along the normal
            let size_vec = if ctx.resolved.normal.y.abs() > 0.5 {
                Vector3::new(run, depth + SURFACE_LIFT, size)
            } else if ctx.resolved.normal.z.abs() > 0.5 {
                Vector3::new(run, size, depth + SURFACE_LIFT)
            } else {
                Vector3::new(depth + SURFACE_LIFT, size, run)
            };

            Some(box_solid(center, size_vec))
        } else {
            None
        };

        Ok(FeatureEffect::Marking { record, engrave })
    }
}
