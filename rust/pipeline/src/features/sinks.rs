// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Countersinks, counterbores and spotfaces.
//!
//! All three are lathe profiles around the bore axis: a conical transition
//! for countersinks, a stepped cylinder for counterbores, a shallow
//! counterbore with a chamfered rim for spotfaces.

use super::{orient_y_along, FeatureEffect, FeatureProcessor, ProcessorContext, BORE_THROUGH_MULTIPLIER};
use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point2, Point3};
use steelfab_core::{Feature, FeatureKind, SteelProfile};
use steelfab_geometry::{circle_segments_for_radius, lathe, Mesh};

/// Default countersink cone angle (degrees, included)
const DEFAULT_SINK_ANGLE: f64 = 90.0;

/// Overshoot above the surface keeping the boolean clean (mm)
const SURFACE_OVERSHOOT: f64 = 0.5;

pub struct SinkProcessor;

impl SinkProcessor {
    /// Closed (radius, height) profile; height 0 is the outer surface,
    /// negative heights go into the material.
    fn sink_profile(kind: FeatureKind, feature: &Feature, through: f64) -> Vec<Point2<f64>> {
        let params = &feature.params;
        let d = params.diameter.unwrap_or(10.0);
        let r_hole = d / 2.0;
        let sink_d = params.sink_diameter.unwrap_or(d * 2.0);
        let r_sink = sink_d / 2.0;

        match kind {
            FeatureKind::Countersink => {
                // Cone from the sink diameter at the surface down to the
                // bore diameter, then the through bore
                let angle = params.sink_angle.unwrap_or(DEFAULT_SINK_ANGLE);
                let cone_depth = (r_sink - r_hole) / (angle.to_radians() / 2.0).tan();

                vec![
                    Point2::new(0.0, SURFACE_OVERSHOOT),
                    Point2::new(r_sink, SURFACE_OVERSHOOT),
                    Point2::new(r_sink, 0.0),
                    Point2::new(r_hole, -cone_depth),
                    Point2::new(r_hole, -through),
                    Point2::new(0.0, -through),
                ]
            }
            FeatureKind::Counterbore => {
                let bore_depth = params.depth.unwrap_or(d / 2.0);

                vec![
                    Point2::new(0.0, SURFACE_OVERSHOOT),
                    Point2::new(r_sink, SURFACE_OVERSHOOT),
                    Point2::new(r_sink, -bore_depth),
                    Point2::new(r_hole, -bore_depth),
                    Point2::new(r_hole, -through),
                    Point2::new(0.0, -through),
                ]
            }
            _ => {
                // Spotface: shallow counterbore, rim chamfered at 45
                let face_depth = params.depth.unwrap_or(2.0);
                let chamfer = params.chamfer_length.unwrap_or(1.0).min(r_sink - r_hole);

                vec![
                    Point2::new(0.0, SURFACE_OVERSHOOT),
                    Point2::new(r_sink - chamfer, SURFACE_OVERSHOOT),
                    Point2::new(r_sink, -chamfer.min(face_depth)),
                    Point2::new(r_sink, -face_depth),
                    Point2::new(r_hole, -face_depth),
                    Point2::new(r_hole, -through),
                    Point2::new(0.0, -through),
                ]
            }
        }
    }
}

impl FeatureProcessor for SinkProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![
            FeatureKind::Countersink,
            FeatureKind::Counterbore,
            FeatureKind::Spotface,
        ]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        let d = feature.params.diameter.unwrap_or(0.0);
        if let Some(sink_d) = feature.params.sink_diameter {
            if sink_d <= d {
                issues.push(format!(
                    "sink diameter {sink_d} must exceed the bore diameter {d}"
                ));
            }
        }
        if let Some(angle) = feature.params.sink_angle {
            if angle <= 0.0 || angle >= 180.0 {
                issues.push(format!("sink angle must lie in (0, 180), got {angle}"));
            }
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        if ctx.feature.params.diameter.is_none() {
            return Err(Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["sink features require a diameter".to_string()],
            });
        }

        let through = ctx.resolved.depth * BORE_THROUGH_MULTIPLIER;
        let profile = Self::sink_profile(ctx.feature.kind, ctx.feature, through);
        let segments = circle_segments_for_radius(
            ctx.feature
                .params
                .sink_diameter
                .unwrap_or(ctx.feature.params.diameter.unwrap_or(10.0)) / 2.0,
        );

        let mut solid: Mesh = lathe(Point3::origin(), &profile, segments);
        let orient = orient_y_along(&ctx.resolved.normal);
        let place = Matrix4::new_translation(&ctx.resolved.surface_point().coords) * orient;
        solid.apply_transform(&place);

        Ok(FeatureEffect::Cut(solid))
    }
}
