// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tapped holes.
//!
//! The thread is approximated as a lathe of revolution: sawtooth rings
//! between the core diameter `D - 1.0825 P` and the pitch diameter
//! `D - 0.6495 P`, spaced at the pitch. Exact helices are out of scope.
//! When fewer than three rings fit the bore falls back to a plain cylinder
//! at the core diameter.

use super::holes::{bore_outline, bore_solid};
use super::{orient_y_along, FeatureEffect, FeatureProcessor, ProcessorContext, BORE_THROUGH_MULTIPLIER};
use crate::error::{Error, Result};
use crate::resolver::face_frame;
use nalgebra::{Matrix4, Point2, Point3};
use steelfab_core::{
    core_diameter, pitch_diameter, pitch_for_diameter, Feature, FeatureKind, HoleType,
    SteelProfile,
};
use steelfab_geometry::{circle_segments_for_radius, lathe};
use tracing::debug;

/// Minimum ring count for the sawtooth approximation
const MIN_THREAD_RINGS: usize = 3;

pub struct TappedHoleProcessor;

impl TappedHoleProcessor {
    /// Closed (radius, height) lathe profile of the threaded bore.
    ///
    /// Height runs from `-reach/2` to `+reach/2`; rings are centered in the
    /// span with plain core-diameter runouts at both ends.
    fn thread_profile(diameter: f64, pitch: f64, reach: f64, rings: usize) -> Vec<Point2<f64>> {
        let r_core = core_diameter(diameter, pitch) / 2.0;
        let r_pitch = pitch_diameter(diameter, pitch) / 2.0;
        let half = reach / 2.0;

        let teeth_span = rings as f64 * pitch;
        let mut y = -teeth_span / 2.0;

        let mut profile = Vec::with_capacity(rings * 2 + 6);
        profile.push(Point2::new(0.0, -half));
        profile.push(Point2::new(r_core, -half));
        profile.push(Point2::new(r_core, y));

        for _ in 0..rings {
            profile.push(Point2::new(r_pitch, y + pitch / 2.0));
            profile.push(Point2::new(r_core, y + pitch));
            y += pitch;
        }

        profile.push(Point2::new(r_core, half));
        profile.push(Point2::new(0.0, half));
        profile
    }
}

impl FeatureProcessor for TappedHoleProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::TappedHole]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        if let Some(pitch) = feature.params.pitch {
            if pitch <= 0.0 {
                issues.push(format!("thread pitch must be positive, got {pitch}"));
            } else if let Some(d) = feature.params.diameter {
                if core_diameter(d, pitch) <= 0.0 {
                    issues.push(format!(
                        "pitch {pitch} leaves no core diameter for M{d}"
                    ));
                }
            }
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let params = &ctx.feature.params;
        let diameter = params.diameter.ok_or_else(|| Error::InvalidFeatureParams {
            feature_id: ctx.feature.id.clone(),
            reasons: vec!["tapped hole requires a diameter".to_string()],
        })?;

        let pitch = params.pitch.unwrap_or_else(|| pitch_for_diameter(diameter));
        // Through taps reach face depth x 1.1; blind taps stop at the
        // requested depth, centered from the surface inward
        let (reach, center) = match params.depth {
            Some(depth) => (
                depth,
                ctx.resolved.surface_point() - ctx.resolved.normal * (depth / 2.0),
            ),
            None => (
                ctx.resolved.depth * BORE_THROUGH_MULTIPLIER,
                ctx.resolved.cut_center(),
            ),
        };
        let rings = (reach / pitch).floor() as usize;

        if rings < MIN_THREAD_RINGS {
            // Too short to ring: plain cylinder at the core diameter
            debug!(
                feature = %ctx.feature.id,
                rings, "thread too short for sawtooth rings, using core bore"
            );
            let frame = face_frame(ctx.resolved.face, ctx.profile);
            let outline = bore_outline(
                HoleType::Round,
                ctx.feature.position[0],
                ctx.feature.position[1],
                core_diameter(diameter, pitch),
                None,
                None,
                None,
            );
            let solid = bore_solid(&frame, &ctx.resolved, &outline, params.depth)?;
            return Ok(FeatureEffect::Cut(solid));
        }

        let profile = Self::thread_profile(diameter, pitch, reach, rings);
        let segments = circle_segments_for_radius(diameter / 2.0);

        let mut solid = lathe(Point3::origin(), &profile, segments);
        let orient = orient_y_along(&ctx.resolved.normal);
        let place = Matrix4::new_translation(&center.coords) * orient;
        solid.apply_transform(&place);

        Ok(FeatureEffect::Cut(solid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use steelfab_core::{Face, ProfileDimensions, ProfileKind};
    use steelfab_geometry::Mesh;

    fn thick_plate() -> SteelProfile {
        SteelProfile::new(
            ProfileKind::Plate,
            "BL40",
            ProfileDimensions::new(500.0, 40.0, 300.0, 40.0),
        )
    }

    fn tapped(diameter: f64) -> Feature {
        let mut f = Feature::new("m12", FeatureKind::TappedHole, [250.0, 150.0, 0.0]);
        f.face = Some(Face::Top);
        f.params.diameter = Some(diameter);
        f
    }

    fn build(feature: &Feature, profile: &SteelProfile) -> Mesh {
        let ctx = ProcessorContext {
            feature,
            profile,
            resolved: resolver::resolve(feature, profile),
        };
        match TappedHoleProcessor.build(&ctx).unwrap() {
            FeatureEffect::Cut(mesh) => mesh,
            _ => panic!("tapped hole must produce a cut"),
        }
    }

    #[test]
    fn test_thread_profile_diameters() {
        let profile = TappedHoleProcessor::thread_profile(12.0, 1.75, 40.0, 10);

        let max_r = profile.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let tooth_r = core_diameter(12.0, 1.75) / 2.0;

        // Peaks at the pitch radius, valleys at the core radius
        assert!((max_r - pitch_diameter(12.0, 1.75) / 2.0).abs() < 1e-9);
        assert!(profile.iter().filter(|p| (p.x - tooth_r).abs() < 1e-9).count() > 10);
    }

    #[test]
    fn test_ringed_bore_through_plate() {
        let profile = thick_plate();
        let solid = build(&tapped(12.0), &profile);

        assert!(!solid.is_empty());
        let (min, max) = solid.bounds();

        // Lathe axis along Y through the plate
        assert!((min.y as f64) < -20.0);
        assert!((max.y as f64) > 20.0);

        // Radial extent below the nominal radius (threads cut inward)
        let x_span = (max.x - min.x) as f64;
        assert!(x_span < 12.0);
        assert!(x_span > core_diameter(12.0, 1.75));
    }

    #[test]
    fn test_short_thread_falls_back_to_core_bore() {
        // M24 coarse pitch 3.0; a 4mm plate fits ~2 rings over the reach
        let profile = SteelProfile::new(
            ProfileKind::Plate,
            "BL4",
            ProfileDimensions::new(200.0, 4.0, 100.0, 4.0),
        );
        let mut feature = tapped(24.0);
        feature.position = [100.0, 50.0, 0.0];

        let solid = build(&feature, &profile);
        let (min, max) = solid.bounds();

        // Plain cylinder at the core diameter
        let x_span = (max.x - min.x) as f64;
        assert!((x_span - core_diameter(24.0, 3.0)).abs() < 0.5);
    }

    #[test]
    fn test_invalid_pitch_rejected() {
        let profile = thick_plate();
        let mut feature = tapped(12.0);
        feature.params.pitch = Some(-1.0);
        assert!(!TappedHoleProcessor.validate(&feature, &profile).is_empty());
    }
}
