// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bored holes: round, slotted, square and rectangular.
//!
//! A hole is the extrusion of its cross-section outline along the face
//! normal: through-all by default (face depth x 1.1), blind when
//! `params.depth` is given.

use super::{FeatureEffect, FeatureProcessor, ProcessorContext, BORE_THROUGH_MULTIPLIER};
use crate::error::{Error, Result};
use crate::resolver::{face_frame, FaceFrame, ResolvedPosition};
use nalgebra::Point2;
use steelfab_core::{Feature, FeatureKind, HoleType, SteelProfile};
use steelfab_geometry::{circle_segments_for_radius, ensure_ccw, extrude_outline_between, Mesh, Outline2D};

/// Cross-section outline of a bore in DSTV face coordinates around `(x, y)`
pub(crate) fn bore_outline(
    hole_type: HoleType,
    x: f64,
    y: f64,
    diameter: f64,
    slot_length: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
) -> Vec<Point2<f64>> {
    let r = diameter / 2.0;

    match hole_type {
        HoleType::Round => {
            let segments = circle_segments_for_radius(r);
            (0..segments)
                .map(|i| {
                    let a = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
                    Point2::new(x + r * a.cos(), y + r * a.sin())
                })
                .collect()
        }
        HoleType::Slotted => {
            let length = slot_length.unwrap_or(diameter).max(diameter);
            let flat = (length - diameter) / 2.0;
            if flat <= 1e-9 {
                return bore_outline(HoleType::Round, x, y, diameter, None, None, None);
            }

            // Oblong: two semicircles joined by flats, elongated along x
            let segments = circle_segments_for_radius(r).max(12) / 2;
            let mut points = Vec::with_capacity(segments * 2 + 2);

            // Right cap, bottom to top
            for i in 0..=segments {
                let a = -std::f64::consts::FRAC_PI_2
                    + std::f64::consts::PI * (i as f64) / (segments as f64);
                points.push(Point2::new(x + flat + r * a.cos(), y + r * a.sin()));
            }
            // Left cap, top to bottom
            for i in 0..=segments {
                let a = std::f64::consts::FRAC_PI_2
                    + std::f64::consts::PI * (i as f64) / (segments as f64);
                points.push(Point2::new(x - flat + r * a.cos(), y + r * a.sin()));
            }
            points
        }
        HoleType::Square => {
            vec![
                Point2::new(x - r, y - r),
                Point2::new(x + r, y - r),
                Point2::new(x + r, y + r),
                Point2::new(x - r, y + r),
            ]
        }
        HoleType::Rectangular => {
            let half_w = width.unwrap_or(diameter) / 2.0;
            let half_h = height.unwrap_or(diameter) / 2.0;
            vec![
                Point2::new(x - half_w, y - half_h),
                Point2::new(x + half_w, y - half_h),
                Point2::new(x + half_w, y + half_h),
                Point2::new(x - half_w, y + half_h),
            ]
        }
    }
}

/// Extrude a face-coordinate bore outline through or into the wall.
///
/// `blind_depth = None` drills through (face depth x 1.1); otherwise the
/// bore stops `blind_depth` below the surface.
pub(crate) fn bore_solid(
    frame: &FaceFrame,
    resolved: &ResolvedPosition,
    face_points: &[Point2<f64>],
    blind_depth: Option<f64>,
) -> Result<Mesh> {
    let mapped: Vec<Point2<f64>> = face_points
        .iter()
        .map(|p| frame.outline_point(p.x, p.y))
        .collect();
    let outline = Outline2D::new(ensure_ccw(&mapped));

    // Frame-z of the outer surface: mid-anchored frames sit half a wall
    // below it, surface-anchored frames on it
    let surface_z = if resolved.surface_anchored {
        0.0
    } else {
        resolved.depth / 2.0
    };

    let (z0, z1) = match blind_depth {
        None => {
            let reach = resolved.depth * BORE_THROUGH_MULTIPLIER;
            (surface_z - reach, surface_z + (reach - resolved.depth))
        }
        Some(depth) => {
            // Small overshoot above the surface keeps the boolean clean
            (surface_z - depth, surface_z + 1.0)
        }
    };

    let transform = frame.extrusion_transform(-z0);
    Ok(extrude_outline_between(
        &outline,
        0.0,
        z1 - z0,
        Some(transform),
    )?)
}

/// Round/slotted/square/rectangular bores
pub struct HoleProcessor;

impl FeatureProcessor for HoleProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Hole]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        if let Some(depth) = feature.params.depth {
            if depth <= 0.0 {
                issues.push(format!("blind depth must be positive, got {depth}"));
            }
        }
        if matches!(feature.params.hole_type, Some(HoleType::Rectangular)) {
            let w = feature.params.width.or(feature.params.diameter);
            let h = feature.params.height.or(feature.params.diameter);
            if w.is_none() || h.is_none() {
                issues.push("rectangular hole requires width and height".to_string());
            }
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let params = &ctx.feature.params;
        let diameter = params.diameter.ok_or_else(|| Error::InvalidFeatureParams {
            feature_id: ctx.feature.id.clone(),
            reasons: vec!["hole requires a diameter".to_string()],
        })?;

        let frame = face_frame(ctx.resolved.face, ctx.profile);
        let outline = bore_outline(
            params.hole_type.unwrap_or_default(),
            ctx.feature.position[0],
            ctx.feature.position[1],
            diameter,
            params.length,
            params.width,
            params.height,
        );

        let solid = bore_solid(&frame, &ctx.resolved, &outline, params.depth)?;
        Ok(FeatureEffect::Cut(solid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use steelfab_core::{Face, ProfileDimensions, ProfileKind};

    fn ipe300() -> SteelProfile {
        SteelProfile::new(
            ProfileKind::IProfile,
            "IPE300",
            ProfileDimensions {
                length: 6000.0,
                height: 300.0,
                width: 150.0,
                thickness: 7.1,
                web_thickness: Some(7.1),
                flange_thickness: Some(10.7),
                wall_thickness: None,
            },
        )
    }

    fn web_hole(diameter: f64, x: f64, y: f64) -> Feature {
        let mut f = Feature::new("h1", FeatureKind::Hole, [x, y, 0.0]);
        f.face = Some(Face::Web);
        f.params.diameter = Some(diameter);
        f
    }

    fn build(feature: &Feature, profile: &SteelProfile) -> Mesh {
        let ctx = ProcessorContext {
            feature,
            profile,
            resolved: resolver::resolve(feature, profile),
        };
        match HoleProcessor.build(&ctx).unwrap() {
            FeatureEffect::Cut(mesh) => mesh,
            _ => panic!("hole must produce a cut"),
        }
    }

    #[test]
    fn test_web_hole_cylinder_through_web() {
        let profile = ipe300();
        let solid = build(&web_hole(22.0, 500.0, 150.0), &profile);

        let (min, max) = solid.bounds();
        // Centered at engine (-2500, 0, 0), radius 11
        assert!((min.x as f64 - (-2511.0)).abs() < 0.5);
        assert!((max.x as f64 - (-2489.0)).abs() < 0.5);
        assert!((min.y as f64 + 11.0).abs() < 0.5);
        // Passes through the 7.1mm web with the 1.1 factor
        assert!((min.z as f64) <= -7.1 / 2.0);
        assert!((max.z as f64) >= 7.1 / 2.0);
    }

    #[test]
    fn test_blind_hole_stops_inside() {
        let profile = ipe300();
        let mut feature = web_hole(16.0, 1000.0, 150.0);
        feature.params.depth = Some(3.0);

        let solid = build(&feature, &profile);
        let (min, max) = solid.bounds();

        // Starts just above the +z web surface, ends 3mm in
        assert!((max.z as f64 - (7.1 / 2.0 + 1.0)).abs() < 0.1);
        assert!((min.z as f64 - (7.1 / 2.0 - 3.0)).abs() < 0.1);
    }

    #[test]
    fn test_slotted_hole_elongated() {
        let profile = ipe300();
        let mut feature = web_hole(18.0, 2000.0, 150.0);
        feature.params.hole_type = Some(HoleType::Slotted);
        feature.params.length = Some(40.0);

        let solid = build(&feature, &profile);
        let (min, max) = solid.bounds();

        // 40mm along the length, 18mm across
        assert!(((max.x - min.x) as f64 - 40.0).abs() < 0.5);
        assert!(((max.y - min.y) as f64 - 18.0).abs() < 0.5);
    }

    #[test]
    fn test_square_hole() {
        let profile = ipe300();
        let mut feature = web_hole(20.0, 2000.0, 150.0);
        feature.params.hole_type = Some(HoleType::Square);

        let solid = build(&feature, &profile);
        let (min, max) = solid.bounds();
        assert!(((max.x - min.x) as f64 - 20.0).abs() < 0.5);
        assert!(((max.y - min.y) as f64 - 20.0).abs() < 0.5);
    }

    #[test]
    fn test_validation_rejects_zero_diameter() {
        let profile = ipe300();
        let feature = web_hole(0.0, 100.0, 100.0);
        assert!(!HoleProcessor.validate(&feature, &profile).is_empty());
    }

    #[test]
    fn test_top_flange_hole_along_y() {
        let profile = ipe300();
        let mut feature = web_hole(22.0, 500.0, 75.0);
        feature.face = Some(Face::TopFlange);

        let solid = build(&feature, &profile);
        let (min, max) = solid.bounds();

        // Drilled along Y through the flange at the section top
        assert!((min.y as f64) < 150.0 - 10.7);
        assert!((max.y as f64) > 150.0);
        // Round in the XZ plane
        assert!(((max.x - min.x) as f64 - 22.0).abs() < 0.5);
        assert!(((max.z - min.z) as f64 - 22.0).abs() < 0.5);
    }
}
