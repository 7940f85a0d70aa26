// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contour features.
//!
//! A closed 2D polygon with optional per-edge bulges (DXF convention),
//! extruded through the bound face and subtracted. Unlike cutouts, contour
//! points are absolute face coordinates.

use super::holes::bore_solid;
use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::{Error, Result};
use crate::resolver::face_frame;
use steelfab_core::{Feature, FeatureKind, SteelProfile};
use steelfab_geometry::sample_bulged_contour;

pub struct ContourProcessor;

impl FeatureProcessor for ContourProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Contour]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        if feature.params.distinct_point_count() < 3 {
            issues.push("contour requires at least 3 distinct points".to_string());
        }
        if !feature.params.bulges.is_empty()
            && feature.params.bulges.len() != feature.params.points.len()
        {
            issues.push(format!(
                "bulge count {} does not match point count {}",
                feature.params.bulges.len(),
                feature.params.points.len()
            ));
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let points = ctx.feature.params.points2();
        if points.len() < 3 {
            return Err(Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["contour requires at least 3 points".to_string()],
            });
        }

        let sampled = sample_bulged_contour(&points, &ctx.feature.params.bulges);
        let frame = face_frame(ctx.resolved.face, ctx.profile);
        let solid = bore_solid(&frame, &ctx.resolved, &sampled, ctx.feature.params.depth)?;

        Ok(FeatureEffect::Cut(solid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use steelfab_core::{Face, ProfileDimensions, ProfileKind};
    use steelfab_geometry::Mesh;

    fn plate() -> SteelProfile {
        SteelProfile::new(
            ProfileKind::Plate,
            "BL15",
            ProfileDimensions::new(400.0, 15.0, 200.0, 15.0),
        )
    }

    fn build(feature: &Feature, profile: &SteelProfile) -> Mesh {
        let ctx = ProcessorContext {
            feature,
            profile,
            resolved: resolver::resolve(feature, profile),
        };
        match ContourProcessor.build(&ctx).unwrap() {
            FeatureEffect::Cut(mesh) => mesh,
            _ => panic!("contour must produce a cut"),
        }
    }

    #[test]
    fn test_straight_contour() {
        let profile = plate();
        let mut contour = Feature::new("k1", FeatureKind::Contour, [0.0; 3]);
        contour.face = Some(Face::Top);
        contour.params.points = vec![
            [100.0, 50.0],
            [180.0, 50.0],
            [180.0, 120.0],
            [100.0, 120.0],
        ];

        let solid = build(&contour, &profile);
        let (min, max) = solid.bounds();

        assert!((min.x as f64 - (100.0 - 200.0)).abs() < 0.5);
        assert!((max.x as f64 - (180.0 - 200.0)).abs() < 0.5);
        assert!((min.z as f64 - (50.0 - 100.0)).abs() < 0.5);
        assert!((max.z as f64 - (120.0 - 100.0)).abs() < 0.5);
    }

    #[test]
    fn test_bulged_contour_has_arc_vertices() {
        let profile = plate();

        let mut straight = Feature::new("k2", FeatureKind::Contour, [0.0; 3]);
        straight.face = Some(Face::Top);
        straight.params.points = vec![
            [100.0, 50.0],
            [180.0, 50.0],
            [180.0, 120.0],
            [100.0, 120.0],
        ];

        let mut bulged = straight.clone();
        bulged.id = "k3".to_string();
        // Round one edge into an arc
        bulged.params.bulges = vec![0.3, 0.0, 0.0, 0.0];

        let straight_solid = build(&straight, &profile);
        let bulged_solid = build(&bulged, &profile);
        assert!(bulged_solid.vertex_count() > straight_solid.vertex_count());
    }

    #[test]
    fn test_too_few_points_rejected() {
        let profile = plate();
        let mut contour = Feature::new("k4", FeatureKind::Contour, [0.0; 3]);
        contour.face = Some(Face::Top);
        contour.params.points = vec![[0.0, 0.0], [10.0, 0.0]];

        let ctx = ProcessorContext {
            feature: &contour,
            profile: &profile,
            resolved: resolver::resolve(&contour, &profile),
        };
        assert!(ContourProcessor.build(&ctx).is_err());
    }
}
