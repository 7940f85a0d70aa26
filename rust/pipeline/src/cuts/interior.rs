// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interior (IK) contour handling.
//!
//! A closed contour interior to the profile footprint is extruded through
//! the bound face and subtracted. The same builder serves generic notches
//! and the compound fallback, which differ only in how the detector
//! classified them.

use super::{through_span, CutContext, CutHandler, CutSolid};
use crate::cut_classifier::CutClass;
use crate::error::{Error, Result};
use crate::resolver::face_frame;
use steelfab_geometry::{ensure_ccw, extrude_outline, sample_bulged_contour, Outline2D};

/// Extrudes a closed contour through the face depth.
pub struct InteriorCutHandler {
    class: CutClass,
}

impl InteriorCutHandler {
    /// Same construction for `Interior`, `Notch` and `Compound`
    pub fn for_class(class: CutClass) -> Self {
        debug_assert!(matches!(
            class,
            CutClass::Interior | CutClass::Notch | CutClass::Compound
        ));
        Self { class }
    }
}

impl CutHandler for InteriorCutHandler {
    fn class(&self) -> CutClass {
        self.class
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let points = ctx.feature.params.points2();
        if points.len() < 3 {
            return Err(Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["contour requires at least 3 points".to_string()],
            });
        }

        let frame = face_frame(ctx.resolved.face, ctx.profile);
        let sampled = sample_bulged_contour(&points, &ctx.feature.params.bulges);

        // Lift DSTV face coordinates into the frame's outline plane
        let outline_points: Vec<_> = sampled
            .iter()
            .map(|p| frame.outline_point(p.x, p.y))
            .collect();
        let outline = Outline2D::new(ensure_ccw(&outline_points));

        if !outline.is_valid() {
            return Err(Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["contour encloses no area".to_string()],
            });
        }

        let (back_off, depth) = through_span(&ctx.resolved);
        let solid = extrude_outline(&outline, depth, Some(frame.extrusion_transform(back_off)))?;

        Ok(CutSolid::subtract(solid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use steelfab_core::{Face, Feature, FeatureKind, ProfileDimensions, ProfileKind, SteelProfile};
    use steelfab_geometry::Mesh;

    fn beam() -> SteelProfile {
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

    #[test]
    fn test_web_opening_solid() {
        let profile = beam();
        let mut feature = Feature::new("ik1", FeatureKind::Cut, [0.0; 3]);
        feature.face = Some(Face::Web);
        feature.params.points = vec![
            [1000.0, 100.0],
            [1400.0, 100.0],
            [1400.0, 200.0],
            [1000.0, 200.0],
        ];

        let resolved = resolver::resolve(&feature, &profile);
        let base = Mesh::new();
        let ctx = CutContext {
            feature: &feature,
            profile: &profile,
            base: &base,
            class: CutClass::Interior,
            resolved,
        };

        let solid = InteriorCutHandler::for_class(CutClass::Interior)
            .build(&ctx)
            .unwrap();
        assert!(!solid.skipped);

        let (min, max) = solid.mesh.bounds();
        // DSTV (1000..1400, 100..200) -> engine (-2000..-1600, -50..50)
        assert!((min.x as f64 - -2000.0).abs() < 0.5);
        assert!((max.x as f64 - -1600.0).abs() < 0.5);
        assert!((min.y as f64 - -50.0).abs() < 0.5);
        assert!((max.y as f64 - 50.0).abs() < 0.5);
        // Passes through the web both ways
        assert!((min.z as f64) < -3.55 && (max.z as f64) > 3.55);
    }

    #[test]
    fn test_clockwise_input_normalized() {
        let profile = beam();
        let mut feature = Feature::new("ik2", FeatureKind::Cut, [0.0; 3]);
        feature.face = Some(Face::Web);
        // Clockwise order
        feature.params.points = vec![
            [1000.0, 200.0],
            [1400.0, 200.0],
            [1400.0, 100.0],
            [1000.0, 100.0],
        ];

        let resolved = resolver::resolve(&feature, &profile);
        let base = Mesh::new();
        let ctx = CutContext {
            feature: &feature,
            profile: &profile,
            base: &base,
            class: CutClass::Interior,
            resolved,
        };

        let solid = InteriorCutHandler::for_class(CutClass::Interior)
            .build(&ctx)
            .unwrap();
        assert!(!solid.mesh.is_empty());
    }

    #[test]
    fn test_degenerate_contour_rejected() {
        let profile = beam();
        let mut feature = Feature::new("ik3", FeatureKind::Cut, [0.0; 3]);
        feature.face = Some(Face::Web);
        feature.params.points = vec![[0.0, 0.0], [100.0, 0.0], [200.0, 0.0]];

        let resolved = resolver::resolve(&feature, &profile);
        let base = Mesh::new();
        let ctx = CutContext {
            feature: &feature,
            profile: &profile,
            base: &base,
            class: CutClass::Interior,
            resolved,
        };

        assert!(InteriorCutHandler::for_class(CutClass::Interior)
            .build(&ctx)
            .is_err());
    }
}
