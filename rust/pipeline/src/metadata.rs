// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Metadata sidecar construction.
//!
//! Every applied (or attempted) cut leaves exactly one record in
//! `mesh.user_data.cuts`; the external outline renderer draws intended
//! cuts from these records even when the boolean failed. Bounds come from
//! the contour when one exists, from a fixed margin around the anchor
//! otherwise, and from the section plus the chamfer extent for end cuts.

use crate::cut_classifier::CutClass;
use crate::resolver::{face_frame, ResolvedPosition};
use steelfab_core::{Feature, SteelProfile};
use steelfab_geometry::{Bounds3, CutRecord};

/// Margin around point-less features (mm)
const ANCHOR_MARGIN: f64 = 25.0;

/// Derive the metadata bounds for a feature.
pub fn feature_bounds(
    feature: &Feature,
    profile: &SteelProfile,
    resolved: &ResolvedPosition,
    class: Option<CutClass>,
) -> Bounds3 {
    let dims = &profile.dimensions;
    let points = feature.params.points2();

    // End cuts span the whole section plus the chamfer extent
    if matches!(class, Some(CutClass::StraightEnd | CutClass::FullCut)) {
        let chamfer = feature.params.chamfer_length.unwrap_or(50.0);
        let at_start = points
            .iter()
            .map(|p| p.x)
            .fold(f64::MAX, f64::min)
            <= 1.0;

        let (min_x, max_x) = if at_start {
            (-dims.length / 2.0, -dims.length / 2.0 + chamfer)
        } else {
            (dims.length / 2.0 - chamfer, dims.length / 2.0)
        };

        return Bounds3 {
            min_x,
            max_x,
            min_y: -dims.height / 2.0,
            max_y: dims.height / 2.0,
            min_z: -dims.width / 2.0,
            max_z: dims.width / 2.0,
        };
    }

    if points.is_empty() {
        return Bounds3::around(resolved.position, ANCHOR_MARGIN);
    }

    // Lift the contour's 2D bounds through the face frame
    let frame = face_frame(resolved.face, profile);
    let mut bounds: Option<Bounds3> = None;
    for p in &points {
        let mapped = frame.outline_point(p.x, p.y);
        let engine = frame.origin + frame.u * mapped.x + frame.v * mapped.y;
        match bounds.as_mut() {
            Some(b) => b.expand(engine),
            None => {
                bounds = Some(Bounds3::from_corners(engine, engine));
            }
        }
    }

    let mut bounds = bounds.unwrap_or_default();
    // Depth extent along the face normal
    let reach = resolved.depth;
    let n = resolved.normal;
    let along = |v: f64, axis: f64| v + axis.abs() * reach;
    bounds.max_x = along(bounds.max_x, n.x);
    bounds.max_y = along(bounds.max_y, n.y);
    bounds.max_z = along(bounds.max_z, n.z);
    bounds.min_x -= n.x.abs() * reach;
    bounds.min_y -= n.y.abs() * reach;
    bounds.min_z -= n.z.abs() * reach;

    bounds
}

/// Build the cut record for a feature application.
pub fn cut_record(
    feature: &Feature,
    profile: &SteelProfile,
    resolved: &ResolvedPosition,
    class: Option<CutClass>,
) -> CutRecord {
    let contour_points = if feature.params.points.is_empty() {
        None
    } else {
        Some(feature.params.points.clone())
    };

    CutRecord {
        id: feature.id.clone(),
        kind: feature.kind.as_str().to_string(),
        face: Some(resolved.face),
        bounds: feature_bounds(feature, profile, resolved, class),
        contour_points,
        depth: feature.params.depth.unwrap_or(resolved.depth),
        angle: feature.params.angle.unwrap_or(0.0),
        cut_type: class
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| feature.kind.as_str().to_string()),
        csg_failed: false,
        csg_skipped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use steelfab_core::{Face, FeatureKind, ProfileDimensions, ProfileKind};

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

    #[test]
    fn test_anchor_margin_bounds() {
        let profile = ipe300();
        let mut hole = Feature::new("h1", FeatureKind::Hole, [500.0, 150.0, 0.0]);
        hole.face = Some(Face::Web);
        hole.params.diameter = Some(22.0);

        let resolved = resolver::resolve(&hole, &profile);
        let bounds = feature_bounds(&hole, &profile, &resolved, None);

        // 25mm margin around engine (-2500, 0, 0)
        assert!((bounds.min_x - (-2525.0)).abs() < 1e-9);
        assert!((bounds.max_x - (-2475.0)).abs() < 1e-9);
        assert!((bounds.min_y - (-25.0)).abs() < 1e-9);
        assert!((bounds.max_y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_contour_bounds_from_points() {
        let profile = ipe300();
        let mut cut = Feature::new("c1", FeatureKind::Cut, [0.0; 3]);
        cut.face = Some(Face::Web);
        cut.params.points = vec![
            [1000.0, 100.0],
            [1400.0, 100.0],
            [1400.0, 200.0],
            [1000.0, 200.0],
        ];

        let resolved = resolver::resolve(&cut, &profile);
        let bounds = feature_bounds(&cut, &profile, &resolved, Some(CutClass::Interior));

        assert!((bounds.min_x - (-2000.0)).abs() < 1e-9);
        assert!((bounds.max_x - (-1600.0)).abs() < 1e-9);
        assert!((bounds.min_y - (-50.0)).abs() < 1e-9);
        assert!((bounds.max_y - 50.0).abs() < 1e-9);
        // Depth extent along the web normal
        assert!(bounds.max_z >= 7.1 / 2.0);
    }

    #[test]
    fn test_end_cut_bounds_span_section() {
        let profile = ipe300();
        let mut end = Feature::new("e1", FeatureKind::EndCut, [0.0; 3]);
        end.face = Some(Face::Web);
        end.params.points = vec![[0.0, 0.0], [50.0, 0.0], [50.0, 300.0], [0.0, 300.0]];
        end.params.chamfer_length = Some(50.0);

        let resolved = resolver::resolve(&end, &profile);
        let bounds = feature_bounds(&end, &profile, &resolved, Some(CutClass::StraightEnd));

        assert!((bounds.min_x - (-3000.0)).abs() < 1e-9);
        assert!((bounds.max_x - (-2950.0)).abs() < 1e-9);
        assert!((bounds.min_y - (-150.0)).abs() < 1e-9);
        assert!((bounds.max_z - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_carries_feature_identity() {
        let profile = ipe300();
        let mut hole = Feature::new("h7", FeatureKind::Hole, [500.0, 150.0, 0.0]);
        hole.face = Some(Face::Web);
        hole.params.diameter = Some(22.0);

        let resolved = resolver::resolve(&hole, &profile);
        let record = cut_record(&hole, &profile, &resolved, None);

        assert_eq!(record.id, "h7");
        assert_eq!(record.kind, "hole");
        assert_eq!(record.face, Some(Face::Web));
        assert!(!record.csg_failed);
        assert!(!record.csg_skipped);
    }
}
