// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two-notches-at-extremities pattern.
//!
//! Some AK contours encode two flange notches in a single 9-point polygon
//! spanning the whole piece: a cluster of points at each end separated by
//! a large gap. The contour itself is useless as an extrusion profile; the
//! handler reconstructs one axis-aligned rectangle per end and returns the
//! union of the two notch solids.

use super::{CutContext, CutHandler, CutSolid};
use crate::cut_classifier::CutClass;
use crate::error::{Error, Result};
use crate::resolver::face_frame;
use nalgebra::Point2;
use steelfab_geometry::{extrude_outline, Mesh, Outline2D};
use tracing::debug;

pub struct PartialNotchHandler {
    /// Gap separating the two end clusters (mm)
    pub gap_threshold_mm: f64,
}

impl Default for PartialNotchHandler {
    fn default() -> Self {
        Self {
            gap_threshold_mm: 500.0,
        }
    }
}

/// The two reconstructed notch rectangles in DSTV face coordinates
#[derive(Debug, Clone, Copy)]
pub struct NotchSpans {
    /// First notch: piece start to the end of the first point cluster
    pub first: (f64, f64),
    /// Second notch: start of the last cluster to the piece end
    pub second: (f64, f64),
    /// Shared y range from the contour
    pub y: (f64, f64),
}

impl PartialNotchHandler {
    /// Reconstruct the two notch rectangles from the 9-point contour.
    ///
    /// Returns `None` when no inter-point gap exceeds the threshold.
    pub fn notch_spans(&self, points: &[nalgebra::Point2<f64>], length: f64) -> Option<NotchSpans> {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let (first_end, second_start) = self.split_clusters(&xs)?;

        let min_y = points.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::MIN, f64::max);

        Some(NotchSpans {
            first: (0.0, first_end),
            second: (second_start, length),
            y: (min_y, max_y),
        })
    }

    /// Split x-sorted points at the largest gap; returns the end of the
    /// first cluster and the start of the second
    fn split_clusters(&self, xs: &[f64]) -> Option<(f64, f64)> {
        let mut sorted = xs.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut best: Option<(f64, f64)> = None;
        let mut best_gap = self.gap_threshold_mm;

        for w in sorted.windows(2) {
            let gap = w[1] - w[0];
            if gap > best_gap {
                best_gap = gap;
                best = Some((w[0], w[1]));
            }
        }

        best
    }
}

impl CutHandler for PartialNotchHandler {
    fn class(&self) -> CutClass {
        CutClass::PartialNotch
    }

    fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        let dims = &ctx.profile.dimensions;
        let points = ctx.feature.params.points2();

        let spans = self.notch_spans(&points, dims.length).ok_or_else(|| {
            Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec![format!(
                    "no inter-point gap above {} mm found",
                    self.gap_threshold_mm
                )],
            }
        })?;

        debug!(
            feature = %ctx.feature.id,
            first_end = spans.first.1,
            second_start = spans.second.0,
            "splitting partial notch contour into two end rectangles"
        );

        let (min_y, max_y) = spans.y;

        let frame = face_frame(ctx.resolved.face, ctx.profile);
        // Twice the wall depth as safety so both notches clear the flange
        let depth = ctx.resolved.depth * 2.0;
        let back_off = if ctx.resolved.surface_anchored {
            depth * 0.75
        } else {
            depth / 2.0
        };
        let transform = frame.extrusion_transform(back_off);

        let rect = |x0: f64, x1: f64| -> Result<Mesh> {
            let corners = [
                frame.outline_point(x0, min_y),
                frame.outline_point(x1, min_y),
                frame.outline_point(x1, max_y),
                frame.outline_point(x0, max_y),
            ];
            let (lo, hi) = (
                Point2::new(
                    corners.iter().map(|p| p.x).fold(f64::MAX, f64::min),
                    corners.iter().map(|p| p.y).fold(f64::MAX, f64::min),
                ),
                Point2::new(
                    corners.iter().map(|p| p.x).fold(f64::MIN, f64::max),
                    corners.iter().map(|p| p.y).fold(f64::MIN, f64::max),
                ),
            );
            let outline = Outline2D::rect_from_corners(lo.x, lo.y, hi.x, hi.y);
            Ok(extrude_outline(&outline, depth, Some(transform))?)
        };

        // One rectangle per extremity: piece start to the first cluster's
        // end, second cluster's start to the piece end
        let mut solid = rect(spans.first.0, spans.first.1)?;
        solid.merge(&rect(spans.second.0, spans.second.1)?);

        Ok(CutSolid::subtract(solid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use steelfab_core::{
        DstvBlock, Face, Feature, FeatureKind, ProfileDimensions, ProfileKind, SteelProfile,
    };

    fn ub254(length: f64) -> SteelProfile {
        SteelProfile::new(
            ProfileKind::IProfile,
            "UB254x146x31",
            ProfileDimensions {
                length,
                height: 251.4,
                width: 146.1,
                thickness: 6.0,
                web_thickness: Some(6.0),
                flange_thickness: Some(8.6),
                wall_thickness: None,
            },
        )
    }

    /// The M1002-style 9-point top-flange pattern: 70mm notches at each end
    fn notch_pattern(length: f64, width: f64) -> Feature {
        let mut f = Feature::new("ak_n", FeatureKind::Cut, [0.0; 3]);
        f.face = Some(Face::TopFlange);
        f.params.block = Some(DstvBlock::ExteriorContour);
        f.params.points = vec![
            [0.0, 0.0],
            [70.0, 0.0],
            [70.0, width],
            [35.0, width],
            [length - 70.0, width],
            [length - 35.0, width],
            [length - 0.5, width],
            [length, 0.0],
            [0.0, 0.0],
        ];
        f
    }

    #[test]
    fn test_two_disjoint_notch_solids() {
        let length = 4000.0;
        let profile = ub254(length);
        let feature = notch_pattern(length, 146.1);

        let resolved = resolver::resolve(&feature, &profile);
        let base = Mesh::new();
        let ctx = CutContext {
            feature: &feature,
            profile: &profile,
            base: &base,
            class: CutClass::PartialNotch,
            resolved,
        };

        let solid = PartialNotchHandler::default().build(&ctx).unwrap();
        assert!(!solid.skipped);

        // Union of two end rectangles: spans the full length on X but is
        // hollow in the middle, so triangle count doubles a single box
        let (min, max) = solid.mesh.bounds();
        assert!((min.x as f64 - -2000.0).abs() < 1.0);
        assert!((max.x as f64 - 2000.0).abs() < 1.0);

        // Tool passes the flange thickness with the 2x safety
        let y_span = (max.y - min.y) as f64;
        assert!(y_span >= 2.0 * 8.6);
    }

    #[test]
    fn test_missing_gap_is_rejected() {
        let profile = ub254(4000.0);
        let mut feature = notch_pattern(4000.0, 146.1);
        // Collapse all points into one cluster
        for p in feature.params.points.iter_mut() {
            p[0] = p[0].min(100.0);
        }

        let resolved = resolver::resolve(&feature, &profile);
        let base = Mesh::new();
        let ctx = CutContext {
            feature: &feature,
            profile: &profile,
            base: &base,
            class: CutClass::PartialNotch,
            resolved,
        };

        assert!(PartialNotchHandler::default().build(&ctx).is_err());
    }
}
