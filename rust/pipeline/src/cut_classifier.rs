// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cut type detection.
//!
//! Contour-bearing features are classified by inspecting their point array
//! and bounds against the profile. Rule precedence is fixed; the first
//! match wins. The partial-notch gap threshold is empirical and exposed as
//! a tuning parameter.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use steelfab_core::{DstvBlock, Feature, SteelProfile};

/// Classified cut shape, keys the handler registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CutClass {
    /// Square or angled end cut, at most 4 points at one extremity
    StraightEnd,
    /// DSTV AK contour: the material that remains
    Exterior,
    /// DSTV IK contour: closed interior opening
    Interior,
    /// Two notches at the extremities encoded in one 9-point contour
    PartialNotch,
    /// Generic notch: bounds strictly inside the profile, off an edge
    Notch,
    /// End-region cut keeping one edge, corner step contour
    LShape,
    /// End-region cut removing the top edge
    TopCut,
    /// End-region cut removing the bottom edge
    BottomCut,
    /// End-region cut across the full section height
    FullCut,
    /// End-region cut keeping both edges
    SimpleCut,
    /// Arbitrary closed contour fallback
    Compound,
}

impl CutClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CutClass::StraightEnd => "straight_end",
            CutClass::Exterior => "exterior",
            CutClass::Interior => "interior",
            CutClass::PartialNotch => "partial_notch",
            CutClass::Notch => "notch",
            CutClass::LShape => "l_shape",
            CutClass::TopCut => "top_cut",
            CutClass::BottomCut => "bottom_cut",
            CutClass::FullCut => "full_cut",
            CutClass::SimpleCut => "simple_cut",
            CutClass::Compound => "compound",
        }
    }
}

impl std::fmt::Display for CutClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning knobs for the classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum inter-point gap marking the two-notch pattern (mm)
    pub gap_threshold_mm: f64,
    /// Tolerance for "touches the section edge" checks (mm)
    pub edge_tolerance_mm: f64,
    /// Tolerance for "reaches the piece end" checks (mm)
    pub end_tolerance_mm: f64,
    /// Fraction of the length below which a contour counts as an end region
    pub end_region_fraction: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            gap_threshold_mm: 500.0,
            edge_tolerance_mm: 10.0,
            end_tolerance_mm: 1.0,
            end_region_fraction: 0.25,
        }
    }
}

/// 2D bounds of a contour point set
fn contour_bounds(points: &[Point2<f64>]) -> (Point2<f64>, Point2<f64>) {
    let mut min = Point2::new(f64::MAX, f64::MAX);
    let mut max = Point2::new(f64::MIN, f64::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Number of distinct values in a list, within a tolerance
fn distinct_values(values: &mut Vec<f64>, tol: f64) -> usize {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut count = 0;
    let mut last = f64::NEG_INFINITY;
    for &v in values.iter() {
        if v - last > tol {
            count += 1;
            last = v;
        }
    }
    count
}

/// Largest gap between x-sorted consecutive points, with its position
fn largest_x_gap(points: &[Point2<f64>]) -> f64 {
    let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut largest = 0.0f64;
    for w in xs.windows(2) {
        largest = largest.max(w[1] - w[0]);
    }
    largest
}

/// Classify a contour-bearing feature.
///
/// The face height used for edge checks is the span of the contour's
/// natural axis: callers pass the dimension of the face the contour lives
/// on (section height for web contours, width for flange contours).
pub fn classify(
    feature: &Feature,
    profile: &SteelProfile,
    face_span: f64,
    config: &DetectorConfig,
) -> CutClass {
    let points = feature.params.points2();
    let length = profile.dimensions.length;

    if points.len() < 3 {
        return CutClass::Compound;
    }

    let (min, max) = contour_bounds(&points);
    let tol_end = config.end_tolerance_mm;
    let tol_edge = config.edge_tolerance_mm;

    let touches_start = min.x <= tol_end;
    let touches_end = max.x >= length - tol_end;
    let x_span = max.x - min.x;

    // 1. An IK block is interior by definition, wherever its bounds sit
    if feature.params.block == Some(DstvBlock::InteriorContour) {
        return CutClass::Interior;
    }

    // 2. Straight end: few points, parked at exactly one extremity
    if points.len() <= 4
        && (touches_start != touches_end)
        && x_span <= length * config.end_region_fraction
    {
        return CutClass::StraightEnd;
    }

    // 3. Two-notch pattern: a 9-point contour spanning the length with one
    //    large gap and an extension past the far end. Checked before the
    //    generic exterior rule: the pattern arrives in AK blocks.
    if points.len() == 9
        && largest_x_gap(&points) > config.gap_threshold_mm
        && max.x >= length - tol_end
        && touches_start
    {
        return CutClass::PartialNotch;
    }

    // 4. Remaining AK blocks describe the kept material
    if feature.params.block == Some(DstvBlock::ExteriorContour) {
        return CutClass::Exterior;
    }

    // 5. Generic notch: strictly interior bounds, away from both ends
    if !touches_start && !touches_end && x_span < length {
        return CutClass::Notch;
    }

    // 6. End-region family: contour at one end; edge contact picks a flavor
    if touches_start != touches_end && x_span <= length * config.end_region_fraction {
        let at_bottom = min.y <= tol_edge;
        let at_top = max.y >= face_span - tol_edge;

        return match (at_bottom, at_top) {
            (true, true) => {
                // Full height; a stepped contour keeps a corner, a plain
                // rectangle removes the whole section
                let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
                let mut ys: Vec<f64> = points.iter().map(|p| p.y).collect();
                if distinct_values(&mut xs, tol_edge) > 2 || distinct_values(&mut ys, tol_edge) > 2
                {
                    CutClass::LShape
                } else {
                    CutClass::FullCut
                }
            }
            (false, true) => CutClass::TopCut,
            (true, false) => CutClass::BottomCut,
            (false, false) => CutClass::SimpleCut,
        };
    }

    // 7. Interior closed contour without a block tag
    if !touches_start && !touches_end {
        return CutClass::Interior;
    }

    CutClass::Compound
}

#[cfg(test)]
mod tests {
    use super::*;
    use steelfab_core::{FeatureKind, ProfileDimensions, ProfileKind};

    fn beam(length: f64) -> SteelProfile {
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

    fn contour_feature(points: Vec<[f64; 2]>) -> Feature {
        let mut f = Feature::new("c", FeatureKind::Cut, [0.0; 3]);
        f.params.points = points;
        f
    }

    #[test]
    fn test_straight_end() {
        // A 4-point rectangle at the piece start
        let f = contour_feature(vec![
            [0.0, 0.0],
            [80.0, 0.0],
            [80.0, 251.4],
            [0.0, 251.4],
        ]);

        let class = classify(&f, &beam(6000.0), 251.4, &DetectorConfig::default());
        assert_eq!(class, CutClass::StraightEnd);
    }

    #[test]
    fn test_exterior_block_tag_wins() {
        let mut f = contour_feature(vec![
            [0.0, 0.0],
            [6000.0, 0.0],
            [6000.0, 251.4],
            [3000.0, 200.0],
            [0.0, 251.4],
        ]);
        f.params.block = Some(DstvBlock::ExteriorContour);

        let class = classify(&f, &beam(6000.0), 251.4, &DetectorConfig::default());
        assert_eq!(class, CutClass::Exterior);
    }

    #[test]
    fn test_interior_block_tag() {
        let mut f = contour_feature(vec![
            [1000.0, 50.0],
            [1200.0, 50.0],
            [1200.0, 150.0],
            [1000.0, 150.0],
        ]);
        f.params.block = Some(DstvBlock::InteriorContour);

        let class = classify(&f, &beam(6000.0), 251.4, &DetectorConfig::default());
        assert_eq!(class, CutClass::Interior);
    }

    #[test]
    fn test_partial_notch_nine_points() {
        // The classic two-notches-at-extremities AK pattern: points cluster
        // at both ends with a >500mm gap in between, extending past L - 1
        let length = 4000.0;
        let f = contour_feature(vec![
            [0.0, 0.0],
            [70.0, 0.0],
            [70.0, 146.1],
            [35.0, 146.1],
            [3930.0, 146.1],
            [3965.0, 146.1],
            [3999.5, 146.1],
            [4000.0, 0.0],
            [0.0, 0.0],
        ]);

        let class = classify(&f, &beam(length), 146.1, &DetectorConfig::default());
        assert_eq!(class, CutClass::PartialNotch);
    }

    #[test]
    fn test_generic_notch_interior_bounds() {
        // Rectangle near the middle, off the edges but spanning some height
        let f = contour_feature(vec![
            [2000.0, 0.0],
            [2300.0, 0.0],
            [2300.0, 100.0],
            [2150.0, 120.0],
            [2000.0, 100.0],
        ]);

        let class = classify(&f, &beam(6000.0), 251.4, &DetectorConfig::default());
        assert_eq!(class, CutClass::Notch);
    }

    #[test]
    fn test_end_region_flavors() {
        let config = DetectorConfig::default();
        let profile = beam(6000.0);

        // Top cut: touches the top edge only, 6 points so no StraightEnd
        let top = contour_feature(vec![
            [0.0, 100.0],
            [150.0, 100.0],
            [150.0, 180.0],
            [140.0, 220.0],
            [100.0, 251.4],
            [0.0, 251.4],
        ]);
        assert_eq!(classify(&top, &profile, 251.4, &config), CutClass::TopCut);

        // Bottom cut mirrors it
        let bottom = contour_feature(vec![
            [0.0, 0.0],
            [100.0, 0.0],
            [140.0, 30.0],
            [150.0, 70.0],
            [150.0, 150.0],
            [0.0, 150.0],
        ]);
        assert_eq!(
            classify(&bottom, &profile, 251.4, &config),
            CutClass::BottomCut
        );

        // Corner step keeping one edge: L-shape
        let l_shape = contour_feature(vec![
            [0.0, 0.0],
            [200.0, 0.0],
            [200.0, 120.0],
            [80.0, 120.0],
            [80.0, 251.4],
            [0.0, 251.4],
        ]);
        assert_eq!(classify(&l_shape, &profile, 251.4, &config), CutClass::LShape);

        // Closed full-height rectangle at the far end: full cut
        let full = contour_feature(vec![
            [5850.0, 0.0],
            [6000.0, 0.0],
            [6000.0, 251.4],
            [5850.0, 251.4],
            [5850.0, 0.0],
        ]);
        assert_eq!(classify(&full, &profile, 251.4, &config), CutClass::FullCut);

        // Keeping both edges: simple cut
        let simple = contour_feature(vec![
            [5900.0, 60.0],
            [6000.0, 60.0],
            [5990.0, 120.0],
            [6000.0, 190.0],
            [5900.0, 190.0],
        ]);
        assert_eq!(
            classify(&simple, &profile, 251.4, &config),
            CutClass::SimpleCut
        );
    }

    #[test]
    fn test_gap_threshold_is_tunable() {
        let length = 4000.0;
        let f = contour_feature(vec![
            [0.0, 0.0],
            [70.0, 0.0],
            [70.0, 146.1],
            [35.0, 146.1],
            [3930.0, 146.1],
            [3965.0, 146.1],
            [3999.5, 146.1],
            [4000.0, 0.0],
            [0.0, 0.0],
        ]);

        let strict = DetectorConfig {
            gap_threshold_mm: 5000.0,
            ..DetectorConfig::default()
        };
        let class = classify(&f, &beam(length), 146.1, &strict);
        assert_ne!(class, CutClass::PartialNotch);
    }

    #[test]
    fn test_compound_fallback() {
        let f = contour_feature(vec![[0.0, 0.0], [6000.0, 10.0], [3000.0, 200.0]]);
        let class = classify(&f, &beam(6000.0), 251.4, &DetectorConfig::default());
        assert_eq!(class, CutClass::Compound);
    }
}
