// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fabrication feature records.
//!
//! A [`Feature`] is a value type decoded from a DSTV block: a hole, a
//! contour cut, a marking, a weld. Parameters live in a typed open bag
//! ([`FeatureParams`]); keys the processors do not consume are preserved
//! in `extra` untouched.

use crate::face::{DstvBlock, Face};
use crate::profile::SteelProfile;
use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Enumerated feature kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKind {
    Hole,
    TappedHole,
    Countersink,
    Counterbore,
    Spotface,
    DrillPattern,
    Slot,
    Cutout,
    Contour,
    Cut,
    Notch,
    EndCut,
    Coping,
    Chamfer,
    Bevel,
    Marking,
    Text,
    Weld,
    Thread,
    Bend,
    Volume,
    Composite,
}

impl FeatureKind {
    /// Stable name for metadata, diagnostics and ordering tie-breaks
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Hole => "hole",
            FeatureKind::TappedHole => "tapped_hole",
            FeatureKind::Countersink => "countersink",
            FeatureKind::Counterbore => "counterbore",
            FeatureKind::Spotface => "spotface",
            FeatureKind::DrillPattern => "drill_pattern",
            FeatureKind::Slot => "slot",
            FeatureKind::Cutout => "cutout",
            FeatureKind::Contour => "contour",
            FeatureKind::Cut => "cut",
            FeatureKind::Notch => "notch",
            FeatureKind::EndCut => "end_cut",
            FeatureKind::Coping => "coping",
            FeatureKind::Chamfer => "chamfer",
            FeatureKind::Bevel => "bevel",
            FeatureKind::Marking => "marking",
            FeatureKind::Text => "text",
            FeatureKind::Weld => "weld",
            FeatureKind::Thread => "thread",
            FeatureKind::Bend => "bend",
            FeatureKind::Volume => "volume",
            FeatureKind::Composite => "composite",
        }
    }

    /// Fixed complexity score used by the pipeline's order optimization.
    /// Cheap cosmetic kinds first, heavy contour subtractions last.
    pub fn complexity(&self) -> u8 {
        match self {
            FeatureKind::Marking | FeatureKind::Text | FeatureKind::Weld => 1,
            FeatureKind::Hole
            | FeatureKind::TappedHole
            | FeatureKind::Countersink
            | FeatureKind::Counterbore
            | FeatureKind::Spotface
            | FeatureKind::Thread
            | FeatureKind::DrillPattern => 2,
            FeatureKind::Chamfer | FeatureKind::Bevel | FeatureKind::Bend => 3,
            FeatureKind::Slot | FeatureKind::Notch => 4,
            FeatureKind::Cutout
            | FeatureKind::Coping
            | FeatureKind::Contour
            | FeatureKind::Cut
            | FeatureKind::EndCut
            | FeatureKind::Volume
            | FeatureKind::Composite => 5,
        }
    }

    /// Kinds that never mutate geometry; safe to process on parallel tasks
    #[inline]
    pub fn is_non_geometric(&self) -> bool {
        matches!(self, FeatureKind::Marking | FeatureKind::Text)
    }

    /// Kinds whose geometry is carried by a closed contour point array
    #[inline]
    pub fn is_contour_bearing(&self) -> bool {
        matches!(
            self,
            FeatureKind::Contour | FeatureKind::Cut | FeatureKind::Notch | FeatureKind::Cutout
        )
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate system a feature's anchor is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordinateSystem {
    Local,
    Global,
    Face,
    #[default]
    Dstv,
    Standard,
}

/// Shape variant of a bored hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HoleType {
    #[default]
    Round,
    Slotted,
    Square,
    Rectangular,
}

/// Coping geometry style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CopingStyle {
    /// I-shape cutout of the mating profile at the join angle
    #[default]
    ProfileFit,
    /// Cylinder-on-cylinder saddle for tube joins
    Saddle,
    Straight,
    SingleBevel,
    DoubleBevel,
}

/// Weld seam style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeldStyle {
    #[default]
    Fillet,
    Butt,
    Spot,
    Seam,
}

/// Layout of a drill pattern expansion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PatternLayout {
    Linear {
        count: u32,
        spacing: f64,
    },
    Rectangular {
        rows: u32,
        columns: u32,
        row_spacing: f64,
        column_spacing: f64,
    },
    Circular {
        count: u32,
        radius: f64,
        start_angle: f64,
    },
}

/// Execution order for composite sub-features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompositeSequence {
    #[default]
    Sequential,
    Parallel,
}

/// Typed open parameter bag.
///
/// All linear quantities are millimeters, all angles degrees unless a field
/// says otherwise. Unknown keys arriving from the parser are preserved in
/// `extra` and ignored by processors that do not consume them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    pub diameter: Option<f64>,
    pub depth: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub radius: Option<f64>,
    /// Cut/cope/bend angle in degrees
    pub angle: Option<f64>,
    /// Countersink cone angle in degrees (default 90 at the processor)
    pub sink_angle: Option<f64>,
    pub sink_diameter: Option<f64>,
    /// Thread pitch; when absent the ISO coarse table decides
    pub pitch: Option<f64>,
    pub chamfer_length: Option<f64>,
    /// Coping clearance between mating sections
    pub clearance: Option<f64>,
    pub thickness: Option<f64>,
    /// Marking glyph height
    pub size: Option<f64>,
    pub text: Option<String>,
    pub hole_type: Option<HoleType>,
    pub coping: Option<CopingStyle>,
    /// Mating section for profile-fit copings
    pub coping_target: Option<crate::profile::ProfileDimensions>,
    pub weld: Option<WeldStyle>,
    pub pattern: Option<PatternLayout>,
    /// DSTV block the feature was decoded from, when known
    pub block: Option<DstvBlock>,
    /// Closed 2D contour in face coordinates
    pub points: Vec<[f64; 2]>,
    /// DXF-convention bulge per contour edge; same length as `points`
    pub bulges: Vec<f64>,
    /// Direction for bends and engravings
    pub axis: Option<[f64; 3]>,
    /// Physical engraving instead of sidecar-only marking
    pub engrave: bool,
    pub sub_features: Vec<Feature>,
    /// Dependency edges between sub-features, (prerequisite, dependent)
    pub dependencies: Vec<(usize, usize)>,
    pub sequence: CompositeSequence,
    /// Unknown keys, preserved verbatim
    #[serde(skip_serializing_if = "FxHashMap::is_empty")]
    pub extra: FxHashMap<String, serde_json::Value>,
}

impl FeatureParams {
    /// Contour points as nalgebra types
    pub fn points2(&self) -> Vec<Point2<f64>> {
        self.points.iter().map(|p| Point2::new(p[0], p[1])).collect()
    }

    /// Count of distinct contour points (consecutive duplicates collapsed)
    pub fn distinct_point_count(&self) -> usize {
        if self.points.is_empty() {
            return 0;
        }
        let mut count = 1;
        for w in self.points.windows(2) {
            if (w[0][0] - w[1][0]).abs() > 1e-9 || (w[0][1] - w[1][1]).abs() > 1e-9 {
                count += 1;
            }
        }
        count
    }
}

/// A single fabrication feature decoded from the input stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable identifier, unique within one part
    pub id: String,
    pub kind: FeatureKind,
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
    /// Anchor in the declared coordinate system
    pub position: [f64; 3],
    /// Euler rotation triple in radians
    #[serde(default)]
    pub rotation: [f64; 3],
    /// Optional face binding
    #[serde(default)]
    pub face: Option<Face>,
    #[serde(default)]
    pub params: FeatureParams,
    /// Opaque payload carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Feature {
    /// Create a feature with default coordinate system and empty params
    pub fn new(id: impl Into<String>, kind: FeatureKind, position: [f64; 3]) -> Self {
        Self {
            id: id.into(),
            kind,
            coordinate_system: CoordinateSystem::default(),
            position,
            rotation: [0.0; 3],
            face: None,
            params: FeatureParams::default(),
            metadata: None,
        }
    }

    /// Anchor as a point
    #[inline]
    pub fn position_point(&self) -> Point3<f64> {
        Point3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Euler rotation as a vector
    #[inline]
    pub fn rotation_vector(&self) -> Vector3<f64> {
        Vector3::new(self.rotation[0], self.rotation[1], self.rotation[2])
    }

    /// Check the model-level invariants for this feature.
    ///
    /// Returns human-readable violations; an empty vector means the record
    /// is structurally sound. Kind-specific geometric validation happens in
    /// the processors.
    pub fn invariant_violations(&self, _profile: &SteelProfile) -> Vec<String> {
        let mut issues = Vec::new();

        match self.kind {
            FeatureKind::Hole
            | FeatureKind::TappedHole
            | FeatureKind::Countersink
            | FeatureKind::Counterbore
            | FeatureKind::Spotface
            | FeatureKind::Thread => {
                let diameter = self.params.diameter.unwrap_or(0.0);
                if diameter <= 0.0 {
                    issues.push(format!(
                        "{} requires a positive diameter, got {diameter}",
                        self.kind
                    ));
                }
            }
            FeatureKind::Contour | FeatureKind::Cut | FeatureKind::Notch => {
                if self.params.distinct_point_count() < 3 {
                    issues.push(format!(
                        "{} requires at least 3 distinct contour points",
                        self.kind
                    ));
                }
                if !self.params.bulges.is_empty()
                    && self.params.bulges.len() != self.params.points.len()
                {
                    issues.push(format!(
                        "bulge array length {} does not match point array length {}",
                        self.params.bulges.len(),
                        self.params.points.len()
                    ));
                }
            }
            FeatureKind::Coping => {
                if let Some(angle) = self.params.angle {
                    if angle <= 0.0 || angle >= 180.0 {
                        issues.push(format!("coping angle must lie in (0, 180), got {angle}"));
                    }
                }
            }
            FeatureKind::Chamfer | FeatureKind::Bevel => {
                if let Some(angle) = self.params.angle {
                    if angle <= 0.0 || angle >= 90.0 {
                        issues.push(format!("chamfer angle must lie in (0, 90), got {angle}"));
                    }
                }
            }
            FeatureKind::Bend => {
                if let Some(angle) = self.params.angle {
                    if !(0.0..=180.0).contains(&angle) {
                        issues.push(format!("bend angle must lie in [0, 180], got {angle}"));
                    }
                }
            }
            _ => {}
        }

        issues
    }
}
