// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature processors - one per non-cut feature kind.
//!
//! Each processor validates its feature against the profile and builds an
//! effect: a solid to subtract or union, a sidecar record, a vertex
//! transform, or an expansion into sub-features. Contour-bearing kinds
//! (`Cut`, `Notch`, `EndCut`) are not handled here; they go through the
//! cut detector and handler registry.
//!
//! - `holes`: round / slotted / square / rectangular bores
//! - `tapped`: thread-ring lathe approximation
//! - `sinks`: countersink / counterbore / spotface lathe profiles
//! - `patterns`: linear / rectangular / circular drill pattern expansion
//! - `slots`: slot bands and contour cutouts
//! - `contour`: bulge-aware contour subtraction
//! - `chamfer`: chamfer and bevel wedges along face edges
//! - `coping`: profile-fit, saddle and bevel end copes
//! - `marking`: sidecar markings with optional engraving
//! - `weld`: additive weld beads
//! - `thread`: reduced-bore through threads
//! - `bend`: per-vertex bend transforms

mod bend;
mod chamfer;
mod contour;
mod coping;
mod holes;
mod marking;
mod patterns;
mod sinks;
mod slots;
mod tapped;
mod thread;
mod weld;

pub use bend::{BendProcessor, BendTransform};
pub use chamfer::ChamferProcessor;
pub use contour::ContourProcessor;
pub use coping::CopingProcessor;
pub use holes::HoleProcessor;
pub use marking::MarkingProcessor;
pub use patterns::DrillPatternProcessor;
pub use sinks::SinkProcessor;
pub use slots::{CutoutProcessor, SlotProcessor};
pub use tapped::TappedHoleProcessor;
pub use thread::ThreadProcessor;
pub use weld::WeldProcessor;

use crate::error::{Error, Result};
use crate::resolver::ResolvedPosition;
use nalgebra::{Matrix4, Vector3};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use steelfab_core::{Feature, FeatureKind, SteelProfile};
use steelfab_geometry::{MarkingRecord, Mesh};

/// Through-bore depth multiplier (face depth x 1.1, the through-all rule)
pub(crate) const BORE_THROUGH_MULTIPLIER: f64 = 1.1;

/// Processor input
pub struct ProcessorContext<'a> {
    pub feature: &'a Feature,
    pub profile: &'a SteelProfile,
    pub resolved: ResolvedPosition,
}

/// What applying a feature does to the pipeline mesh
pub enum FeatureEffect {
    /// Subtract this solid
    Cut(Mesh),
    /// Union this solid (welds)
    Add(Mesh),
    /// Record a marking; optionally engrave a shallow solid
    Marking {
        record: MarkingRecord,
        engrave: Option<Mesh>,
    },
    /// Apply a per-vertex transform (bending)
    Transform(BendTransform),
    /// Replace the feature with sub-features, in order
    Expand(Vec<Feature>),
}

/// A processor validates and builds the effect for one feature kind
pub trait FeatureProcessor: Send + Sync {
    /// Kinds this processor serves
    fn kinds(&self) -> Vec<FeatureKind>;

    /// Parameter validation; never panics, returns human-readable issues
    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String>;

    /// Build the feature's effect
    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect>;
}

/// Dispatch table from feature kind to processor
pub struct ProcessorRegistry {
    processors: FxHashMap<FeatureKind, Arc<dyn FeatureProcessor>>,
}

impl ProcessorRegistry {
    /// Registry with the default processor set
    pub fn new() -> Self {
        let mut registry = Self {
            processors: FxHashMap::default(),
        };

        registry.register(Arc::new(HoleProcessor));
        registry.register(Arc::new(TappedHoleProcessor));
        registry.register(Arc::new(SinkProcessor));
        registry.register(Arc::new(DrillPatternProcessor));
        registry.register(Arc::new(SlotProcessor));
        registry.register(Arc::new(CutoutProcessor));
        registry.register(Arc::new(ContourProcessor));
        registry.register(Arc::new(ChamferProcessor));
        registry.register(Arc::new(CopingProcessor));
        registry.register(Arc::new(MarkingProcessor));
        registry.register(Arc::new(WeldProcessor));
        registry.register(Arc::new(ThreadProcessor));
        registry.register(Arc::new(BendProcessor));

        registry
    }

    /// Register a processor for all kinds it serves
    pub fn register(&mut self, processor: Arc<dyn FeatureProcessor>) {
        for kind in processor.kinds() {
            self.processors.insert(kind, Arc::clone(&processor));
        }
    }

    /// Look up the processor for a kind
    pub fn get(&self, kind: FeatureKind) -> Result<&Arc<dyn FeatureProcessor>> {
        self.processors
            .get(&kind)
            .ok_or_else(|| Error::UnknownFeatureKind(kind.to_string()))
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotation taking the +Y axis onto the given face normal.
///
/// Used to orient lathe solids (built around Y) along the drilling axis.
/// The solids are rotationally symmetric, so the sign of the mapping is
/// irrelevant.
pub(crate) fn orient_y_along(normal: &Vector3<f64>) -> Matrix4<f64> {
    use nalgebra::Rotation3;

    if normal.y.abs() > 0.5 {
        Matrix4::identity()
    } else if normal.z.abs() > 0.5 {
        Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::FRAC_PI_2)
            .to_homogeneous()
    } else {
        Rotation3::from_axis_angle(&Vector3::z_axis(), -std::f64::consts::FRAC_PI_2)
            .to_homogeneous()
    }
}
