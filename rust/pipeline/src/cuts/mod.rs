// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cut handlers - one per detected cut class.
//!
//! Each handler turns a [`CutContext`] into a cut solid in the engine
//! frame; the pipeline performs the boolean subtraction. Handlers extrude
//! with a 1.5-2x depth multiplier so the tool passes cleanly through the
//! parent surface regardless of numerical jitter.
//!
//! - `straight_end`: angled box across the full section at an extremity
//! - `exterior`: AK contour; outline match is a no-op, otherwise the
//!   complement region is removed
//! - `interior`: IK contour extruded through the bound face
//! - `partial_notch`: the 9-point two-notch pattern split into two solids
//! - `end_region`: the L-shape / top / bottom / full / simple family

mod end_region;
mod exterior;
mod interior;
mod partial_notch;
mod straight_end;

pub use end_region::{
    BottomCutHandler, FullCutHandler, LShapeCutHandler, SimpleCutHandler, TopCutHandler,
};
pub use exterior::ExteriorCutHandler;
pub use interior::InteriorCutHandler;
pub use partial_notch::{NotchSpans, PartialNotchHandler};
pub use straight_end::StraightEndHandler;

use crate::cut_classifier::CutClass;
use crate::error::{Error, Result};
use crate::resolver::ResolvedPosition;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use steelfab_core::{Feature, SteelProfile};
use steelfab_geometry::{BooleanOp, Mesh};

/// Depth multiplier guaranteeing clean passage through the parent surface
pub(crate) const THROUGH_MULTIPLIER: f64 = 2.0;

/// Default chamfer length for straight end cuts (mm)
pub(crate) const DEFAULT_CHAMFER_LENGTH: f64 = 50.0;

/// Extrusion span through a face: (back-off behind the face origin, total
/// depth). Covers the wall symmetrically for both anchor conventions.
pub(crate) fn through_span(resolved: &ResolvedPosition) -> (f64, f64) {
    let total = resolved.depth * THROUGH_MULTIPLIER;
    let back_off = if resolved.surface_anchored {
        resolved.depth * (THROUGH_MULTIPLIER + 1.0) / 2.0
    } else {
        total / 2.0
    };
    (back_off, total)
}

/// Everything a handler needs to build its solid
pub struct CutContext<'a> {
    pub feature: &'a Feature,
    pub profile: &'a SteelProfile,
    pub base: &'a Mesh,
    pub class: CutClass,
    pub resolved: ResolvedPosition,
}

/// A cut solid ready for boolean application
pub struct CutSolid {
    pub mesh: Mesh,
    pub op: BooleanOp,
    /// True when the handler decided no geometry change is needed
    pub skipped: bool,
    /// Human-readable explanation for skips and diagnostics
    pub note: Option<String>,
}

impl CutSolid {
    /// Subtraction solid
    pub fn subtract(mesh: Mesh) -> Self {
        Self {
            mesh,
            op: BooleanOp::Subtract,
            skipped: false,
            note: None,
        }
    }

    /// Successful no-op with an explanation
    pub fn skip(note: impl Into<String>) -> Self {
        Self {
            mesh: Mesh::new(),
            op: BooleanOp::Subtract,
            skipped: true,
            note: Some(note.into()),
        }
    }
}

/// A handler builds the removal solid for one cut class
pub trait CutHandler: Send + Sync {
    /// The class this handler serves
    fn class(&self) -> CutClass;

    /// Build the cut solid in the engine frame
    fn build(&self, ctx: &CutContext) -> Result<CutSolid>;
}

/// Dispatch table from cut class to handler
pub struct CutHandlerRegistry {
    handlers: FxHashMap<CutClass, Arc<dyn CutHandler>>,
}

impl CutHandlerRegistry {
    /// Registry with the default handler set
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: FxHashMap::default(),
        };

        registry.register(Arc::new(StraightEndHandler));
        registry.register(Arc::new(ExteriorCutHandler));
        registry.register(Arc::new(InteriorCutHandler::for_class(CutClass::Interior)));
        registry.register(Arc::new(InteriorCutHandler::for_class(CutClass::Notch)));
        registry.register(Arc::new(InteriorCutHandler::for_class(CutClass::Compound)));
        registry.register(Arc::new(PartialNotchHandler::default()));
        registry.register(Arc::new(LShapeCutHandler));
        registry.register(Arc::new(TopCutHandler));
        registry.register(Arc::new(BottomCutHandler));
        registry.register(Arc::new(FullCutHandler));
        registry.register(Arc::new(SimpleCutHandler));

        registry
    }

    /// Register or replace a handler
    pub fn register(&mut self, handler: Arc<dyn CutHandler>) {
        self.handlers.insert(handler.class(), handler);
    }

    /// Look up the handler for a class
    pub fn get(&self, class: CutClass) -> Result<&Arc<dyn CutHandler>> {
        self.handlers
            .get(&class)
            .ok_or_else(|| Error::NoHandlerForCutType(class.to_string()))
    }

    /// Build the cut solid for a classified feature
    pub fn build(&self, ctx: &CutContext) -> Result<CutSolid> {
        self.get(ctx.class)?.build(ctx)
    }
}

impl Default for CutHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
