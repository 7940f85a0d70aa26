// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Steelfab Pipeline
//!
//! The feature application engine: takes a base profile mesh and a list
//! of fabrication features decoded from DSTV, and folds every feature
//! into the mesh as a CSG operation.
//!
//! ```rust,ignore
//! use steelfab_pipeline::{FeaturePipeline, PipelineOptions};
//! use steelfab_geometry::section_mesh;
//!
//! let base = section_mesh(&profile)?;
//! let pipeline = FeaturePipeline::new();
//! let result = pipeline.apply_features(&base, &features, &profile, &PipelineOptions::default());
//!
//! println!("{} applied, {} failed", result.processed, result.failed);
//! ```
//!
//! ## Layering
//!
//! - [`resolver`]: DSTV face anchors to engine coordinates
//! - [`cut_classifier`]: contour inspection into cut classes
//! - [`cuts`]: cut class to removal solid (handler registry)
//! - [`features`]: non-cut feature kinds (processor registry)
//! - [`composite`]: sub-feature graphs in topological order
//! - [`cache`]: fingerprinted cut solids with LRU + TTL bounds
//! - [`pipeline`]: ordering, batching, boolean folding, error policy
//! - [`metadata`]: the cut/marking sidecar riding on the mesh
//!
//! Feature-local failures never escape [`FeaturePipeline::apply_features`];
//! the result aggregates them and the mesh stays well-formed.

pub mod cache;
pub mod composite;
pub mod cut_classifier;
pub mod cuts;
pub mod error;
pub mod features;
pub mod metadata;
pub mod pipeline;
pub mod resolver;

pub use cache::{default_cache, teardown_default_cache, CacheConfig, CacheStats, GeometryCache};
pub use composite::{
    countersunk_tapped_hole, expand_composite, mounting_plate, rounded_cutout,
    slotted_hole_pattern, t_slot, Expansion,
};
pub use cut_classifier::{classify, CutClass, DetectorConfig};
pub use cuts::{CutContext, CutHandler, CutHandlerRegistry, CutSolid};
pub use error::{Error, Result};
pub use features::{FeatureEffect, FeatureProcessor, ProcessorContext, ProcessorRegistry};
pub use metadata::{cut_record, feature_bounds};
pub use pipeline::{
    CancellationToken, FeatureError, FeaturePipeline, PipelineOptions, PipelineResult,
    PipelineStats,
};
pub use resolver::{face_frame, resolve, FaceFrame, ResolvedPosition};
