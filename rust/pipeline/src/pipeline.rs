// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature batching and application.
//!
//! The pipeline orders features, groups them into batches, consults the
//! geometry cache, builds cut solids through the handler and processor
//! registries and folds the boolean operations over the base mesh. No
//! error below this layer escapes: feature-local failures land in the
//! result's error list and the pre-operation mesh is retained.
//!
//! The final mesh is the sequential fold of the (possibly reordered)
//! feature list; reordering is a pure function of the input. Opt-in
//! parallelism covers only kinds that never mutate geometry.

use crate::cache::GeometryCache;
use crate::composite::expand_composite;
use crate::cut_classifier::{classify, CutClass, DetectorConfig};
use crate::cuts::{CutContext, CutHandlerRegistry};
use crate::error::{Error, Result};
use crate::features::{FeatureEffect, ProcessorContext, ProcessorRegistry};
use crate::metadata::cut_record;
use crate::resolver::{self, ResolvedPosition};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use steelfab_core::{Face, Feature, FeatureKind, SteelProfile};
use steelfab_geometry::{boolean, BooleanOp, MarkingRecord, Mesh};
use tracing::{debug, warn};

/// Fraction of vertices whose loss is only warned about, not rejected
const EXCESSIVE_LOSS_FRACTION: f64 = 0.95;

/// Recursion guard for nested composite/pattern expansion
const MAX_EXPANSION_DEPTH: usize = 8;

/// Pipeline tuning options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Features processed together without intermediate bound recompute
    pub max_batch_size: usize,
    /// Parallelize non-geometric kinds (markings, text)
    pub parallel_processing: bool,
    /// Consult the geometry cache before building cut solids
    pub cache_results: bool,
    /// Reorder features by ascending complexity
    pub optimize_order: bool,
    /// Log and continue on feature-local failures
    pub continue_on_error: bool,
    /// Optional per-feature soft budget in milliseconds
    pub feature_timeout_ms: Option<u64>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_batch_size: 50,
            parallel_processing: false,
            cache_results: true,
            optimize_order: true,
            continue_on_error: true,
            feature_timeout_ms: None,
        }
    }
}

/// One feature-local failure
#[derive(Debug, Clone, Serialize)]
pub struct FeatureError {
    pub feature_id: String,
    pub reason: String,
}

/// Run statistics
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PipelineStats {
    pub total_ms: f64,
    pub avg_ms: f64,
    /// Number of distinct batched groups
    pub groups: usize,
}

/// Aggregate result of a pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    pub mesh: Mesh,
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub errors: Vec<FeatureError>,
    pub cancelled: bool,
    pub stats: PipelineStats,
}

/// Cooperative cancellation flag checked between features
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What building a feature produced
enum Built {
    Solid { mesh: Mesh, op: BooleanOp },
    Skip { note: String },
    Marking { record: MarkingRecord, engrave: Option<Mesh> },
    Transform(crate::features::BendTransform),
    Expand(Vec<Feature>),
}

/// The feature application engine
pub struct FeaturePipeline {
    cut_handlers: CutHandlerRegistry,
    processors: ProcessorRegistry,
    detector: DetectorConfig,
    cache: Arc<GeometryCache>,
}

impl FeaturePipeline {
    /// Pipeline with default registries and a private cache
    pub fn new() -> Self {
        Self {
            cut_handlers: CutHandlerRegistry::new(),
            processors: ProcessorRegistry::new(),
            detector: DetectorConfig::default(),
            cache: Arc::new(GeometryCache::default()),
        }
    }

    /// Pipeline sharing an external cache
    pub fn with_cache(cache: Arc<GeometryCache>) -> Self {
        Self {
            cache,
            ..Self::new()
        }
    }

    /// Pipeline with a tuned cut detector
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Shared cache handle
    pub fn cache(&self) -> &Arc<GeometryCache> {
        &self.cache
    }

    /// Apply a feature list to a base mesh.
    pub fn apply_features(
        &self,
        base: &Mesh,
        features: &[Feature],
        profile: &SteelProfile,
        options: &PipelineOptions,
    ) -> PipelineResult {
        self.apply_features_with_cancellation(
            base,
            features,
            profile,
            options,
            &CancellationToken::new(),
        )
    }

    /// Apply a feature list, checking the token between features.
    ///
    /// A cancellation in flight aborts after the current feature's boolean
    /// completes, so the returned mesh is always well-formed.
    pub fn apply_features_with_cancellation(
        &self,
        base: &Mesh,
        features: &[Feature],
        profile: &SteelProfile,
        options: &PipelineOptions,
        token: &CancellationToken,
    ) -> PipelineResult {
        let started = Instant::now();
        let mut mesh = base.clone();
        let mut errors: Vec<FeatureError> = Vec::new();
        let mut processed = 0usize;
        let mut failed = 0usize;
        let mut cancelled = false;

        let ordered = self.ordered(features, options);
        let batches = Self::batch(&ordered, options.max_batch_size);
        let groups = batches.len();

        debug!(
            total = features.len(),
            groups,
            profile = %profile.code,
            "applying feature list"
        );

        'batches: for batch in batches {
            // Non-geometric batches may fan out onto parallel tasks; the
            // records join back in input order before the next batch
            if options.parallel_processing
                && batch.iter().all(|f| f.kind.is_non_geometric())
                && batch.len() > 1
            {
                let built: Vec<(usize, Result<Built>)> = batch
                    .par_iter()
                    .enumerate()
                    .map(|(i, feature)| {
                        (i, self.build_feature(feature, profile, &mesh, options, 0))
                    })
                    .collect();

                let mut sorted = built;
                sorted.sort_by_key(|(i, _)| *i);
                for (i, outcome) in sorted {
                    let feature = batch[i];
                    match self.commit(
                        &mut mesh,
                        feature,
                        profile,
                        outcome,
                        options,
                        Instant::now(),
                    ) {
                        Ok(()) => processed += 1,
                        Err(err) => {
                            failed += 1;
                            errors.push(FeatureError {
                                feature_id: feature.id.clone(),
                                reason: err.to_string(),
                            });
                            if !options.continue_on_error {
                                break 'batches;
                            }
                        }
                    }
                }
                continue;
            }

            for feature in batch {
                if token.is_cancelled() {
                    cancelled = true;
                    break 'batches;
                }

                let feature_started = Instant::now();
                let outcome = self.build_feature(feature, profile, &mesh, options, 0);
                match self.commit(&mut mesh, feature, profile, outcome, options, feature_started)
                {
                    Ok(()) => processed += 1,
                    Err(err) => {
                        warn!(feature = %feature.id, error = %err, "feature failed");
                        failed += 1;
                        errors.push(FeatureError {
                            feature_id: feature.id.clone(),
                            reason: err.to_string(),
                        });
                        if !options.continue_on_error {
                            break 'batches;
                        }
                    }
                }
            }
        }

        let total_ms = started.elapsed().as_secs_f64() * 1000.0;
        let attempted = processed + failed;
        PipelineResult {
            mesh,
            total: features.len(),
            processed,
            failed,
            errors,
            cancelled,
            stats: PipelineStats {
                total_ms,
                avg_ms: if attempted > 0 {
                    total_ms / attempted as f64
                } else {
                    0.0
                },
                groups,
            },
        }
    }

    /// Order features by ascending complexity; a pure function of the
    /// input list (stable sort, ties broken by kind name)
    fn ordered<'a>(&self, features: &'a [Feature], options: &PipelineOptions) -> Vec<&'a Feature> {
        let mut ordered: Vec<&Feature> = features.iter().collect();
        if options.optimize_order {
            ordered.sort_by(|a, b| {
                a.kind
                    .complexity()
                    .cmp(&b.kind.complexity())
                    .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
            });
        }
        ordered
    }

    /// Group consecutive features of identical kind into bounded batches
    fn batch<'a>(ordered: &[&'a Feature], max_batch_size: usize) -> Vec<Vec<&'a Feature>> {
        let mut batches: Vec<Vec<&Feature>> = Vec::new();

        for &feature in ordered {
            match batches.last_mut() {
                Some(batch)
                    if batch[0].kind == feature.kind
                        && batch.len() < max_batch_size.max(1) =>
                {
                    batch.push(feature);
                }
                _ => batches.push(vec![feature]),
            }
        }

        batches
    }

    /// Span of the DSTV y axis on the feature's face
    fn face_span(face: Face, profile: &SteelProfile) -> f64 {
        match face {
            Face::Web | Face::Front | Face::Back | Face::Left | Face::Right | Face::LeftLeg => {
                profile.dimensions.height
            }
            _ => profile.dimensions.width,
        }
    }

    /// Validate and build one feature into its effect
    fn build_feature(
        &self,
        feature: &Feature,
        profile: &SteelProfile,
        base: &Mesh,
        options: &PipelineOptions,
        depth: usize,
    ) -> Result<Built> {
        if depth >= MAX_EXPANSION_DEPTH {
            return Err(Error::InvalidFeatureParams {
                feature_id: feature.id.clone(),
                reasons: vec!["expansion nested too deeply".to_string()],
            });
        }

        let resolved = resolver::resolve(feature, profile);

        // Composites expand here; their sub-features re-enter the builder
        if feature.kind == FeatureKind::Composite {
            let expansion = expand_composite(feature)?;
            if !expansion.skipped.is_empty() {
                return Err(Error::CyclicComposite {
                    feature_id: feature.id.clone(),
                });
            }
            return Ok(Built::Expand(expansion.ordered));
        }

        // Contour-bearing kinds route through the detector and handlers
        if matches!(
            feature.kind,
            FeatureKind::Cut | FeatureKind::Notch | FeatureKind::EndCut
        ) {
            let issues = feature.invariant_violations(profile);
            if !issues.is_empty() {
                return Err(Error::InvalidFeatureParams {
                    feature_id: feature.id.clone(),
                    reasons: issues,
                });
            }

            return self.build_cut(feature, profile, base, resolved);
        }

        // Everything else has a registered processor
        let processor = self.processors.get(feature.kind)?;
        let issues = processor.validate(feature, profile);
        if !issues.is_empty() {
            return Err(Error::InvalidFeatureParams {
                feature_id: feature.id.clone(),
                reasons: issues,
            });
        }

        let ctx = ProcessorContext {
            feature,
            profile,
            resolved,
        };

        let effect = if options.cache_results && self.is_cacheable(feature) {
            let key = GeometryCache::fingerprint(feature, profile);
            let mesh = self
                .cache
                .get_or_create(key, || match processor.build(&ctx)? {
                    FeatureEffect::Cut(mesh) | FeatureEffect::Add(mesh) => Ok(mesh),
                    _ => unreachable!("cacheable kinds build solids"),
                })?;
            if feature.kind == FeatureKind::Weld {
                FeatureEffect::Add(mesh)
            } else {
                FeatureEffect::Cut(mesh)
            }
        } else {
            processor.build(&ctx)?
        };

        Ok(match effect {
            FeatureEffect::Cut(mesh) => Built::Solid {
                mesh,
                op: BooleanOp::Subtract,
            },
            FeatureEffect::Add(mesh) => Built::Solid {
                mesh,
                op: BooleanOp::Union,
            },
            FeatureEffect::Marking { record, engrave } => Built::Marking { record, engrave },
            FeatureEffect::Transform(bend) => Built::Transform(bend),
            FeatureEffect::Expand(features) => Built::Expand(features),
        })
    }

    /// Solid-producing kinds whose build output is worth caching
    fn is_cacheable(&self, feature: &Feature) -> bool {
        matches!(
            feature.kind,
            FeatureKind::Hole
                | FeatureKind::TappedHole
                | FeatureKind::Countersink
                | FeatureKind::Counterbore
                | FeatureKind::Spotface
                | FeatureKind::Slot
                | FeatureKind::Cutout
                | FeatureKind::Volume
                | FeatureKind::Contour
                | FeatureKind::Chamfer
                | FeatureKind::Bevel
                | FeatureKind::Coping
                | FeatureKind::Thread
                | FeatureKind::Weld
        )
    }

    /// Build a contour-bearing cut through the detector and handlers
    fn build_cut(
        &self,
        feature: &Feature,
        profile: &SteelProfile,
        base: &Mesh,
        resolved: ResolvedPosition,
    ) -> Result<Built> {
        let span = Self::face_span(resolved.face, profile);
        let class = classify(feature, profile, span, &self.detector);
        debug!(feature = %feature.id, class = %class, "classified cut");

        // The two-notch pattern splits into one feature per extremity so
        // each notch subtracts and records independently
        if class == CutClass::PartialNotch {
            return self.split_partial_notch(feature, profile);
        }

        let ctx = CutContext {
            feature,
            profile,
            base,
            class,
            resolved,
        };
        let solid = self.cut_handlers.build(&ctx)?;

        if solid.skipped {
            Ok(Built::Skip {
                note: solid
                    .note
                    .unwrap_or_else(|| "handler produced no geometry".to_string()),
            })
        } else {
            Ok(Built::Solid {
                mesh: solid.mesh,
                op: solid.op,
            })
        }
    }

    /// Expand a partial-notch contour into two interior notch features
    fn split_partial_notch(&self, feature: &Feature, profile: &SteelProfile) -> Result<Built> {
        use crate::cuts::PartialNotchHandler;
        use steelfab_core::DstvBlock;

        let handler = PartialNotchHandler {
            gap_threshold_mm: self.detector.gap_threshold_mm,
        };
        let points = feature.params.points2();
        let spans = handler
            .notch_spans(&points, profile.dimensions.length)
            .ok_or_else(|| Error::InvalidFeatureParams {
                feature_id: feature.id.clone(),
                reasons: vec!["partial notch contour has no usable gap".to_string()],
            })?;

        let (min_y, max_y) = spans.y;
        let rect_feature = |index: usize, x0: f64, x1: f64| -> Feature {
            let mut notch = feature.clone();
            notch.id = format!("{}:n{index}", feature.id);
            notch.kind = FeatureKind::Notch;
            // Pin the classification so the rectangles extrude as plain
            // interior openings through the face
            notch.params.block = Some(DstvBlock::InteriorContour);
            notch.params.points = vec![[x0, min_y], [x1, min_y], [x1, max_y], [x0, max_y]];
            notch.params.bulges = Vec::new();
            notch
        };

        Ok(Built::Expand(vec![
            rect_feature(0, spans.first.0, spans.first.1),
            rect_feature(1, spans.second.0, spans.second.1),
        ]))
    }

    /// Commit a built effect onto the pipeline mesh.
    ///
    /// This is where the degenerate-result policy lives: an empty boolean
    /// result restores the pre-operation mesh and flags the record.
    fn commit(
        &self,
        mesh: &mut Mesh,
        feature: &Feature,
        profile: &SteelProfile,
        outcome: Result<Built>,
        options: &PipelineOptions,
        started: Instant,
    ) -> Result<()> {
        let built = outcome?;
        let resolved = resolver::resolve(feature, profile);
        let class = self.class_hint(feature, profile, &resolved);

        match built {
            Built::Skip { note } => {
                debug!(feature = %feature.id, note = %note, "cut skipped");
                let mut record = cut_record(feature, profile, &resolved, class);
                record.csg_skipped = true;
                mesh.user_data.cuts.push(record);
                Ok(())
            }
            Built::Marking { record, engrave } => {
                if let Some(solid) = engrave {
                    self.apply_checked(
                        mesh,
                        feature,
                        profile,
                        &resolved,
                        class,
                        solid,
                        BooleanOp::Subtract,
                        options,
                        started,
                    )?;
                }
                mesh.user_data.markings.push(record);
                Ok(())
            }
            Built::Transform(bend) => {
                bend.apply(mesh);
                mesh.user_data
                    .cuts
                    .push(cut_record(feature, profile, &resolved, class));
                Ok(())
            }
            Built::Expand(sub_features) => {
                for sub in &sub_features {
                    let outcome = self.build_feature(sub, profile, mesh, options, 1);
                    self.commit(mesh, sub, profile, outcome, options, started)?;
                }
                Ok(())
            }
            Built::Solid { mesh: solid, op } => match op {
                BooleanOp::Subtract | BooleanOp::Intersect => self.apply_checked(
                    mesh, feature, profile, &resolved, class, solid, op, options, started,
                ),
                BooleanOp::Union => {
                    let result = boolean(mesh, &solid, BooleanOp::Union)?;
                    self.check_timeout(feature, options, started)?;
                    *mesh = result;
                    mesh.user_data
                        .cuts
                        .push(cut_record(feature, profile, &resolved, class));
                    Ok(())
                }
            },
        }
    }

    /// Detector class for metadata, when the feature is contour-bearing
    fn class_hint(
        &self,
        feature: &Feature,
        profile: &SteelProfile,
        resolved: &ResolvedPosition,
    ) -> Option<CutClass> {
        if matches!(
            feature.kind,
            FeatureKind::Cut | FeatureKind::Notch | FeatureKind::EndCut
        ) {
            let span = Self::face_span(resolved.face, profile);
            Some(classify(feature, profile, span, &self.detector))
        } else {
            None
        }
    }

    /// Apply a removal boolean with the zero-vertex guard and the
    /// excessive-loss warning
    #[allow(clippy::too_many_arguments)]
    fn apply_checked(
        &self,
        mesh: &mut Mesh,
        feature: &Feature,
        profile: &SteelProfile,
        resolved: &ResolvedPosition,
        class: Option<CutClass>,
        solid: Mesh,
        op: BooleanOp,
        options: &PipelineOptions,
        started: Instant,
    ) -> Result<()> {
        let before = mesh.vertex_count();
        let result = boolean(mesh, &solid, op)?;
        self.check_timeout(feature, options, started)?;

        if result.vertex_count() == 0 && before > 0 {
            // Catastrophic collapse: keep the input mesh, flag the record
            let mut record = cut_record(feature, profile, resolved, class);
            record.csg_failed = true;
            mesh.user_data.cuts.push(record);
            return Err(Error::CsgDegenerate {
                feature_id: feature.id.clone(),
            });
        }

        let loss = 1.0 - result.vertex_count() as f64 / before.max(1) as f64;
        if loss > EXCESSIVE_LOSS_FRACTION {
            warn!(
                feature = %feature.id,
                loss_pct = loss * 100.0,
                "subtraction removed most of the mesh, keeping result"
            );
        }

        *mesh = result;
        mesh.user_data
            .cuts
            .push(cut_record(feature, profile, resolved, class));
        Ok(())
    }

    /// Per-feature soft budget check
    fn check_timeout(
        &self,
        feature: &Feature,
        options: &PipelineOptions,
        started: Instant,
    ) -> Result<()> {
        if let Some(budget_ms) = options.feature_timeout_ms {
            let elapsed = started.elapsed().as_millis() as u64;
            if elapsed > budget_ms {
                return Err(Error::FeatureTimeout {
                    feature_id: feature.id.clone(),
                    elapsed_ms: elapsed,
                });
            }
        }
        Ok(())
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}
