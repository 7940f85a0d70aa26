// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drill pattern expansion.
//!
//! A pattern feature expands into individual holes laid out linearly,
//! rectangularly or circularly around the anchor; the pipeline then
//! processes the expanded holes like any others.

use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::{Error, Result};
use steelfab_core::{Feature, FeatureKind, PatternLayout, SteelProfile};

pub struct DrillPatternProcessor;

impl DrillPatternProcessor {
    /// Hole center offsets in DSTV face coordinates
    fn offsets(layout: &PatternLayout) -> Vec<(f64, f64)> {
        match *layout {
            PatternLayout::Linear { count, spacing } => (0..count)
                .map(|i| (i as f64 * spacing, 0.0))
                .collect(),
            PatternLayout::Rectangular {
                rows,
                columns,
                row_spacing,
                column_spacing,
            } => {
                let mut offsets = Vec::with_capacity((rows * columns) as usize);
                for row in 0..rows {
                    for col in 0..columns {
                        offsets.push((col as f64 * column_spacing, row as f64 * row_spacing));
                    }
                }
                offsets
            }
            PatternLayout::Circular {
                count,
                radius,
                start_angle,
            } => (0..count)
                .map(|i| {
                    let angle = (start_angle + i as f64 * 360.0 / count as f64).to_radians();
                    (radius * angle.cos(), radius * angle.sin())
                })
                .collect(),
        }
    }
}

impl FeatureProcessor for DrillPatternProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::DrillPattern]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        match feature.params.pattern {
            None => issues.push("drill pattern requires a layout".to_string()),
            Some(PatternLayout::Linear { count, spacing }) => {
                if count == 0 {
                    issues.push("pattern count must be positive".to_string());
                }
                if spacing <= 0.0 {
                    issues.push(format!("pattern spacing must be positive, got {spacing}"));
                }
            }
            Some(PatternLayout::Rectangular { rows, columns, .. }) => {
                if rows == 0 || columns == 0 {
                    issues.push("pattern rows and columns must be positive".to_string());
                }
            }
            Some(PatternLayout::Circular { count, radius, .. }) => {
                if count == 0 {
                    issues.push("pattern count must be positive".to_string());
                }
                if radius <= 0.0 {
                    issues.push(format!("pattern radius must be positive, got {radius}"));
                }
            }
        }

        if feature.params.diameter.unwrap_or(0.0) <= 0.0 {
            issues.push("drill pattern requires a positive hole diameter".to_string());
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let layout = ctx
            .feature
            .params
            .pattern
            .ok_or_else(|| Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["drill pattern requires a layout".to_string()],
            })?;

        let mut holes = Vec::new();
        for (i, (dx, dy)) in Self::offsets(&layout).into_iter().enumerate() {
            let mut hole = ctx.feature.clone();
            hole.id = format!("{}#{}", ctx.feature.id, i);
            hole.kind = FeatureKind::Hole;
            hole.position[0] += dx;
            hole.position[1] += dy;
            hole.params.pattern = None;
            holes.push(hole);
        }

        Ok(FeatureEffect::Expand(holes))
    }
}
