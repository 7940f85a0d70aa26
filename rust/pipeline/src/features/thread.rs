// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Through-hole threads (DSTV TO blocks).
//!
//! Unlike tapped holes, a thread feature drills a plain bore reduced to
//! the core diameter; the thread itself is cosmetic and only flagged in
//! the metadata sidecar.

use super::holes::{bore_outline, bore_solid};
use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::{Error, Result};
use crate::resolver::face_frame;
use steelfab_core::{core_diameter, pitch_for_diameter, Feature, FeatureKind, HoleType, SteelProfile};

pub struct ThreadProcessor;

impl FeatureProcessor for ThreadProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Thread]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        feature.invariant_violations(profile)
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let params = &ctx.feature.params;
        let diameter = params.diameter.ok_or_else(|| Error::InvalidFeatureParams {
            feature_id: ctx.feature.id.clone(),
            reasons: vec!["thread requires a diameter".to_string()],
        })?;

        let pitch = params.pitch.unwrap_or_else(|| pitch_for_diameter(diameter));
        let reduced = core_diameter(diameter, pitch);

        let frame = face_frame(ctx.resolved.face, ctx.profile);
        let outline = bore_outline(
            HoleType::Round,
            ctx.feature.position[0],
            ctx.feature.position[1],
            reduced,
            None,
            None,
            None,
        );

        let solid = bore_solid(&frame, &ctx.resolved, &outline, params.depth)?;
        Ok(FeatureEffect::Cut(solid))
    }
}
