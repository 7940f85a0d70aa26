// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coping: shaped end cuts that let one profile mate another.
//!
//! Three geometries by style: profile-fit removes the mating section's
//! silhouette (inflated by the clearance) at the join angle; saddle removes
//! the crossing tube's cylinder; the straight and bevel styles reduce to
//! angled end boxes. Tolerances and clearance are design inputs, not
//! analytic intersections.

use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use steelfab_core::{
    CopingStyle, Feature, FeatureKind, ProfileDimensions, ProfileKind, SteelProfile,
};
use steelfab_geometry::{box_solid, cylinder, section_outline, extrude_outline, Axis, Mesh};

/// Default clearance between mating sections (mm)
const DEFAULT_CLEARANCE: f64 = 2.0;

pub struct CopingProcessor;

impl CopingProcessor {
    /// Which end the cope sits at, from the anchor
    fn at_start(ctx: &ProcessorContext) -> bool {
        ctx.feature.position[0] < ctx.profile.dimensions.length / 2.0
    }

    /// Mating profile dimensions, inflated by the clearance
    fn inflated_target(target: &ProfileDimensions, clearance: f64) -> ProfileDimensions {
        ProfileDimensions {
            length: target.length,
            height: target.height + 2.0 * clearance,
            width: target.width + 2.0 * clearance,
            thickness: target.thickness + 2.0 * clearance,
            web_thickness: target.web_thickness.map(|t| t + 2.0 * clearance),
            flange_thickness: target.flange_thickness.map(|t| t + clearance),
            wall_thickness: target.wall_thickness,
        }
    }

    /// Profile-fit cope: the mating I-section silhouette crossing the end
    fn profile_fit(ctx: &ProcessorContext, clearance: f64) -> Result<Mesh> {
        let dims = &ctx.profile.dimensions;
        let target = ctx
            .feature
            .params
            .coping_target
            .ok_or_else(|| Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["profile-fit coping requires a target section".to_string()],
            })?;

        let inflated = Self::inflated_target(&target, clearance);
        let silhouette = SteelProfile::new(ProfileKind::IProfile, "coping-target", inflated);
        let outline = section_outline(&silhouette)?;

        // The mating beam crosses the piece: extrude its silhouette across
        // the section width with margin, as a prism along engine Z
        let reach = dims.width * 2.0;
        let angle = ctx.feature.params.angle.unwrap_or(90.0);
        let at_start = Self::at_start(ctx);
        let end_x = if at_start {
            -dims.length / 2.0
        } else {
            dims.length / 2.0
        };

        // Section outline is (w, h); lift it into the end plane: outline w
        // runs along the piece axis, h up, extrusion across the width
        let orient = Matrix4::new(
            1.0, 0.0, 0.0, end_x,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, -reach / 2.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let mut solid = extrude_outline(&outline, reach, Some(orient))?;

        // Join angle: rotate the silhouette about the vertical through the end
        if (angle - 90.0).abs() > 1e-9 {
            let tilt = Rotation3::from_axis_angle(
                &Vector3::y_axis(),
                (angle - 90.0).to_radians(),
            )
            .to_homogeneous();
            solid.translate(Vector3::new(-end_x, 0.0, 0.0));
            solid.apply_transform(&tilt);
            solid.translate(Vector3::new(end_x, 0.0, 0.0));
        }

        Ok(solid)
    }

    /// Saddle cope: the crossing tube's cylinder at the end
    fn saddle(ctx: &ProcessorContext, clearance: f64) -> Result<Mesh> {
        let dims = &ctx.profile.dimensions;
        let target_d = ctx
            .feature
            .params
            .coping_target
            .map(|t| t.height)
            .or(ctx.feature.params.diameter)
            .ok_or_else(|| Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["saddle coping requires a target diameter".to_string()],
            })?;

        let at_start = Self::at_start(ctx);
        let end_x = if at_start {
            -dims.length / 2.0
        } else {
            dims.length / 2.0
        };

        cylinder(
            Point3::new(end_x, 0.0, 0.0),
            target_d + 2.0 * clearance,
            dims.width * 3.0,
            Axis::Z,
        )
        .map_err(Into::into)
    }

    /// Straight and bevel styles: angled end boxes
    fn bevel_box(ctx: &ProcessorContext, angle_deg: f64, flip: bool) -> Mesh {
        let dims = &ctx.profile.dimensions;
        let at_start = Self::at_start(ctx);
        let depth = ctx.feature.params.depth.unwrap_or(50.0);
        let margin = dims.height.max(dims.width);

        let end_x = if at_start {
            -dims.length / 2.0 + depth
        } else {
            dims.length / 2.0 - depth
        };
        let box_len = depth + margin;
        let center_x = if at_start {
            end_x - box_len / 2.0
        } else {
            end_x + box_len / 2.0
        };

        let mut solid = box_solid(
            Point3::new(center_x, 0.0, 0.0),
            Vector3::new(box_len, dims.height + margin, dims.width + margin),
        );

        if angle_deg.abs() > 1e-9 {
            let signed = if flip { -angle_deg } else { angle_deg };
            let tilt =
                Rotation3::from_axis_angle(&Vector3::z_axis(), signed.to_radians()).to_homogeneous();
            solid.translate(Vector3::new(-end_x, 0.0, 0.0));
            solid.apply_transform(&tilt);
            solid.translate(Vector3::new(end_x, 0.0, 0.0));
        }

        solid
    }
}

impl FeatureProcessor for CopingProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Coping]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        match feature.params.coping.unwrap_or_default() {
            CopingStyle::ProfileFit if feature.params.coping_target.is_none() => {
                issues.push("profile-fit coping requires a target section".to_string());
            }
            CopingStyle::Saddle
                if feature.params.coping_target.is_none()
                    && feature.params.diameter.is_none() =>
            {
                issues.push("saddle coping requires a target diameter".to_string());
            }
            _ => {}
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let clearance = ctx.feature.params.clearance.unwrap_or(DEFAULT_CLEARANCE);
        let style = ctx.feature.params.coping.unwrap_or_default();

        let solid = match style {
            CopingStyle::ProfileFit => Self::profile_fit(ctx, clearance)?,
            CopingStyle::Saddle => Self::saddle(ctx, clearance)?,
            CopingStyle::Straight => Self::bevel_box(ctx, 0.0, false),
            CopingStyle::SingleBevel => {
                let angle = ctx.feature.params.angle.unwrap_or(45.0);
                Self::bevel_box(ctx, angle, false)
            }
            CopingStyle::DoubleBevel => {
                let angle = ctx.feature.params.angle.unwrap_or(45.0);
                let mut upper = Self::bevel_box(ctx, angle, false);
                let lower = Self::bevel_box(ctx, angle, true);
                upper.merge(&lower);
                upper
            }
        };

        Ok(FeatureEffect::Cut(solid))
    }
}
