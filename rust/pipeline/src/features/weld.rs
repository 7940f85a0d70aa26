// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Weld beads.
//!
//! Welds are additive: the bead solid is unioned onto the piece rather
//! than subtracted. Fillet beads are triangular prisms, butt and seam
//! welds flat strips, spot welds low cylinder caps. The geometry is a
//! visualization-grade approximation, not a weld model.

use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::Result;
use nalgebra::{Matrix4, Vector3};
use steelfab_core::{Feature, FeatureKind, SteelProfile, WeldStyle};
use steelfab_geometry::{box_solid, cylinder, wedge, Axis, Mesh};

/// Default bead leg size (mm)
const DEFAULT_BEAD_SIZE: f64 = 6.0;

/// Default seam length (mm)
const DEFAULT_SEAM_LENGTH: f64 = 100.0;

pub struct WeldProcessor;

impl WeldProcessor {
    fn bead(ctx: &ProcessorContext) -> Result<Mesh> {
        let params = &ctx.feature.params;
        let style = params.weld.unwrap_or_default();
        let size = params.size.or(params.width).unwrap_or(DEFAULT_BEAD_SIZE);
        let length = params.length.unwrap_or(DEFAULT_SEAM_LENGTH);
        let surface = ctx.resolved.surface_point();

        match style {
            WeldStyle::Fillet => {
                // Triangular prism along the seam, legs riding the surface
                let mut bead = wedge(size, size, length)?;

                // Prism axis along the piece length, legs up the normal and
                // across the seam
                let up = ctx.resolved.normal;
                let across = if up.y.abs() > 0.5 {
                    Vector3::z()
                } else {
                    Vector3::y()
                };
                let axis = up.cross(&across);
                let place = Matrix4::new(
                    up.x, across.x, axis.x, surface.x,
                    up.y, across.y, axis.y, surface.y,
                    up.z, across.z, axis.z, surface.z,
                    0.0, 0.0, 0.0, 1.0,
                );
                bead.apply_transform(&place);
                Ok(bead)
            }
            WeldStyle::Spot => {
                let d = params.diameter.unwrap_or(2.0 * size);
                let cap_center = surface + ctx.resolved.normal * (size / 4.0);
                let axis = if ctx.resolved.normal.y.abs() > 0.5 {
                    Axis::Y
                } else if ctx.resolved.normal.z.abs() > 0.5 {
                    Axis::Z
                } else {
                    Axis::X
                };
                Ok(cylinder(cap_center, d, size / 2.0, axis)?)
            }
            WeldStyle::Butt | WeldStyle::Seam => {
                // Flat strip along the seam, half-sunk into the joint
                let center = surface + ctx.resolved.normal * (size / 4.0);
                let extents = if ctx.resolved.normal.y.abs() > 0.5 {
                    Vector3::new(length, size / 2.0, size)
                } else if ctx.resolved.normal.z.abs() > 0.5 {
                    Vector3::new(length, size, size / 2.0)
                } else {
                    Vector3::new(size / 2.0, size, length)
                };
                Ok(box_solid(center, extents))
            }
        }
    }
}

impl FeatureProcessor for WeldProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Weld]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        if let Some(size) = feature.params.size {
            if size <= 0.0 {
                issues.push(format!("weld size must be positive, got {size}"));
            }
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        Ok(FeatureEffect::Add(Self::bead(ctx)?))
    }
}
