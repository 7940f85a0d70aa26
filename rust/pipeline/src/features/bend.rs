// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bending (DSTV KA blocks).
//!
//! A bend is a per-vertex transform, not a CSG operation: vertices past
//! the bend line rotate rigidly about the bend axis; vertices inside the
//! bend radius blend the rotation to approximate the fold. Normals are
//! recomputed afterwards.

use super::{FeatureEffect, FeatureProcessor, ProcessorContext};
use crate::error::{Error, Result};
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use steelfab_core::{Feature, FeatureKind, SteelProfile};
use steelfab_geometry::Mesh;

/// Rigid bend applied to every vertex past the bend line
#[derive(Debug, Clone)]
pub struct BendTransform {
    /// Bend line position along the piece axis (engine X)
    pub position_x: f64,
    /// Bend axis direction
    pub axis: Vector3<f64>,
    /// Fold angle in radians
    pub angle: f64,
    /// Inner bend radius; vertices within it blend the fold
    pub radius: f64,
}

impl BendTransform {
    /// Apply the bend to a mesh in place
    pub fn apply(&self, mesh: &mut Mesh) {
        let axis = match Unit::try_new(self.axis, 1e-9) {
            Some(a) => a,
            None => return,
        };
        let pivot = Point3::new(self.position_x, 0.0, 0.0);

        mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
            let p = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let past = p.x - self.position_x;
            if past <= 0.0 {
                return;
            }

            // Blend inside the radius, full fold beyond it
            let t = if self.radius > 1e-9 {
                (past / self.radius).min(1.0)
            } else {
                1.0
            };
            let rotation = Rotation3::from_axis_angle(&axis, self.angle * t);
            let rotated = pivot + rotation * (p - pivot);

            chunk[0] = rotated.x as f32;
            chunk[1] = rotated.y as f32;
            chunk[2] = rotated.z as f32;
        });

        mesh.recompute_normals();
    }
}

pub struct BendProcessor;

impl FeatureProcessor for BendProcessor {
    fn kinds(&self) -> Vec<FeatureKind> {
        vec![FeatureKind::Bend]
    }

    fn validate(&self, feature: &Feature, profile: &SteelProfile) -> Vec<String> {
        let mut issues = feature.invariant_violations(profile);

        if feature.params.angle.is_none() {
            issues.push("bend requires an angle".to_string());
        }

        issues
    }

    fn build(&self, ctx: &ProcessorContext) -> Result<FeatureEffect> {
        let angle = ctx
            .feature
            .params
            .angle
            .ok_or_else(|| Error::InvalidFeatureParams {
                feature_id: ctx.feature.id.clone(),
                reasons: vec!["bend requires an angle".to_string()],
            })?;

        let axis = ctx
            .feature
            .params
            .axis
            .map(|a| Vector3::new(a[0], a[1], a[2]))
            .unwrap_or_else(Vector3::z);

        let position_x = ctx.feature.position[0] - ctx.profile.dimensions.length / 2.0;

        Ok(FeatureEffect::Transform(BendTransform {
            position_x,
            axis,
            angle: angle.to_radians(),
            radius: ctx.feature.params.radius.unwrap_or(0.0),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn strip_mesh() -> Mesh {
        // Flat strip along X from -100 to 100
        let mut mesh = Mesh::new();
        for x in [-100.0, 0.0, 50.0, 100.0] {
            mesh.add_vertex(Point3::new(x, 0.0, 0.0), Vector3::y());
            mesh.add_vertex(Point3::new(x, 0.0, 10.0), Vector3::y());
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(2, 1, 3);
        mesh.add_triangle(2, 3, 4);
        mesh.add_triangle(4, 3, 5);
        mesh.add_triangle(4, 5, 6);
        mesh.add_triangle(6, 5, 7);
        mesh
    }

    #[test]
    fn test_vertices_before_bend_stay_put() {
        let mut mesh = strip_mesh();
        let bend = BendTransform {
            position_x: 0.0,
            axis: Vector3::z(),
            angle: std::f64::consts::FRAC_PI_2,
            radius: 0.0,
        };
        bend.apply(&mut mesh);

        let p = mesh.position(0);
        assert_relative_eq!(p.x, -100.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_vertices_past_bend_fold_up() {
        let mut mesh = strip_mesh();
        let bend = BendTransform {
            position_x: 0.0,
            axis: Vector3::z(),
            angle: std::f64::consts::FRAC_PI_2,
            radius: 0.0,
        };
        bend.apply(&mut mesh);

        // x = 100 rotates onto the Y axis (90 degrees about Z)
        let p = mesh.position(6);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(p.y, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_radius_blends_fold() {
        let mut sharp = strip_mesh();
        let mut rounded = strip_mesh();

        let fold = std::f64::consts::FRAC_PI_2;
        BendTransform {
            position_x: 0.0,
            axis: Vector3::z(),
            angle: fold,
            radius: 0.0,
        }
        .apply(&mut sharp);
        BendTransform {
            position_x: 0.0,
            axis: Vector3::z(),
            angle: fold,
            radius: 80.0,
        }
        .apply(&mut rounded);

        // Inside the radius the rounded bend rotates less than the sharp one
        let sharp_p = sharp.position(4); // x = 50
        let round_p = rounded.position(4);
        assert!(round_p.x > sharp_p.x);
    }

    #[test]
    fn test_processor_emits_transform() {
        use crate::resolver;
        use steelfab_core::{Face, ProfileDimensions, ProfileKind};

        let profile = SteelProfile::new(
            ProfileKind::Plate,
            "BL5",
            ProfileDimensions::new(400.0, 5.0, 100.0, 5.0),
        );
        let mut feature = Feature::new("b1", FeatureKind::Bend, [300.0, 50.0, 0.0]);
        feature.face = Some(Face::Top);
        feature.params.angle = Some(90.0);
        feature.params.radius = Some(4.0);

        let ctx = ProcessorContext {
            feature: &feature,
            profile: &profile,
            resolved: resolver::resolve(&feature, &profile),
        };

        match BendProcessor.build(&ctx).unwrap() {
            FeatureEffect::Transform(bend) => {
                assert_relative_eq!(bend.position_x, 100.0);
                assert_relative_eq!(bend.angle, std::f64::consts::FRAC_PI_2);
            }
            _ => panic!("bend must produce a transform"),
        }
    }
}
