// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Position and face resolution.
//!
//! DSTV anchors are measured from the piece's lower-left origin on the
//! declared face. The engine frame is centered: X along the length, Y the
//! height, Z the width. This module converts a feature anchor `(face, x, y)`
//! into engine coordinates with the drilling axis and face depth per
//! profile family.
//!
//! Anchor conventions follow the format: web and flange anchors sit at the
//! wall's mid-depth, plate and tube anchors on the outer surface. The
//! `surface_anchored` flag tells the solid builders which convention a
//! position uses; [`ResolvedPosition::cut_center`] normalizes both to the
//! wall mid-depth.

use nalgebra::{Matrix4, Point2, Point3, Vector3};
use steelfab_core::{Face, Feature, ProfileKind, SteelProfile};
use tracing::warn;

/// Engine-frame placement of a feature
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPosition {
    /// Anchor in engine coordinates
    pub position: Point3<f64>,
    /// Euler rotation (radians) orienting a Y-axis solid along the
    /// drilling direction; kept for renderer parity
    pub rotation: Vector3<f64>,
    /// Face the feature binds to (fallback applied)
    pub face: Face,
    /// Thickness of the wall being cut
    pub depth: f64,
    /// Outward normal of the face
    pub normal: Vector3<f64>,
    /// Whether `position` sits on the outer surface (true) or at the wall
    /// mid-depth (false)
    pub surface_anchored: bool,
}

impl ResolvedPosition {
    /// Center of the wall being cut, regardless of anchor convention
    #[inline]
    pub fn cut_center(&self) -> Point3<f64> {
        if self.surface_anchored {
            self.position - self.normal * (self.depth / 2.0)
        } else {
            self.position
        }
    }

    /// Point on the outer surface of the face
    #[inline]
    pub fn surface_point(&self) -> Point3<f64> {
        if self.surface_anchored {
            self.position
        } else {
            self.position + self.normal * (self.depth / 2.0)
        }
    }
}

/// Right-handed 2D frame on a face, used to lift DSTV contours into the
/// engine frame.
///
/// `engine = origin + u * p.x + v * p.y + normal * z`, with `u × v = normal`
/// so extrusions along the face normal keep outward windings.
#[derive(Debug, Clone, Copy)]
pub struct FaceFrame {
    pub origin: Point3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub normal: Vector3<f64>,
    /// Wall thickness behind this face
    pub depth: f64,
}

impl FaceFrame {
    /// Whether DSTV `(x, y)` maps to `(v, u)` rather than `(u, v)`.
    ///
    /// DSTV `x` always runs along the length; in frames where `v` is the
    /// length axis the components swap.
    #[inline]
    fn dstv_swapped(&self) -> bool {
        self.u.x.abs() < 0.5
    }

    /// Map a DSTV face point into outline coordinates for extrusion.
    ///
    /// The outline plane is spanned by (u, v); this returns the (u, v)
    /// components for a DSTV `(x, y)` pair.
    #[inline]
    pub fn outline_point(&self, x: f64, y: f64) -> Point2<f64> {
        if self.dstv_swapped() {
            Point2::new(y, x)
        } else {
            Point2::new(x, y)
        }
    }

    /// Transform mapping outline space (u, v, z-along-normal) into the
    /// engine frame, with the extrusion starting `back_off` behind the face
    /// plane.
    pub fn extrusion_transform(&self, back_off: f64) -> Matrix4<f64> {
        let start = self.origin - self.normal * back_off;
        Matrix4::new(
            self.u.x, self.v.x, self.normal.x, start.x,
            self.u.y, self.v.y, self.normal.y, start.y,
            self.u.z, self.v.z, self.normal.z, start.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// Euler rotation orienting a Y-axis cylinder along the given face normal
fn rotation_for_normal(normal: &Vector3<f64>) -> Vector3<f64> {
    if normal.z.abs() > 0.5 {
        // Y -> Z: quarter turn about X
        Vector3::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0)
    } else if normal.x.abs() > 0.5 {
        // Y -> X: quarter turn about Z
        Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2)
    } else {
        Vector3::zeros()
    }
}

/// Resolve the effective face of a feature, falling back to the web.
///
/// An unmapped or missing face is reported but does not halt processing.
pub fn effective_face(feature: &Feature, profile: &SteelProfile) -> Face {
    match feature.face {
        Some(face) => face,
        None => {
            let fallback = default_face(profile.kind);
            warn!(
                feature = %feature.id,
                profile = %profile.code,
                "feature carries no face binding, falling back to {fallback}"
            );
            fallback
        }
    }
}

/// Default face per family when the input stream carries none
fn default_face(kind: ProfileKind) -> Face {
    match kind {
        ProfileKind::IProfile | ProfileKind::HProfile | ProfileKind::UProfile => Face::Web,
        ProfileKind::LProfile => Face::LeftLeg,
        ProfileKind::Plate | ProfileKind::FlatBar => Face::Top,
        _ => Face::Top,
    }
}

/// Build the face frame for a profile face.
///
/// DSTV contour coordinates on the face are `(x along length, y across the
/// face)` from the lower-left corner; the frame's origin and axes encode
/// that mapping per family.
pub fn face_frame(face: Face, profile: &SteelProfile) -> FaceFrame {
    let dims = &profile.dimensions;
    let half_l = dims.length / 2.0;
    let half_h = dims.height / 2.0;
    let half_w = dims.width / 2.0;

    match face {
        // Web mid-plane: contour (x, y) -> engine (x - L/2, y - H/2)
        Face::Web => FaceFrame {
            origin: Point3::new(-half_l, -half_h, 0.0),
            u: Vector3::x(),
            v: Vector3::y(),
            normal: Vector3::z(),
            depth: dims.web_or_default(),
        },
        // Box faces across the width: surface anchored
        Face::Front => FaceFrame {
            origin: Point3::new(-half_l, -half_h, half_w),
            u: Vector3::x(),
            v: Vector3::y(),
            normal: Vector3::z(),
            depth: dims.wall_or_default(),
        },
        Face::Back => FaceFrame {
            origin: Point3::new(-half_l, -half_h, -half_w),
            u: Vector3::y(),
            v: Vector3::x(),
            normal: -Vector3::z(),
            depth: dims.wall_or_default(),
        },
        // Horizontal faces: u runs across the width so u x v = +Y
        Face::TopFlange => FaceFrame {
            origin: Point3::new(-half_l, half_h - dims.flange_or_default() / 2.0, -half_w),
            u: Vector3::z(),
            v: Vector3::x(),
            normal: Vector3::y(),
            depth: dims.flange_or_default(),
        },
        Face::BottomFlange => FaceFrame {
            origin: Point3::new(-half_l, -half_h + dims.flange_or_default() / 2.0, -half_w),
            u: Vector3::x(),
            v: Vector3::z(),
            normal: -Vector3::y(),
            depth: dims.flange_or_default(),
        },
        Face::Top => {
            let (surface_y, depth) = top_face_surface(profile);
            FaceFrame {
                origin: Point3::new(-half_l, surface_y, -half_w),
                u: Vector3::z(),
                v: Vector3::x(),
                normal: Vector3::y(),
                depth,
            }
        }
        Face::Bottom => {
            let (surface_y, depth) = top_face_surface(profile);
            FaceFrame {
                origin: Point3::new(-half_l, -surface_y, -half_w),
                u: Vector3::x(),
                v: Vector3::z(),
                normal: -Vector3::y(),
                depth,
            }
        }
        Face::Left => FaceFrame {
            origin: Point3::new(-half_l, -half_h, -half_w),
            u: Vector3::y(),
            v: Vector3::x(),
            normal: -Vector3::z(),
            depth: dims.wall_or_default(),
        },
        Face::Right => FaceFrame {
            origin: Point3::new(-half_l, -half_h, half_w),
            u: Vector3::x(),
            v: Vector3::y(),
            normal: Vector3::z(),
            depth: dims.wall_or_default(),
        },
        // Angle legs: the left leg is the upright plate, the right leg the
        // horizontal one; each uses its own thickness
        Face::LeftLeg => FaceFrame {
            origin: Point3::new(-half_l, -half_h, -half_w + dims.thickness / 2.0),
            u: Vector3::x(),
            v: Vector3::y(),
            normal: Vector3::z(),
            depth: dims.thickness,
        },
        Face::RightLeg => FaceFrame {
            origin: Point3::new(-half_l, -half_h + dims.thickness / 2.0, -half_w),
            u: Vector3::z(),
            v: Vector3::x(),
            normal: Vector3::y(),
            depth: dims.thickness,
        },
    }
}

/// Outer surface height and wall depth of the `Top` face per family
fn top_face_surface(profile: &SteelProfile) -> (f64, f64) {
    let dims = &profile.dimensions;
    match profile.kind {
        ProfileKind::Plate | ProfileKind::FlatBar => (dims.thickness / 2.0, dims.thickness),
        ProfileKind::RectTube | ProfileKind::SquareTube | ProfileKind::RoundTube => {
            (dims.height / 2.0, dims.wall_or_default())
        }
        _ => (dims.height / 2.0, dims.flange_or_default()),
    }
}

/// Whether anchors on this face sit on the surface rather than mid-wall.
/// Web, flange and leg frames are mid-wall; box faces anchor on the surface.
fn is_surface_anchored(face: Face) -> bool {
    !matches!(
        face,
        Face::Web | Face::TopFlange | Face::BottomFlange | Face::LeftLeg | Face::RightLeg
    )
}

/// Resolve a feature anchor into engine coordinates.
///
/// `(x, y)` come from the feature position in the DSTV convention: `x`
/// along the length from the piece start, `y` across the declared face from
/// its lower-left corner.
pub fn resolve(feature: &Feature, profile: &SteelProfile) -> ResolvedPosition {
    let face = effective_face(feature, profile);
    let frame = face_frame(face, profile);

    let x = feature.position[0];
    let y = feature.position[1];

    let p2 = frame.outline_point(x, y);
    let position = frame.origin + frame.u * p2.x + frame.v * p2.y;

    ResolvedPosition {
        position,
        rotation: rotation_for_normal(&frame.normal),
        face,
        depth: frame.depth,
        normal: frame.normal,
        surface_anchored: is_surface_anchored(face),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use steelfab_core::{FeatureKind, ProfileDimensions};

    fn ipe300() -> SteelProfile {
        SteelProfile::new(
            ProfileKind::IProfile,
            "IPE300",
            ProfileDimensions {
                length: 6000.0,
                height: 300.0,
                width: 150.0,
                thickness: 7.1,
                web_thickness: Some(7.1),
                flange_thickness: Some(10.7),
                wall_thickness: None,
            },
        )
    }

    fn hole_on(face: Face, x: f64, y: f64) -> Feature {
        let mut f = Feature::new("h", FeatureKind::Hole, [x, y, 0.0]);
        f.face = Some(face);
        f.params.diameter = Some(22.0);
        f
    }

    #[test]
    fn test_web_hole_position() {
        let resolved = resolve(&hole_on(Face::Web, 500.0, 150.0), &ipe300());

        assert_relative_eq!(resolved.position.x, 500.0 - 3000.0);
        assert_relative_eq!(resolved.position.y, 150.0 - 150.0);
        assert_relative_eq!(resolved.position.z, 0.0);
        assert_relative_eq!(resolved.depth, 7.1);
        assert_relative_eq!(resolved.normal.z, 1.0);
        assert_relative_eq!(resolved.rotation.x, std::f64::consts::FRAC_PI_2);
        assert!(!resolved.surface_anchored);
    }

    #[test]
    fn test_top_flange_hole_position() {
        let resolved = resolve(&hole_on(Face::TopFlange, 500.0, 75.0), &ipe300());

        assert_relative_eq!(resolved.position.x, -2500.0);
        // Mid-thickness of the flange
        assert_relative_eq!(resolved.position.y, 150.0 - 10.7 / 2.0);
        // y = 75 is the width midline
        assert_relative_eq!(resolved.position.z, 0.0);
        assert_relative_eq!(resolved.depth, 10.7);
        assert_relative_eq!(resolved.normal.y, 1.0);
    }

    #[test]
    fn test_bottom_flange_mirrors() {
        let resolved = resolve(&hole_on(Face::BottomFlange, 500.0, 75.0), &ipe300());

        assert_relative_eq!(resolved.position.y, -150.0 + 10.7 / 2.0);
        assert_relative_eq!(resolved.normal.y, -1.0);
    }

    #[test]
    fn test_plate_top_surface_anchor() {
        let plate = SteelProfile::new(
            ProfileKind::Plate,
            "BL15",
            ProfileDimensions::new(220.0, 15.0, 120.0, 15.0),
        );

        let resolved = resolve(&hole_on(Face::Top, 50.0, 60.0), &plate);

        assert_relative_eq!(resolved.position.x, 50.0 - 110.0);
        assert_relative_eq!(resolved.position.y, 7.5);
        assert_relative_eq!(resolved.position.z, 0.0);
        assert!(resolved.surface_anchored);

        // Cut center drops to the thickness midline
        assert_relative_eq!(resolved.cut_center().y, 0.0);
        assert_relative_eq!(resolved.surface_point().y, 7.5);
    }

    #[test]
    fn test_tube_top_face() {
        let tube = SteelProfile::new(
            ProfileKind::RectTube,
            "RHS200x100x5",
            ProfileDimensions {
                length: 2000.0,
                height: 200.0,
                width: 100.0,
                thickness: 5.0,
                web_thickness: None,
                flange_thickness: None,
                wall_thickness: Some(5.0),
            },
        );

        let resolved = resolve(&hole_on(Face::Top, 1000.0, 50.0), &tube);

        assert_relative_eq!(resolved.position.x, 0.0);
        assert_relative_eq!(resolved.position.y, 100.0);
        assert_relative_eq!(resolved.position.z, 0.0);
        assert_relative_eq!(resolved.depth, 5.0);
        assert_relative_eq!(resolved.normal.y, 1.0);
    }

    #[test]
    fn test_missing_face_falls_back() {
        let mut hole = Feature::new("h", FeatureKind::Hole, [100.0, 50.0, 0.0]);
        hole.params.diameter = Some(10.0);

        let resolved = resolve(&hole, &ipe300());
        assert_eq!(resolved.face, Face::Web);
    }

    #[test]
    fn test_face_frames_are_right_handed() {
        let profile = ipe300();
        for face in [
            Face::Web,
            Face::TopFlange,
            Face::BottomFlange,
            Face::Top,
            Face::Bottom,
            Face::Left,
            Face::Right,
            Face::Front,
            Face::Back,
            Face::LeftLeg,
            Face::RightLeg,
        ] {
            let frame = face_frame(face, &profile);
            let cross = frame.u.cross(&frame.v);
            assert_relative_eq!(cross.dot(&frame.normal), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_extrusion_transform_maps_origin() {
        let frame = face_frame(Face::Web, &ipe300());
        let transform = frame.extrusion_transform(5.0);

        // Outline origin lands at the face origin, backed off along -normal
        let p = transform.transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(p.x, frame.origin.x);
        assert_relative_eq!(p.y, frame.origin.y);
        assert_relative_eq!(p.z, frame.origin.z - 5.0);

        // One unit along outline z advances along the face normal
        let q = transform.transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(q.z, frame.origin.z - 4.0);
    }
}
