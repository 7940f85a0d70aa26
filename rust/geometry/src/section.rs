// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-section outlines per profile family.
//!
//! Sections are produced in 2D section coordinates `(w, h)`: `w` runs along
//! the engine Z axis (width, centered), `h` along engine Y (height,
//! centered). [`section_mesh`] extrudes the outline along the piece length
//! and orients it into the engine frame (X length, Y height, Z width),
//! centered on the origin.

use crate::contour::Outline2D;
use crate::error::{Error, Result};
use crate::extrusion::extrude_outline;
use crate::mesh::Mesh;
use crate::primitives::circle_segments_for_radius;
use nalgebra::{Matrix4, Point2, Rotation3, Vector3};
use steelfab_core::{ProfileKind, SteelProfile};

/// Adaptive segment count for circular sections
#[inline]
pub fn circle_segments(radius: f64) -> usize {
    circle_segments_for_radius(radius)
}

/// Build the cross-section outline of a profile.
///
/// Returns the outline in section coordinates; hollow families carry their
/// inner boundary as a hole.
pub fn section_outline(profile: &SteelProfile) -> Result<Outline2D> {
    let dims = &profile.dimensions;
    dims.validate()?;

    match profile.kind {
        ProfileKind::IProfile | ProfileKind::HProfile => {
            Ok(i_section(dims.width, dims.height, dims.web_or_default(), dims.flange_or_default()))
        }
        ProfileKind::UProfile => Ok(u_section(
            dims.width,
            dims.height,
            dims.web_or_default(),
            dims.flange_or_default(),
        )),
        ProfileKind::LProfile => Ok(l_section(dims.width, dims.height, dims.thickness)),
        ProfileKind::RectTube | ProfileKind::SquareTube => {
            rect_tube_section(dims.width, dims.height, dims.wall_or_default())
        }
        ProfileKind::RoundTube => round_tube_section(dims.height, dims.wall_or_default()),
        ProfileKind::Plate | ProfileKind::FlatBar => {
            Ok(Outline2D::rectangle(dims.width, dims.thickness))
        }
        ProfileKind::RoundBar => Ok(circle_outline(dims.height / 2.0)),
        ProfileKind::Unknown => Ok(Outline2D::rectangle(dims.width, dims.height)),
    }
}

/// Extrude the section along the piece length into the engine frame.
///
/// The result spans `[-length/2, length/2]` on X with Y the height axis and
/// Z the width axis.
pub fn section_mesh(profile: &SteelProfile) -> Result<Mesh> {
    let outline = section_outline(profile)?;
    let length = profile.dimensions.length;

    // Section (w, h, extrusion) maps to engine (X=extrusion, Y=h, Z=w):
    // rotate -90 degrees about Y, then recenter along the length
    let orient =
        Rotation3::from_axis_angle(&Vector3::y_axis(), -std::f64::consts::FRAC_PI_2)
            .to_homogeneous();
    let transform = Matrix4::new_translation(&Vector3::new(length / 2.0, 0.0, 0.0)) * orient;

    extrude_outline(&outline, length, Some(transform))
}

/// I/H section: two flanges joined by a central web
fn i_section(width: f64, height: f64, web: f64, flange: f64) -> Outline2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let half_web = web / 2.0;

    Outline2D::new(vec![
        // Bottom flange
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, -half_h + flange),
        // Right side of web
        Point2::new(half_web, -half_h + flange),
        Point2::new(half_web, half_h - flange),
        // Top flange
        Point2::new(half_w, half_h - flange),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
        Point2::new(-half_w, half_h - flange),
        // Left side of web
        Point2::new(-half_web, half_h - flange),
        Point2::new(-half_web, -half_h + flange),
        Point2::new(-half_w, -half_h + flange),
    ])
}

/// U/channel section: web on the left, flanges opening to +w
fn u_section(width: f64, height: f64, web: f64, flange: f64) -> Outline2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Outline2D::new(vec![
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, -half_h + flange),
        Point2::new(-half_w + web, -half_h + flange),
        Point2::new(-half_w + web, half_h - flange),
        Point2::new(half_w, half_h - flange),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
    ])
}

/// L/angle section: legs along the bottom and left edges
fn l_section(width: f64, height: f64, thickness: f64) -> Outline2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Outline2D::new(vec![
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, -half_h + thickness),
        Point2::new(-half_w + thickness, -half_h + thickness),
        Point2::new(-half_w + thickness, half_h),
        Point2::new(-half_w, half_h),
    ])
}

/// Rectangular hollow section: outer rectangle with inner hole
fn rect_tube_section(width: f64, height: f64, wall: f64) -> Result<Outline2D> {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    if wall >= half_w || wall >= half_h {
        return Err(Error::InvalidOutline(format!(
            "Wall thickness {wall} exceeds half dimensions ({half_w}, {half_h})"
        )));
    }

    let inner_w = half_w - wall;
    let inner_h = half_h - wall;

    let mut outline = Outline2D::rectangle(width, height);
    outline.add_hole(vec![
        Point2::new(-inner_w, -inner_h),
        Point2::new(inner_w, -inner_h),
        Point2::new(inner_w, inner_h),
        Point2::new(-inner_w, inner_h),
    ]);
    Ok(outline)
}

/// Circular hollow section: ring with the wall thickness
fn round_tube_section(diameter: f64, wall: f64) -> Result<Outline2D> {
    let outer_radius = diameter / 2.0;
    let inner_radius = outer_radius - wall;

    if inner_radius <= 0.0 {
        return Err(Error::InvalidOutline(format!(
            "Wall thickness {wall} leaves no bore in diameter {diameter}"
        )));
    }

    let mut outline = circle_outline(outer_radius);
    let segments = circle_segments_for_radius(inner_radius);
    let mut hole = Vec::with_capacity(segments);
    for i in 0..segments {
        let angle = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
        hole.push(Point2::new(
            inner_radius * angle.cos(),
            inner_radius * angle.sin(),
        ));
    }
    outline.add_hole(hole);
    Ok(outline)
}

/// Plain circle outline
fn circle_outline(radius: f64) -> Outline2D {
    let segments = circle_segments_for_radius(radius);
    let mut points = Vec::with_capacity(segments);
    for i in 0..segments {
        let angle = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
        points.push(Point2::new(radius * angle.cos(), radius * angle.sin()));
    }
    Outline2D::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use steelfab_core::ProfileDimensions;

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

    #[test]
    fn test_i_section_shape() {
        let outline = section_outline(&ipe300()).unwrap();
        assert_eq!(outline.outer.len(), 12);
        assert!(outline.holes.is_empty());

        let (min, max) = outline.bounds();
        assert!((min.x - -75.0).abs() < 1e-9);
        assert!((max.x - 75.0).abs() < 1e-9);
        assert!((min.y - -150.0).abs() < 1e-9);
        assert!((max.y - 150.0).abs() < 1e-9);

        // Section area of an I-shape: 2 flanges + web
        let expected = 2.0 * 150.0 * 10.7 + (300.0 - 2.0 * 10.7) * 7.1;
        assert!((outline.area().abs() - expected).abs() < 1.0);
    }

    #[test]
    fn test_section_mesh_engine_frame() {
        let mesh = section_mesh(&ipe300()).unwrap();
        let (min, max) = mesh.bounds();

        // X spans the centered length, Y the height, Z the width
        assert!((min.x - -3000.0).abs() < 0.5);
        assert!((max.x - 3000.0).abs() < 0.5);
        assert!((min.y - -150.0).abs() < 0.5);
        assert!((max.y - 150.0).abs() < 0.5);
        assert!((min.z - -75.0).abs() < 0.5);
        assert!((max.z - 75.0).abs() < 0.5);
    }

    #[test]
    fn test_rect_tube_has_hole() {
        let profile = SteelProfile::new(
            ProfileKind::RectTube,
            "RHS200x100x5",
            ProfileDimensions {
                length: 2000.0,
                height: 100.0,
                width: 200.0,
                thickness: 5.0,
                web_thickness: None,
                flange_thickness: None,
                wall_thickness: Some(5.0),
            },
        );

        let outline = section_outline(&profile).unwrap();
        assert_eq!(outline.holes.len(), 1);

        // Ring area = outer - inner
        let hole_area: f64 = crate::contour::signed_area(&outline.holes[0]).abs();
        assert!((outline.area().abs() - 200.0 * 100.0).abs() < 1e-6);
        assert!((hole_area - 190.0 * 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_excessive_wall_rejected() {
        let profile = SteelProfile::new(
            ProfileKind::SquareTube,
            "SHS50x30",
            ProfileDimensions {
                length: 1000.0,
                height: 50.0,
                width: 50.0,
                thickness: 30.0,
                web_thickness: None,
                flange_thickness: None,
                wall_thickness: Some(30.0),
            },
        );

        assert!(section_outline(&profile).is_err());
    }

    #[test]
    fn test_plate_section() {
        let profile = SteelProfile::new(
            ProfileKind::Plate,
            "BL15",
            ProfileDimensions::new(220.0, 15.0, 120.0, 15.0),
        );

        let outline = section_outline(&profile).unwrap();
        let (min, max) = outline.bounds();
        assert!((max.x - 60.0).abs() < 1e-9);
        assert!((max.y - 7.5).abs() < 1e-9);
        assert!((min.y - -7.5).abs() < 1e-9);
    }

    #[test]
    fn test_round_tube_ring() {
        let profile = SteelProfile::new(
            ProfileKind::RoundTube,
            "CHS114x5",
            ProfileDimensions {
                length: 1500.0,
                height: 114.3,
                width: 114.3,
                thickness: 5.0,
                web_thickness: None,
                flange_thickness: None,
                wall_thickness: Some(5.0),
            },
        );

        let outline = section_outline(&profile).unwrap();
        assert_eq!(outline.holes.len(), 1);
    }

    #[test]
    fn test_l_section_corner() {
        let profile = SteelProfile::new(
            ProfileKind::LProfile,
            "L100x100x10",
            ProfileDimensions::new(3000.0, 100.0, 100.0, 10.0),
        );

        let outline = section_outline(&profile).unwrap();
        assert_eq!(outline.outer.len(), 6);

        let expected_area = 100.0 * 10.0 + (100.0 - 10.0) * 10.0;
        assert!((outline.area().abs() - expected_area).abs() < 1e-6);
    }
}
