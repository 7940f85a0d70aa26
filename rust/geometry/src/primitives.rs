// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid primitive builders used by the cut handlers.
//!
//! Boxes for end cuts and notches, cylinders for bores, lathes for thread
//! and countersink profiles, wedges for chamfers. All builders emit closed
//! solids with outward normals.

use crate::contour::Outline2D;
use crate::error::Result;
use crate::extrusion::extrude_outline;
use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point2, Point3, Rotation3, Vector3};

/// Principal axis selector for oriented primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector of the axis
    #[inline]
    pub fn unit(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Rotation taking +Z to this axis
    fn rotation_from_z(&self) -> Matrix4<f64> {
        match self {
            Axis::X => Rotation3::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2)
                .to_homogeneous(),
            Axis::Y => Rotation3::from_axis_angle(&Vector3::x_axis(), -std::f64::consts::FRAC_PI_2)
                .to_homogeneous(),
            Axis::Z => Matrix4::identity(),
        }
    }
}

/// Add a triangle with its face normal to a mesh
fn add_face_triangle(mesh: &mut Mesh, v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) {
    let normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-12) {
        Some(n) => n,
        None => return,
    };

    let base = mesh.vertex_count() as u32;
    mesh.add_vertex(v0, normal);
    mesh.add_vertex(v1, normal);
    mesh.add_vertex(v2, normal);
    mesh.add_triangle(base, base + 1, base + 2);
}

/// Axis-aligned box from corner bounds; 12 triangles, outward normals
pub fn box_from_bounds(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(36, 36);

    let v0 = Point3::new(min.x, min.y, min.z);
    let v1 = Point3::new(max.x, min.y, min.z);
    let v2 = Point3::new(max.x, max.y, min.z);
    let v3 = Point3::new(min.x, max.y, min.z);
    let v4 = Point3::new(min.x, min.y, max.z);
    let v5 = Point3::new(max.x, min.y, max.z);
    let v6 = Point3::new(max.x, max.y, max.z);
    let v7 = Point3::new(min.x, max.y, max.z);

    // Front face (z = min.z), normal -Z
    add_face_triangle(&mut mesh, v0, v2, v1);
    add_face_triangle(&mut mesh, v0, v3, v2);

    // Back face (z = max.z), normal +Z
    add_face_triangle(&mut mesh, v4, v5, v6);
    add_face_triangle(&mut mesh, v4, v6, v7);

    // Left face (x = min.x), normal -X
    add_face_triangle(&mut mesh, v0, v4, v7);
    add_face_triangle(&mut mesh, v0, v7, v3);

    // Right face (x = max.x), normal +X
    add_face_triangle(&mut mesh, v1, v2, v6);
    add_face_triangle(&mut mesh, v1, v6, v5);

    // Bottom face (y = min.y), normal -Y
    add_face_triangle(&mut mesh, v0, v1, v5);
    add_face_triangle(&mut mesh, v0, v5, v4);

    // Top face (y = max.y), normal +Y
    add_face_triangle(&mut mesh, v3, v7, v6);
    add_face_triangle(&mut mesh, v3, v6, v2);

    mesh
}

/// Box centered at a point with full extents
pub fn box_solid(center: Point3<f64>, size: Vector3<f64>) -> Mesh {
    let half = size / 2.0;
    box_from_bounds(center - half, center + half)
}

/// Adaptive segment count for a circle of the given radius (millimeters)
#[inline]
pub fn circle_segments_for_radius(radius: f64) -> usize {
    let segments = (radius.sqrt() * 6.0).ceil() as usize;
    segments.clamp(12, 48)
}

/// Solid cylinder along a principal axis.
///
/// `length` is the full extent along the axis; the cylinder is centered at
/// `center`.
pub fn cylinder(center: Point3<f64>, diameter: f64, length: f64, axis: Axis) -> Result<Mesh> {
    let radius = diameter / 2.0;
    let segments = circle_segments_for_radius(radius);

    let mut circle = Vec::with_capacity(segments);
    for i in 0..segments {
        let angle = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
        circle.push(Point2::new(radius * angle.cos(), radius * angle.sin()));
    }

    let outline = Outline2D::new(circle);

    // Extrude symmetric about the origin, orient, then move into place
    let orient = axis.rotation_from_z();
    let transform = Matrix4::new_translation(&center.coords)
        * orient
        * Matrix4::new_translation(&Vector3::new(0.0, 0.0, -length / 2.0));

    extrude_outline(&outline, length, Some(transform))
}

/// Surface of revolution: revolve a closed (r, h) profile a full turn
/// around the +Y axis through `center`.
///
/// Profile points are (radius, height) pairs; radii must be non-negative.
/// Each profile edge sweeps a quad ring; the closed profile seals the
/// solid, so no caps are emitted.
pub fn lathe(center: Point3<f64>, profile: &[Point2<f64>], segments: usize) -> Mesh {
    let mut mesh = Mesh::new();
    if profile.len() < 3 {
        return mesh;
    }

    // Counter-clockwise profiles sweep outward-facing quads
    let profile = crate::contour::ensure_ccw(profile);

    let segments = segments.clamp(8, 64);
    let n = profile.len();

    for i in 0..n {
        let p0 = profile[i];
        let p1 = profile[(i + 1) % n];

        for j in 0..segments {
            let a0 = 2.0 * std::f64::consts::PI * (j as f64) / (segments as f64);
            let a1 = 2.0 * std::f64::consts::PI * ((j + 1) as f64) / (segments as f64);

            let ring = |p: Point2<f64>, a: f64| {
                Point3::new(
                    center.x + p.x * a.cos(),
                    center.y + p.y,
                    center.z + p.x * a.sin(),
                )
            };

            let v00 = ring(p0, a0);
            let v01 = ring(p0, a1);
            let v10 = ring(p1, a0);
            let v11 = ring(p1, a1);

            // Degenerate quads at the axis collapse to single triangles
            add_face_triangle(&mut mesh, v00, v10, v11);
            add_face_triangle(&mut mesh, v00, v11, v01);
        }
    }

    mesh
}

/// Right-triangle prism used for chamfers and bevels.
///
/// The cross-section is a right triangle with legs `width` (along +X) and
/// `height` (along +Y), right angle at the origin corner; the prism runs
/// `length` along +Z, centered on the origin along that axis.
pub fn wedge(width: f64, height: f64, length: f64) -> Result<Mesh> {
    let outline = Outline2D::new(vec![
        Point2::new(0.0, 0.0),
        Point2::new(width, 0.0),
        Point2::new(0.0, height),
    ]);

    let transform = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -length / 2.0));
    extrude_outline(&outline, length, Some(transform))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_bounds() {
        let mesh = box_from_bounds(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangle_count(), 12);

        let (min, max) = mesh.bounds();
        assert!((min.x - -1.0).abs() < 1e-6);
        assert!((max.y - 2.0).abs() < 1e-6);
        assert!((max.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_box_solid_centering() {
        let mesh = box_solid(Point3::new(10.0, 0.0, 0.0), Vector3::new(4.0, 4.0, 4.0));
        let (min, max) = mesh.bounds();
        assert!((min.x - 8.0).abs() < 1e-6);
        assert!((max.x - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_cylinder_along_y() {
        let mesh = cylinder(Point3::new(0.0, 5.0, 0.0), 20.0, 10.0, Axis::Y).unwrap();
        let (min, max) = mesh.bounds();

        assert!((min.y - 0.0).abs() < 0.01);
        assert!((max.y - 10.0).abs() < 0.01);
        assert!((min.x - -10.0).abs() < 0.1);
        assert!((max.z - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_cylinder_along_x() {
        let mesh = cylinder(Point3::origin(), 6.0, 100.0, Axis::X).unwrap();
        let (min, max) = mesh.bounds();

        assert!((min.x - -50.0).abs() < 0.01);
        assert!((max.x - 50.0).abs() < 0.01);
        assert!((max.y - 3.0).abs() < 0.1);
    }

    #[test]
    fn test_lathe_ring() {
        // Rectangular (r, h) profile revolves into a washer-like ring
        let profile = vec![
            Point2::new(5.0, 0.0),
            Point2::new(8.0, 0.0),
            Point2::new(8.0, 4.0),
            Point2::new(5.0, 4.0),
        ];

        let mesh = lathe(Point3::origin(), &profile, 24);
        assert!(!mesh.is_empty());

        let (min, max) = mesh.bounds();
        assert!((max.x - 8.0).abs() < 0.1);
        assert!((min.y - 0.0).abs() < 1e-6);
        assert!((max.y - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_wedge_cross_section() {
        let mesh = wedge(10.0, 5.0, 100.0).unwrap();
        let (min, max) = mesh.bounds();

        assert!((max.x - 10.0).abs() < 1e-6);
        assert!((max.y - 5.0).abs() < 1e-6);
        assert!((min.z - -50.0).abs() < 1e-6);
        assert!((max.z - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_segment_adaptivity() {
        assert!(circle_segments_for_radius(1.0) >= 12);
        assert!(circle_segments_for_radius(500.0) <= 48);
        assert!(circle_segments_for_radius(100.0) > circle_segments_for_radius(4.0));
    }
}
