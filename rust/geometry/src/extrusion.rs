// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion of 2D outlines into solid meshes.

use crate::contour::{Outline2D, OutlineTriangulation};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Extrude an outline along +Z from 0 to `depth`.
///
/// Caps are triangulated with holes included; side walls are emitted for
/// the outer boundary and every hole. An optional transform is applied to
/// the finished solid.
#[inline]
pub fn extrude_outline(
    outline: &Outline2D,
    depth: f64,
    transform: Option<Matrix4<f64>>,
) -> Result<Mesh> {
    extrude_outline_between(outline, 0.0, depth, transform)
}

/// Extrude an outline along +Z between two depths
pub fn extrude_outline_between(
    outline: &Outline2D,
    z_start: f64,
    z_end: f64,
    transform: Option<Matrix4<f64>>,
) -> Result<Mesh> {
    if z_end <= z_start {
        return Err(Error::InvalidExtrusion(format!(
            "Extrusion span must be positive, got {z_start}..{z_end}"
        )));
    }

    let triangulation = outline.triangulate()?;

    let cap_vertices = triangulation.points.len() * 2;
    let side_vertices =
        (outline.outer.len() + outline.holes.iter().map(|h| h.len()).sum::<usize>()) * 4;
    let mut mesh = Mesh::with_capacity(
        cap_vertices + side_vertices,
        triangulation.indices.len() * 2 + side_vertices * 3 / 2,
    );

    create_cap(&triangulation, z_start, Vector3::new(0.0, 0.0, -1.0), &mut mesh);
    create_cap(&triangulation, z_end, Vector3::new(0.0, 0.0, 1.0), &mut mesh);

    create_side_walls(&outline.outer, z_start, z_end, false, &mut mesh);
    for hole in &outline.holes {
        create_side_walls(hole, z_start, z_end, true, &mut mesh);
    }

    if let Some(mat) = transform {
        mesh.apply_transform(&mat);
    }

    Ok(mesh)
}

/// Create a cap at height `z` from a triangulation
fn create_cap(
    triangulation: &OutlineTriangulation,
    z: f64,
    normal: Vector3<f64>,
    mesh: &mut Mesh,
) {
    let base_index = mesh.vertex_count() as u32;

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    let downward = normal.z < 0.0;
    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        // Bottom cap winds the other way so both faces point outward
        if downward {
            mesh.add_triangle(i0, i2, i1);
        } else {
            mesh.add_triangle(i0, i1, i2);
        }
    }
}

/// Create side walls for one boundary ring
fn create_side_walls(
    boundary: &[Point2<f64>],
    z_start: f64,
    z_end: f64,
    inward: bool,
    mesh: &mut Mesh,
) {
    let base_index = mesh.vertex_count() as u32;
    let mut quad_count = 0u32;

    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();

        let p0 = &boundary[i];
        let p1 = &boundary[j];

        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let raw_normal = if inward {
            Vector3::new(edge.y, -edge.x, 0.0)
        } else {
            Vector3::new(-edge.y, edge.x, 0.0)
        };
        let normal = match raw_normal.try_normalize(1e-10) {
            Some(n) => n,
            None => continue, // Degenerate edge (duplicate points)
        };

        let v0_bottom = Point3::new(p0.x, p0.y, z_start);
        let v1_bottom = Point3::new(p1.x, p1.y, z_start);
        let v0_top = Point3::new(p0.x, p0.y, z_end);
        let v1_top = Point3::new(p1.x, p1.y, z_end);

        let idx = base_index + quad_count * 4;
        mesh.add_vertex(v0_bottom, normal);
        mesh.add_vertex(v1_bottom, normal);
        mesh.add_vertex(v1_top, normal);
        mesh.add_vertex(v0_top, normal);

        if inward {
            mesh.add_triangle(idx, idx + 2, idx + 1);
            mesh.add_triangle(idx, idx + 3, idx + 2);
        } else {
            mesh.add_triangle(idx, idx + 1, idx + 2);
            mesh.add_triangle(idx, idx + 2, idx + 3);
        }

        quad_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrude_rectangle() {
        let outline = Outline2D::rectangle(10.0, 5.0);
        let mesh = extrude_outline(&outline, 20.0, None).unwrap();

        assert!(mesh.vertex_count() > 0);
        assert!(mesh.triangle_count() > 0);

        let (min, max) = mesh.bounds();
        assert!((min.x - -5.0).abs() < 0.01);
        assert!((max.x - 5.0).abs() < 0.01);
        assert!((min.y - -2.5).abs() < 0.01);
        assert!((max.y - 2.5).abs() < 0.01);
        assert!((min.z - 0.0).abs() < 0.01);
        assert!((max.z - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_extrude_between_depths() {
        let outline = Outline2D::rectangle(4.0, 4.0);
        let mesh = extrude_outline_between(&outline, 5.0, 9.0, None).unwrap();

        let (min, max) = mesh.bounds();
        assert!((min.z - 5.0).abs() < 0.01);
        assert!((max.z - 9.0).abs() < 0.01);
    }

    #[test]
    fn test_extrude_with_transform() {
        let outline = Outline2D::rectangle(10.0, 5.0);
        let transform = Matrix4::new_translation(&Vector3::new(100.0, 200.0, 300.0));
        let mesh = extrude_outline(&outline, 20.0, Some(transform)).unwrap();

        let (min, max) = mesh.bounds();
        assert!((min.x - 95.0).abs() < 0.01);
        assert!((max.x - 105.0).abs() < 0.01);
        assert!((min.z - 300.0).abs() < 0.01);
        assert!((max.z - 320.0).abs() < 0.01);
    }

    #[test]
    fn test_extrude_with_hole_has_more_triangles() {
        let solid = Outline2D::rectangle(20.0, 20.0);
        let solid_mesh = extrude_outline(&solid, 10.0, None).unwrap();

        let mut holed = Outline2D::rectangle(20.0, 20.0);
        holed.add_hole(vec![
            Point2::new(-5.0, -5.0),
            Point2::new(5.0, -5.0),
            Point2::new(5.0, 5.0),
            Point2::new(-5.0, 5.0),
        ]);
        let holed_mesh = extrude_outline(&holed, 10.0, None).unwrap();

        assert!(holed_mesh.triangle_count() > solid_mesh.triangle_count());
    }

    #[test]
    fn test_invalid_span() {
        let outline = Outline2D::rectangle(10.0, 5.0);
        assert!(extrude_outline(&outline, -1.0, None).is_err());
        assert!(extrude_outline_between(&outline, 3.0, 3.0, None).is_err());
    }
}
