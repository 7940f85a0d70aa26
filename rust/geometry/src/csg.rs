// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG (Constructive Solid Geometry) evaluation.
//!
//! Boolean subtract/union/intersect over two triangle meshes via csgrs.
//! CSG over tessellated solids is numerically fragile at grazing
//! intersections; degenerate outcomes (unchanged or empty results) are
//! returned to the caller for policy handling rather than raised here.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{polygon_normal, project_to_plane, triangulate};
use nalgebra::{Point3, Vector3};

/// Boolean operation over two solids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Subtract,
    Union,
    Intersect,
}

impl BooleanOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::Subtract => "subtract",
            BooleanOp::Union => "union",
            BooleanOp::Intersect => "intersect",
        }
    }
}

/// Validate that a mesh is usable as a CSG operand
fn validate_operand(mesh: &Mesh, role: &str) -> Result<()> {
    if mesh.positions.is_empty() {
        return Err(Error::InvalidMeshForCsg(format!(
            "{role} operand has no position data"
        )));
    }
    if mesh.vertex_count() < 3 {
        return Err(Error::InvalidMeshForCsg(format!(
            "{role} operand has fewer than 3 vertices"
        )));
    }
    Ok(())
}

/// Convert our mesh format to a csgrs mesh
fn to_csgrs(mesh: &Mesh) -> csgrs::mesh::Mesh<()> {
    use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CsgMesh};
    use std::sync::OnceLock;

    if mesh.is_empty() {
        return CsgMesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            metadata: None,
        };
    }

    let mut polygons = Vec::with_capacity(mesh.triangle_count());

    for tri in mesh.indices.chunks_exact(3) {
        let v0 = mesh.position(tri[0] as usize);
        let v1 = mesh.position(tri[1] as usize);
        let v2 = mesh.position(tri[2] as usize);

        // Face normal from the triangle edges; skip degenerate triangles
        // so NaNs never reach the BSP tree
        let face_normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        let vertices = vec![
            Vertex::new(v0, face_normal),
            Vertex::new(v1, face_normal),
            Vertex::new(v2, face_normal),
        ];

        polygons.push(Polygon::new(vertices, None));
    }

    CsgMesh::from_polygons(&polygons, None)
}

/// Convert a csgrs mesh back to our mesh format
fn from_csgrs(csg_mesh: &csgrs::mesh::Mesh<()>) -> Result<Mesh> {
    let mut mesh = Mesh::new();

    for polygon in &csg_mesh.polygons {
        let vertices = &polygon.vertices;
        if vertices.len() < 3 {
            continue;
        }

        let points_3d: Vec<Point3<f64>> = vertices
            .iter()
            .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
            .collect();

        let raw_normal = Vector3::new(
            vertices[0].normal[0],
            vertices[0].normal[1],
            vertices[0].normal[2],
        );

        // Prefer the CSG normal; fall back to the computed polygon normal
        let normal = match raw_normal.try_normalize(1e-10) {
            Some(n) if n.x.is_finite() && n.y.is_finite() && n.z.is_finite() => n,
            _ => match polygon_normal(&points_3d).try_normalize(1e-10) {
                Some(n) => n,
                None => continue,
            },
        };

        // Triangles need no re-triangulation
        if points_3d.len() == 3 {
            let base = mesh.vertex_count() as u32;
            for v in vertices {
                mesh.add_vertex(v.pos, v.normal);
            }
            mesh.add_triangle(base, base + 1, base + 2);
            continue;
        }

        // Project using the CSG normal so winding intent is preserved
        let (points_2d, _, _, _) = project_to_plane(&points_3d, &normal);

        let indices = match triangulate(&points_2d) {
            Ok(idx) => idx,
            Err(_) => continue,
        };

        let base = mesh.vertex_count();
        for v in vertices {
            mesh.add_vertex(v.pos, v.normal);
        }

        for tri in indices.chunks_exact(3) {
            mesh.add_triangle(
                (base + tri[0]) as u32,
                (base + tri[1]) as u32,
                (base + tri[2]) as u32,
            );
        }
    }

    Ok(mesh)
}

/// Evaluate `a op b` and return a new mesh.
///
/// Both operands must expose positions and at least three vertices. The
/// result carries `a`'s metadata sidecar and freshly computed bounds-ready
/// buffers. A zero-vertex result is *returned*, not raised; the pipeline
/// decides whether to reject it.
pub fn boolean(a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh> {
    use csgrs::traits::CSG;

    validate_operand(a, "left")?;
    validate_operand(b, "right")?;

    let a_csg = to_csgrs(a);
    let b_csg = to_csgrs(b);

    let result_csg = match op {
        BooleanOp::Subtract => a_csg.difference(&b_csg),
        BooleanOp::Union => a_csg.union(&b_csg),
        BooleanOp::Intersect => a_csg.intersection(&b_csg),
    };

    let mut result = from_csgrs(&result_csg)?;
    result.user_data = a.user_data.clone();
    Ok(result)
}
