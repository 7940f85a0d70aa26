// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures and the metadata sidecar.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use steelfab_core::Face;

/// Axis-aligned bounds record carried in cut metadata
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds3 {
    /// Bounds from two corner points
    pub fn from_corners(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min_x: min.x,
            max_x: max.x,
            min_y: min.y,
            max_y: max.y,
            min_z: min.z,
            max_z: max.z,
        }
    }

    /// Symmetric bounds around a center point
    pub fn around(center: Point3<f64>, margin: f64) -> Self {
        Self {
            min_x: center.x - margin,
            max_x: center.x + margin,
            min_y: center.y - margin,
            max_y: center.y + margin,
            min_z: center.z - margin,
            max_z: center.z + margin,
        }
    }

    /// Grow to include a point
    pub fn expand(&mut self, p: Point3<f64>) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
        self.min_z = self.min_z.min(p.z);
        self.max_z = self.max_z.max(p.z);
    }
}

/// Descriptor of one applied (or attempted) cut.
///
/// This is the interface to the external outline renderer: even when the
/// boolean fails, the descriptor records what the cut intended so the
/// outline can still be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutRecord {
    pub id: String,
    pub kind: String,
    pub face: Option<Face>,
    pub bounds: Bounds3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contour_points: Option<Vec<[f64; 2]>>,
    pub depth: f64,
    pub angle: f64,
    pub cut_type: String,
    #[serde(default)]
    pub csg_failed: bool,
    #[serde(default)]
    pub csg_skipped: bool,
}

/// Descriptor of a visual marking that is not applied as geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkingRecord {
    pub id: String,
    pub text: String,
    pub size: f64,
    pub face: Option<Face>,
    /// Engine-frame anchor of the marking
    pub position: [f64; 3],
    #[serde(default)]
    pub engraved: bool,
}

/// Side-channel data riding on a mesh through all CSG operations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshUserData {
    /// Applied cut descriptors in application order
    pub cuts: Vec<CutRecord>,
    /// Visual markings for the renderer
    pub markings: Vec<MarkingRecord>,
    /// Vertical offset hint for the renderer
    pub y_offset: f64,
    /// Centering offset hint for the renderer
    pub center_offset: [f64; 3],
    /// Whether the piece is mirrored relative to its catalog orientation
    pub is_mirrored: bool,
}

impl MeshUserData {
    /// Merge another sidecar into this one (used by mesh merge)
    pub fn absorb(&mut self, other: &MeshUserData) {
        self.cuts.extend(other.cuts.iter().cloned());
        self.markings.extend(other.markings.iter().cloned());
    }
}

/// Indexed triangle mesh.
///
/// Positions, normals and uvs are flat `f32` buffers, three (two for uvs)
/// components per vertex. The uv buffer may be empty; when present it is
/// kept in lockstep with positions.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Texture coordinates (u, v); optional
    pub uvs: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
    /// Metadata sidecar, preserved across CSG operations
    pub user_data: MeshUserData,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with preallocated buffers
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            uvs: Vec::new(),
            indices: Vec::with_capacity(index_count),
            user_data: MeshUserData::default(),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Vertex position as a point
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        Point3::new(
            self.positions[index * 3] as f64,
            self.positions[index * 3 + 1] as f64,
            self.positions[index * 3 + 2] as f64,
        )
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh has no vertices
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Attribute byte count; authoritative for cache size accounting
    #[inline]
    pub fn byte_size(&self) -> usize {
        (self.positions.len() + self.normals.len() + self.uvs.len()) * std::mem::size_of::<f32>()
            + self.indices.len() * std::mem::size_of::<u32>()
    }

    /// Merge another mesh into this one, absorbing its sidecar
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = (self.positions.len() / 3) as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);

        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));

        self.user_data.absorb(&other.user_data);
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Bounding sphere as (center, radius) around the box center
    pub fn bounding_sphere(&self) -> (Point3<f32>, f32) {
        if self.is_empty() {
            return (Point3::origin(), 0.0);
        }

        let (min, max) = self.bounds();
        let center = Point3::new(
            (min.x + max.x) * 0.5,
            (min.y + max.y) * 0.5,
            (min.z + max.z) * 0.5,
        );

        let mut radius_sq = 0.0f32;
        self.positions.chunks_exact(3).for_each(|chunk| {
            let dx = chunk[0] - center.x;
            let dy = chunk[1] - center.y;
            let dz = chunk[2] - center.z;
            radius_sq = radius_sq.max(dx * dx + dy * dy + dz * dz);
        });

        (center, radius_sq.sqrt())
    }

    /// Recompute smooth vertex normals from triangle geometry
    pub fn recompute_normals(&mut self) {
        let vertex_count = self.vertex_count();
        if vertex_count == 0 {
            return;
        }

        let mut accumulated = vec![Vector3::<f64>::zeros(); vertex_count];

        for tri in self.indices.chunks_exact(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let v0 = self.position(i0);
            let v1 = self.position(i1);
            let v2 = self.position(i2);

            let normal = (v1 - v0).cross(&(v2 - v0));

            accumulated[i0] += normal;
            accumulated[i1] += normal;
            accumulated[i2] += normal;
        }

        self.normals.clear();
        self.normals.reserve(vertex_count * 3);

        for normal in accumulated {
            let n = normal.try_normalize(1e-12).unwrap_or_else(Vector3::z);
            self.normals.push(n.x as f32);
            self.normals.push(n.y as f32);
            self.normals.push(n.z as f32);
        }
    }

    /// Translate all positions
    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.positions.chunks_exact_mut(3).for_each(|chunk| {
            chunk[0] = (chunk[0] as f64 + offset.x) as f32;
            chunk[1] = (chunk[1] as f64 + offset.y) as f32;
            chunk[2] = (chunk[2] as f64 + offset.z) as f32;
        });
    }

    /// Rotate all positions and normals by an Euler triple (radians)
    pub fn rotate_euler(&mut self, roll: f64, pitch: f64, yaw: f64) {
        let rotation = Rotation3::from_euler_angles(roll, pitch, yaw);
        self.apply_transform(&rotation.to_homogeneous());
    }

    /// Apply an affine transformation to positions and normals
    pub fn apply_transform(&mut self, transform: &Matrix4<f64>) {
        self.positions.chunks_exact_mut(3).for_each(|chunk| {
            let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let transformed = transform.transform_point(&point);
            chunk[0] = transformed.x as f32;
            chunk[1] = transformed.y as f32;
            chunk[2] = transformed.z as f32;
        });

        // Inverse transpose keeps normals correct under non-uniform scaling
        let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

        self.normals.chunks_exact_mut(3).for_each(|chunk| {
            let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let transformed = (normal_matrix * normal.to_homogeneous()).xyz();
            let n = transformed.try_normalize(1e-12).unwrap_or(normal);
            chunk[0] = n.x as f32;
            chunk[1] = n.y as f32;
            chunk[2] = n.z as f32;
        });
    }

    /// Clear all buffers and the sidecar
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.indices.clear();
        self.user_data = MeshUserData::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::z());
        mesh.add_triangle(0, 1, 2);
        mesh
    }

    #[test]
    fn test_mesh_counts() {
        let mesh = triangle_mesh();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_byte_size_accounting() {
        let mesh = triangle_mesh();
        // 3 vertices * 3 floats * 2 attributes * 4 bytes + 3 indices * 4 bytes
        assert_eq!(mesh.byte_size(), 3 * 3 * 2 * 4 + 3 * 4);
    }

    #[test]
    fn test_merge_offsets_indices_and_absorbs_sidecar() {
        let mut a = triangle_mesh();
        let mut b = triangle_mesh();
        b.user_data.cuts.push(CutRecord {
            id: "c1".to_string(),
            kind: "hole".to_string(),
            face: None,
            bounds: Bounds3::default(),
            contour_points: None,
            depth: 5.0,
            angle: 0.0,
            cut_type: "hole".to_string(),
            csg_failed: false,
            csg_skipped: false,
        });

        a.merge(&b);
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.indices[3..6], [3, 4, 5]);
        assert_eq!(a.user_data.cuts.len(), 1);
    }

    #[test]
    fn test_translate() {
        let mut mesh = triangle_mesh();
        mesh.translate(Vector3::new(10.0, 20.0, 30.0));
        let (min, _) = mesh.bounds();
        assert!((min.x - 10.0).abs() < 1e-5);
        assert!((min.y - 20.0).abs() < 1e-5);
        assert!((min.z - 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_euler_quarter_turn() {
        let mut mesh = triangle_mesh();
        // Rotate 90 degrees around X: (0,1,0) -> (0,0,1)
        mesh.rotate_euler(std::f64::consts::FRAC_PI_2, 0.0, 0.0);
        let p = mesh.position(2);
        assert!(p.y.abs() < 1e-6);
        assert!((p.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recompute_normals() {
        let mut mesh = triangle_mesh();
        mesh.normals.iter_mut().for_each(|n| *n = 0.0);
        mesh.recompute_normals();
        // Triangle in XY plane with CCW winding faces +Z
        assert!((mesh.normals[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_sphere() {
        let mesh = triangle_mesh();
        let (center, radius) = mesh.bounding_sphere();
        assert!(radius > 0.0);
        assert!(center.x > 0.0 && center.y > 0.0);
    }

    #[test]
    fn test_bounds3_expand() {
        let mut bounds = Bounds3::around(Point3::origin(), 1.0);
        bounds.expand(Point3::new(5.0, -3.0, 0.0));
        assert_eq!(bounds.max_x, 5.0);
        assert_eq!(bounds.min_y, -3.0);
    }
}
