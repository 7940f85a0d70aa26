// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Steelfab Geometry
//!
//! Triangle meshes and solid construction for steel part fabrication.
//!
//! This crate turns profile dimensions and cut parameters into meshes:
//!
//! - **Mesh primitives**: indexed triangle meshes with position/normal/uv
//!   attributes, bounds, byte accounting and affine transforms, plus the
//!   metadata sidecar that rides on every mesh.
//! - **CSG evaluation**: boolean subtract/union/intersect over two meshes
//!   via [csgrs](https://docs.rs/csgrs), tolerant of degenerate input.
//! - **Outlines**: closed 2D outlines with DXF-style bulge arcs, winding
//!   hygiene and triangulation via [earcutr](https://docs.rs/earcutr).
//! - **Sections**: cross-section outlines for every profile family.
//! - **Solid builders**: boxes, axis-aligned cylinders, surfaces of
//!   revolution and wedges used by the cut handlers.
//! - **2D booleans**: outline complement and difference via
//!   [i_overlay](https://docs.rs/i_overlay) for exterior-cut handling.
//!
//! All internal math runs in `f64`; mesh buffers are `f32`.

pub mod bool2d;
pub mod contour;
pub mod csg;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod primitives;
pub mod section;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use bool2d::{complement_in_frame, difference_2d, union_2d};
pub use contour::{
    ensure_ccw, ensure_cw, matches_rect_frame, point_in_outline, sample_bulged_contour,
    signed_area, Outline2D,
};
pub use csg::{boolean, BooleanOp};
pub use error::{Error, Result};
pub use extrusion::{extrude_outline, extrude_outline_between};
pub use mesh::{Bounds3, CutRecord, MarkingRecord, Mesh, MeshUserData};
pub use primitives::{box_from_bounds, box_solid, circle_segments_for_radius, cylinder, lathe, wedge, Axis};
pub use section::{circle_segments, section_mesh, section_outline};
pub use triangulation::{polygon_normal, project_to_plane, triangulate, triangulate_with_holes};
