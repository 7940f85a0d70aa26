// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D boolean operations on outlines.
//!
//! Used by the exterior-cut handler: an AK contour describes the material
//! that *remains*, so the removal solid is the complement of the contour
//! inside the face frame. The heavy lifting is done by the i_overlay crate.

use crate::contour::{ensure_ccw, Outline2D};
use crate::error::{Error, Result};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Minimum usable contour area after an overlay operation
const MIN_RESULT_AREA: f64 = 1e-9;

/// Convert a contour to an i_overlay path
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

/// Convert an outline (outer + holes) to i_overlay paths
fn outline_to_paths(outline: &Outline2D) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::with_capacity(1 + outline.holes.len());
    paths.push(contour_to_path(&outline.outer));
    for hole in &outline.holes {
        paths.push(contour_to_path(hole));
    }
    paths
}

/// Convert overlay result shapes back to outlines
fn shapes_to_outlines(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Outline2D> {
    let mut outlines = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let mut contours = shape.iter().map(|path| {
            path.iter()
                .map(|p| Point2::new(p[0], p[1]))
                .collect::<Vec<_>>()
        });

        let Some(outer) = contours.next() else {
            continue;
        };
        if outer.len() < 3 {
            continue;
        }

        let mut outline = Outline2D::new(ensure_ccw(&outer));
        for hole in contours {
            if hole.len() >= 3 {
                outline.add_hole(hole);
            }
        }

        if outline.area().abs() > MIN_RESULT_AREA {
            outlines.push(outline);
        }
    }

    outlines
}

/// Boolean difference `subject - clips`, returning zero or more outlines
pub fn difference_2d(
    subject: &Outline2D,
    clips: &[Vec<Point2<f64>>],
) -> Result<Vec<Outline2D>> {
    if subject.outer.len() < 3 {
        return Err(Error::InvalidOutline(
            "Subject must have at least 3 vertices".to_string(),
        ));
    }

    let valid_clips: Vec<Vec<[f64; 2]>> = clips
        .iter()
        .filter(|c| c.len() >= 3)
        .map(|c| contour_to_path(c))
        .collect();

    if valid_clips.is_empty() {
        return Ok(vec![subject.clone()]);
    }

    let paths = outline_to_paths(subject);
    let result = paths.overlay(&valid_clips, OverlayRule::Difference, FillRule::EvenOdd);

    Ok(shapes_to_outlines(&result))
}

/// Boolean union of a set of contours
pub fn union_2d(contours: &[Vec<Point2<f64>>]) -> Result<Vec<Outline2D>> {
    let valid: Vec<&Vec<Point2<f64>>> = contours.iter().filter(|c| c.len() >= 3).collect();

    match valid.len() {
        0 => Ok(Vec::new()),
        1 => Ok(vec![Outline2D::new(ensure_ccw(valid[0]))]),
        _ => {
            let subject = vec![contour_to_path(valid[0])];
            let clip: Vec<Vec<[f64; 2]>> =
                valid.iter().skip(1).map(|c| contour_to_path(c)).collect();

            let result = subject.overlay(&clip, OverlayRule::Union, FillRule::EvenOdd);
            Ok(shapes_to_outlines(&result))
        }
    }
}

/// Complement of a contour inside a rectangular frame: `frame - contour`.
///
/// The frame is the face footprint `(min .. max)`; the returned outlines are
/// the regions the exterior cut removes.
pub fn complement_in_frame(
    contour: &[Point2<f64>],
    min: Point2<f64>,
    max: Point2<f64>,
) -> Result<Vec<Outline2D>> {
    if contour.len() < 3 {
        return Err(Error::InvalidOutline(
            "Contour must have at least 3 vertices".to_string(),
        ));
    }

    let frame = Outline2D::rect_from_corners(min.x, min.y, max.x, max.y);
    difference_2d(&frame, &[ensure_ccw(contour)])
}
