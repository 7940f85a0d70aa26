// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composite feature expansion.
//!
//! A composite declares sub-features and optional dependency edges. The
//! expansion runs a topological sort and returns the sub-features in
//! application order; a cycle is diagnosed and the offending sub-features
//! are skipped rather than aborting the run. With a `Parallel` sequence
//! the order additionally groups by kind so the pipeline can batch
//! non-geometric groups onto parallel tasks.
//!
//! The module also ships the built-in composite constructors: countersunk
//! tapped holes, rounded cutouts, slotted hole patterns, mounting plates
//! and T-slots.

use crate::error::Result;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use steelfab_core::{
    CompositeSequence, Face, Feature, FeatureKind, HoleType, PatternLayout,
};
use tracing::warn;

/// Result of expanding a composite
pub struct Expansion {
    /// Sub-features in application order
    pub ordered: Vec<Feature>,
    /// Indices of sub-features skipped because of dependency cycles
    pub skipped: Vec<usize>,
}

/// Expand a composite feature into its ordered sub-features.
///
/// Dependency edges are `(prerequisite, dependent)` index pairs into
/// `params.sub_features`. Cycles are reported and their members skipped.
pub fn expand_composite(feature: &Feature) -> Result<Expansion> {
    let subs = &feature.params.sub_features;
    let n = subs.len();

    if n == 0 {
        return Ok(Expansion {
            ordered: Vec::new(),
            skipped: Vec::new(),
        });
    }

    // Kahn's algorithm over the dependency edges
    let mut indegree = vec![0usize; n];
    let mut edges: FxHashMap<usize, SmallVec<[usize; 4]>> = FxHashMap::default();

    for &(prerequisite, dependent) in &feature.params.dependencies {
        if prerequisite >= n || dependent >= n {
            warn!(
                feature = %feature.id,
                prerequisite, dependent,
                "dependency edge out of range, ignoring"
            );
            continue;
        }
        edges.entry(prerequisite).or_default().push(dependent);
        indegree[dependent] += 1;
    }

    // FIFO keeps independent sub-features in declaration order
    let mut ready: std::collections::VecDeque<usize> =
        (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut emitted: FxHashSet<usize> = FxHashSet::default();

    while let Some(index) = ready.pop_front() {
        order.push(index);
        emitted.insert(index);

        if let Some(dependents) = edges.get(&index) {
            for &dependent in dependents {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
        }
    }

    // Anything not emitted sits on a cycle
    let skipped: Vec<usize> = (0..n).filter(|i| !emitted.contains(i)).collect();
    if !skipped.is_empty() {
        warn!(
            feature = %feature.id,
            skipped = ?skipped,
            "composite contains a dependency cycle, skipping members"
        );
    }

    let mut ordered: Vec<Feature> = order.iter().map(|&i| subs[i].clone()).collect();

    // Parallel sequences group by kind; geometry order within the groups
    // is preserved by a stable sort
    if feature.params.sequence == CompositeSequence::Parallel {
        ordered.sort_by_key(|f| f.kind);
    }

    Ok(Expansion { ordered, skipped })
}

/// Countersink followed by a tapped hole at the same anchor
pub fn countersunk_tapped_hole(
    id: &str,
    face: Face,
    x: f64,
    y: f64,
    diameter: f64,
    sink_diameter: f64,
) -> Feature {
    let mut sink = Feature::new(format!("{id}:sink"), FeatureKind::Countersink, [x, y, 0.0]);
    sink.face = Some(face);
    sink.params.diameter = Some(diameter);
    sink.params.sink_diameter = Some(sink_diameter);

    let mut tap = Feature::new(format!("{id}:tap"), FeatureKind::TappedHole, [x, y, 0.0]);
    tap.face = Some(face);
    tap.params.diameter = Some(diameter);

    let mut composite = Feature::new(id, FeatureKind::Composite, [x, y, 0.0]);
    composite.face = Some(face);
    composite.params.sub_features = vec![sink, tap];
    composite.params.dependencies = vec![(0, 1)];
    composite
}

/// Closed contour with automatic bulges rounding every corner
pub fn rounded_cutout(
    id: &str,
    face: Face,
    points: Vec<[f64; 2]>,
    corner_radius: f64,
) -> Feature {
    let mut contour = Feature::new(format!("{id}:contour"), FeatureKind::Contour, [0.0; 3]);
    contour.face = Some(face);

    // A uniform bulge on every edge approximates filleted corners; the
    // bulge value comes from the requested radius against the edge length
    let n = points.len();
    let mut bulges = vec![0.0; n];
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let edge = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
        if edge > 1e-9 {
            bulges[i] = (corner_radius / edge).min(0.25);
        }
    }
    contour.params.points = points;
    contour.params.bulges = bulges;

    let mut composite = Feature::new(id, FeatureKind::Composite, [0.0; 3]);
    composite.face = Some(face);
    composite.params.sub_features = vec![contour];
    composite
}

/// Slots first, then the bolt holes centered in them
pub fn slotted_hole_pattern(
    id: &str,
    face: Face,
    x: f64,
    y: f64,
    count: u32,
    spacing: f64,
    hole_diameter: f64,
    slot_length: f64,
) -> Feature {
    let mut subs = Vec::with_capacity(count as usize * 2);
    let mut dependencies = Vec::with_capacity(count as usize);

    for i in 0..count {
        let cx = x + i as f64 * spacing;

        let mut slot = Feature::new(format!("{id}:slot{i}"), FeatureKind::Slot, [cx, y, 0.0]);
        slot.face = Some(face);
        slot.params.width = Some(hole_diameter * 1.5);
        slot.params.length = Some(slot_length);
        subs.push(slot);

        let mut hole = Feature::new(format!("{id}:hole{i}"), FeatureKind::Hole, [cx, y, 0.0]);
        hole.face = Some(face);
        hole.params.diameter = Some(hole_diameter);
        subs.push(hole);

        // Slot before its hole
        dependencies.push(((i * 2) as usize, (i * 2 + 1) as usize));
    }

    let mut composite = Feature::new(id, FeatureKind::Composite, [x, y, 0.0]);
    composite.face = Some(face);
    composite.params.sub_features = subs;
    composite.params.dependencies = dependencies;
    composite
}

/// Outer contour then a rectangular bolt pattern
pub fn mounting_plate(
    id: &str,
    face: Face,
    outline: Vec<[f64; 2]>,
    bolt_diameter: f64,
    rows: u32,
    columns: u32,
    row_spacing: f64,
    column_spacing: f64,
    pattern_origin: [f64; 2],
) -> Feature {
    let mut contour = Feature::new(format!("{id}:outline"), FeatureKind::Contour, [0.0; 3]);
    contour.face = Some(face);
    contour.params.points = outline;

    let mut bolts = Feature::new(
        format!("{id}:bolts"),
        FeatureKind::DrillPattern,
        [pattern_origin[0], pattern_origin[1], 0.0],
    );
    bolts.face = Some(face);
    bolts.params.diameter = Some(bolt_diameter);
    bolts.params.pattern = Some(PatternLayout::Rectangular {
        rows,
        columns,
        row_spacing,
        column_spacing,
    });

    let mut composite = Feature::new(id, FeatureKind::Composite, [0.0; 3]);
    composite.face = Some(face);
    composite.params.sub_features = vec![contour, bolts];
    composite.params.dependencies = vec![(0, 1)];
    composite
}

/// Two oblong slots arranged orthogonally
pub fn t_slot(id: &str, face: Face, x: f64, y: f64, width: f64, length: f64) -> Feature {
    let mut bar = Feature::new(format!("{id}:bar"), FeatureKind::Slot, [x, y, 0.0]);
    bar.face = Some(face);
    bar.params.width = Some(width);
    bar.params.length = Some(length);

    let mut stem = Feature::new(format!("{id}:stem"), FeatureKind::Slot, [x, y, 0.0]);
    stem.face = Some(face);
    stem.params.width = Some(width);
    stem.params.length = Some(length);
    stem.params.hole_type = Some(HoleType::Rectangular);
    // Crossed orientation via the rotation triple
    stem.rotation = [0.0, 0.0, std::f64::consts::FRAC_PI_2];

    let mut composite = Feature::new(id, FeatureKind::Composite, [x, y, 0.0]);
    composite.face = Some(face);
    composite.params.sub_features = vec![bar, stem];
    composite
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_order_respected() {
        let composite = countersunk_tapped_hole("c1", Face::Top, 50.0, 50.0, 12.0, 24.0);
        let expansion = expand_composite(&composite).unwrap();

        assert!(expansion.skipped.is_empty());
        assert_eq!(expansion.ordered.len(), 2);
        assert_eq!(expansion.ordered[0].kind, FeatureKind::Countersink);
        assert_eq!(expansion.ordered[1].kind, FeatureKind::TappedHole);
    }

    #[test]
    fn test_cycle_detected_and_skipped() {
        let mut composite = countersunk_tapped_hole("c2", Face::Top, 0.0, 0.0, 12.0, 24.0);
        composite.params.dependencies = vec![(0, 1), (1, 0)];

        let expansion = expand_composite(&composite).unwrap();
        assert_eq!(expansion.skipped.len(), 2);
        assert!(expansion.ordered.is_empty());
    }

    #[test]
    fn test_partial_cycle_keeps_clean_members() {
        let mut composite = slotted_hole_pattern("c3", Face::Top, 0.0, 0.0, 2, 60.0, 12.0, 30.0);
        // Tie the last two into a cycle; the first pair stays clean
        composite.params.dependencies.push((3, 2));

        let expansion = expand_composite(&composite).unwrap();
        assert_eq!(expansion.skipped.len(), 2);
        assert_eq!(expansion.ordered.len(), 2);
    }

    #[test]
    fn test_parallel_sequence_groups_by_kind() {
        let mut composite = Feature::new("c4", FeatureKind::Composite, [0.0; 3]);
        composite.params.sequence = CompositeSequence::Parallel;

        for (i, kind) in [
            FeatureKind::Marking,
            FeatureKind::Hole,
            FeatureKind::Marking,
            FeatureKind::Hole,
        ]
        .iter()
        .enumerate()
        {
            let mut sub = Feature::new(format!("s{i}"), *kind, [0.0; 3]);
            sub.params.diameter = Some(10.0);
            composite.params.sub_features.push(sub);
        }

        let expansion = expand_composite(&composite).unwrap();
        let kinds: Vec<FeatureKind> = expansion.ordered.iter().map(|f| f.kind).collect();

        // Same kinds are adjacent after grouping
        assert_eq!(kinds[0], kinds[1]);
        assert_eq!(kinds[2], kinds[3]);
    }

    #[test]
    fn test_builtin_constructors_shape() {
        let pattern = slotted_hole_pattern("p", Face::Top, 10.0, 20.0, 3, 50.0, 12.0, 30.0);
        assert_eq!(pattern.params.sub_features.len(), 6);
        assert_eq!(pattern.params.dependencies.len(), 3);

        let plate = mounting_plate(
            "m",
            Face::Top,
            vec![[0.0, 0.0], [200.0, 0.0], [200.0, 100.0], [0.0, 100.0]],
            10.0,
            2,
            2,
            60.0,
            160.0,
            [20.0, 20.0],
        );
        assert_eq!(plate.params.sub_features.len(), 2);

        let slot = t_slot("t", Face::Top, 0.0, 0.0, 10.0, 40.0);
        assert_eq!(slot.params.sub_features.len(), 2);

        let rounded = rounded_cutout(
            "r",
            Face::Top,
            vec![[0.0, 0.0], [100.0, 0.0], [100.0, 50.0], [0.0, 50.0]],
            5.0,
        );
        let contour = &rounded.params.sub_features[0];
        assert_eq!(contour.params.bulges.len(), 4);
        assert!(contour.params.bulges.iter().all(|&b| b > 0.0));
    }
}
