// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Steelfab Core
//!
//! Data model for steel fabrication geometry: parametric profiles, DSTV
//! faces and the fabrication-feature records consumed by the pipeline.
//!
//! This crate knows nothing about meshes. It owns:
//!
//! - **Profiles**: the immutable stock-piece descriptor ([`SteelProfile`])
//!   with its dimension set and the profile-code classifier.
//! - **Faces**: the enumerated surface identifiers and the fixed DSTV face
//!   code mapping (`v`, `o`, `u`, `h`, `l`, `r`).
//! - **Features**: value-type records for holes, cuts, contours, copings,
//!   welds, markings, bends and composites, with a typed open parameter bag.
//! - **Thread tables**: ISO metric coarse pitches used to approximate
//!   tapped holes.
//!
//! The DSTV text parser itself is an external collaborator; this crate only
//! defines the vocabulary its output is expressed in.

pub mod classifier;
pub mod error;
pub mod face;
pub mod feature;
pub mod profile;
pub mod threads;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use classifier::classify_profile_code;
pub use error::{Error, Result};
pub use face::{DstvBlock, Face};
pub use feature::{
    CompositeSequence, CoordinateSystem, CopingStyle, Feature, FeatureKind, FeatureParams,
    HoleType, PatternLayout, WeldStyle,
};
pub use profile::{ProfileDimensions, ProfileKind, SteelProfile};
pub use threads::{core_diameter, pitch_diameter, pitch_for_diameter};
