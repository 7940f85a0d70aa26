// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline error kinds and policy.
//!
//! No error raised below the pipeline escapes `apply_features`: feature-local
//! failures are collected into the result's error list, and only caller
//! cancellation or `continue_on_error = false` ends a run early.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while applying features
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid feature parameters for '{feature_id}': {reasons:?}")]
    InvalidFeatureParams {
        feature_id: String,
        reasons: Vec<String>,
    },

    #[error("No processor registered for feature kind '{0}'")]
    UnknownFeatureKind(String),

    #[error("No handler registered for cut class '{0}'")]
    NoHandlerForCutType(String),

    #[error("CSG produced a degenerate (empty) result for '{feature_id}'")]
    CsgDegenerate { feature_id: String },

    #[error("Composite '{feature_id}' contains a dependency cycle")]
    CyclicComposite { feature_id: String },

    #[error("Pipeline cancelled by caller")]
    Cancelled,

    #[error("Feature '{feature_id}' exceeded its soft budget ({elapsed_ms} ms)")]
    FeatureTimeout { feature_id: String, elapsed_ms: u64 },

    #[error("Geometry error: {0}")]
    Geometry(#[from] steelfab_geometry::Error),

    #[error("Core model error: {0}")]
    Core(#[from] steelfab_core::Error),
}
