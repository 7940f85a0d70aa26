// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or validating model records
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown DSTV face code: {0:?}")]
    UnknownFaceCode(char),

    #[error("Invalid profile dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Invalid feature parameters: {0}")]
    InvalidFeature(String),
}
