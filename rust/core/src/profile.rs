// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric profile descriptors.
//!
//! A [`SteelProfile`] is created once per part and never mutated; the
//! pipeline and handlers read its dimensions to position and size cut solids.

use crate::classifier::classify_profile_code;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cross-section family of a stock piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileKind {
    IProfile,
    HProfile,
    UProfile,
    LProfile,
    RectTube,
    SquareTube,
    RoundTube,
    Plate,
    FlatBar,
    RoundBar,
    Unknown,
}

impl ProfileKind {
    /// Stable name used in metadata and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::IProfile => "IProfile",
            ProfileKind::HProfile => "HProfile",
            ProfileKind::UProfile => "UProfile",
            ProfileKind::LProfile => "LProfile",
            ProfileKind::RectTube => "RectTube",
            ProfileKind::SquareTube => "SquareTube",
            ProfileKind::RoundTube => "RoundTube",
            ProfileKind::Plate => "Plate",
            ProfileKind::FlatBar => "FlatBar",
            ProfileKind::RoundBar => "RoundBar",
            ProfileKind::Unknown => "Unknown",
        }
    }

    /// Whether the section has distinct web and flanges
    #[inline]
    pub fn is_flanged(&self) -> bool {
        matches!(
            self,
            ProfileKind::IProfile | ProfileKind::HProfile | ProfileKind::UProfile
        )
    }

    /// Whether the section is a closed hollow (tube family)
    #[inline]
    pub fn is_hollow(&self) -> bool {
        matches!(
            self,
            ProfileKind::RectTube | ProfileKind::SquareTube | ProfileKind::RoundTube
        )
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimension set of a stock piece, in millimeters.
///
/// Not every field is meaningful for every family; the optional thicknesses
/// fall back to the plate `thickness` via the `*_or_default` accessors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileDimensions {
    /// Length along the piece axis
    pub length: f64,
    /// Section height
    pub height: f64,
    /// Section width
    pub width: f64,
    /// Plate/base thickness
    pub thickness: f64,
    /// Web thickness for flanged sections
    pub web_thickness: Option<f64>,
    /// Flange thickness for flanged sections
    pub flange_thickness: Option<f64>,
    /// Wall thickness for hollow sections
    pub wall_thickness: Option<f64>,
}

impl ProfileDimensions {
    /// Create a plain dimension set (plates, bars)
    pub fn new(length: f64, height: f64, width: f64, thickness: f64) -> Self {
        Self {
            length,
            height,
            width,
            thickness,
            web_thickness: None,
            flange_thickness: None,
            wall_thickness: None,
        }
    }

    /// Web thickness, falling back to the base thickness
    #[inline]
    pub fn web_or_default(&self) -> f64 {
        self.web_thickness.unwrap_or(self.thickness)
    }

    /// Flange thickness, falling back to the base thickness
    #[inline]
    pub fn flange_or_default(&self) -> f64 {
        self.flange_thickness.unwrap_or(self.thickness)
    }

    /// Wall thickness, falling back to the base thickness
    #[inline]
    pub fn wall_or_default(&self) -> f64 {
        self.wall_thickness.unwrap_or(self.thickness)
    }

    /// Validate that the primary dimensions are positive
    pub fn validate(&self) -> Result<()> {
        if self.length <= 0.0 || self.height <= 0.0 || self.width <= 0.0 {
            return Err(Error::InvalidDimensions(format!(
                "length/height/width must be positive, got {}x{}x{}",
                self.length, self.height, self.width
            )));
        }
        if self.thickness < 0.0 {
            return Err(Error::InvalidDimensions(format!(
                "thickness must be non-negative, got {}",
                self.thickness
            )));
        }
        Ok(())
    }
}

/// Immutable descriptor of the stock piece a feature stream applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelProfile {
    /// Cross-section family
    pub kind: ProfileKind,
    /// Catalog code, e.g. `"IPE300"` or `"RHS200x100x5"`
    pub code: String,
    /// Dimension set in millimeters
    pub dimensions: ProfileDimensions,
}

impl SteelProfile {
    /// Create a profile with an explicit kind
    pub fn new(kind: ProfileKind, code: impl Into<String>, dimensions: ProfileDimensions) -> Self {
        Self {
            kind,
            code: code.into(),
            dimensions,
        }
    }

    /// Create a profile, classifying the kind from the code and an optional
    /// material tag (see [`classify_profile_code`])
    pub fn from_code(
        code: impl Into<String>,
        material_tag: Option<&str>,
        dimensions: ProfileDimensions,
    ) -> Self {
        let code = code.into();
        let kind = classify_profile_code(&code, material_tag);
        Self {
            kind,
            code,
            dimensions,
        }
    }
}
