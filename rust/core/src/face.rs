// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face identifiers and the DSTV surface/block vocabulary.

use serde::{Deserialize, Serialize};

/// Enumerated surface of a stock piece.
///
/// Which variants are meaningful depends on the profile family: I/H profiles
/// use `Web`/`TopFlange`/`BottomFlange`, tubes and plates use the box faces,
/// angles use the two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Web,
    TopFlange,
    BottomFlange,
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
    LeftLeg,
    RightLeg,
}

impl Face {
    /// Map a DSTV face code to a [`Face`].
    ///
    /// The mapping is fixed by the format: `v` (vorne/âme) is the web,
    /// `o` (oben) the top flange, `u` (unten) the bottom flange, `l`/`r`
    /// the legs of an angle. The code `h` (hinten) is ambiguous in the wild;
    /// this implementation resolves it to [`Face::Back`].
    ///
    /// Returns `None` for unknown codes. Callers are expected to fall back
    /// to [`Face::Web`] and report the code rather than halt.
    pub fn from_dstv(code: char) -> Option<Face> {
        match code.to_ascii_lowercase() {
            'v' => Some(Face::Web),
            'o' => Some(Face::TopFlange),
            'u' => Some(Face::BottomFlange),
            'h' => Some(Face::Back),
            'l' => Some(Face::LeftLeg),
            'r' => Some(Face::RightLeg),
            _ => None,
        }
    }

    /// Short stable name used in metadata records
    pub fn as_str(&self) -> &'static str {
        match self {
            Face::Web => "Web",
            Face::TopFlange => "TopFlange",
            Face::BottomFlange => "BottomFlange",
            Face::Top => "Top",
            Face::Bottom => "Bottom",
            Face::Left => "Left",
            Face::Right => "Right",
            Face::Front => "Front",
            Face::Back => "Back",
            Face::LeftLeg => "LeftLeg",
            Face::RightLeg => "RightLeg",
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DSTV block codes recognised at the boundary.
///
/// The parser producing the feature stream is external; these identifiers
/// exist so metadata can name the block a feature originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DstvBlock {
    /// AK: exterior contour
    ExteriorContour,
    /// IK: interior contour
    InteriorContour,
    /// BO: bore (holes, slots, tapped holes)
    Bore,
    /// SI: marking (Signierung)
    Marking,
    /// KA: bend (Kantung)
    Bend,
    /// TO: thread
    Thread,
    /// PU: volume
    Volume,
}

impl DstvBlock {
    /// Parse a two-letter block code, case-insensitive
    pub fn from_code(code: &str) -> Option<DstvBlock> {
        match code.to_ascii_uppercase().as_str() {
            "AK" => Some(DstvBlock::ExteriorContour),
            "IK" => Some(DstvBlock::InteriorContour),
            "BO" => Some(DstvBlock::Bore),
            "SI" => Some(DstvBlock::Marking),
            "KA" => Some(DstvBlock::Bend),
            "TO" => Some(DstvBlock::Thread),
            "PU" => Some(DstvBlock::Volume),
            _ => None,
        }
    }
}
