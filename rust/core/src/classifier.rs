// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile code classification.
//!
//! Maps catalog codes like `"IPE300"` or `"RHS200x100x5"` to a
//! [`ProfileKind`], falling back to a material tag when the code prefix is
//! not recognised.

use crate::profile::ProfileKind;

/// Code prefixes checked in order; longer prefixes listed first so that
/// `CHS` wins over `C` and `UBP` over `UB`.
const CODE_PREFIXES: &[(&str, ProfileKind)] = &[
    ("UBP", ProfileKind::IProfile),
    ("CHS", ProfileKind::RoundTube),
    ("ROR", ProfileKind::RoundTube),
    ("SHS", ProfileKind::SquareTube),
    ("RHS", ProfileKind::RectTube),
    ("IPE", ProfileKind::IProfile),
    ("IPN", ProfileKind::IProfile),
    ("HEA", ProfileKind::IProfile),
    ("HEB", ProfileKind::IProfile),
    ("HEM", ProfileKind::IProfile),
    ("UPN", ProfileKind::UProfile),
    ("UAP", ProfileKind::UProfile),
    ("UPE", ProfileKind::UProfile),
    ("UB", ProfileKind::IProfile),
    ("UC", ProfileKind::IProfile),
    ("HD", ProfileKind::IProfile),
    ("HP", ProfileKind::IProfile),
    ("W", ProfileKind::IProfile),
    ("C", ProfileKind::UProfile),
    ("L", ProfileKind::LProfile),
];

/// Classify a profile code, with an optional material tag fallback.
///
/// The prefix match is case-insensitive. When no prefix matches, the
/// material tag decides: `Tube` means RectTube, `Plate`/`Sheet` mean Plate,
/// a round bar tag (`Bar` with `RO`) means RoundBar, plain `Bar` FlatBar,
/// `Beam` IProfile. Anything else is [`ProfileKind::Unknown`].
pub fn classify_profile_code(code: &str, material_tag: Option<&str>) -> ProfileKind {
    let upper = code.trim().to_ascii_uppercase();

    for (prefix, kind) in CODE_PREFIXES {
        if upper.starts_with(prefix) {
            return *kind;
        }
    }

    if let Some(tag) = material_tag {
        let tag_upper = tag.trim().to_ascii_uppercase();
        if tag_upper.contains("TUBE") {
            return ProfileKind::RectTube;
        }
        if tag_upper.contains("PLATE") || tag_upper.contains("SHEET") {
            return ProfileKind::Plate;
        }
        if tag_upper.contains("BAR") {
            if tag_upper.contains("RO") || upper.starts_with("RO") {
                return ProfileKind::RoundBar;
            }
            return ProfileKind::FlatBar;
        }
        if tag_upper.contains("BEAM") {
            return ProfileKind::IProfile;
        }
    }

    ProfileKind::Unknown
}
