// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ISO metric coarse thread table.
//!
//! Tapped holes are approximated from the nominal diameter and pitch; the
//! geometry side reduces the bore to the core diameter and rings the wall at
//! the pitch spacing. Exact helices are out of scope.

/// ISO 261 coarse pitches, (nominal diameter, pitch), both mm
const METRIC_COARSE: &[(f64, f64)] = &[
    (3.0, 0.5),
    (4.0, 0.7),
    (5.0, 0.8),
    (6.0, 1.0),
    (8.0, 1.25),
    (10.0, 1.5),
    (12.0, 1.75),
    (14.0, 2.0),
    (16.0, 2.0),
    (18.0, 2.5),
    (20.0, 2.5),
    (22.0, 2.5),
    (24.0, 3.0),
    (27.0, 3.0),
    (30.0, 3.5),
    (33.0, 3.5),
    (36.0, 4.0),
    (39.0, 4.0),
    (42.0, 4.5),
    (48.0, 5.0),
    (56.0, 5.5),
    (64.0, 6.0),
];

/// Coarse pitch for a nominal diameter, nearest-nominal lookup.
///
/// Diameters below M3 clamp to the M3 pitch, above M64 to the M64 pitch.
pub fn pitch_for_diameter(diameter: f64) -> f64 {
    let mut best = METRIC_COARSE[0];
    let mut best_delta = (diameter - best.0).abs();

    for &entry in METRIC_COARSE.iter().skip(1) {
        let delta = (diameter - entry.0).abs();
        if delta < best_delta {
            best = entry;
            best_delta = delta;
        }
    }

    best.1
}

/// Thread core (minor) diameter for a nominal diameter and pitch
#[inline]
pub fn core_diameter(diameter: f64, pitch: f64) -> f64 {
    diameter - 1.0825 * pitch
}

/// Thread pitch (effective) diameter for a nominal diameter and pitch
#[inline]
pub fn pitch_diameter(diameter: f64, pitch: f64) -> f64 {
    diameter - 0.6495 * pitch
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_pitches() {
        assert_relative_eq!(pitch_for_diameter(6.0), 1.0);
        assert_relative_eq!(pitch_for_diameter(12.0), 1.75);
        assert_relative_eq!(pitch_for_diameter(20.0), 2.5);
    }

    #[test]
    fn test_nearest_nominal() {
        // M11 does not exist in the coarse table; M10 and M12 straddle it
        let pitch = pitch_for_diameter(11.0);
        assert!(pitch == 1.5 || pitch == 1.75);
        // Off-catalog diameters clamp to the table ends
        assert_relative_eq!(pitch_for_diameter(1.0), 0.5);
        assert_relative_eq!(pitch_for_diameter(100.0), 6.0);
    }

    #[test]
    fn test_derived_diameters() {
        // M12 x 1.75: core ≈ 10.106, pitch diameter ≈ 10.863
        assert_relative_eq!(core_diameter(12.0, 1.75), 10.105625, epsilon = 1e-6);
        assert_relative_eq!(pitch_diameter(12.0, 1.75), 10.863375, epsilon = 1e-6);
        assert!(core_diameter(12.0, 1.75) < pitch_diameter(12.0, 1.75));
    }
}
