//! Fixed-point geographic validation and proximity.
//!
//! Coordinates are microdegrees (`degrees × 10^6`) stored as `i64`. The
//! proximity test is an equirectangular approximation evaluated entirely in
//! `u128`:
//!
//! ```text
//! (dLat² · C² + (dLon · cos φ)²) · M² <= r² · S² · C²
//!
//!   C = COS_SCALE (10^4)     cos φ from COS_TABLE, φ = mean latitude
//!   M = METERS_PER_DEGREE    S = COORD_SCALE (10^6)
//! ```
//!
//! No division, no square root, no floating point: every re-execution
//! reaches the same verdict bit for bit.
//!
//! Approximation error: the flat-earth projection stays below 0.5% for
//! radii up to `MAX_RADIUS` away from the poles. Rounding the mean latitude
//! to the nearest whole degree adds at most ~1.6% on the longitude axis up
//! to 60.5° and ~2.5% at 70.5°, growing toward the poles where the longitude
//! term vanishes.

use crate::error::MeetProofError;
use serde::{Deserialize, Serialize};

pub const COORD_SCALE: i64 = 1_000_000;
pub const MAX_LAT: i64 = 90 * COORD_SCALE;
pub const MAX_LON: i64 = 180 * COORD_SCALE;

/// Minimum session radius in meters.
pub const MIN_RADIUS: u64 = 10;
/// Maximum session radius in meters.
pub const MAX_RADIUS: u64 = 10_000;

/// Length of one degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: u128 = 111_320;

const COS_SCALE: u128 = 10_000;

/// `cos(k°) × 10^4`, rounded, for `k = 0..=90`.
const COS_TABLE: [u16; 91] = [
    10000, 9998, 9994, 9986, 9976, 9962, 9945, 9925, 9903, 9877, 9848, 9816, 9781, 9744, 9703,
    9659, 9613, 9563, 9511, 9455, 9397, 9336, 9272, 9205, 9135, 9063, 8988, 8910, 8829, 8746, 8660,
    8572, 8480, 8387, 8290, 8192, 8090, 7986, 7880, 7771, 7660, 7547, 7431, 7314, 7193, 7071, 6947,
    6820, 6691, 6561, 6428, 6293, 6157, 6018, 5878, 5736, 5592, 5446, 5299, 5150, 5000, 4848, 4695,
    4540, 4384, 4226, 4067, 3907, 3746, 3584, 3420, 3256, 3090, 2924, 2756, 2588, 2419, 2250, 2079,
    1908, 1736, 1564, 1392, 1219, 1045, 872, 698, 523, 349, 175, 0,
];

/// A point in microdegrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub lat: i64,
    pub lon: i64,
}

impl Location {
    pub const fn new(lat: i64, lon: i64) -> Self {
        Self { lat, lon }
    }

    pub fn validate(&self) -> Result<(), MeetProofError> {
        validate_location(self.lat, self.lon)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

pub fn validate_location(lat: i64, lon: i64) -> Result<(), MeetProofError> {
    if !(-MAX_LAT..=MAX_LAT).contains(&lat) || !(-MAX_LON..=MAX_LON).contains(&lon) {
        return Err(MeetProofError::InvalidLocation { lat, lon });
    }
    Ok(())
}

pub fn validate_radius(radius: u64) -> Result<(), MeetProofError> {
    if !(MIN_RADIUS..=MAX_RADIUS).contains(&radius) {
        return Err(MeetProofError::InvalidRadius { radius });
    }
    Ok(())
}

/// Whether `a` lies within `radius` meters of `b`.
///
/// Inputs need not be validated: separations beyond half the globe are
/// rejected before any multiplication.
pub fn within_radius(a: Location, b: Location, radius: u64) -> bool {
    let d_lat = u128::from(a.lat.abs_diff(b.lat));
    let d_lon = u128::from(a.lon.abs_diff(b.lon));

    let full_turn = 2 * MAX_LON.unsigned_abs() as u128;
    if d_lat > 2 * MAX_LAT.unsigned_abs() as u128 || d_lon > full_turn {
        return false;
    }
    // Shorter way around the antimeridian.
    let d_lon = d_lon.min(full_turn - d_lon);

    let cos = u128::from(COS_TABLE[mean_latitude_degree(a.lat, b.lat)]);
    let lat_term = d_lat * d_lat * COS_SCALE * COS_SCALE;
    let lon_scaled = d_lon * cos;
    let lhs = (lat_term + lon_scaled * lon_scaled) * METERS_PER_DEGREE * METERS_PER_DEGREE;

    let scale = COORD_SCALE.unsigned_abs() as u128 * COS_SCALE;
    let radius = u128::from(radius);
    let rhs = radius
        .saturating_mul(radius)
        .saturating_mul(scale)
        .saturating_mul(scale);

    lhs <= rhs
}

/// Mean latitude rounded to the nearest whole degree, clamped to 90.
fn mean_latitude_degree(lat_a: i64, lat_b: i64) -> usize {
    let mean = (i128::from(lat_a) + i128::from(lat_b)) / 2;
    let scale = COORD_SCALE.unsigned_abs() as u128;
    let degree = (mean.unsigned_abs() + scale / 2) / scale;
    degree.min(90) as usize
}
