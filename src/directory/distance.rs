//! Great-circle distance between airports.

use crate::models::AirportRecord;

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.0;

/// Returns the great-circle distance between two airports in nautical miles.
///
/// Uses the spherical law of cosines. The cosine is clamped to [-1, 1] so
/// identical coordinates yield zero rather than NaN.
///
/// # Example
///
/// ```
/// use pilot_pay::directory::great_circle_nm;
/// use pilot_pay::models::AirportRecord;
///
/// let airport = |code: &str, latitude: f64, longitude: f64| AirportRecord {
///     code: code.to_string(),
///     name: String::new(),
///     country: String::new(),
///     region: String::new(),
///     timezone: String::new(),
///     latitude,
///     longitude,
/// };
///
/// let mxp = airport("MXP", 45.6306, 8.7281);
/// let fco = airport("FCO", 41.8003, 12.2389);
/// let nm = great_circle_nm(&mxp, &fco);
/// assert!((nm - 276.0).abs() < 2.0);
/// ```
pub fn great_circle_nm(from: &AirportRecord, to: &AirportRecord) -> f64 {
    let (lat_d, lon_d) = (from.latitude.to_radians(), from.longitude.to_radians());
    let (lat_a, lon_a) = (to.latitude.to_radians(), to.longitude.to_radians());

    let cosine = lat_d.sin() * lat_a.sin() + lat_d.cos() * lat_a.cos() * (lon_a - lon_d).cos();

    (EARTH_RADIUS_NM * cosine.clamp(-1.0, 1.0).acos()).max(0.0)
}
