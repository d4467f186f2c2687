//! Spherical-earth helpers for zone geometry and headings.

use crate::value::LatLon;

/// Mean earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_366_707.0195;

fn to_ecef(p: LatLon) -> [f64; 3] {
    let (lat, lon) = (p.lat.to_radians(), p.lon.to_radians());
    [
        EARTH_RADIUS * lat.cos() * lon.cos(),
        EARTH_RADIUS * lat.cos() * lon.sin(),
        EARTH_RADIUS * lat.sin(),
    ]
}

/// North/east offset in meters of `point` from `anchor`, both at zero altitude.
pub fn ned_offset(anchor: LatLon, point: LatLon) -> (f64, f64) {
    let a = to_ecef(anchor);
    let b = to_ecef(point);
    let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let (lat, lon) = (anchor.lat.to_radians(), anchor.lon.to_radians());
    let north = -lat.sin() * lon.cos() * d[0] - lat.sin() * lon.sin() * d[1] + lat.cos() * d[2];
    let east = -lon.sin() * d[0] + lon.cos() * d[1];
    (north, east)
}

/// Initial great-circle bearing from `from` to `to`, radians in `[0, 2π)`.
pub fn bearing(from: LatLon, to: LatLon) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let dlon = (to.lon - from.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x).rem_euclid(std::f64::consts::TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = LatLon::new(0.0, 0.0);
        assert!(bearing(origin, LatLon::new(1.0, 0.0)).abs() < 1e-9);
        let east = bearing(origin, LatLon::new(0.0, 1.0));
        assert!((east - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_ned_offset_small_displacement() {
        let anchor = LatLon::new(10.0, 20.0);
        let (n, e) = ned_offset(anchor, LatLon::new(10.01, 20.0));
        let expected = EARTH_RADIUS * 0.01_f64.to_radians();
        assert!((n - expected).abs() < 1.0);
        assert!(e.abs() < 1e-6);
    }
}
