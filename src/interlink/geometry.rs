use crate::interlink::types::Geodetic;

/// WGS-84 equatorial radius.
pub const EARTH_RADIUS_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

pub type Vector3 = [f64; 3];

pub fn sub(a: Vector3, b: Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: Vector3, b: Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: Vector3) -> f64 {
    dot(a, a).sqrt()
}

/// Euclidean separation of two inertial positions. This is the true signal
/// path length; a great-circle distance is not a substitute when the two
/// satellites sit at different altitudes.
pub fn distance(a_km: Vector3, b_km: Vector3) -> f64 {
    norm(sub(b_km, a_km))
}

/// Smallest distance from Earth's centre to the segment joining `a_km` and
/// `b_km`, or `None` when both ends coincide.
pub fn closest_approach_km(a_km: Vector3, b_km: Vector3) -> Option<f64> {
    let d = sub(b_km, a_km);
    let dd = dot(d, d);
    if dd == 0.0 {
        return None;
    }

    // Project the origin onto the line, then keep the foot on the segment.
    let t = (-dot(a_km, d) / dd).clamp(0.0, 1.0);
    let closest = [a_km[0] + t * d[0], a_km[1] + t * d[1], a_km[2] + t * d[2]];
    Some(norm(closest))
}

/// True when the straight line between the two satellites passes through a
/// sphere of `earth_radius_km`. Grazing sight lines (closest approach exactly
/// equal to the radius) are clear. A zero-length segment is always occluded.
pub fn is_occluded(a_km: Vector3, b_km: Vector3, earth_radius_km: f64) -> bool {
    match closest_approach_km(a_km, b_km) {
        Some(r) => r < earth_radius_km,
        None => true,
    }
}

pub fn teme_to_ecef_position(pos_teme: Vector3, gmst: f64) -> Vector3 {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_geodetic(ecef_km: Vector3) -> Geodetic {
    let a = EARTH_RADIUS_KM;
    let [x, y, z] = ecef_km;
    let p = (x * x + y * y).sqrt();
    let longitude = y.atan2(x);

    let mut latitude = z.atan2(p * (1.0 - WGS84_E2));
    let mut altitude = 0.0;
    for _ in 0..6 {
        let sin_lat = latitude.sin();
        let n = a / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        altitude = p * latitude.cos() + (z + WGS84_E2 * n * sin_lat) * sin_lat - n;
        latitude = (z + WGS84_E2 * n * sin_lat).atan2(p);
    }

    Geodetic {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km: altitude,
    }
}
