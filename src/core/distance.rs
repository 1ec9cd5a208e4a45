use crate::models::BoundingBox;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (haversine)
///
/// Total over all finite inputs: symmetric, zero for identical points,
/// never negative, finite even for antipodal pairs. Coordinate range
/// validation is the caller's responsibility.
#[inline]
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Bounding box around a center point covering at least `radius_km`
///
/// Much cheaper than haversine, so the engine uses it as a conservative
/// pre-filter when a tier has a finite outer radius. The box always
/// contains the radius circle.
/// 1 degree latitude is ~111 km, 1 degree longitude is ~111 km * cos(lat).
pub fn calculate_bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;
    let lng_delta = radius_km / (111.0 * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lng: lng - lng_delta,
        max_lng: lng + lng_delta,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lng: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lng >= bbox.min_lng && lng <= bbox.max_lng
}
