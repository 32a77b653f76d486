use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude used by the box approximation
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Kilometers per degree of longitude at the equator
const KM_PER_DEGREE_LON: f64 = 111.320;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two points in kilometers
#[inline]
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Calculate a bounding box around a center point
///
/// Much cheaper than Haversine, so it is only ever used as a pre-filter.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111.32km * cos(latitude).
///
/// The box always contains the full circle of `radius_km`. Where the degree
/// approximation would cut the east/west edge of the circle, the exact
/// spherical half-width is used instead. Boxes touching a pole span every
/// longitude.
pub fn bounding_box(center: &GeoPoint, radius_km: f64) -> BoundingBox {
    let radius_km = radius_km.max(0.0);
    let lat_delta = radius_km / KM_PER_DEGREE_LAT;

    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let cos_lat = center.latitude.to_radians().cos();
    let approx_delta = radius_km / (KM_PER_DEGREE_LON * cos_lat);

    let spread = (radius_km / EARTH_RADIUS_KM).sin() / cos_lat;
    let exact_delta = if spread >= 1.0 {
        180.0
    } else {
        spread.asin().to_degrees()
    };

    let lon_delta = approx_delta.max(exact_delta);
    if lon_delta >= 180.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    BoundingBox {
        min_lat,
        max_lat,
        min_lon: center.longitude - lon_delta,
        max_lon: center.longitude + lon_delta,
    }
}

/// Calculate a bounding box from raw coordinates
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    bounding_box(
        &GeoPoint {
            latitude: lat,
            longitude: lon,
        },
        radius_km,
    )
}

impl BoundingBox {
    /// Longitude ranges inside [-180, 180] covered by this box.
    ///
    /// A box crossing the antimeridian is split in two.
    pub fn longitude_ranges(&self) -> Vec<(f64, f64)> {
        if self.max_lon - self.min_lon >= 360.0 {
            vec![(-180.0, 180.0)]
        } else if self.min_lon < -180.0 {
            vec![(self.min_lon + 360.0, 180.0), (-180.0, self.max_lon)]
        } else if self.max_lon > 180.0 {
            vec![(self.min_lon, 180.0), (-180.0, self.max_lon - 360.0)]
        } else {
            vec![(self.min_lon, self.max_lon)]
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        is_within_bounding_box(point.latitude, point.longitude, self)
    }
}

/// Check if a point is within a bounding box (boundary inclusive)
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && bbox
            .longitude_ranges()
            .iter()
            .any(|(min_lon, max_lon)| lon >= *min_lon && lon <= *max_lon)
}
