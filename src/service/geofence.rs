use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// "lat,lon" text form stored in the ledger's location column.
    pub fn as_location(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Circular zone around a reference point.
#[derive(Debug, Clone, Copy)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_km: f64,
}

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whether `point` lies inside the zone. A missing point fails closed:
/// no location data is a normal condition, not an error.
pub fn within_zone(point: Option<GeoPoint>, center: GeoPoint, radius_km: f64) -> bool {
    match point {
        Some(p) => haversine_km(p, center) <= radius_km,
        None => false,
    }
}

impl Geofence {
    pub fn contains(&self, point: Option<GeoPoint>) -> bool {
        within_zone(point, self.center, self.radius_km)
    }
}
