use crate::models::driver::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Served-area boundary. A polygon with fewer than three vertices disables
/// the fence and every location is allowed.
#[derive(Debug, Clone, Default)]
pub struct Geofence {
    polygon: Vec<GeoPoint>,
}

impl Geofence {
    pub fn new(polygon: Vec<GeoPoint>) -> Self {
        Self { polygon }
    }

    pub fn is_location_allowed(&self, point: &GeoPoint) -> bool {
        if self.polygon.len() < 3 {
            return true;
        }

        // Even-odd ray cast against the polygon edges.
        let mut inside = false;
        let mut j = self.polygon.len() - 1;
        for i in 0..self.polygon.len() {
            let a = self.polygon[i];
            let b = self.polygon[j];

            if (a.lat > point.lat) != (b.lat > point.lat) {
                let crossing_lng = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
                if point.lng < crossing_lng {
                    inside = !inside;
                }
            }
            j = i;
        }

        inside
    }
}

#[cfg(test)]
mod tests {
    use super::{Geofence, haversine_km};
    use crate::models::driver::GeoPoint;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 53.5511,
            lng: 9.9937,
        };
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = GeoPoint {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = haversine_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    fn square_fence() -> Geofence {
        Geofence::new(vec![
            GeoPoint { lat: 53.0, lng: 9.0 },
            GeoPoint { lat: 54.0, lng: 9.0 },
            GeoPoint { lat: 54.0, lng: 10.0 },
            GeoPoint { lat: 53.0, lng: 10.0 },
        ])
    }

    #[test]
    fn point_inside_polygon_is_allowed() {
        let fence = square_fence();
        assert!(fence.is_location_allowed(&GeoPoint { lat: 53.5, lng: 9.5 }));
    }

    #[test]
    fn point_outside_polygon_is_rejected() {
        let fence = square_fence();
        assert!(!fence.is_location_allowed(&GeoPoint { lat: 55.0, lng: 9.5 }));
        assert!(!fence.is_location_allowed(&GeoPoint { lat: 53.5, lng: 11.0 }));
    }

    #[test]
    fn empty_fence_allows_everything() {
        let fence = Geofence::default();
        assert!(fence.is_location_allowed(&GeoPoint { lat: 0.0, lng: 0.0 }));
    }
}
