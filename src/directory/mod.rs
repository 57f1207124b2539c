use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::geo::haversine_km;
use crate::models::driver::{Driver, DriverStatus, GeoPoint, LocationFix};

/// A directory query hit: a driver believed available at query time, ordered
/// by distance from the pickup point. Availability must be re-checked with
/// `try_claim` before binding, it can change between query and claim.
#[derive(Debug, Clone)]
pub struct DriverCandidate {
    pub driver_id: Uuid,
    pub distance_km: f64,
}

pub struct DriverDirectory {
    drivers: DashMap<Uuid, Driver>,
}

impl DriverDirectory {
    pub fn new() -> Self {
        Self {
            drivers: DashMap::new(),
        }
    }

    pub fn upsert(&self, driver: Driver) {
        self.drivers.insert(driver.id, driver);
    }

    pub fn get(&self, id: Uuid) -> Option<Driver> {
        self.drivers.get(&id).map(|entry| entry.value().clone())
    }

    pub fn record_location(&self, id: Uuid, fix: LocationFix) -> Result<(), DispatchError> {
        let mut driver = self
            .drivers
            .get_mut(&id)
            .ok_or(DispatchError::DriverNotFound(id))?;
        driver.location = fix;
        driver.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_status(&self, id: Uuid, status: DriverStatus) -> Result<(), DispatchError> {
        let mut driver = self
            .drivers
            .get_mut(&id)
            .ok_or(DispatchError::DriverNotFound(id))?;
        driver.status = status;
        driver.updated_at = Utc::now();
        Ok(())
    }

    /// Snapshot of available drivers sorted by distance from `point`.
    pub fn nearest_available(&self, point: &GeoPoint) -> Vec<DriverCandidate> {
        let mut candidates: Vec<DriverCandidate> = self
            .drivers
            .iter()
            .filter(|entry| entry.value().is_available())
            .map(|entry| DriverCandidate {
                driver_id: *entry.key(),
                distance_km: haversine_km(point, &entry.value().location.point),
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        candidates
    }

    pub fn all_available_near(&self, point: &GeoPoint, radius_km: f64) -> Vec<Driver> {
        self.drivers
            .iter()
            .filter(|entry| {
                let driver = entry.value();
                driver.is_available()
                    && haversine_km(point, &driver.location.point) <= radius_km
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Re-check availability and reserve the driver in one step, under the
    /// map entry's lock. Concurrent pickup requests racing for the same
    /// driver see exactly one `true` here.
    pub fn try_claim(&self, id: Uuid) -> bool {
        match self.drivers.get_mut(&id) {
            Some(mut driver) if driver.is_available() => {
                driver.status = DriverStatus::Dispatched;
                driver.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Undo a claim, e.g. when the rider cancels the pickup.
    pub fn release(&self, id: Uuid) {
        if let Some(mut driver) = self.drivers.get_mut(&id) {
            if driver.status == DriverStatus::Dispatched {
                driver.status = DriverStatus::Available;
                driver.updated_at = Utc::now();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl Default for DriverDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::DriverDirectory;
    use crate::models::driver::{Driver, DriverStatus, GeoPoint, LocationFix, Vehicle};

    fn driver(id_seed: u128, lat: f64, lng: f64) -> Driver {
        Driver {
            id: Uuid::from_u128(id_seed),
            name: "test-driver".to_string(),
            vehicle: Vehicle {
                id: Uuid::from_u128(id_seed + 1000),
                plate: "H-RD 1001".to_string(),
            },
            location: LocationFix {
                point: GeoPoint { lat, lng },
                heading: 0.0,
                recorded_at: Utc::now(),
            },
            status: DriverStatus::Available,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn nearest_available_orders_by_distance() {
        let directory = DriverDirectory::new();
        directory.upsert(driver(1, 53.7, 10.2));
        directory.upsert(driver(2, 53.5512, 9.9938));

        let pickup = GeoPoint {
            lat: 53.5511,
            lng: 9.9937,
        };
        let candidates = directory.nearest_available(&pickup);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].driver_id, Uuid::from_u128(2));
        assert!(candidates[0].distance_km < candidates[1].distance_km);
    }

    #[test]
    fn unavailable_drivers_are_excluded() {
        let directory = DriverDirectory::new();
        let mut busy = driver(1, 53.55, 9.99);
        busy.status = DriverStatus::Busy;
        directory.upsert(busy);

        let pickup = GeoPoint { lat: 53.55, lng: 9.99 };
        assert!(directory.nearest_available(&pickup).is_empty());
    }

    #[test]
    fn claim_wins_once() {
        let directory = DriverDirectory::new();
        directory.upsert(driver(1, 53.55, 9.99));
        let id = Uuid::from_u128(1);

        assert!(directory.try_claim(id));
        assert!(!directory.try_claim(id));

        directory.release(id);
        assert!(directory.try_claim(id));
    }

    #[test]
    fn release_leaves_busy_drivers_alone() {
        let directory = DriverDirectory::new();
        let mut busy = driver(1, 53.55, 9.99);
        busy.status = DriverStatus::Busy;
        directory.upsert(busy);
        let id = Uuid::from_u128(1);

        directory.release(id);
        assert_eq!(directory.get(id).unwrap().status, DriverStatus::Busy);
    }

    #[test]
    fn all_available_near_respects_radius() {
        let directory = DriverDirectory::new();
        directory.upsert(driver(1, 53.5512, 9.9938));
        directory.upsert(driver(2, 54.5, 11.0));

        let here = GeoPoint {
            lat: 53.5511,
            lng: 9.9937,
        };
        let nearby = directory.all_available_near(&here, 5.0);

        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].id, Uuid::from_u128(1));
    }
}
