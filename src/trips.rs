use dashmap::DashMap;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::models::driver::GeoPoint;
use crate::models::trip::{Trip, TripStatus};

pub struct TripStore {
    trips: DashMap<Uuid, Trip>,
}

impl TripStore {
    pub fn new() -> Self {
        Self {
            trips: DashMap::new(),
        }
    }

    /// New trip record, not yet bound to a driver.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.trips.insert(id, Trip::new(id));
        id
    }

    /// Bind rider, pickup location and the claimed driver to the trip.
    pub fn pickup(
        &self,
        trip_id: Uuid,
        rider_id: Uuid,
        pickup: GeoPoint,
        driver_id: Uuid,
    ) -> Result<(), DispatchError> {
        let mut trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or(DispatchError::TripNotFound(trip_id))?;
        trip.rider_id = Some(rider_id);
        trip.driver_id = Some(driver_id);
        trip.pickup = Some(pickup);
        trip.status = TripStatus::PickupRequested;
        Ok(())
    }

    pub fn pickup_canceled_by_rider(&self, trip_id: Uuid) -> Result<(), DispatchError> {
        let mut trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or(DispatchError::TripNotFound(trip_id))?;
        trip.status = TripStatus::CanceledByRider;
        Ok(())
    }

    /// Dispatch-side rollback, used when a claim cannot be committed.
    pub fn abort(&self, trip_id: Uuid) {
        if let Some(mut trip) = self.trips.get_mut(&trip_id) {
            trip.status = TripStatus::Aborted;
        }
    }

    pub fn get(&self, trip_id: Uuid) -> Option<Trip> {
        self.trips.get(&trip_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl Default for TripStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::TripStore;
    use crate::models::driver::GeoPoint;
    use crate::models::trip::TripStatus;

    #[test]
    fn create_then_pickup_binds_all_parties() {
        let store = TripStore::new();
        let trip_id = store.create();
        assert_eq!(store.get(trip_id).unwrap().status, TripStatus::Created);

        let rider_id = Uuid::new_v4();
        let driver_id = Uuid::new_v4();
        let pickup = GeoPoint { lat: 53.55, lng: 9.99 };
        store.pickup(trip_id, rider_id, pickup, driver_id).unwrap();

        let trip = store.get(trip_id).unwrap();
        assert_eq!(trip.rider_id, Some(rider_id));
        assert_eq!(trip.driver_id, Some(driver_id));
        assert_eq!(trip.status, TripStatus::PickupRequested);
    }

    #[test]
    fn pickup_on_unknown_trip_fails() {
        let store = TripStore::new();
        let result = store.pickup(
            Uuid::new_v4(),
            Uuid::new_v4(),
            GeoPoint { lat: 0.0, lng: 0.0 },
            Uuid::new_v4(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rider_cancel_marks_trip() {
        let store = TripStore::new();
        let trip_id = store.create();
        store.pickup_canceled_by_rider(trip_id).unwrap();
        assert_eq!(
            store.get(trip_id).unwrap().status,
            TripStatus::CanceledByRider
        );
    }
}
