use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiderState {
    Looking,
    Dispatching,
    WaitingForPickup,
    OnTrip,
    PendingRating,
}

impl RiderState {
    /// States in which the rider is bound to an active trip.
    pub fn requires_trip(self) -> bool {
        match self {
            RiderState::Looking => false,
            RiderState::Dispatching
            | RiderState::WaitingForPickup
            | RiderState::OnTrip
            | RiderState::PendingRating => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub id: Uuid,
    pub state: RiderState,
    pub location: GeoPoint,
    pub located_at: DateTime<Utc>,
    pub trip_id: Option<Uuid>,
    pub connected: bool,
    pub has_confirmed_mobile: bool,
    pub payment_profile: Option<String>,
    pub token: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Rider {
    pub fn new(id: Uuid, location: GeoPoint) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: RiderState::Looking,
            location,
            located_at: now,
            trip_id: None,
            connected: false,
            has_confirmed_mobile: false,
            payment_profile: None,
            token: None,
            updated_at: now,
        }
    }

    pub fn record_location(&mut self, point: GeoPoint) {
        self.location = point;
        self.located_at = Utc::now();
    }

    /// Landing on `Looking` clears the trip reference in the same step.
    pub fn transition(&mut self, next: RiderState) {
        self.state = next;
        if next == RiderState::Looking {
            self.trip_id = None;
        }
        self.updated_at = Utc::now();
    }

    pub fn assign_trip(&mut self, trip_id: Uuid) {
        self.trip_id = Some(trip_id);
        self.transition(RiderState::Dispatching);
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{Rider, RiderState};
    use crate::models::driver::GeoPoint;

    fn rider() -> Rider {
        Rider::new(Uuid::new_v4(), GeoPoint { lat: 53.55, lng: 9.99 })
    }

    #[test]
    fn new_rider_starts_looking_without_trip() {
        let rider = rider();
        assert_eq!(rider.state, RiderState::Looking);
        assert!(rider.trip_id.is_none());
    }

    #[test]
    fn transition_to_looking_clears_trip() {
        let mut rider = rider();
        rider.assign_trip(Uuid::new_v4());
        assert_eq!(rider.state, RiderState::Dispatching);
        assert!(rider.trip_id.is_some());

        rider.transition(RiderState::Looking);
        assert!(rider.trip_id.is_none());
    }

    #[test]
    fn trip_requirement_matches_state() {
        assert!(!RiderState::Looking.requires_trip());
        assert!(RiderState::Dispatching.requires_trip());
        assert!(RiderState::WaitingForPickup.requires_trip());
        assert!(RiderState::OnTrip.requires_trip());
        assert!(RiderState::PendingRating.requires_trip());
    }
}
