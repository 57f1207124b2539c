use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripStatus {
    Created,
    PickupRequested,
    CanceledByRider,
    Aborted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub rider_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub pickup: Option<GeoPoint>,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            rider_id: None,
            driver_id: None,
            pickup: None,
            status: TripStatus::Created,
            created_at: Utc::now(),
        }
    }
}
