pub mod sessions;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::rider::RiderState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub vehicle_id: Uuid,
    pub lng: f64,
    pub lat: f64,
    pub recorded_at: DateTime<Utc>,
    pub heading: f64,
    // TODO: compute a real ETA from the driver's position once routing lands.
    pub eta_minutes: u32,
}

impl VehicleSnapshot {
    pub fn of(driver: &Driver) -> Self {
        Self {
            vehicle_id: driver.vehicle.id,
            lng: driver.location.point.lng,
            lat: driver.location.point.lat,
            recorded_at: driver.location.recorded_at,
            heading: driver.location.heading,
            eta_minutes: 0,
        }
    }
}

/// The state-shaped OK payload. Which optional fields are filled depends on
/// the rider's current state, never on the triggering request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderOk {
    pub state: RiderState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<Uuid>,
    pub trip_pending_rating: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorry_msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles: Option<Vec<VehicleSnapshot>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RiderMessage {
    Ok(RiderOk),
    PickupCanceled { reason: String },
    TripCanceled { message: String },
    DriverArriving { trip_id: Uuid },
}

impl RiderMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            RiderMessage::Ok(_) => "ok",
            RiderMessage::PickupCanceled { .. } => "pickup_canceled",
            RiderMessage::TripCanceled { .. } => "trip_canceled",
            RiderMessage::DriverArriving { .. } => "driver_arriving",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RiderMessage, RiderOk};
    use crate::models::rider::RiderState;

    #[test]
    fn bare_ok_omits_empty_fields() {
        let message = RiderMessage::Ok(RiderOk {
            state: RiderState::Looking,
            token: None,
            trip_id: None,
            trip_pending_rating: false,
            sorry_msg: None,
            vehicles: None,
        });

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "Ok");
        assert_eq!(json["state"], "Looking");
        assert!(json.get("token").is_none());
        assert!(json.get("vehicles").is_none());
    }

    #[test]
    fn pickup_canceled_carries_reason() {
        let message = RiderMessage::PickupCanceled {
            reason: "driver unreachable".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "PickupCanceled");
        assert_eq!(json["reason"], "driver unreachable");
    }
}
