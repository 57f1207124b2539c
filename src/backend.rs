use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::models::rider::Rider;
use crate::models::trip::Trip;

/// Telemetry flavor of a failed pickup attempt. `second_check` distinguishes
/// "no drivers in the area" from "drivers existed but were all claimed
/// concurrently".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupFailure {
    RestrictedLocation,
    NoCarsAvailable { second_check: bool },
}

/// Fire-and-forget side calls out of the dispatch core: confirmation flows,
/// operator telemetry, SMS notices and the billing call.
#[async_trait]
pub trait Backend: Send + Sync {
    fn request_mobile_confirmation(&self, rider_id: Uuid);

    fn report_pickup_failure(&self, rider_id: Uuid, failure: PickupFailure);

    fn sms_trip_status(&self, rider: &Rider, trip: &Trip);

    async fn rate_driver(
        &self,
        trip_id: Uuid,
        rating: u8,
        feedback: Option<String>,
    ) -> Result<(), DispatchError>;
}

/// Default backend: structured logs only. Real deployments wire their own.
pub struct LogBackend;

#[async_trait]
impl Backend for LogBackend {
    fn request_mobile_confirmation(&self, rider_id: Uuid) {
        info!(rider_id = %rider_id, "mobile confirmation requested");
    }

    fn report_pickup_failure(&self, rider_id: Uuid, failure: PickupFailure) {
        info!(rider_id = %rider_id, failure = ?failure, "pickup failed");
    }

    fn sms_trip_status(&self, rider: &Rider, trip: &Trip) {
        debug!(rider_id = %rider.id, trip_id = %trip.id, "trip status sms");
    }

    async fn rate_driver(
        &self,
        trip_id: Uuid,
        rating: u8,
        _feedback: Option<String>,
    ) -> Result<(), DispatchError> {
        info!(trip_id = %trip_id, rating, "driver rated");
        Ok(())
    }
}
