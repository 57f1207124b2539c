use tracing::{debug, info};
use uuid::Uuid;

use crate::directory::DriverCandidate;
use crate::error::DispatchError;
use crate::models::driver::GeoPoint;
use crate::models::rider::Rider;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched { trip_id: Uuid, driver_id: Uuid },
    /// Every candidate was gone by claim time, a different signal than an
    /// empty directory query.
    NoneAvailable,
}

/// Bind the first candidate that is still available to a new trip.
///
/// The trip record is created before the scan and stays behind unbound if
/// every claim misses. Availability is re-checked at claim time: another
/// rider's pickup may have taken a candidate between the directory query
/// and this walk. No lock spans riders; a loser falls through to
/// `NoneAvailable` and the rider retries.
pub async fn claim_first_available(
    state: &AppState,
    rider: &mut Rider,
    pickup: GeoPoint,
    candidates: &[DriverCandidate],
) -> Result<DispatchOutcome, DispatchError> {
    let trip_id = state.trips.create();

    for candidate in candidates {
        if !state.directory.try_claim(candidate.driver_id) {
            debug!(driver_id = %candidate.driver_id, "candidate claimed elsewhere, skipping");
            continue;
        }

        if let Err(err) = state
            .trips
            .pickup(trip_id, rider.id, pickup, candidate.driver_id)
        {
            state.directory.release(candidate.driver_id);
            return Err(err);
        }

        let mut staged = rider.clone();
        staged.assign_trip(trip_id);
        if let Err(err) = state.repo.save(&staged).await {
            // The transition must not survive a failed save; hand the
            // driver back and discard the binding before propagating.
            state.directory.release(candidate.driver_id);
            state.trips.abort(trip_id);
            return Err(err);
        }
        *rider = staged;

        info!(
            rider_id = %rider.id,
            trip_id = %trip_id,
            driver_id = %candidate.driver_id,
            distance_km = candidate.distance_km,
            "driver claimed"
        );
        return Ok(DispatchOutcome::Dispatched {
            trip_id,
            driver_id: candidate.driver_id,
        });
    }

    Ok(DispatchOutcome::NoneAvailable)
}
