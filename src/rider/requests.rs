use std::time::Instant;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::backend::PickupFailure;
use crate::engine::dispatch::{self, DispatchOutcome};
use crate::error::DispatchError;
use crate::messaging::RiderMessage;
use crate::models::driver::GeoPoint;
use crate::models::rider::RiderState;
use crate::rider::{commit, responses};
use crate::state::AppState;

const RESTRICTED_AREA_MSG: &str = "Unfortunately we do not serve your area yet. \
We are expanding all the time, stay tuned for updates!";

const SECOND_CHECK_SORRY_MSG: &str = "Thanks a lot for your interest! All cars are \
currently full, please check again shortly!";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub rider_id: Uuid,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PingRequest {
    pub rider_id: Uuid,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickupRequest {
    pub rider_id: Uuid,
    pub location: GeoPoint,
    pub pickup_location: GeoPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    pub rider_id: Uuid,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingRequest {
    pub rider_id: Uuid,
    pub location: GeoPoint,
    pub rating: u8,
    pub feedback: Option<String>,
}

/// First contact creates the rider in `Looking`; returning riders come back
/// from the repository. The response always carries the auth token.
pub async fn login(state: &AppState, req: LoginRequest) -> Result<RiderMessage, DispatchError> {
    let handle = state.rider_or_load(req.rider_id, req.location).await?;
    let mut rider = handle.lock().await;
    rider.record_location(req.location);
    if rider.token.is_none() {
        rider.token = Some(Uuid::new_v4().to_string());
    }
    state.repo.save(&rider).await?;

    info!(rider_id = %rider.id, state = ?rider.state, "rider login");
    Ok(responses::compose_ok(state, &rider, true))
}

pub async fn ping(state: &AppState, req: PingRequest) -> Result<RiderMessage, DispatchError> {
    let handle = state.rider(req.rider_id)?;
    let mut rider = handle.lock().await;
    rider.record_location(req.location);

    Ok(responses::compose_ok(state, &rider, false))
}

pub async fn pickup(state: &AppState, req: PickupRequest) -> Result<RiderMessage, DispatchError> {
    let started = Instant::now();
    let handle = state.rider(req.rider_id)?;
    let mut rider = handle.lock().await;
    rider.record_location(req.location);

    if rider.state != RiderState::Looking {
        state.metrics.observe_pickup("not_looking", started.elapsed().as_secs_f64());
        return Ok(responses::bare_ok(&rider, false));
    }

    if !rider.has_confirmed_mobile {
        state.backend.request_mobile_confirmation(rider.id);
        state
            .metrics
            .observe_pickup("mobile_unconfirmed", started.elapsed().as_secs_f64());
        return Ok(responses::bare_ok(&rider, false));
    }

    if !state.geofence.is_location_allowed(&req.pickup_location) {
        state
            .backend
            .report_pickup_failure(rider.id, PickupFailure::RestrictedLocation);
        state
            .metrics
            .observe_pickup("restricted_location", started.elapsed().as_secs_f64());
        info!(rider_id = %rider.id, "pickup from restricted location");
        return Ok(responses::sorry_ok(&rider, RESTRICTED_AREA_MSG.to_string()));
    }

    let candidates = state.directory.nearest_available(&req.pickup_location);
    if candidates.is_empty() {
        state.backend.report_pickup_failure(
            rider.id,
            PickupFailure::NoCarsAvailable {
                second_check: false,
            },
        );
        state
            .metrics
            .observe_pickup("no_cars", started.elapsed().as_secs_f64());
        info!(rider_id = %rider.id, "no cars available");
        return Ok(responses::sorry_ok(
            &rider,
            state.config.schedule.sorry_message(Utc::now()),
        ));
    }

    match dispatch::claim_first_available(state, &mut rider, req.pickup_location, &candidates)
        .await?
    {
        DispatchOutcome::Dispatched { .. } => {
            state
                .metrics
                .observe_pickup("dispatched", started.elapsed().as_secs_f64());
            Ok(responses::bare_ok(&rider, false))
        }
        DispatchOutcome::NoneAvailable => {
            state.backend.report_pickup_failure(
                rider.id,
                PickupFailure::NoCarsAvailable { second_check: true },
            );
            state
                .metrics
                .observe_pickup("no_cars_second_check", started.elapsed().as_secs_f64());
            info!(rider_id = %rider.id, "no cars left at claim time");
            Ok(responses::sorry_ok(&rider, SECOND_CHECK_SORRY_MSG.to_string()))
        }
    }
}

pub async fn cancel_pickup(
    state: &AppState,
    req: CancelRequest,
) -> Result<RiderMessage, DispatchError> {
    let handle = state.rider(req.rider_id)?;
    let mut rider = handle.lock().await;
    rider.record_location(req.location);

    if matches!(
        rider.state,
        RiderState::Dispatching | RiderState::WaitingForPickup
    ) {
        if let Some(trip_id) = rider.trip_id {
            if let Some(driver_id) = state.trips.get(trip_id).and_then(|trip| trip.driver_id) {
                state.directory.release(driver_id);
            }
            state.trips.pickup_canceled_by_rider(trip_id)?;
        }

        let mut staged = rider.clone();
        staged.transition(RiderState::Looking);
        commit(state, &mut rider, staged).await?;
        info!(rider_id = %rider.id, "pickup canceled by rider");
    }

    Ok(responses::compose_ok(state, &rider, false))
}

/// Alternate cancellation entry while waiting for pickup. Replies a bare OK
/// without a refreshed vehicle list, a known deferred gap.
pub async fn cancel_trip(
    state: &AppState,
    req: CancelRequest,
) -> Result<RiderMessage, DispatchError> {
    let handle = state.rider(req.rider_id)?;
    let mut rider = handle.lock().await;
    rider.record_location(req.location);

    if rider.state == RiderState::WaitingForPickup {
        let mut staged = rider.clone();
        staged.transition(RiderState::Looking);
        commit(state, &mut rider, staged).await?;
        info!(rider_id = %rider.id, "trip canceled by rider");
    }

    Ok(responses::bare_ok(&rider, false))
}

pub async fn rate_driver(
    state: &AppState,
    req: RatingRequest,
) -> Result<RiderMessage, DispatchError> {
    let handle = state.rider(req.rider_id)?;
    let mut rider = handle.lock().await;
    rider.record_location(req.location);

    if rider.state == RiderState::PendingRating {
        if let Some(trip_id) = rider.trip_id {
            state
                .backend
                .rate_driver(trip_id, req.rating, req.feedback.clone())
                .await?;

            let mut staged = rider.clone();
            staged.transition(RiderState::Looking);
            commit(state, &mut rider, staged).await?;
            info!(rider_id = %rider.id, trip_id = %trip_id, rating = req.rating, "driver rated");
        }
    }

    Ok(responses::compose_ok(state, &rider, false))
}
