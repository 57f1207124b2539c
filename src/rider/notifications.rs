//! Driver- and trip-originated notification handlers. Every handler checks
//! the exact rider state at entry and silently ignores anything else, so
//! duplicate or delayed events cannot corrupt the rider.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::messaging::RiderMessage;
use crate::models::rider::RiderState;
use crate::rider::{commit, responses};
use crate::state::AppState;

const TRIP_CANCELED_RETRY_MSG: &str = "Your driver had to cancel the order, but we \
may have another car free for you! Please try booking again.";

pub async fn notify_driver_confirmed(
    state: &AppState,
    rider_id: Uuid,
) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        warn!(rider_id = %rider_id, "notification for unknown rider");
        return Ok(());
    };
    let mut rider = handle.lock().await;
    if rider.state != RiderState::Dispatching {
        return Ok(());
    }

    let mut staged = rider.clone();
    staged.transition(RiderState::WaitingForPickup);
    commit(state, &mut rider, staged).await?;

    if let Some(trip) = rider.trip_id.and_then(|id| state.trips.get(id)) {
        state.backend.sms_trip_status(&rider, &trip);
    }

    state.push(rider.id, responses::compose_ok(state, &rider, false));
    info!(rider_id = %rider.id, "driver confirmed");
    Ok(())
}

pub async fn notify_trip_started(state: &AppState, rider_id: Uuid) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        warn!(rider_id = %rider_id, "notification for unknown rider");
        return Ok(());
    };
    let mut rider = handle.lock().await;
    if rider.state != RiderState::WaitingForPickup {
        return Ok(());
    }

    let mut staged = rider.clone();
    staged.transition(RiderState::OnTrip);
    commit(state, &mut rider, staged).await?;

    state.push(rider.id, responses::compose_ok(state, &rider, false));
    info!(rider_id = %rider.id, "trip started");
    Ok(())
}

/// Informational only: refresh the assigned-vehicle view while the driver
/// is on the way or the trip is running.
pub async fn notify_driver_enroute(state: &AppState, rider_id: Uuid) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        return Ok(());
    };
    let rider = handle.lock().await;
    if !matches!(
        rider.state,
        RiderState::WaitingForPickup | RiderState::OnTrip
    ) {
        return Ok(());
    }

    state.push(rider.id, responses::compose_ok(state, &rider, false));
    Ok(())
}

pub async fn notify_trip_canceled(state: &AppState, rider_id: Uuid) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        warn!(rider_id = %rider_id, "notification for unknown rider");
        return Ok(());
    };
    let mut rider = handle.lock().await;
    if rider.state != RiderState::WaitingForPickup {
        return Ok(());
    }

    if let Some(trip) = rider.trip_id.and_then(|id| state.trips.get(id)) {
        state.backend.sms_trip_status(&rider, &trip);
    }

    let mut staged = rider.clone();
    staged.transition(RiderState::Looking);
    commit(state, &mut rider, staged).await?;

    state.push(
        rider.id,
        RiderMessage::TripCanceled {
            message: TRIP_CANCELED_RETRY_MSG.to_string(),
        },
    );
    info!(rider_id = %rider.id, "trip canceled by driver");
    Ok(())
}

pub async fn notify_driver_arriving(state: &AppState, rider_id: Uuid) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        return Ok(());
    };
    let rider = handle.lock().await;
    if rider.state != RiderState::WaitingForPickup {
        return Ok(());
    }

    if let Some(trip) = rider.trip_id.and_then(|id| state.trips.get(id)) {
        state.push(rider.id, RiderMessage::DriverArriving { trip_id: trip.id });
        state.backend.sms_trip_status(&rider, &trip);
    }
    state.push(rider.id, responses::compose_ok(state, &rider, false));
    Ok(())
}

pub async fn notify_trip_finished(state: &AppState, rider_id: Uuid) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        warn!(rider_id = %rider_id, "notification for unknown rider");
        return Ok(());
    };
    let mut rider = handle.lock().await;
    if rider.state != RiderState::OnTrip {
        return Ok(());
    }

    let mut staged = rider.clone();
    staged.transition(RiderState::PendingRating);
    commit(state, &mut rider, staged).await?;

    state.push(rider.id, responses::compose_ok(state, &rider, false));
    info!(rider_id = %rider.id, "trip finished");
    Ok(())
}

/// Dispatch could not confirm the driver for an external reason; the rider
/// goes back to looking and is told why.
pub async fn notify_pickup_canceled(
    state: &AppState,
    rider_id: Uuid,
    reason: String,
) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        warn!(rider_id = %rider_id, "notification for unknown rider");
        return Ok(());
    };
    let mut rider = handle.lock().await;
    if rider.state != RiderState::Dispatching {
        return Ok(());
    }

    let mut staged = rider.clone();
    staged.transition(RiderState::Looking);
    commit(state, &mut rider, staged).await?;

    state.push(rider.id, RiderMessage::PickupCanceled { reason });
    info!(rider_id = %rider.id, "pickup canceled by dispatch");
    Ok(())
}

/// Billing completion acknowledgement, pushed regardless of state.
pub async fn notify_trip_billed(state: &AppState, rider_id: Uuid) -> Result<(), DispatchError> {
    let Some(handle) = state.try_rider(rider_id) else {
        return Ok(());
    };
    let rider = handle.lock().await;
    state.push(rider.id, responses::bare_ok(&rider, false));
    Ok(())
}
