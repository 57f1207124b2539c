use crate::messaging::{RiderMessage, RiderOk, VehicleSnapshot};
use crate::models::rider::{Rider, RiderState};
use crate::state::AppState;

/// Build the state-shaped OK payload for a rider. The shape is a function of
/// the current state alone: riders bound to a driver see that one vehicle,
/// riders still looking see everything available around them, everyone else
/// gets the bare status.
pub fn compose_ok(state: &AppState, rider: &Rider, include_token: bool) -> RiderMessage {
    match rider.state {
        RiderState::WaitingForPickup | RiderState::OnTrip => {
            let vehicle = rider
                .trip_id
                .and_then(|trip_id| state.trips.get(trip_id))
                .and_then(|trip| trip.driver_id)
                .and_then(|driver_id| state.directory.get(driver_id))
                .map(|driver| VehicleSnapshot::of(&driver));

            RiderMessage::Ok(RiderOk {
                state: rider.state,
                token: token_for(rider, include_token),
                trip_id: rider.trip_id,
                trip_pending_rating: false,
                sorry_msg: None,
                vehicles: vehicle.map(|v| vec![v]),
            })
        }
        RiderState::Looking => {
            let vehicles = state
                .directory
                .all_available_near(&rider.location, state.config.nearby_radius_km)
                .iter()
                .map(VehicleSnapshot::of)
                .collect();

            RiderMessage::Ok(RiderOk {
                state: rider.state,
                token: token_for(rider, include_token),
                trip_id: None,
                trip_pending_rating: false,
                sorry_msg: None,
                vehicles: Some(vehicles),
            })
        }
        RiderState::Dispatching | RiderState::PendingRating => bare_ok(rider, include_token),
    }
}

/// Current status only, no vehicle data.
pub fn bare_ok(rider: &Rider, include_token: bool) -> RiderMessage {
    RiderMessage::Ok(RiderOk {
        state: rider.state,
        token: token_for(rider, include_token),
        trip_id: rider.trip_id,
        trip_pending_rating: rider.state == RiderState::PendingRating,
        sorry_msg: None,
        vehicles: None,
    })
}

/// Bare status carrying a rider-facing apology.
pub fn sorry_ok(rider: &Rider, sorry_msg: String) -> RiderMessage {
    RiderMessage::Ok(RiderOk {
        state: rider.state,
        token: None,
        trip_id: rider.trip_id,
        trip_pending_rating: rider.state == RiderState::PendingRating,
        sorry_msg: Some(sorry_msg),
        vehicles: None,
    })
}

fn token_for(rider: &Rider, include_token: bool) -> Option<String> {
    if include_token {
        rider.token.clone()
    } else {
        None
    }
}
