use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::models::rider::RiderState;
use crate::rider::responses;
use crate::state::AppState;

/// Push a fresh nearby-vehicle list to one rider. Does nothing unless the
/// rider is connected and still looking. The list is recomputed from
/// scratch on every call.
pub async fn refresh_nearby(state: &AppState, rider_id: Uuid) {
    let Some(handle) = state.try_rider(rider_id) else {
        return;
    };
    let rider = handle.lock().await;
    if !rider.connected || rider.state != RiderState::Looking {
        return;
    }

    state.push(rider.id, responses::compose_ok(state, &rider, false));
}

/// One sweep over every known rider.
pub async fn broadcast_nearby(state: &AppState) {
    let rider_ids: Vec<Uuid> = state.riders.iter().map(|entry| *entry.key()).collect();
    for rider_id in rider_ids {
        refresh_nearby(state, rider_id).await;
    }
}

/// Periodic nearby-vehicle broadcast, spawned next to the request handlers.
pub async fn run_nearby_broadcast(state: Arc<AppState>) {
    let period = Duration::from_secs(state.config.broadcast_period_secs);
    info!(period_secs = period.as_secs(), "nearby broadcast loop started");

    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        broadcast_nearby(&state).await;
    }
}
