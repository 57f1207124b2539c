pub mod notifications;
pub mod requests;
pub mod responses;

use crate::error::DispatchError;
use crate::models::rider::Rider;
use crate::state::AppState;

/// Persist a staged rider and only then publish it into the shared slot.
/// A failed save leaves the rider exactly as it was, the transition is not
/// committed.
pub(crate) async fn commit(
    state: &AppState,
    slot: &mut Rider,
    staged: Rider,
) -> Result<(), DispatchError> {
    state.repo.save(&staged).await?;
    *slot = staged;
    Ok(())
}
