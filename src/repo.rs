use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::models::rider::Rider;

/// Durable rider storage, keyed by rider id. Save failures propagate to the
/// caller; the core never commits a state transition whose save failed.
#[async_trait]
pub trait RiderRepository: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<Rider>, DispatchError>;

    async fn save(&self, rider: &Rider) -> Result<(), DispatchError>;
}

#[derive(Default)]
pub struct InMemoryRiderRepository {
    riders: DashMap<Uuid, Rider>,
}

impl InMemoryRiderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RiderRepository for InMemoryRiderRepository {
    async fn load(&self, id: Uuid) -> Result<Option<Rider>, DispatchError> {
        Ok(self.riders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, rider: &Rider) -> Result<(), DispatchError> {
        self.riders.insert(rider.id, rider.clone());
        Ok(())
    }
}
