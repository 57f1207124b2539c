use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use crate::backend::{Backend, LogBackend};
use crate::config::Config;
use crate::directory::DriverDirectory;
use crate::error::DispatchError;
use crate::geo::Geofence;
use crate::messaging::RiderMessage;
use crate::messaging::sessions::SessionRegistry;
use crate::models::driver::GeoPoint;
use crate::models::rider::Rider;
use crate::observability::metrics::Metrics;
use crate::repo::{InMemoryRiderRepository, RiderRepository};
use crate::trips::TripStore;

/// Everything the dispatch core operates on, constructed once at service
/// start and injected into the handlers. Each rider sits behind its own
/// async mutex, so operations for one rider never interleave while riders
/// stay independent of each other.
pub struct AppState {
    pub riders: DashMap<Uuid, Arc<Mutex<Rider>>>,
    pub directory: DriverDirectory,
    pub trips: TripStore,
    pub sessions: SessionRegistry,
    pub repo: Arc<dyn RiderRepository>,
    pub backend: Arc<dyn Backend>,
    pub geofence: Geofence,
    pub config: Config,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(InMemoryRiderRepository::new()),
            Arc::new(LogBackend),
        )
    }

    pub fn with_collaborators(
        config: Config,
        repo: Arc<dyn RiderRepository>,
        backend: Arc<dyn Backend>,
    ) -> Self {
        let geofence = Geofence::new(config.service_area.clone());

        Self {
            riders: DashMap::new(),
            directory: DriverDirectory::new(),
            trips: TripStore::new(),
            sessions: SessionRegistry::new(),
            repo,
            backend,
            geofence,
            config,
            metrics: Metrics::new(),
        }
    }

    pub fn rider(&self, id: Uuid) -> Result<Arc<Mutex<Rider>>, DispatchError> {
        self.riders
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(DispatchError::RiderNotFound(id))
    }

    pub fn try_rider(&self, id: Uuid) -> Option<Arc<Mutex<Rider>>> {
        self.riders.get(&id).map(|entry| entry.value().clone())
    }

    /// Rider handle for login: the in-process entry if present, the stored
    /// record if the repository knows the rider, a fresh `Looking` record
    /// otherwise.
    pub async fn rider_or_load(
        &self,
        id: Uuid,
        location: GeoPoint,
    ) -> Result<Arc<Mutex<Rider>>, DispatchError> {
        if let Some(existing) = self.try_rider(id) {
            return Ok(existing);
        }

        let rider = match self.repo.load(id).await? {
            Some(stored) => stored,
            None => Rider::new(id, location),
        };

        Ok(self
            .riders
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(rider)))
            .clone())
    }

    /// Push a message to the rider's session, counting delivered ones.
    pub fn push(&self, rider_id: Uuid, message: RiderMessage) {
        let kind = message.kind();
        if self.sessions.send(rider_id, message) {
            self.metrics
                .messages_pushed_total
                .with_label_values(&[kind])
                .inc();
        }
    }

    pub async fn connect(
        &self,
        rider_id: Uuid,
    ) -> Result<mpsc::UnboundedReceiver<RiderMessage>, DispatchError> {
        let handle = self.rider(rider_id)?;
        let mut rider = handle.lock().await;
        if !rider.connected {
            self.metrics.riders_connected.inc();
        }
        rider.connected = true;
        Ok(self.sessions.attach(rider_id))
    }

    pub async fn disconnect(&self, rider_id: Uuid) -> Result<(), DispatchError> {
        let handle = self.rider(rider_id)?;
        let mut rider = handle.lock().await;
        if rider.connected {
            self.metrics.riders_connected.dec();
        }
        rider.connected = false;
        self.sessions.detach(rider_id);
        Ok(())
    }
}
