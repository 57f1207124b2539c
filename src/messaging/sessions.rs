use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::messaging::RiderMessage;

/// Live push channels to connected riders. Sends are fire-and-forget: a
/// missing or closed session drops the message, it is not an error.
pub struct SessionRegistry {
    sessions: DashMap<Uuid, mpsc::UnboundedSender<RiderMessage>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Open a session for the rider, replacing any previous one.
    pub fn attach(&self, rider_id: Uuid) -> mpsc::UnboundedReceiver<RiderMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.insert(rider_id, tx);
        rx
    }

    pub fn detach(&self, rider_id: Uuid) {
        self.sessions.remove(&rider_id);
    }

    pub fn is_attached(&self, rider_id: Uuid) -> bool {
        self.sessions.contains_key(&rider_id)
    }

    /// Returns whether the message was handed to a live session.
    pub fn send(&self, rider_id: Uuid, message: RiderMessage) -> bool {
        match self.sessions.get(&rider_id) {
            Some(tx) => tx.send(message).is_ok(),
            None => {
                debug!(rider_id = %rider_id, "no session, message dropped");
                false
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::SessionRegistry;
    use crate::messaging::RiderMessage;

    #[test]
    fn send_without_session_is_dropped() {
        let registry = SessionRegistry::new();
        let delivered = registry.send(
            Uuid::new_v4(),
            RiderMessage::DriverArriving {
                trip_id: Uuid::new_v4(),
            },
        );
        assert!(!delivered);
    }

    #[tokio::test]
    async fn attached_session_receives_messages() {
        let registry = SessionRegistry::new();
        let rider_id = Uuid::new_v4();
        let mut rx = registry.attach(rider_id);

        let trip_id = Uuid::new_v4();
        assert!(registry.send(rider_id, RiderMessage::DriverArriving { trip_id }));

        match rx.try_recv().unwrap() {
            RiderMessage::DriverArriving { trip_id: got } => assert_eq!(got, trip_id),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn detach_closes_the_channel() {
        let registry = SessionRegistry::new();
        let rider_id = Uuid::new_v4();
        let _rx = registry.attach(rider_id);

        registry.detach(rider_id);
        assert!(!registry.is_attached(rider_id));
        assert!(!registry.send(
            rider_id,
            RiderMessage::DriverArriving {
                trip_id: Uuid::new_v4()
            }
        ));
    }
}
