use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("rider {0} not found")]
    RiderNotFound(Uuid),

    #[error("trip {0} not found")]
    TripNotFound(Uuid),

    #[error("driver {0} not found")]
    DriverNotFound(Uuid),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("billing failed: {0}")]
    Billing(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
