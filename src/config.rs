use std::env;

use crate::error::DispatchError;
use crate::models::driver::GeoPoint;
use crate::schedule::WeeklySchedule;

#[derive(Debug, Clone)]
pub struct Config {
    /// Radius of the nearby-vehicle list shown to riders in `Looking`.
    pub nearby_radius_km: f64,
    /// Period of the background nearby-vehicle broadcast loop.
    pub broadcast_period_secs: u64,
    pub schedule: WeeklySchedule,
    /// Served-area polygon; empty means no restriction.
    pub service_area: Vec<GeoPoint>,
}

impl Config {
    pub fn from_env() -> Result<Self, DispatchError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            nearby_radius_km: parse_or_default("NEARBY_RADIUS_KM", 5.0)?,
            broadcast_period_secs: parse_or_default("BROADCAST_PERIOD_SECS", 10)?,
            schedule: WeeklySchedule::default(),
            service_area: Vec::new(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nearby_radius_km: 5.0,
            broadcast_period_secs: 10,
            schedule: WeeklySchedule::default(),
            service_area: Vec::new(),
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, DispatchError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| DispatchError::Config(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
