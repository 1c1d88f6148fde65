use std::{env, str::FromStr, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;

use crate::geofence::ARRIVAL_THRESHOLD_METERS;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("`{name}` has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
    #[error("{0}")]
    Inconsistent(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Time between two simulation ticks.
    pub period: Duration,
    /// Seed for the jitter source. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub arrival_threshold_meters: f64,
    /// Maximum position change per tick and axis, in degrees.
    pub position_jitter_degrees: f64,
    /// Maximum speed change per tick, in km/h.
    pub speed_jitter: f64,
    pub speed_min: f64,
    pub speed_max: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(5),
            seed: None,
            arrival_threshold_meters: ARRIVAL_THRESHOLD_METERS,
            position_jitter_degrees: 0.001,
            speed_jitter: 2.5,
            speed_min: 40.0,
            speed_max: 80.0,
        }
    }
}

impl SimulationSettings {
    /// Reads `FLEET_TICK_SECONDS`, `FLEET_SEED` and
    /// `FLEET_ARRIVAL_THRESHOLD_METERS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(seconds) = parse::<f64, _>(&lookup, "FLEET_TICK_SECONDS")? {
            settings.period = Duration::try_from_secs_f64(seconds).map_err(|_| {
                SettingsError::Invalid {
                    name: "FLEET_TICK_SECONDS",
                    value: seconds.to_string(),
                }
            })?;
        }
        if let Some(seed) = parse(&lookup, "FLEET_SEED")? {
            settings.seed = Some(seed);
        }
        if let Some(threshold) = parse(&lookup, "FLEET_ARRIVAL_THRESHOLD_METERS")? {
            settings.arrival_threshold_meters = threshold;
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.period.is_zero() {
            return Err(SettingsError::Inconsistent("tick period must not be zero"));
        }
        if !(self.arrival_threshold_meters.is_finite() && self.arrival_threshold_meters >= 0.0)
        {
            return Err(SettingsError::Inconsistent(
                "arrival threshold must be a non-negative distance",
            ));
        }
        if !(self.position_jitter_degrees >= 0.0 && self.speed_jitter >= 0.0) {
            return Err(SettingsError::Inconsistent("jitter must not be negative"));
        }
        if !(self.speed_min <= self.speed_max) {
            return Err(SettingsError::Inconsistent(
                "minimum speed must not exceed maximum speed",
            ));
        }
        Ok(())
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| SettingsError::Invalid { name, value })
        })
        .transpose()
}
