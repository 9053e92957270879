use crate::cabin::CabinConfig;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_FLOORS: u32 = 5;
const DEFAULT_FLOOR_HEIGHT_M: f64 = 2.0;
const DEFAULT_VELOCITY_MPS: f64 = 2.0;
const DEFAULT_OPEN_DOORS_TIMEOUT_S: f64 = 2.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("building must have at least one floor")]
    NoFloors,
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidQuantity { name: &'static str, value: f64 },
    #[error("initial floor {floor} is outside {floors:?}")]
    InitialFloorOutOfRange { floor: i32, floors: Range<i32> },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Physical description of the simulated building and cabin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub floors: u32,
    pub floor_height_m: f64,
    pub velocity_mps: f64,
    pub open_doors_timeout_s: f64,
    pub initial_floor: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            floors: DEFAULT_FLOORS,
            floor_height_m: DEFAULT_FLOOR_HEIGHT_M,
            velocity_mps: DEFAULT_VELOCITY_MPS,
            open_doors_timeout_s: DEFAULT_OPEN_DOORS_TIMEOUT_S,
            initial_floor: 0,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floors == 0 {
            return Err(ConfigError::NoFloors);
        }
        positive("floor_height_m", self.floor_height_m)?;
        positive("velocity_mps", self.velocity_mps)?;
        positive("open_doors_timeout_s", self.open_doors_timeout_s)?;
        self.time_to_floor()?;

        let floors = self.floors_range();
        if !floors.contains(&self.initial_floor) {
            return Err(ConfigError::InitialFloorOutOfRange {
                floor: self.initial_floor,
                floors,
            });
        }
        Ok(())
    }

    /// Valid floors, `0..floors`.
    pub fn floors_range(&self) -> Range<i32> {
        0..i32::try_from(self.floors).unwrap_or(i32::MAX)
    }

    pub fn time_to_floor(&self) -> Result<Duration, ConfigError> {
        seconds("time_to_floor", self.floor_height_m / self.velocity_mps)
    }

    pub fn open_doors_timeout(&self) -> Result<Duration, ConfigError> {
        seconds("open_doors_timeout_s", self.open_doors_timeout_s)
    }

    pub fn cabin_config(&self) -> Result<CabinConfig, ConfigError> {
        self.validate()?;
        Ok(CabinConfig {
            initial_floor: self.initial_floor,
            time_to_floor: self.time_to_floor()?,
            open_doors_timeout: self.open_doors_timeout()?,
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidQuantity { name, value })
    }
}

fn seconds(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    positive(name, value)?;
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidQuantity { name, value })
}
