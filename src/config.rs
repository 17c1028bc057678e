use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::journal::DEFAULT_LOG_FILE;
use crate::lot::{ConfigError, MAX_FLOORS, SLOTS_PER_FLOOR};

pub const DEFAULT_LOT_ID: &str = "PL1";
pub const DEFAULT_FLOORS: u32 = 3;
pub const DEFAULT_CAR_SLOTS: u32 = 6;
pub const DEFAULT_TRUCK_SLOTS: u32 = 2;
pub const DEFAULT_BIKE_SLOTS: u32 = 2;

/// Construction parameters of a lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotConfig {
    pub lot_id: String,
    pub floors: u32,
    /// Car slots on every floor, taken from the start of the floor
    pub car_slots: u32,
    /// Truck slots on every floor, after the car slots
    pub truck_slots: u32,
    /// Bike slots on every floor, the remainder
    pub bike_slots: u32,
}

impl LotConfig {
    pub fn new(lot_id: impl Into<String>, floors: u32, car_slots: u32, truck_slots: u32, bike_slots: u32) -> Self {
        Self {
            lot_id: lot_id.into(),
            floors,
            car_slots,
            truck_slots,
            bike_slots,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floors == 0 {
            return Err(ConfigError::NoFloors);
        }
        if self.floors > MAX_FLOORS {
            return Err(ConfigError::TooManyFloors {
                floors: self.floors,
                max: MAX_FLOORS,
            });
        }
        let total = self.car_slots as u64 + self.truck_slots as u64 + self.bike_slots as u64;
        if total != SLOTS_PER_FLOOR as u64 {
            return Err(ConfigError::CapacityMismatch {
                car: self.car_slots,
                truck: self.truck_slots,
                bike: self.bike_slots,
                expected: SLOTS_PER_FLOOR,
            });
        }
        Ok(())
    }

    /// Reads the lot from `PARKING_*` environment variables, falling back to
    /// the defaults for unset ones. The result is validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &'static str, default: u32| match lookup(key) {
            Some(value) => parse_count(key, &value),
            None => Ok(default),
        };

        let config = Self {
            lot_id: normalize_lot_id(lookup("PARKING_LOT_ID")),
            floors: number("PARKING_FLOORS", DEFAULT_FLOORS)?,
            car_slots: number("PARKING_CAR_SLOTS", DEFAULT_CAR_SLOTS)?,
            truck_slots: number("PARKING_TRUCK_SLOTS", DEFAULT_TRUCK_SLOTS)?,
            bike_slots: number("PARKING_BIKE_SLOTS", DEFAULT_BIKE_SLOTS)?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for LotConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOT_ID, DEFAULT_FLOORS, DEFAULT_CAR_SLOTS, DEFAULT_TRUCK_SLOTS, DEFAULT_BIKE_SLOTS)
    }
}

/// Trims a configured lot id; blank or missing ids become `DEFAULT_LOT_ID`
pub fn normalize_lot_id(raw: Option<String>) -> String {
    raw.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_LOT_ID.to_string())
}

/// Lot id from `PARKING_LOT_ID`
pub fn lot_id_from_env() -> String {
    normalize_lot_id(std::env::var("PARKING_LOT_ID").ok())
}

/// Path of the availability report written when the menu exits, from
/// `PARKING_REPORT_FILE`. Unset means no report.
pub fn report_file_from_env() -> Option<PathBuf> {
    std::env::var("PARKING_REPORT_FILE")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

/// Parses a non-negative count typed by a user or read from the environment
pub fn parse_count(field: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
        field,
        value: value.trim().to_string(),
    })
}

/// Path of the audit log, from `PARKING_LOG_FILE`
pub fn log_file_from_env() -> PathBuf {
    std::env::var("PARKING_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE))
}
