//! A single parking lot: floors of fixed-category slots, tickets issued on
//! park and released on unpark, and availability reporting.

pub mod lot;
pub mod clock;
pub mod journal;
pub mod config;
pub mod display;
pub mod cli;
pub mod web;

pub use config::LotConfig;
pub use lot::{ParkError, ParkingLot, UnparkError, VehicleType};
