use thiserror::Error;

use super::types::VehicleType;

/// Rejected lot construction parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: a lot needs at least one floor")]
    NoFloors,
    #[error("invalid configuration: {floors} floors requested, a lot has at most {max}")]
    TooManyFloors { floors: u32, max: u32 },
    #[error("invalid configuration: per-floor capacities (car {car}, truck {truck}, bike {bike}) must add up to {expected}")]
    CapacityMismatch {
        car: u32,
        truck: u32,
        bike: u32,
        expected: u32,
    },
    #[error("invalid configuration: {field} must be a non-negative integer, got {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParkError {
    #[error("Invalid floor or slot (floor {floor}, slot {slot}).")]
    OutOfRange { floor: u32, slot: u32 },
    #[error("Slot is occupied (floor {floor}, slot {slot}).")]
    SlotOccupied { floor: u32, slot: u32 },
    #[error("No available {0} slots.")]
    CapacityExhausted(VehicleType),
    #[error("Slot {slot} on floor {floor} is reserved for {slot_category}, not {vehicle_type}.")]
    CategoryMismatch {
        floor: u32,
        slot: u32,
        slot_category: VehicleType,
        vehicle_type: VehicleType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnparkError {
    #[error("Invalid Ticket ID: {0}")]
    TicketNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vehicle type {0:?} (expected car, truck or bike)")]
pub struct ParseVehicleTypeError(pub String);
