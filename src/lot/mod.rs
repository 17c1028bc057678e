pub mod types;
pub mod error;
pub mod allocator;

pub use types::{Assignment, Availability, CategoryCounts, Slot, SlotView, TicketLocation, VehicleType, MAX_FLOORS, SLOTS_PER_FLOOR};
pub use error::{ConfigError, ParkError, ParseVehicleTypeError, UnparkError};
pub use allocator::ParkingLot;
