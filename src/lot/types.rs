use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::ParseVehicleTypeError;

/// Number of slots on every floor of a lot
pub const SLOTS_PER_FLOOR: u32 = 10;

/// Largest floor count a lot can be built with
pub const MAX_FLOORS: u32 = 10;

/// Vehicle category. Every slot is fixed to one of these when the lot is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Truck,
    Bike,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::Car, VehicleType::Truck, VehicleType::Bike];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Truck => "truck",
            VehicleType::Bike => "bike",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = ParseVehicleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "car" => Ok(VehicleType::Car),
            "truck" => Ok(VehicleType::Truck),
            "bike" => Ok(VehicleType::Bike),
            _ => Err(ParseVehicleTypeError(s.trim().to_string())),
        }
    }
}

/// A vehicle currently parked in a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub ticket_id: String,
    pub vehicle_type: VehicleType,
    pub registration: String,
    pub entry_time: NaiveDateTime,
}

/// One physical parking space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    category: VehicleType,
    assignment: Option<Assignment>,
}

impl Slot {
    pub(crate) fn empty(category: VehicleType) -> Self {
        Self {
            category,
            assignment: None,
        }
    }

    pub fn category(&self) -> VehicleType {
        self.category
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.assignment.is_some()
    }

    pub(crate) fn occupy(&mut self, assignment: Assignment) {
        self.assignment = Some(assignment);
    }

    /// Empties the slot, keeping its category
    pub(crate) fn release(&mut self) -> Option<Assignment> {
        self.assignment.take()
    }
}

/// A count per vehicle category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub car: u32,
    pub truck: u32,
    pub bike: u32,
}

impl CategoryCounts {
    pub fn new(car: u32, truck: u32, bike: u32) -> Self {
        Self { car, truck, bike }
    }

    pub fn get(&self, vehicle_type: VehicleType) -> u32 {
        match vehicle_type {
            VehicleType::Car => self.car,
            VehicleType::Truck => self.truck,
            VehicleType::Bike => self.bike,
        }
    }

    pub(crate) fn get_mut(&mut self, vehicle_type: VehicleType) -> &mut u32 {
        match vehicle_type {
            VehicleType::Car => &mut self.car,
            VehicleType::Truck => &mut self.truck,
            VehicleType::Bike => &mut self.bike,
        }
    }

    pub fn sum(&self) -> u32 {
        self.car + self.truck + self.bike
    }
}

/// Where a live ticket is parked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketLocation<'a> {
    pub floor: u32,
    pub slot: u32,
    pub assignment: &'a Assignment,
}

/// Reporting view of a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub floor: u32,
    pub slot: u32,
    pub category: VehicleType,
    pub occupant: Option<VehicleType>,
}

impl SlotView {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Snapshot of the whole lot, floor by floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub lot_id: String,
    pub floors: Vec<Vec<SlotView>>,
    pub available: CategoryCounts,
}

impl Availability {
    pub fn slots(&self) -> impl Iterator<Item = &SlotView> {
        self.floors.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_parses_case_insensitively() {
        assert_eq!("car".parse::<VehicleType>(), Ok(VehicleType::Car));
        assert_eq!(" Truck ".parse::<VehicleType>(), Ok(VehicleType::Truck));
        assert_eq!("BIKE".parse::<VehicleType>(), Ok(VehicleType::Bike));
    }

    #[test]
    fn unknown_vehicle_type_is_rejected() {
        let err = "boat".parse::<VehicleType>().unwrap_err();
        assert_eq!(err, ParseVehicleTypeError("boat".to_string()));
    }

    #[test]
    fn vehicle_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&VehicleType::Truck).unwrap(), "\"truck\"");
        let parsed: VehicleType = serde_json::from_str("\"bike\"").unwrap();
        assert_eq!(parsed, VehicleType::Bike);
    }

    #[test]
    fn slot_release_keeps_category() {
        let mut slot = Slot::empty(VehicleType::Bike);
        slot.occupy(Assignment {
            ticket_id: "PL1_1_1".to_string(),
            vehicle_type: VehicleType::Bike,
            registration: "B-1".to_string(),
            entry_time: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        });
        assert!(slot.is_occupied());

        let released = slot.release().unwrap();
        assert_eq!(released.ticket_id, "PL1_1_1");
        assert!(!slot.is_occupied());
        assert_eq!(slot.category(), VehicleType::Bike);
    }
}
