use std::path::Path;

use tracing::{debug, info};

use super::error::{ConfigError, ParkError, UnparkError};
use super::types::{
    Assignment, Availability, CategoryCounts, Slot, SlotView, TicketLocation, VehicleType, SLOTS_PER_FLOOR,
};
use crate::clock::{Clock, SystemClock};
use crate::config::LotConfig;
use crate::journal::{format_line, FileLog, LogSink};

/// A single parking lot: a `floors × SLOTS_PER_FLOOR` grid of slots, each fixed
/// to a vehicle category, plus a per-category count of free slots.
///
/// Every free slot of category C is counted in `available`, so at all times
/// `available[C] + occupied[C] == total[C]`.
pub struct ParkingLot {
    lot_id: String,
    slots: Vec<Vec<Slot>>,
    totals: CategoryCounts,
    available: CategoryCounts,
    clock: Box<dyn Clock>,
    log: Box<dyn LogSink>,
}

impl ParkingLot {
    /// Builds the lot described by `config`. On each floor the first
    /// `car_slots` slots take cars, the next `truck_slots` trucks, the rest bikes.
    pub fn new<C, L>(config: &LotConfig, clock: C, log: L) -> Result<Self, ConfigError>
    where
        C: Clock + 'static,
        L: LogSink + 'static,
    {
        config.validate()?;

        let slots: Vec<Vec<Slot>> = (0..config.floors)
            .map(|_| {
                (0..SLOTS_PER_FLOOR)
                    .map(|index| {
                        let category = if index < config.car_slots {
                            VehicleType::Car
                        } else if index < config.car_slots + config.truck_slots {
                            VehicleType::Truck
                        } else {
                            VehicleType::Bike
                        };
                        Slot::empty(category)
                    })
                    .collect()
            })
            .collect();

        let totals = CategoryCounts::new(
            config.floors * config.car_slots,
            config.floors * config.truck_slots,
            config.floors * config.bike_slots,
        );

        info!(
            lot_id = %config.lot_id,
            floors = config.floors,
            car = totals.car,
            truck = totals.truck,
            bike = totals.bike,
            "parking lot ready"
        );

        Ok(Self {
            lot_id: config.lot_id.clone(),
            slots,
            totals,
            available: totals,
            clock: Box::new(clock),
            log: Box::new(log),
        })
    }

    /// Builds a lot using the system clock and an audit log file at `log_path`
    pub fn with_system_services<P: AsRef<Path>>(config: &LotConfig, log_path: P) -> Result<Self, ConfigError> {
        Self::new(config, SystemClock, FileLog::new(log_path))
    }

    /// Parks a vehicle in the requested slot (both 1-based) and returns its ticket id
    pub fn park(
        &mut self,
        vehicle_type: VehicleType,
        registration: &str,
        floor: u32,
        slot: u32,
    ) -> Result<String, ParkError> {
        let result = self.try_park(vehicle_type, registration, floor, slot);
        if let Err(e) = &result {
            debug!(%vehicle_type, registration, floor, slot, error = %e, "park rejected");
        }
        result
    }

    fn try_park(
        &mut self,
        vehicle_type: VehicleType,
        registration: &str,
        floor: u32,
        slot: u32,
    ) -> Result<String, ParkError> {
        let (floor_index, slot_index) = self
            .index_of(floor, slot)
            .ok_or(ParkError::OutOfRange { floor, slot })?;

        let target = &self.slots[floor_index][slot_index];
        if target.is_occupied() {
            return Err(ParkError::SlotOccupied { floor, slot });
        }
        if self.available.get(vehicle_type) == 0 {
            return Err(ParkError::CapacityExhausted(vehicle_type));
        }
        if target.category() != vehicle_type {
            return Err(ParkError::CategoryMismatch {
                floor,
                slot,
                slot_category: target.category(),
                vehicle_type,
            });
        }

        let ticket_id = ticket_id_for(&self.lot_id, floor, slot);
        let entry_time = self.clock.now();
        self.slots[floor_index][slot_index].occupy(Assignment {
            ticket_id: ticket_id.clone(),
            vehicle_type,
            registration: registration.to_string(),
            entry_time,
        });
        *self.available.get_mut(vehicle_type) -= 1;

        info!(ticket_id = %ticket_id, %vehicle_type, registration, floor, slot, "vehicle parked");
        self.log.record(&format_line(
            self.clock.now(),
            &format!(
                "Vehicle parked - Type: {}, Registration: {}, Floor: {}, Slot: {}",
                vehicle_type, registration, floor, slot
            ),
        ));

        Ok(ticket_id)
    }

    /// Releases the slot holding `ticket_id` and returns what was parked there
    pub fn unpark(&mut self, ticket_id: &str) -> Result<Assignment, UnparkError> {
        let Some((floor_index, slot_index)) = self.position_of(ticket_id) else {
            debug!(ticket_id, "unpark rejected, no such ticket");
            return Err(UnparkError::TicketNotFound(ticket_id.to_string()));
        };

        let slot = &mut self.slots[floor_index][slot_index];
        let category = slot.category();
        let assignment = slot
            .release()
            .ok_or_else(|| UnparkError::TicketNotFound(ticket_id.to_string()))?;
        *self.available.get_mut(category) += 1;

        info!(ticket_id, floor = floor_index + 1, slot = slot_index + 1, "vehicle unparked");
        self.log.record(&format_line(
            self.clock.now(),
            &format!("Vehicle unparked - Ticket ID: {}", ticket_id),
        ));

        Ok(assignment)
    }

    /// Occupancy of every slot, floor by floor
    pub fn availability(&self) -> Availability {
        let floors = self
            .slots
            .iter()
            .enumerate()
            .map(|(floor_index, floor)| {
                floor
                    .iter()
                    .enumerate()
                    .map(|(slot_index, slot)| SlotView {
                        floor: floor_index as u32 + 1,
                        slot: slot_index as u32 + 1,
                        category: slot.category(),
                        occupant: slot.assignment().map(|a| a.vehicle_type),
                    })
                    .collect()
            })
            .collect();

        Availability {
            lot_id: self.lot_id.clone(),
            floors,
            available: self.available,
        }
    }

    pub fn find_ticket(&self, ticket_id: &str) -> Option<TicketLocation<'_>> {
        let (floor_index, slot_index) = self.position_of(ticket_id)?;
        let assignment = self.slots[floor_index][slot_index].assignment()?;
        Some(TicketLocation {
            floor: floor_index as u32 + 1,
            slot: slot_index as u32 + 1,
            assignment,
        })
    }

    /// The slot at a 1-based position
    pub fn slot(&self, floor: u32, slot: u32) -> Option<&Slot> {
        let (floor_index, slot_index) = self.index_of(floor, slot)?;
        Some(&self.slots[floor_index][slot_index])
    }

    pub fn lot_id(&self) -> &str {
        &self.lot_id
    }

    pub fn floors(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn available(&self, vehicle_type: VehicleType) -> u32 {
        self.available.get(vehicle_type)
    }

    pub fn available_counts(&self) -> CategoryCounts {
        self.available
    }

    pub fn total(&self, vehicle_type: VehicleType) -> u32 {
        self.totals.get(vehicle_type)
    }

    /// Counts occupied slots of a category by walking the grid
    pub fn occupied(&self, vehicle_type: VehicleType) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|slot| slot.category() == vehicle_type && slot.is_occupied())
            .count() as u32
    }

    fn index_of(&self, floor: u32, slot: u32) -> Option<(usize, usize)> {
        if floor == 0 || floor > self.floors() || slot == 0 || slot > SLOTS_PER_FLOOR {
            return None;
        }
        Some(((floor - 1) as usize, (slot - 1) as usize))
    }

    // Floor-major scan, first match wins.
    fn position_of(&self, ticket_id: &str) -> Option<(usize, usize)> {
        self.slots.iter().enumerate().find_map(|(floor_index, floor)| {
            floor
                .iter()
                .position(|slot| slot.assignment().is_some_and(|a| a.ticket_id == ticket_id))
                .map(|slot_index| (floor_index, slot_index))
        })
    }
}

fn ticket_id_for(lot_id: &str, floor: u32, slot: u32) -> String {
    format!("{}_{}_{}", lot_id, floor, slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::journal::{MemoryLog, NullLog};
    use chrono::{NaiveDate, NaiveDateTime};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn lot(floors: u32, car: u32, truck: u32, bike: u32) -> ParkingLot {
        ParkingLot::new(&LotConfig::new("PL1", floors, car, truck, bike), FixedClock(noon()), NullLog).unwrap()
    }

    #[test]
    fn categories_follow_the_per_floor_split() {
        let lot = lot(2, 5, 3, 2);
        for floor in 1..=2 {
            for slot in 1..=5 {
                assert_eq!(lot.slot(floor, slot).unwrap().category(), VehicleType::Car);
            }
            for slot in 6..=8 {
                assert_eq!(lot.slot(floor, slot).unwrap().category(), VehicleType::Truck);
            }
            for slot in 9..=10 {
                assert_eq!(lot.slot(floor, slot).unwrap().category(), VehicleType::Bike);
            }
        }
        assert_eq!(lot.available_counts(), CategoryCounts::new(10, 6, 4));
    }

    #[test]
    fn construction_rejects_bad_parameters() {
        let zero = ParkingLot::new(&LotConfig::new("PL1", 0, 10, 0, 0), FixedClock(noon()), NullLog);
        assert!(matches!(zero, Err(ConfigError::NoFloors)));

        let short = ParkingLot::new(&LotConfig::new("PL1", 1, 1, 0, 1), FixedClock(noon()), NullLog);
        assert!(matches!(short, Err(ConfigError::CapacityMismatch { .. })));

        let huge = ParkingLot::new(&LotConfig::new("PL1", u32::MAX, 10, 0, 0), FixedClock(noon()), NullLog);
        assert!(matches!(huge, Err(ConfigError::TooManyFloors { .. })));
    }

    #[test]
    fn park_records_assignment_and_log_line() {
        let log = MemoryLog::new();
        let mut lot = ParkingLot::new(&LotConfig::new("PL1", 1, 6, 2, 2), FixedClock(noon()), log.clone()).unwrap();

        let ticket = lot.park(VehicleType::Truck, "TR-77", 1, 7).unwrap();
        assert_eq!(ticket, "PL1_1_7");

        let assignment = lot.slot(1, 7).unwrap().assignment().unwrap();
        assert_eq!(assignment.registration, "TR-77");
        assert_eq!(assignment.vehicle_type, VehicleType::Truck);
        assert_eq!(assignment.entry_time, noon());
        assert_eq!(lot.available(VehicleType::Truck), 1);

        assert_eq!(
            log.lines(),
            vec!["[2024-06-01 12:00:00] Vehicle parked - Type: truck, Registration: TR-77, Floor: 1, Slot: 7".to_string()]
        );
    }

    #[test]
    fn unpark_releases_slot_and_logs() {
        let log = MemoryLog::new();
        let mut lot = ParkingLot::new(&LotConfig::new("PL1", 2, 6, 2, 2), FixedClock(noon()), log.clone()).unwrap();
        let ticket = lot.park(VehicleType::Bike, "B-9", 2, 10).unwrap();

        let released = lot.unpark(&ticket).unwrap();
        assert_eq!(released.registration, "B-9");
        assert!(!lot.slot(2, 10).unwrap().is_occupied());
        assert_eq!(lot.slot(2, 10).unwrap().category(), VehicleType::Bike);
        assert_eq!(lot.available(VehicleType::Bike), 4);
        assert_eq!(log.lines()[1], "[2024-06-01 12:00:00] Vehicle unparked - Ticket ID: PL1_2_10");
    }

    #[test]
    fn rejected_operations_do_not_log() {
        let log = MemoryLog::new();
        let mut lot = ParkingLot::new(&LotConfig::new("PL1", 1, 6, 2, 2), FixedClock(noon()), log.clone()).unwrap();

        assert!(lot.park(VehicleType::Car, "C-1", 2, 1).is_err());
        assert!(lot.park(VehicleType::Car, "C-1", 1, 10).is_err());
        assert!(lot.unpark("PL1_1_1").is_err());
        assert!(log.lines().is_empty());
    }

    #[test]
    fn category_mismatch_leaves_lot_untouched() {
        let mut lot = lot(1, 6, 2, 2);
        let before = lot.availability();

        assert_eq!(
            lot.park(VehicleType::Car, "C-1", 1, 9),
            Err(ParkError::CategoryMismatch {
                floor: 1,
                slot: 9,
                slot_category: VehicleType::Bike,
                vehicle_type: VehicleType::Car,
            })
        );
        assert_eq!(lot.availability(), before);
    }

    #[test]
    fn find_ticket_reports_location() {
        let mut lot = lot(3, 6, 2, 2);
        let ticket = lot.park(VehicleType::Car, "C-3", 3, 4).unwrap();

        let location = lot.find_ticket(&ticket).unwrap();
        assert_eq!((location.floor, location.slot), (3, 4));
        assert_eq!(location.assignment.registration, "C-3");
        assert!(lot.find_ticket("PL1_3_5").is_none());
    }

    #[test]
    fn slot_lookup_is_one_based() {
        let lot = lot(1, 6, 2, 2);
        assert!(lot.slot(0, 1).is_none());
        assert!(lot.slot(1, 0).is_none());
        assert!(lot.slot(1, 11).is_none());
        assert!(lot.slot(2, 1).is_none());
        assert!(lot.slot(1, 10).is_some());
    }
}
