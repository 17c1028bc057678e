use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::lot::{Availability, VehicleType, SLOTS_PER_FLOOR};

const EMPTY_CELL: &str = "[?????]";

fn separator() -> String {
    let mut line = String::from("+-----------+");
    for _ in 0..SLOTS_PER_FLOOR {
        line.push_str("---------+");
    }
    line
}

fn header() -> String {
    let mut line = String::from("| Floor     |");
    for slot in 1..=SLOTS_PER_FLOOR {
        line.push_str(&format!(" {:<8}|", format!("Slot {}", slot)));
    }
    line
}

fn cell(occupant: Option<VehicleType>) -> String {
    match occupant {
        Some(vehicle_type) => format!("[{}]", vehicle_type),
        None => EMPTY_CELL.to_string(),
    }
}

/// Renders the lot as a table: one row per floor, `[?????]` for an empty slot
/// and the occupying vehicle type otherwise
pub fn render_availability(availability: &Availability) -> String {
    let mut lines = vec![separator(), header(), separator()];
    for (index, floor) in availability.floors.iter().enumerate() {
        let mut row = format!("| Floor {:>3} |", index + 1);
        for slot in floor {
            row.push_str(&format!(" {:<7} |", cell(slot.occupant)));
        }
        lines.push(row);
    }
    lines.push(separator());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Writes the availability table, headed by the lot id, to a file
pub fn write_availability_to_file<P: AsRef<Path>>(
    availability: &Availability,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    writeln!(file, "** Parking lot {} **", availability.lot_id)?;
    write!(file, "{}", render_availability(availability))?;
    writeln!(
        file,
        "Available - car: {}, truck: {}, bike: {}",
        availability.available.car, availability.available.truck, availability.available.bike
    )?;
    Ok(())
}

#[derive(Serialize)]
struct SlotRecord {
    floor: u32,
    slot: u32,
    category: VehicleType,
    status: &'static str,
    vehicle_type: Option<VehicleType>,
}

/// Exports one CSV record per slot: `floor,slot,category,status,vehicle_type`
pub fn write_availability_csv<W: Write>(availability: &Availability, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for slot in availability.slots() {
        wtr.serialize(SlotRecord {
            floor: slot.floor,
            slot: slot.slot,
            category: slot.category,
            status: if slot.is_occupied() { "occupied" } else { "empty" },
            vehicle_type: slot.occupant,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
