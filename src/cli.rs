use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::{parse_count, LotConfig};
use crate::display::{render_availability, write_availability_to_file};
use crate::lot::{ParkingLot, VehicleType};

/// Reads whitespace separated tokens, pulling more lines as needed
struct Tokens<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or `None` once the input is exhausted
    fn next_token(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }
}

fn prompt<R: BufRead, W: Write>(tokens: &mut Tokens<R>, output: &mut W, text: &str) -> io::Result<Option<String>> {
    write!(output, "{}", text)?;
    output.flush()?;
    tokens.next_token()
}

/// Asks for a count until a valid one is typed
fn prompt_count<R: BufRead, W: Write>(
    tokens: &mut Tokens<R>,
    output: &mut W,
    text: &str,
    field: &'static str,
) -> io::Result<Option<u32>> {
    loop {
        let Some(token) = prompt(tokens, output, text)? else {
            return Ok(None);
        };
        match parse_count(field, &token) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}

/// Prompts for the floor count and the per-floor split, repeating until the
/// answers describe a valid lot. Returns `None` if input ends first.
pub fn prompt_lot_config<R: BufRead, W: Write>(
    lot_id: &str,
    input: R,
    mut output: W,
) -> io::Result<Option<LotConfig>> {
    read_lot_config(lot_id, &mut Tokens::new(input), &mut output)
}

fn read_lot_config<R: BufRead, W: Write>(
    lot_id: &str,
    tokens: &mut Tokens<R>,
    output: &mut W,
) -> io::Result<Option<LotConfig>> {
    loop {
        let Some(floors) = prompt_count(tokens, output, "Enter the number of floors: ", "floors")? else {
            return Ok(None);
        };
        let Some(car) = prompt_count(tokens, output, "Enter car slots per floor: ", "car slots")? else {
            return Ok(None);
        };
        let Some(truck) = prompt_count(tokens, output, "Enter truck slots per floor: ", "truck slots")? else {
            return Ok(None);
        };
        let Some(bike) = prompt_count(tokens, output, "Enter bike slots per floor: ", "bike slots")? else {
            return Ok(None);
        };

        let config = LotConfig::new(lot_id, floors, car, truck, bike);
        match config.validate() {
            Ok(()) => return Ok(Some(config)),
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}

enum MenuChoice {
    Park,
    Unpark,
    Display,
    Exit,
    Unknown,
}

impl MenuChoice {
    fn parse(token: &str) -> Self {
        match token.trim() {
            "1" => MenuChoice::Park,
            "2" => MenuChoice::Unpark,
            "3" => MenuChoice::Display,
            "4" => MenuChoice::Exit,
            _ => MenuChoice::Unknown,
        }
    }
}

/// Runs the interactive menu against `lot` until the user exits or input ends
pub fn run_menu<R: BufRead, W: Write>(lot: &mut ParkingLot, input: R, mut output: W) -> io::Result<()> {
    menu_loop(lot, &mut Tokens::new(input), &mut output)
}

/// Asks for the lot layout, builds the lot with the system clock and an audit
/// log at `log_path`, then runs the menu, all from one input stream. When
/// `report_path` is given the final availability is written there on exit.
pub fn run_interactive<R: BufRead, W: Write>(
    lot_id: &str,
    log_path: &Path,
    report_path: Option<&Path>,
    input: R,
    mut output: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tokens = Tokens::new(input);
    let Some(config) = read_lot_config(lot_id, &mut tokens, &mut output)? else {
        writeln!(output, "\nExiting... Goodbye!")?;
        return Ok(());
    };
    let mut lot = ParkingLot::with_system_services(&config, log_path)?;
    menu_loop(&mut lot, &mut tokens, &mut output)?;

    if let Some(path) = report_path {
        write_availability_to_file(&lot.availability(), path)?;
        writeln!(output, "Availability saved to: {}", path.display())?;
    }
    Ok(())
}

fn menu_loop<R: BufRead, W: Write>(lot: &mut ParkingLot, tokens: &mut Tokens<R>, output: &mut W) -> io::Result<()> {
    loop {
        write!(
            output,
            "\nMenu:\n1. Park Vehicle\n2. Unpark Vehicle\n3. Display Availability\n4. Exit\n"
        )?;
        let Some(choice) = prompt(tokens, output, "Enter your choice: ")? else {
            break;
        };

        let finished = match MenuChoice::parse(&choice) {
            MenuChoice::Park => !park_vehicle(lot, tokens, output)?,
            MenuChoice::Unpark => !unpark_vehicle(lot, tokens, output)?,
            MenuChoice::Display => {
                write!(output, "{}", render_availability(&lot.availability()))?;
                false
            }
            MenuChoice::Exit => true,
            MenuChoice::Unknown => {
                writeln!(output, "Invalid choice.")?;
                false
            }
        };
        if finished {
            break;
        }
    }
    writeln!(output, "Exiting... Goodbye!")?;
    Ok(())
}

// Each action returns Ok(false) when input ran out mid-prompt.
fn park_vehicle<R: BufRead, W: Write>(lot: &mut ParkingLot, tokens: &mut Tokens<R>, output: &mut W) -> io::Result<bool> {
    let Some(vehicle_type) = prompt(tokens, output, "Enter vehicle type (car/truck/bike): ")? else {
        return Ok(false);
    };
    let Some(registration) = prompt(tokens, output, "Enter registration number: ")? else {
        return Ok(false);
    };
    let Some(floor) = prompt(tokens, output, "Enter preferred floor: ")? else {
        return Ok(false);
    };
    let Some(slot) = prompt(tokens, output, "Enter preferred slot: ")? else {
        return Ok(false);
    };

    let vehicle_type = match vehicle_type.parse::<VehicleType>() {
        Ok(vehicle_type) => vehicle_type,
        Err(e) => {
            writeln!(output, "Parking Result: {}", e)?;
            return Ok(true);
        }
    };
    let (floor, slot) = (parse_position(&floor), parse_position(&slot));

    match lot.park(vehicle_type, &registration, floor, slot) {
        Ok(ticket) => writeln!(output, "Parking Result: {}", ticket)?,
        Err(e) => writeln!(output, "Parking Result: {}", e)?,
    }
    Ok(true)
}

fn unpark_vehicle<R: BufRead, W: Write>(lot: &mut ParkingLot, tokens: &mut Tokens<R>, output: &mut W) -> io::Result<bool> {
    let Some(ticket_id) = prompt(tokens, output, "Enter Ticket ID to unpark: ")? else {
        return Ok(false);
    };
    match lot.unpark(&ticket_id) {
        Ok(_) => writeln!(output, "Vehicle unparked successfully.")?,
        Err(_) => writeln!(output, "Invalid Ticket ID.")?,
    }
    Ok(true)
}

// Anything that is not a positive index (negative, zero, text) lands out of range.
fn parse_position(value: &str) -> u32 {
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 0,
    }
}
