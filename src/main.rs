use std::io;

use tracing_subscriber::EnvFilter;

use parking_lot::cli::run_interactive;
use parking_lot::config::{log_file_from_env, lot_id_from_env, report_file_from_env};
use parking_lot::{web, LotConfig, ParkingLot};

fn init_tracing(default_directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)))
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_path = log_file_from_env();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        init_tracing("info");
        let port = args.get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let config = LotConfig::from_env()?;
        let lot = ParkingLot::with_system_services(&config, &log_path)?;

        println!("Starting web server on port {}...", port);
        println!("Parking lot {}: {} floor(s), audit log at {}", config.lot_id, config.floors, log_path.display());
        println!("Access the lot at http://localhost:{}", port);

        web::start_server(port, lot).await?;
        return Ok(());
    }

    // Interactive menu; keep diagnostics out of the prompts unless asked for
    init_tracing("warn");
    let report_path = report_file_from_env();
    run_interactive(
        &lot_id_from_env(),
        &log_path,
        report_path.as_deref(),
        io::stdin().lock(),
        io::stdout(),
    )?;

    Ok(())
}
