use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::display::{render_availability, write_availability_csv};
use crate::lot::{ParkError, ParkingLot, UnparkError, VehicleType};

// The whole lot is one unit behind the mutex; every request holds it for the full operation.
pub struct AppState {
    pub lot: Mutex<ParkingLot>,
}

impl AppState {
    pub fn new(lot: ParkingLot) -> Self {
        Self { lot: Mutex::new(lot) }
    }

    fn lock_lot(&self) -> Result<MutexGuard<'_, ParkingLot>> {
        self.lot
            .lock()
            .map_err(|_| actix_web::error::ErrorInternalServerError("parking lot state is unavailable"))
    }
}

#[derive(Deserialize)]
pub struct ParkRequest {
    vehicle_type: String,
    registration: String,
    floor: u32,
    slot: u32,
}

#[derive(Deserialize)]
pub struct UnparkRequest {
    ticket_id: String,
}

#[derive(Serialize)]
pub struct TicketResponse {
    ticket_id: String,
    floor: u32,
    slot: u32,
    vehicle_type: VehicleType,
    registration: String,
    entry_time: String,
}

fn failure(mut builder: actix_web::HttpResponseBuilder, error: impl ToString) -> HttpResponse {
    builder.json(serde_json::json!({"success": false, "error": error.to_string()}))
}

async fn park(req: web::Json<ParkRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let vehicle_type = match req.vehicle_type.parse::<VehicleType>() {
        Ok(vehicle_type) => vehicle_type,
        Err(e) => return Ok(failure(HttpResponse::BadRequest(), e)),
    };

    let mut lot = state.lock_lot()?;
    match lot.park(vehicle_type, &req.registration, req.floor, req.slot) {
        Ok(ticket_id) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "ticket_id": ticket_id
        }))),
        Err(e @ (ParkError::SlotOccupied { .. } | ParkError::CapacityExhausted(_))) => {
            Ok(failure(HttpResponse::Conflict(), e))
        }
        Err(e @ (ParkError::OutOfRange { .. } | ParkError::CategoryMismatch { .. })) => {
            Ok(failure(HttpResponse::BadRequest(), e))
        }
    }
}

async fn unpark(req: web::Json<UnparkRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut lot = state.lock_lot()?;
    match lot.unpark(&req.ticket_id) {
        Ok(assignment) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "ticket_id": assignment.ticket_id,
            "registration": assignment.registration
        }))),
        Err(e @ UnparkError::TicketNotFound(_)) => Ok(failure(HttpResponse::NotFound(), e)),
    }
}

async fn get_ticket(ticket_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let lot = state.lock_lot()?;
    match lot.find_ticket(ticket_id.as_str()) {
        Some(location) => Ok(HttpResponse::Ok().json(TicketResponse {
            ticket_id: location.assignment.ticket_id.clone(),
            floor: location.floor,
            slot: location.slot,
            vehicle_type: location.assignment.vehicle_type,
            registration: location.assignment.registration.clone(),
            entry_time: location.assignment.entry_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        })),
        None => Ok(failure(
            HttpResponse::NotFound(),
            UnparkError::TicketNotFound(ticket_id.into_inner()),
        )),
    }
}

async fn get_availability(state: web::Data<AppState>) -> Result<HttpResponse> {
    let availability = state.lock_lot()?.availability();
    Ok(HttpResponse::Ok().json(availability))
}

async fn get_availability_csv(state: web::Data<AppState>) -> Result<HttpResponse> {
    let availability = state.lock_lot()?.availability();
    let mut body = Vec::new();
    write_availability_csv(&availability, &mut body)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to export CSV: {}", e)))?;
    Ok(HttpResponse::Ok().content_type("text/csv").body(body))
}

async fn index(state: web::Data<AppState>) -> Result<HttpResponse> {
    let availability = state.lock_lot()?.availability();
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(render_availability(&availability)))
}

/// Registers every route of the parking API
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/availability", web::get().to(get_availability))
        .route("/api/availability.csv", web::get().to(get_availability_csv))
        .route("/api/park", web::post().to(park))
        .route("/api/unpark", web::post().to(unpark))
        .service(web::resource("/api/tickets/{ticket_id}").route(web::get().to(get_ticket)));
}

pub async fn start_server(port: u16, lot: ParkingLot) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(lot));
    info!(port, "starting web server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
