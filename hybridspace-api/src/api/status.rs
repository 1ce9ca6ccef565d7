//! API version 1 - Status endpoints

use rocket::{Route, serde::json::Json};
use serde::Serialize;
use ts_rs::TS;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

/// Health Status endpoint.
///
/// - **URL:** `/api/1/Status`
/// - **Method:** `GET`
/// - **Purpose:** Returns the health status of the application
/// - **Authentication:** None required
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "status": "running", "version": "0.1.0" }
/// ```
#[rocket::get("/1/Status")]
pub fn health_status() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn routes() -> Vec<Route> {
    routes![health_status]
}
