//! API endpoint for company booking analytics.

use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;

use crate::orm::DbConn;
use crate::orm::analytics::{CompanyAnalytics, company_analytics};
use crate::session_guards::CompanyScope;

/// Company Analytics endpoint.
///
/// - **URL:** `/api/1/Analytics`
/// - **Method:** `GET`
/// - **Purpose:** Weekday booking breakdown and the recent weekly trend
///   for the scope company
/// - **Authentication:** Required
#[get("/1/Analytics")]
pub async fn get_analytics(
    db: DbConn,
    scope: CompanyScope,
) -> Result<Json<CompanyAnalytics>, Status> {
    let company_id = scope.company_id;
    db.run(move |conn| {
        company_analytics(conn, company_id).map(Json).map_err(|e| {
            error!("Error computing analytics: {:?}", e);
            Status::InternalServerError
        })
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![get_analytics]
}
