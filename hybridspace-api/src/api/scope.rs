//! API endpoints for the superadmin scope override.

use rocket::http::Status;
use rocket::response;
use rocket::{Route, serde::json::Json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::orm::company::get_company_by_id;
use crate::orm::scope::{clear_acting_company, set_acting_company};
use crate::session_guards::{CompanyScope, SuperadminUser};

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ScopeRequest {
    pub company_id: i32,
}

/// The scope a request currently resolves to.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ScopeResponse {
    pub company_id: i32,
    pub overridden: bool,
}

/// Read Scope endpoint.
///
/// - **URL:** `/api/1/Scope`
/// - **Method:** `GET`
/// - **Purpose:** Returns the company id requests currently scope to
/// - **Authentication:** Required
#[get("/1/Scope")]
pub async fn get_scope(scope: CompanyScope) -> Json<ScopeResponse> {
    Json(ScopeResponse { company_id: scope.company_id, overridden: scope.is_overridden() })
}

/// Set Scope endpoint.
///
/// - **URL:** `/api/1/Scope`
/// - **Method:** `PUT`
/// - **Purpose:** Makes this session act as the given company
/// - **Authentication:** Superadmin required
///
/// The override is stored on the session row, so it survives across
/// requests but dies with logout and never affects other sessions.
#[put("/1/Scope", data = "<req>")]
pub async fn set_scope(
    db: DbConn,
    superadmin: SuperadminUser,
    req: Json<ScopeRequest>,
) -> Result<Json<ScopeResponse>, response::status::Custom<Json<ErrorResponse>>> {
    let company_id = req.company_id;

    let exists = db
        .run(move |conn| get_company_by_id(conn, company_id))
        .await
        .map_err(|e| {
            error!("Error looking up company for scope: {:?}", e);
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse { error: "Database error".to_string() }),
            )
        })?;

    if exists.is_none() {
        return Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse { error: format!("No company with id {}", company_id) }),
        ));
    }

    let session_id = superadmin.session.id.clone();
    db.run(move |conn| set_acting_company(conn, &session_id, company_id))
        .await
        .map_err(|e| {
            error!("Error setting scope override: {:?}", e);
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse { error: "Database error".to_string() }),
            )
        })?;

    Ok(Json(ScopeResponse { company_id, overridden: true }))
}

/// Clear Scope endpoint.
///
/// - **URL:** `/api/1/Scope`
/// - **Method:** `DELETE`
/// - **Purpose:** Drops the override; requests scope to the superadmin's
///   own company again
/// - **Authentication:** Superadmin required
#[delete("/1/Scope")]
pub async fn clear_scope(
    db: DbConn,
    superadmin: SuperadminUser,
) -> Result<Json<ScopeResponse>, Status> {
    let session_id = superadmin.session.id.clone();
    db.run(move |conn| clear_acting_company(conn, &session_id))
        .await
        .map_err(|e| {
            error!("Error clearing scope override: {:?}", e);
            Status::InternalServerError
        })?;

    Ok(Json(ScopeResponse { company_id: superadmin.user.company_id, overridden: false }))
}

pub fn routes() -> Vec<Route> {
    routes![get_scope, set_scope, clear_scope]
}
