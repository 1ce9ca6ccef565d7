//! API endpoints for offices.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::{Office, OfficeInput};
use crate::orm::DbConn;
use crate::orm::office::{
    delete_office, get_office_by_id, get_offices_for_company, insert_office, update_office,
};
use crate::session_guards::{AdminUser, CompanyScope};

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct OfficeUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
}

fn db_error(e: diesel::result::Error) -> response::status::Custom<Json<ErrorResponse>> {
    error!("Office API database error: {:?}", e);
    response::status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse { error: "Database error".to_string() }),
    )
}

fn not_found(id: i32) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::NotFound,
        Json(ErrorResponse { error: format!("No office with id {}", id) }),
    )
}

/// Fetches an office and checks it belongs to the scope company. Every
/// layout and booking handler goes through this gate.
pub(crate) async fn scoped_office(
    db: &DbConn,
    scope_company_id: i32,
    id: i32,
) -> Result<Office, response::status::Custom<Json<ErrorResponse>>> {
    let office = db
        .run(move |conn| get_office_by_id(conn, id))
        .await
        .map_err(db_error)?;
    match office {
        Some(o) if o.company_id == scope_company_id => Ok(o),
        _ => Err(not_found(id)),
    }
}

/// List Offices endpoint.
///
/// - **URL:** `/api/1/Offices`
/// - **Method:** `GET`
/// - **Purpose:** All offices of the scope company
/// - **Authentication:** Required
#[get("/1/Offices")]
pub async fn list_offices(db: DbConn, scope: CompanyScope) -> Result<Json<Vec<Office>>, Status> {
    let company_id = scope.company_id;
    db.run(move |conn| {
        get_offices_for_company(conn, company_id).map(Json).map_err(|e| {
            error!("Error listing offices: {:?}", e);
            Status::InternalServerError
        })
    })
    .await
}

/// Create Office endpoint.
///
/// - **URL:** `/api/1/Offices`
/// - **Method:** `POST`
/// - **Purpose:** Creates an office in the scope company
/// - **Authentication:** Admin required
#[post("/1/Offices", data = "<new_office>")]
pub async fn create_office(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    new_office: Json<OfficeInput>,
) -> Result<status::Created<Json<Office>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = new_office.into_inner();
    if input.name.trim().is_empty() {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: "Office name is required".to_string() }),
        ));
    }

    let company_id = scope.company_id;
    db.run(move |conn| insert_office(conn, company_id, input.name, input.address))
        .await
        .map(|office| status::Created::new("/").body(Json(office)))
        .map_err(db_error)
}

/// Update Office endpoint.
///
/// - **URL:** `/api/1/Offices/<id>`
/// - **Method:** `PATCH`
/// - **Authentication:** Admin required (scoped)
#[patch("/1/Offices/<id>", data = "<changes>")]
pub async fn patch_office(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
    changes: Json<OfficeUpdate>,
) -> Result<Json<Office>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, id).await?;

    let input = changes.into_inner();
    db.run(move |conn| update_office(conn, id, input.name, input.address))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Delete Office endpoint.
///
/// - **URL:** `/api/1/Offices/<id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Deletes an office and, through the FK cascade, all of
///   its zones, assets, and their bookings
/// - **Authentication:** Admin required (scoped)
#[delete("/1/Offices/<id>")]
pub async fn remove_office(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
) -> Result<Status, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, id).await?;

    let deleted = db.run(move |conn| delete_office(conn, id)).await.map_err(db_error)?;
    if deleted { Ok(Status::NoContent) } else { Err(not_found(id)) }
}

pub fn routes() -> Vec<Route> {
    routes![list_offices, create_office, patch_office, remove_office]
}
