//! API endpoints for floor-plan zones.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::api::office::scoped_office;
use crate::layout;
use crate::models::{Zone, ZoneInput, ZoneUpdate, ZoneWithTeam};
use crate::orm::DbConn;
use crate::orm::zone::{
    delete_zone, get_zone_by_id, get_zones_with_teams, insert_zone, update_zone,
};
use crate::session_guards::{AdminUser, CompanyScope};

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn db_error(e: diesel::result::Error) -> response::status::Custom<Json<ErrorResponse>> {
    error!("Zone API database error: {:?}", e);
    response::status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse { error: "Database error".to_string() }),
    )
}

fn not_found(id: i32) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::NotFound,
        Json(ErrorResponse { error: format!("No zone with id {}", id) }),
    )
}

fn office_error(
    e: response::status::Custom<Json<crate::api::office::ErrorResponse>>,
) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(e.0, Json(ErrorResponse { error: e.1.into_inner().error }))
}

fn unprocessable(msg: &str) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::UnprocessableEntity,
        Json(ErrorResponse { error: msg.to_string() }),
    )
}

/// Fetches a zone and checks its office belongs to the scope company.
async fn scoped_zone(
    db: &DbConn,
    scope_company_id: i32,
    id: i32,
) -> Result<Zone, response::status::Custom<Json<ErrorResponse>>> {
    let zone = db
        .run(move |conn| get_zone_by_id(conn, id))
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(id))?;
    scoped_office(db, scope_company_id, zone.office_id)
        .await
        .map_err(|_| not_found(id))?;
    Ok(zone)
}

/// List Zones endpoint.
///
/// - **URL:** `/api/1/Offices/<office_id>/Zones`
/// - **Method:** `GET`
/// - **Purpose:** All zones of an office with their team join, ordered by label
/// - **Authentication:** Required
#[get("/1/Offices/<office_id>/Zones")]
pub async fn list_zones(
    db: DbConn,
    scope: CompanyScope,
    office_id: i32,
) -> Result<Json<Vec<ZoneWithTeam>>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, office_id).await.map_err(office_error)?;

    db.run(move |conn| get_zones_with_teams(conn, office_id))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Create Zone endpoint.
///
/// - **URL:** `/api/1/Offices/<office_id>/Zones`
/// - **Method:** `POST`
/// - **Purpose:** Creates a zone from a drag rectangle. The letter label is
///   assigned server-side and coordinates are snapped to the grid.
/// - **Authentication:** Admin required (scoped)
///
/// # Request Format
///
/// ```json
/// { "name": "Engineering", "coord_x": 40, "coord_y": 40, "coord_w": 200, "coord_h": 160 }
/// ```
///
/// Rectangles smaller than the minimum zone size are rejected with 422,
/// matching the editor which refuses to finish such a drag.
#[post("/1/Offices/<office_id>/Zones", data = "<new_zone>")]
pub async fn create_zone(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    office_id: i32,
    new_zone: Json<ZoneInput>,
) -> Result<status::Created<Json<Zone>>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, office_id).await.map_err(office_error)?;

    let input = new_zone.into_inner();
    if input.name.trim().is_empty() {
        return Err(unprocessable("Zone name is required"));
    }
    if layout::normalized_rect(
        input.coord_x,
        input.coord_y,
        input.coord_x + input.coord_w,
        input.coord_y + input.coord_h,
    )
    .is_none()
    {
        return Err(unprocessable(&format!(
            "Zone must be at least {}x{}",
            layout::MIN_ZONE_SIZE,
            layout::MIN_ZONE_SIZE
        )));
    }
    if let Some(team_id) = input.team_id {
        let scope_company_id = scope.company_id;
        let team = db
            .run(move |conn| crate::orm::team::get_team_by_id(conn, team_id))
            .await
            .map_err(db_error)?;
        match team {
            Some(t) if t.company_id == scope_company_id => {}
            _ => {
                return Err(response::status::Custom(
                    Status::NotFound,
                    Json(ErrorResponse { error: format!("No team with id {}", team_id) }),
                ));
            }
        }
    }

    db.run(move |conn| insert_zone(conn, office_id, &input))
        .await
        .map(|zone| status::Created::new("/").body(Json(zone)))
        .map_err(db_error)
}

/// Update Zone endpoint.
///
/// - **URL:** `/api/1/Zones/<id>`
/// - **Method:** `PATCH`
/// - **Purpose:** Partial update. The label is immutable; moves are snapped;
///   `"team_id": null` clears the team assignment.
/// - **Authentication:** Admin required (scoped)
#[patch("/1/Zones/<id>", data = "<changes>")]
pub async fn patch_zone(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
    changes: Json<ZoneUpdate>,
) -> Result<Json<Zone>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_zone(&db, scope.company_id, id).await?;

    let input = changes.into_inner();
    if let Some(Some(team_id)) = input.team_id {
        let scope_company_id = scope.company_id;
        let team = db
            .run(move |conn| crate::orm::team::get_team_by_id(conn, team_id))
            .await
            .map_err(db_error)?;
        match team {
            Some(t) if t.company_id == scope_company_id => {}
            _ => {
                return Err(response::status::Custom(
                    Status::NotFound,
                    Json(ErrorResponse { error: format!("No team with id {}", team_id) }),
                ));
            }
        }
    }

    db.run(move |conn| update_zone(conn, id, &input))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Delete Zone endpoint.
///
/// - **URL:** `/api/1/Zones/<id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Deletes a zone. Assets inside it become zone-less rather
///   than disappearing, and the letter label is freed for reuse.
/// - **Authentication:** Admin required (scoped)
#[delete("/1/Zones/<id>")]
pub async fn remove_zone(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
) -> Result<Status, response::status::Custom<Json<ErrorResponse>>> {
    scoped_zone(&db, scope.company_id, id).await?;

    let deleted = db.run(move |conn| delete_zone(conn, id)).await.map_err(db_error)?;
    if deleted { Ok(Status::NoContent) } else { Err(not_found(id)) }
}

pub fn routes() -> Vec<Route> {
    routes![list_zones, create_zone, patch_zone, remove_zone]
}
