//! API endpoints for teams.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::models::{Team, TeamInput};
use crate::orm::DbConn;
use crate::orm::team::{delete_team, get_team_by_id, get_teams_for_company, insert_team, update_team};
use crate::session_guards::{AdminUser, CompanyScope};

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn db_error(e: diesel::result::Error) -> response::status::Custom<Json<ErrorResponse>> {
    error!("Team API database error: {:?}", e);
    response::status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse { error: "Database error".to_string() }),
    )
}

fn not_found(id: i32) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::NotFound,
        Json(ErrorResponse { error: format!("No team with id {}", id) }),
    )
}

async fn scoped_team(
    db: &DbConn,
    scope_company_id: i32,
    id: i32,
) -> Result<Team, response::status::Custom<Json<ErrorResponse>>> {
    let team = db
        .run(move |conn| get_team_by_id(conn, id))
        .await
        .map_err(db_error)?;
    match team {
        Some(t) if t.company_id == scope_company_id => Ok(t),
        _ => Err(not_found(id)),
    }
}

/// List Teams endpoint.
///
/// - **URL:** `/api/1/Teams`
/// - **Method:** `GET`
/// - **Purpose:** All teams of the scope company, ordered by name
/// - **Authentication:** Required
#[get("/1/Teams")]
pub async fn list_teams(db: DbConn, scope: CompanyScope) -> Result<Json<Vec<Team>>, Status> {
    let company_id = scope.company_id;
    db.run(move |conn| {
        get_teams_for_company(conn, company_id).map(Json).map_err(|e| {
            error!("Error listing teams: {:?}", e);
            Status::InternalServerError
        })
    })
    .await
}

/// Create Team endpoint.
///
/// - **URL:** `/api/1/Teams`
/// - **Method:** `POST`
/// - **Purpose:** Creates a team in the scope company
/// - **Authentication:** Admin required
#[post("/1/Teams", data = "<new_team>")]
pub async fn create_team(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    new_team: Json<TeamInput>,
) -> Result<status::Created<Json<Team>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = new_team.into_inner();
    if input.name.trim().is_empty() {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: "Team name is required".to_string() }),
        ));
    }

    let company_id = scope.company_id;
    db.run(move |conn| insert_team(conn, company_id, input.name, input.color))
        .await
        .map(|team| status::Created::new("/").body(Json(team)))
        .map_err(db_error)
}

/// Update Team endpoint.
///
/// - **URL:** `/api/1/Teams/<id>`
/// - **Method:** `PATCH`
/// - **Purpose:** Renames or recolors a team
/// - **Authentication:** Admin required (scoped)
#[patch("/1/Teams/<id>", data = "<changes>")]
pub async fn patch_team(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
    changes: Json<TeamUpdate>,
) -> Result<Json<Team>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_team(&db, scope.company_id, id).await?;

    let input = changes.into_inner();
    db.run(move |conn| update_team(conn, id, input.name, input.color))
        .await
        .map(Json)
        .map_err(db_error)
}

#[derive(serde::Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Delete Team endpoint.
///
/// - **URL:** `/api/1/Teams/<id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Deletes a team; members and zones keep existing without it
/// - **Authentication:** Admin required (scoped)
#[delete("/1/Teams/<id>")]
pub async fn remove_team(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
) -> Result<Status, response::status::Custom<Json<ErrorResponse>>> {
    scoped_team(&db, scope.company_id, id).await?;

    let deleted = db.run(move |conn| delete_team(conn, id)).await.map_err(db_error)?;
    if deleted { Ok(Status::NoContent) } else { Err(not_found(id)) }
}

pub fn routes() -> Vec<Route> {
    routes![list_teams, create_team, patch_team, remove_team]
}
