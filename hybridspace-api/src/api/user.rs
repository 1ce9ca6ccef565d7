//! API endpoints for company profiles.

use rocket::Route;
use rocket::http::Status;
use rocket::response;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::{User, UserWithTeam};
use crate::orm::DbConn;
use crate::orm::user::{
    get_user_by_id, get_users_for_company, set_user_active, set_user_role, set_user_team,
};
use crate::session_guards::{AdminUser, CompanyScope};

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ActiveToggle {
    pub active: bool,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct RoleChange {
    pub role: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TeamAssignment {
    pub team_id: Option<i32>,
}

fn db_error(e: diesel::result::Error) -> response::status::Custom<Json<ErrorResponse>> {
    error!("User API database error: {:?}", e);
    response::status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse { error: "Database error".to_string() }),
    )
}

fn not_found(id: i32) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::NotFound,
        Json(ErrorResponse { error: format!("No user with id {}", id) }),
    )
}

/// Fetches the target user and checks it belongs to the scope company.
async fn scoped_user(
    db: &DbConn,
    scope_company_id: i32,
    id: i32,
) -> Result<User, response::status::Custom<Json<ErrorResponse>>> {
    let user = db
        .run(move |conn| get_user_by_id(conn, id))
        .await
        .map_err(db_error)?;
    match user {
        Some(u) if u.company_id == scope_company_id => Ok(u),
        _ => Err(not_found(id)),
    }
}

/// List Users endpoint.
///
/// - **URL:** `/api/1/Users`
/// - **Method:** `GET`
/// - **Purpose:** All profiles of the scope company with their team join
/// - **Authentication:** Required
#[get("/1/Users")]
pub async fn list_users(db: DbConn, scope: CompanyScope) -> Result<Json<Vec<UserWithTeam>>, Status> {
    let company_id = scope.company_id;
    db.run(move |conn| {
        get_users_for_company(conn, company_id).map(Json).map_err(|e| {
            error!("Error listing users: {:?}", e);
            Status::InternalServerError
        })
    })
    .await
}

/// Toggle User Active endpoint.
///
/// - **URL:** `/api/1/Users/<id>/Active`
/// - **Method:** `PUT`
/// - **Purpose:** Activates or deactivates a profile. Deactivation frees a
///   plan seat and locks the account out on its next request.
/// - **Authentication:** Admin required (scoped)
#[put("/1/Users/<id>/Active", data = "<toggle>")]
pub async fn toggle_active(
    db: DbConn,
    scope: CompanyScope,
    admin: AdminUser,
    id: i32,
    toggle: Json<ActiveToggle>,
) -> Result<Json<User>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_user(&db, scope.company_id, id).await?;

    if admin.user.id == id && !toggle.active {
        return Err(response::status::Custom(
            Status::Conflict,
            Json(ErrorResponse { error: "You cannot deactivate your own account".to_string() }),
        ));
    }

    let active = toggle.active;
    db.run(move |conn| set_user_active(conn, id, active))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Change User Role endpoint.
///
/// - **URL:** `/api/1/Users/<id>/Role`
/// - **Method:** `PUT`
/// - **Purpose:** Switches a profile between `employee` and `admin`
/// - **Authentication:** Admin required (scoped)
///
/// The `superadmin` role is not assignable here; it belongs to the
/// platform operator, not to tenants.
#[put("/1/Users/<id>/Role", data = "<change>")]
pub async fn change_role(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
    change: Json<RoleChange>,
) -> Result<Json<User>, response::status::Custom<Json<ErrorResponse>>> {
    let role = change.role.clone();
    if role != "employee" && role != "admin" {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: format!("Role '{}' cannot be assigned", role) }),
        ));
    }

    let target = scoped_user(&db, scope.company_id, id).await?;
    if target.is_superadmin() {
        return Err(not_found(id));
    }

    db.run(move |conn| set_user_role(conn, id, &role))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Assign User Team endpoint.
///
/// - **URL:** `/api/1/Users/<id>/Team`
/// - **Method:** `PUT`
/// - **Purpose:** Puts a profile on a team, or takes it off with `null`
/// - **Authentication:** Admin required (scoped)
#[put("/1/Users/<id>/Team", data = "<assignment>")]
pub async fn assign_team(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
    assignment: Json<TeamAssignment>,
) -> Result<Json<User>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_user(&db, scope.company_id, id).await?;

    if let Some(team_id) = assignment.team_id {
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

    let team_id = assignment.team_id;
    db.run(move |conn| set_user_team(conn, id, team_id))
        .await
        .map(Json)
        .map_err(db_error)
}

pub fn routes() -> Vec<Route> {
    routes![list_users, toggle_active, change_role, assign_team]
}
