//! API endpoints for password login and the authentication check.

use rocket::response;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Route, http::CookieJar, serde::json::Json};
use ts_rs::TS;

use crate::DbConn;
use crate::orm::company::get_company_by_id;
use crate::orm::login::process_login;
use crate::session_guards::AuthenticatedUser;

/// Error response structure for authentication failures.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Login success response structure containing the signed-in profile.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub company_id: i32,
    pub company_name: String,
    pub avatar: String,
}

/// Builds the profile payload both login paths and the session check
/// return, so the client sees one shape everywhere.
pub(crate) async fn build_user_response(db: &DbConn, user: crate::models::User) -> LoginSuccessResponse {
    let company_id = user.company_id;
    let company_name = match db.run(move |conn| get_company_by_id(conn, company_id)).await {
        Ok(Some(company)) => company.name,
        _ => "Unknown Company".to_string(),
    };

    LoginSuccessResponse {
        user_id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        company_id: user.company_id,
        company_name,
        avatar: user.avatar,
    }
}

/// Login request structure containing user credentials.
#[derive(Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login endpoint that authenticates users and creates sessions.
///
/// - **URL:** `/api/1/Login`
/// - **Method:** `POST`
/// - **Purpose:** Authenticates by email and password, sets a session cookie
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// { "email": "user@example.com", "password": "userpassword" }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):** the signed-in profile, with a `session`
/// cookie set (HTTP-only, SameSite=Lax).
///
/// **Failure (HTTP 401 Unauthorized):**
/// ```json
/// { "error": "Invalid credentials" }
/// ```
///
/// Deactivated accounts receive the same generic 401 as wrong passwords.
#[post("/1/Login", data = "<login>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    login: Json<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    match process_login(&db, cookies, &login).await {
        Ok((_status, user)) => Ok(Json(build_user_response(&db, user).await)),
        Err(status) => {
            let err_json = Json(ErrorResponse { error: "Invalid credentials".to_string() });
            Err(response::status::Custom(status, err_json))
        }
    }
}

/// Session Check endpoint.
///
/// - **URL:** `/api/1/Session`
/// - **Method:** `GET`
/// - **Purpose:** Returns the profile behind the current session cookie
/// - **Authentication:** Required
#[get("/1/Session")]
pub async fn session_check(db: DbConn, auth_user: AuthenticatedUser) -> Json<LoginSuccessResponse> {
    Json(build_user_response(&db, auth_user.user).await)
}

pub fn routes() -> Vec<Route> {
    routes![login, session_check]
}
