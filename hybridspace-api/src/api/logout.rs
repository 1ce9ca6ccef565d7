//! API endpoint for ending a session.

use rocket::http::{Cookie, CookieJar, Status};
use rocket::{Route, serde::json::Json};
use serde::Serialize;

use crate::DbConn;
use crate::orm::logout::revoke_session;
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize)]
pub struct LogoutResponse {
    message: String,
}

/// Logout endpoint.
///
/// - **URL:** `/api/1/Logout`
/// - **Method:** `POST`
/// - **Purpose:** Revokes the current session and clears the cookie
/// - **Authentication:** Required
///
/// Revoking the session row also retires any superadmin scope override it
/// carried.
#[post("/1/Logout")]
pub async fn logout(
    db: DbConn,
    cookies: &CookieJar<'_>,
    auth_user: AuthenticatedUser,
) -> Result<Json<LogoutResponse>, Status> {
    revoke_session(&db, &auth_user.session.id).await.map_err(|e| {
        error!("Failed to revoke session: {:?}", e);
        Status::InternalServerError
    })?;

    cookies.remove(Cookie::from("session"));

    Ok(Json(LogoutResponse { message: "Logged out".to_string() }))
}

pub fn routes() -> Vec<Route> {
    routes![logout]
}
