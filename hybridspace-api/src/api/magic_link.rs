//! API endpoints for passwordless sign-in.
//!
//! The issue endpoint returns the token in the response body. Wiring it
//! to an email sender is a deployment concern; the API contract is the
//! same either way.

use rocket::http::{CookieJar, Status};
use rocket::response;
use rocket::{Route, serde::json::Json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::api::login::LoginSuccessResponse;
use crate::orm::login::{create_and_store_session, set_session_cookie};
use crate::orm::magic_link::{MagicLinkError, consume_magic_link, issue_magic_link};

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct MagicLinkRequest {
    pub email: String,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct MagicLinkIssued {
    pub token: String,
}

fn map_error(e: MagicLinkError) -> response::status::Custom<Json<ErrorResponse>> {
    let (status, message) = match &e {
        MagicLinkError::UnknownEmail => (Status::NotFound, e.to_string()),
        MagicLinkError::InvalidOrExpired => (Status::Gone, e.to_string()),
        MagicLinkError::Db(inner) => {
            error!("Magic link database error: {:?}", inner);
            (Status::InternalServerError, "Database error".to_string())
        }
    };
    response::status::Custom(status, Json(ErrorResponse { error: message }))
}

/// Request Magic Link endpoint.
///
/// - **URL:** `/api/1/MagicLink`
/// - **Method:** `POST`
/// - **Purpose:** Issues a one-shot sign-in token for an existing profile
/// - **Authentication:** None required
///
/// # Response
///
/// **Failure (HTTP 404 Not Found):** no active profile for the address.
/// Sign-up happens through invitations or company registration, never
/// through this endpoint.
#[post("/1/MagicLink", data = "<req>")]
pub async fn request_magic_link(
    db: DbConn,
    req: Json<MagicLinkRequest>,
) -> Result<Json<MagicLinkIssued>, response::status::Custom<Json<ErrorResponse>>> {
    let email = req.email.clone();
    let link = db
        .run(move |conn| issue_magic_link(conn, &email))
        .await
        .map_err(map_error)?;

    Ok(Json(MagicLinkIssued { token: link.token }))
}

/// Consume Magic Link endpoint.
///
/// - **URL:** `/api/1/MagicLink/<token>`
/// - **Method:** `GET`
/// - **Purpose:** Burns the token and opens a session for its owner
/// - **Authentication:** None required (the token is the credential)
///
/// **Failure (HTTP 410 Gone):** unknown, used, or expired token.
#[get("/1/MagicLink/<token>")]
pub async fn consume_link(
    db: DbConn,
    cookies: &CookieJar<'_>,
    token: String,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    let user = db
        .run(move |conn| consume_magic_link(conn, &token))
        .await
        .map_err(map_error)?;

    let session_token = create_and_store_session(&db, user.id).await.map_err(|status| {
        response::status::Custom(status, Json(ErrorResponse { error: "Database error".to_string() }))
    })?;
    set_session_cookie(cookies, &session_token);

    Ok(Json(crate::api::login::build_user_response(&db, user).await))
}

pub fn routes() -> Vec<Route> {
    routes![request_magic_link, consume_link]
}
