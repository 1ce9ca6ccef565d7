//! API endpoints for the forgot-password flow.
//!
//! Like the magic-link module, the request endpoint returns the token in
//! the response body; wiring it to an email sender is a deployment
//! concern. Spending the token sets the new password and opens a fresh
//! session, so the user lands signed in.

use rocket::http::{CookieJar, Status};
use rocket::response;
use rocket::{Route, serde::json::Json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::api::login::LoginSuccessResponse;
use crate::orm::login::{create_and_store_session, set_session_cookie};
use crate::orm::password_reset::{PasswordResetError, issue_password_reset, reset_password};

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct PasswordResetIssued {
    pub token: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct NewPasswordInput {
    pub password: String,
}

fn map_error(e: PasswordResetError) -> response::status::Custom<Json<ErrorResponse>> {
    let (status, message) = match &e {
        PasswordResetError::UnknownEmail => (Status::NotFound, e.to_string()),
        PasswordResetError::InvalidOrExpired => (Status::Gone, e.to_string()),
        PasswordResetError::Db(inner) => {
            error!("Password reset database error: {:?}", inner);
            (Status::InternalServerError, "Database error".to_string())
        }
    };
    response::status::Custom(status, Json(ErrorResponse { error: message }))
}

/// Request Password Reset endpoint.
///
/// - **URL:** `/api/1/PasswordReset`
/// - **Method:** `POST`
/// - **Purpose:** Issues a one-shot reset token for an existing profile
/// - **Authentication:** None required
///
/// # Response
///
/// **Failure (HTTP 404 Not Found):** no active profile for the address.
#[post("/1/PasswordReset", data = "<req>")]
pub async fn request_password_reset(
    db: DbConn,
    req: Json<PasswordResetRequest>,
) -> Result<Json<PasswordResetIssued>, response::status::Custom<Json<ErrorResponse>>> {
    let email = req.email.clone();
    let reset = db
        .run(move |conn| issue_password_reset(conn, &email))
        .await
        .map_err(map_error)?;

    Ok(Json(PasswordResetIssued { token: reset.token }))
}

/// Reset Password endpoint.
///
/// - **URL:** `/api/1/PasswordReset/<token>`
/// - **Method:** `POST`
/// - **Purpose:** Burns the token, replaces the password, revokes every
///   open session of the account, and signs the user in
/// - **Authentication:** None required (the token is the credential)
///
/// # Request Format
///
/// ```json
/// { "password": "hunter3" }
/// ```
///
/// **Failure (HTTP 410 Gone):** unknown, used, or expired token.
#[post("/1/PasswordReset/<token>", data = "<new_password>")]
pub async fn reset_password_endpoint(
    db: DbConn,
    cookies: &CookieJar<'_>,
    token: String,
    new_password: Json<NewPasswordInput>,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    let input = new_password.into_inner();
    if input.password.is_empty() {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: "Password is required".to_string() }),
        ));
    }

    let user = db
        .run(move |conn| reset_password(conn, &token, &input.password))
        .await
        .map_err(map_error)?;

    let session_token = create_and_store_session(&db, user.id).await.map_err(|status| {
        response::status::Custom(status, Json(ErrorResponse { error: "Database error".to_string() }))
    })?;
    set_session_cookie(cookies, &session_token);

    Ok(Json(crate::api::login::build_user_response(&db, user).await))
}

pub fn routes() -> Vec<Route> {
    routes![request_password_reset, reset_password_endpoint]
}
