//! API endpoints for the invitation flow.
//!
//! Admins issue invitations against their plan's seat limit; the invitee
//! previews and accepts through the token alone, no session required, and
//! comes out the other side signed in.

use rocket::Route;
use rocket::http::{CookieJar, Status};
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::api::login::LoginSuccessResponse;
use crate::models::{AcceptInviteInput, Invitation, InvitationInput, InvitePreview};
use crate::orm::DbConn;
use crate::orm::invitation::{
    InvitationError, accept_invitation, create_invitation, get_invitations_for_company,
    preview_invitation,
};
use crate::orm::login::{create_and_store_session, set_session_cookie};
use crate::session_guards::{AdminUser, CompanyScope};

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn map_error(e: InvitationError) -> response::status::Custom<Json<ErrorResponse>> {
    let (status, message) = match &e {
        InvitationError::SeatLimitExceeded { .. } => (Status::Conflict, e.to_string()),
        InvitationError::EmailTaken => (Status::Conflict, e.to_string()),
        InvitationError::InvalidOrExpired => (Status::Gone, e.to_string()),
        InvitationError::NotFound => (Status::NotFound, "Not found".to_string()),
        InvitationError::Db(inner) => {
            error!("Invitation database error: {:?}", inner);
            (Status::InternalServerError, "Database error".to_string())
        }
    };
    response::status::Custom(status, Json(ErrorResponse { error: message }))
}

/// List Invitations endpoint.
///
/// - **URL:** `/api/1/Invitations`
/// - **Method:** `GET`
/// - **Purpose:** All invitations issued by the scope company, newest first
/// - **Authentication:** Admin required
#[get("/1/Invitations")]
pub async fn list_invitations(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
) -> Result<Json<Vec<Invitation>>, Status> {
    let company_id = scope.company_id;
    db.run(move |conn| {
        get_invitations_for_company(conn, company_id).map(Json).map_err(|e| {
            error!("Error listing invitations: {:?}", e);
            Status::InternalServerError
        })
    })
    .await
}

/// Create Invitation endpoint.
///
/// - **URL:** `/api/1/Invitations`
/// - **Method:** `POST`
/// - **Purpose:** Issues an invitation under the scope company
/// - **Authentication:** Admin required
///
/// # Request Format
///
/// ```json
/// { "email": "newhire@acme.test", "role": "employee" }
/// ```
///
/// # Returns
/// * `201` with the invitation (the token goes into the invite link)
/// * `409` when every plan seat is occupied by an active user
/// * `422` on an empty email or an unassignable role
#[post("/1/Invitations", data = "<new_invitation>")]
pub async fn create_invitation_endpoint(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    new_invitation: Json<InvitationInput>,
) -> Result<status::Created<Json<Invitation>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = new_invitation.into_inner();
    if input.email.trim().is_empty() {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: "Email is required".to_string() }),
        ));
    }
    let role = input.role.unwrap_or_else(|| "employee".to_string());
    if role != "employee" && role != "admin" {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: format!("Role '{}' cannot be invited", role) }),
        ));
    }

    let company_id = scope.company_id;
    db.run(move |conn| create_invitation(conn, company_id, &input.email, &role))
        .await
        .map(|invitation| status::Created::new("/").body(Json(invitation)))
        .map_err(map_error)
}

/// Preview Invitation endpoint.
///
/// - **URL:** `/api/1/Invitations/<token>`
/// - **Method:** `GET`
/// - **Purpose:** What the acceptance form shows: invited email, role, and
///   company name
/// - **Authentication:** None required (the token is the credential)
///
/// **Failure (HTTP 410 Gone):** unknown, used, or expired token. The
/// three cases are indistinguishable on purpose.
#[get("/1/Invitations/<token>")]
pub async fn preview_invitation_endpoint(
    db: DbConn,
    token: String,
) -> Result<Json<InvitePreview>, response::status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| preview_invitation(conn, &token))
        .await
        .map(Json)
        .map_err(map_error)
}

/// Accept Invitation endpoint.
///
/// - **URL:** `/api/1/Invitations/<token>/Accept`
/// - **Method:** `POST`
/// - **Purpose:** Redeems the token, creates the account, and signs the
///   new user in
/// - **Authentication:** None required (the token is the credential)
///
/// # Request Format
///
/// ```json
/// { "name": "New Hire", "password": "hunter2" }
/// ```
#[post("/1/Invitations/<token>/Accept", data = "<acceptance>")]
pub async fn accept_invitation_endpoint(
    db: DbConn,
    cookies: &CookieJar<'_>,
    token: String,
    acceptance: Json<AcceptInviteInput>,
) -> Result<status::Created<Json<LoginSuccessResponse>>, response::status::Custom<Json<ErrorResponse>>>
{
    let input = acceptance.into_inner();
    if input.name.trim().is_empty() || input.password.is_empty() {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: "Name and password are required".to_string() }),
        ));
    }

    let user = db
        .run(move |conn| accept_invitation(conn, &token, &input.name, &input.password))
        .await
        .map_err(map_error)?;

    let session_token = create_and_store_session(&db, user.id).await.map_err(|status| {
        response::status::Custom(status, Json(ErrorResponse { error: "Database error".to_string() }))
    })?;
    set_session_cookie(cookies, &session_token);

    let body = crate::api::login::build_user_response(&db, user).await;
    Ok(status::Created::new("/").body(Json(body)))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_invitations,
        create_invitation_endpoint,
        preview_invitation_endpoint,
        accept_invitation_endpoint,
    ]
}
