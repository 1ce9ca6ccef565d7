//! API endpoint for self-service company registration.

use rocket::http::{CookieJar, Status};
use rocket::response::{self, status};
use rocket::{Route, serde::json::Json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::api::login::LoginSuccessResponse;
use crate::models::UserInput;
use crate::orm::company::{get_company_by_name, insert_company, is_valid_plan};
use crate::orm::login::{create_and_store_session, hash_password, set_session_cookie};
use crate::orm::user::insert_user;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct RegisterRequest {
    pub company_name: String,
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `free`.
    pub plan: Option<String>,
}

/// Register Company endpoint.
///
/// - **URL:** `/api/1/Register`
/// - **Method:** `POST`
/// - **Purpose:** Creates a company and its first admin in one transaction,
///   then signs the admin in
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// {
///   "company_name": "Acme Widgets",
///   "name": "Ana Torres",
///   "email": "ana@acme.test",
///   "password": "secret"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):** the signed-in admin profile, with a
/// session cookie set.
///
/// **Failure (HTTP 409 Conflict):** company name or email already taken.
#[post("/1/Register", data = "<req>")]
pub async fn register_company(
    db: DbConn,
    cookies: &CookieJar<'_>,
    req: Json<RegisterRequest>,
) -> Result<status::Created<Json<LoginSuccessResponse>>, response::status::Custom<Json<ErrorResponse>>>
{
    let input = req.into_inner();

    if input.company_name.trim().is_empty()
        || input.name.trim().is_empty()
        || input.email.trim().is_empty()
        || input.password.trim().is_empty()
    {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: "All fields are required".to_string() }),
        ));
    }

    let plan = input.plan.clone().unwrap_or_else(|| "free".to_string());
    if !is_valid_plan(&plan) {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: format!("Unknown plan '{}'", plan) }),
        ));
    }

    let password_hash = hash_password(&input.password);
    let company_name = input.company_name.clone();
    let user_name = input.name.clone();
    let email = input.email.clone();

    let user = db
        .run(move |conn| {
            conn.immediate_transaction(|conn| {
                if get_company_by_name(conn, &company_name)?.is_some() {
                    return Ok(Err(format!(
                        "Company with name '{}' already exists",
                        company_name
                    )));
                }

                let company = insert_company(conn, company_name.clone(), &plan, None)?;
                let user = insert_user(
                    conn,
                    UserInput {
                        name: user_name,
                        email,
                        password_hash,
                        role: "admin".to_string(),
                        company_id: company.id,
                        team_id: None,
                    },
                )?;
                Ok(Ok(user))
            })
        })
        .await
        .map_err(|e: diesel::result::Error| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => response::status::Custom(
                Status::Conflict,
                Json(ErrorResponse { error: "An account with this email already exists".to_string() }),
            ),
            other => {
                error!("Error registering company: {:?}", other);
                response::status::Custom(
                    Status::InternalServerError,
                    Json(ErrorResponse { error: "Database error while registering".to_string() }),
                )
            }
        })?
        .map_err(|conflict| {
            response::status::Custom(Status::Conflict, Json(ErrorResponse { error: conflict }))
        })?;

    let session_token = create_and_store_session(&db, user.id).await.map_err(|status| {
        response::status::Custom(status, Json(ErrorResponse { error: "Database error".to_string() }))
    })?;
    set_session_cookie(cookies, &session_token);

    let body = crate::api::login::build_user_response(&db, user).await;
    Ok(status::Created::new("/").body(Json(body)))
}

pub fn routes() -> Vec<Route> {
    routes![register_company]
}
