//! API endpoints for the SaaS company layer.
//!
//! Superadmins manage every tenant from here; everyone else can only read
//! the company they belong to.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::models::{Company, CompanyInput, CompanyUpdate, CompanyWithUsage, PlatformStats};
use crate::orm::DbConn;
use crate::orm::company::{
    get_companies_with_usage, get_company_by_id, get_company_by_name, get_platform_stats,
    insert_company, is_valid_plan, update_company,
};
use crate::session_guards::{CompanyScope, SuperadminUser};

/// Error response structure for company API failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// List Companies endpoint.
///
/// - **URL:** `/api/1/Companies`
/// - **Method:** `GET`
/// - **Purpose:** All tenants with their active-user counts
/// - **Authentication:** Superadmin required
#[get("/1/Companies")]
pub async fn list_companies(
    db: DbConn,
    _superadmin: SuperadminUser,
) -> Result<Json<Vec<CompanyWithUsage>>, Status> {
    db.run(|conn| {
        get_companies_with_usage(conn).map(Json).map_err(|e| {
            error!("Error listing companies: {:?}", e);
            Status::InternalServerError
        })
    })
    .await
}

/// Create Company endpoint.
///
/// - **URL:** `/api/1/Companies`
/// - **Method:** `POST`
/// - **Purpose:** Creates a new tenant company
/// - **Authentication:** Superadmin required
///
/// # Request Format
///
/// ```json
/// { "name": "Acme Widgets", "plan": "starter", "timezone": "Europe/Madrid" }
/// ```
///
/// # Returns
/// * `Ok(status::Created<Json<Company>>)` - Successfully created company
/// * `Err(Custom<Json<ErrorResponse>>)` - Duplicate name (409), bad plan (422), or DB error (500)
#[post("/1/Companies", data = "<new_company>")]
pub async fn create_company(
    db: DbConn,
    new_company: Json<CompanyInput>,
    _superadmin: SuperadminUser,
) -> Result<status::Created<Json<Company>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = new_company.into_inner();
    let plan = input.plan.unwrap_or_else(|| "free".to_string());

    if !is_valid_plan(&plan) {
        let err = Json(ErrorResponse { error: format!("Unknown plan '{}'", plan) });
        return Err(response::status::Custom(Status::UnprocessableEntity, err));
    }

    db.run(move |conn| {
        match get_company_by_name(conn, &input.name) {
            Ok(Some(_)) => {
                let err = Json(ErrorResponse {
                    error: format!("Company with name '{}' already exists", input.name),
                });
                return Err(response::status::Custom(Status::Conflict, err));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error checking for existing company: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while checking for existing company".to_string(),
                });
                return Err(response::status::Custom(Status::InternalServerError, err));
            }
        }

        insert_company(conn, input.name, &plan, input.timezone)
            .map(|comp| status::Created::new("/").body(Json(comp)))
            .map_err(|e| {
                error!("Error creating company: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while creating company".to_string(),
                });
                response::status::Custom(Status::InternalServerError, err)
            })
    })
    .await
}

/// Update Company endpoint.
///
/// - **URL:** `/api/1/Companies/<id>`
/// - **Method:** `PATCH`
/// - **Purpose:** Partial update of plan, seats, timezone, name, or the
///   active flag. Companies are never hard-deleted; deactivate instead.
/// - **Authentication:** Superadmin required
#[patch("/1/Companies/<id>", data = "<changes>")]
pub async fn patch_company(
    db: DbConn,
    id: i32,
    changes: Json<CompanyUpdate>,
    _superadmin: SuperadminUser,
) -> Result<Json<Company>, response::status::Custom<Json<ErrorResponse>>> {
    let input = changes.into_inner();

    if let Some(plan) = &input.plan {
        if !is_valid_plan(plan) {
            let err = Json(ErrorResponse { error: format!("Unknown plan '{}'", plan) });
            return Err(response::status::Custom(Status::UnprocessableEntity, err));
        }
    }

    db.run(move |conn| {
        update_company(conn, id, &input).map(Json).map_err(|e| match e {
            diesel::result::Error::NotFound => response::status::Custom(
                Status::NotFound,
                Json(ErrorResponse { error: format!("No company with id {}", id) }),
            ),
            other => {
                error!("Error updating company: {:?}", other);
                response::status::Custom(
                    Status::InternalServerError,
                    Json(ErrorResponse { error: "Database error while updating company".to_string() }),
                )
            }
        })
    })
    .await
}

/// Platform Stats endpoint.
///
/// - **URL:** `/api/1/PlatformStats`
/// - **Method:** `GET`
/// - **Purpose:** Platform-wide counters for the superadmin dashboard
/// - **Authentication:** Superadmin required
#[get("/1/PlatformStats")]
pub async fn platform_stats(
    db: DbConn,
    _superadmin: SuperadminUser,
) -> Result<Json<PlatformStats>, Status> {
    db.run(|conn| {
        get_platform_stats(conn).map(Json).map_err(|e| {
            error!("Error computing platform stats: {:?}", e);
            Status::InternalServerError
        })
    })
    .await
}

/// My Company endpoint.
///
/// - **URL:** `/api/1/Company`
/// - **Method:** `GET`
/// - **Purpose:** The company the request scopes to
/// - **Authentication:** Required
///
/// Under a superadmin scope override this returns the acted-as company,
/// which is what the impersonated dashboard should display.
#[get("/1/Company")]
pub async fn my_company(db: DbConn, scope: CompanyScope) -> Result<Json<Company>, Status> {
    let company_id = scope.company_id;
    db.run(move |conn| match get_company_by_id(conn, company_id) {
        Ok(Some(company)) => Ok(Json(company)),
        Ok(None) => Err(Status::NotFound),
        Err(e) => {
            error!("Error loading company: {:?}", e);
            Err(Status::InternalServerError)
        }
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![list_companies, create_company, patch_company, platform_stats, my_company]
}
