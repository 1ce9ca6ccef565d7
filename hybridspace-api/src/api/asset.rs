//! API endpoints for bookable assets (desks and rooms).

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::api::office::scoped_office;
use crate::models::{Asset, AssetInput, AssetKind, AssetUpdate};
use crate::models::asset::AssetWithZone;
use crate::orm::DbConn;
use crate::orm::asset::{
    delete_asset, get_asset_by_id, get_assets_with_zones, insert_asset, update_asset,
};
use crate::session_guards::{AdminUser, CompanyScope};

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn db_error(e: diesel::result::Error) -> response::status::Custom<Json<ErrorResponse>> {
    error!("Asset API database error: {:?}", e);
    response::status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse { error: "Database error".to_string() }),
    )
}

fn office_error(
    e: response::status::Custom<Json<crate::api::office::ErrorResponse>>,
) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(e.0, Json(ErrorResponse { error: e.1.into_inner().error }))
}

fn not_found(id: i32) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::NotFound,
        Json(ErrorResponse { error: format!("No asset with id {}", id) }),
    )
}

/// Fetches an asset and checks its office belongs to the scope company.
pub(crate) async fn scoped_asset(
    db: &DbConn,
    scope_company_id: i32,
    id: i32,
) -> Result<Asset, response::status::Custom<Json<ErrorResponse>>> {
    let asset = db
        .run(move |conn| get_asset_by_id(conn, id))
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(id))?;
    scoped_office(db, scope_company_id, asset.office_id)
        .await
        .map_err(|_| not_found(id))?;
    Ok(asset)
}

/// List Assets endpoint.
///
/// - **URL:** `/api/1/Offices/<office_id>/Assets`
/// - **Method:** `GET`
/// - **Purpose:** All desks and rooms of an office with their zone join
/// - **Authentication:** Required
#[get("/1/Offices/<office_id>/Assets")]
pub async fn list_assets(
    db: DbConn,
    scope: CompanyScope,
    office_id: i32,
) -> Result<Json<Vec<AssetWithZone>>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, office_id).await.map_err(office_error)?;

    db.run(move |conn| get_assets_with_zones(conn, office_id))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Create Asset endpoint.
///
/// - **URL:** `/api/1/Offices/<office_id>/Assets`
/// - **Method:** `POST`
/// - **Purpose:** Places a desk or room on the floor plan. Desks are
///   auto-named `D-NN`; rooms must be named by the caller. The position is
///   snapped and zone membership inferred from it.
/// - **Authentication:** Admin required (scoped)
///
/// # Request Format
///
/// ```json
/// { "kind": "desk", "coord_x": 120, "coord_y": 80 }
/// ```
#[post("/1/Offices/<office_id>/Assets", data = "<new_asset>")]
pub async fn create_asset(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    office_id: i32,
    new_asset: Json<AssetInput>,
) -> Result<status::Created<Json<Asset>>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, office_id).await.map_err(office_error)?;

    let input = new_asset.into_inner();
    if input.kind == AssetKind::Room
        && input.name.as_deref().map(str::trim).unwrap_or("").is_empty()
    {
        return Err(response::status::Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse { error: "Room name is required".to_string() }),
        ));
    }

    db.run(move |conn| insert_asset(conn, office_id, &input))
        .await
        .map(|asset| status::Created::new("/").body(Json(asset)))
        .map_err(db_error)
}

/// Update Asset endpoint.
///
/// - **URL:** `/api/1/Assets/<id>`
/// - **Method:** `PATCH`
/// - **Purpose:** Renames or moves an asset. Moving snaps the position and
///   re-infers zone membership; a plain rename leaves the zone alone.
/// - **Authentication:** Admin required (scoped)
#[patch("/1/Assets/<id>", data = "<changes>")]
pub async fn patch_asset(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
    changes: Json<AssetUpdate>,
) -> Result<Json<Asset>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_asset(&db, scope.company_id, id).await?;

    let input = changes.into_inner();
    db.run(move |conn| update_asset(conn, id, &input))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Delete Asset endpoint.
///
/// - **URL:** `/api/1/Assets/<id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Removes an asset and, through the FK cascade, its
///   bookings. Desk numbers are never reused.
/// - **Authentication:** Admin required (scoped)
#[delete("/1/Assets/<id>")]
pub async fn remove_asset(
    db: DbConn,
    scope: CompanyScope,
    _admin: AdminUser,
    id: i32,
) -> Result<Status, response::status::Custom<Json<ErrorResponse>>> {
    scoped_asset(&db, scope.company_id, id).await?;

    let deleted = db.run(move |conn| delete_asset(conn, id)).await.map_err(db_error)?;
    if deleted { Ok(Status::NoContent) } else { Err(not_found(id)) }
}

pub fn routes() -> Vec<Route> {
    routes![list_assets, create_asset, patch_asset, remove_asset]
}
