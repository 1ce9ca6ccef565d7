//! API endpoints for bookings: create, cancel, check in, the office and
//! roster queries, and the SSE change feed.

use chrono::{NaiveDate, Utc};
use rocket::Route;
use rocket::Shutdown;
use rocket::http::Status;
use rocket::response::stream::{Event, EventStream};
use rocket::response::{self, status};
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use serde::Serialize;
use ts_rs::TS;

use crate::api::asset::scoped_asset;
use crate::api::office::scoped_office;
use crate::feed::{BookingEvent, BookingFeed};
use crate::models::booking::{BookingInput, BookingWithDetails, CheckInResponse, TeamPresence};
use crate::orm::DbConn;
use crate::orm::booking::{
    BookingError, booking_with_details, bookings_for_office_date, cancel_booking, check_in,
    create_booking, get_booking_by_id, team_presence, user_booking_for_date,
};
use crate::session_guards::CompanyScope;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn db_error(e: diesel::result::Error) -> response::status::Custom<Json<ErrorResponse>> {
    error!("Booking API database error: {:?}", e);
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

/// Maps the conflict taxonomy onto HTTP. Both conflicts carry their
/// human-readable message through to the client verbatim.
fn map_booking_error(e: BookingError) -> response::status::Custom<Json<ErrorResponse>> {
    match e {
        BookingError::AlreadyBookedByUser { .. } | BookingError::AssetAlreadyTaken { .. } => {
            response::status::Custom(Status::Conflict, Json(ErrorResponse { error: e.to_string() }))
        }
        BookingError::NotFound => response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse { error: "Booking not found".to_string() }),
        ),
        BookingError::Db(inner) => db_error(inner),
    }
}

/// Query-string dates arrive as `YYYY-MM-DD`; an absent date means the
/// server's current day.
fn parse_date(date: Option<String>) -> Result<NaiveDate, response::status::Custom<Json<ErrorResponse>>> {
    match date {
        None => Ok(Utc::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            response::status::Custom(
                Status::UnprocessableEntity,
                Json(ErrorResponse { error: format!("Invalid date '{}'", s) }),
            )
        }),
    }
}

/// List Bookings endpoint.
///
/// - **URL:** `/api/1/Bookings?office_id=<id>&date=<YYYY-MM-DD>`
/// - **Method:** `GET`
/// - **Purpose:** All bookings of an office for a date, with the joined
///   display fields the map needs. Date defaults to today.
/// - **Authentication:** Required
#[get("/1/Bookings?<office_id>&<date>")]
pub async fn list_bookings(
    db: DbConn,
    scope: CompanyScope,
    office_id: i32,
    date: Option<String>,
) -> Result<Json<Vec<BookingWithDetails>>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, office_id).await.map_err(office_error)?;
    let date = parse_date(date)?;

    db.run(move |conn| bookings_for_office_date(conn, office_id, date))
        .await
        .map(Json)
        .map_err(db_error)
}

/// Today's Bookings endpoint.
///
/// - **URL:** `/api/1/Bookings/Today?office_id=<id>`
/// - **Method:** `GET`
/// - **Purpose:** Shorthand for the list endpoint pinned to the server's
///   current day; what the map loads on open
/// - **Authentication:** Required
#[get("/1/Bookings/Today?<office_id>")]
pub async fn todays_bookings(
    db: DbConn,
    scope: CompanyScope,
    office_id: i32,
) -> Result<Json<Vec<BookingWithDetails>>, response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, office_id).await.map_err(office_error)?;
    let date = Utc::now().date_naive();

    db.run(move |conn| bookings_for_office_date(conn, office_id, date))
        .await
        .map(Json)
        .map_err(db_error)
}

/// My Booking endpoint.
///
/// - **URL:** `/api/1/Bookings/Mine?date=<YYYY-MM-DD>`
/// - **Method:** `GET`
/// - **Purpose:** The requester's booking for the date (default today),
///   or `null` when they have none
/// - **Authentication:** Required
#[get("/1/Bookings/Mine?<date>")]
pub async fn my_booking(
    db: DbConn,
    scope: CompanyScope,
    date: Option<String>,
) -> Result<Json<Option<BookingWithDetails>>, response::status::Custom<Json<ErrorResponse>>> {
    let date = parse_date(date)?;
    let user_id = scope.user.id;

    db.run(move |conn| {
        let booking = user_booking_for_date(conn, user_id, date)?;
        match booking {
            Some(b) => booking_with_details(conn, b.id),
            None => Ok(None),
        }
    })
    .await
    .map(Json)
    .map_err(db_error)
}

/// Create Booking endpoint.
///
/// - **URL:** `/api/1/Bookings`
/// - **Method:** `POST`
/// - **Purpose:** Books an asset for the requester on a date (default
///   today). Publishes an `inserted` event on the change feed.
/// - **Authentication:** Required
///
/// # Request Format
///
/// ```json
/// { "asset_id": 12, "date": "2026-09-03" }
/// ```
///
/// # Returns
/// * `201` with the joined booking record
/// * `409` when the requester already booked that day, or the asset is taken
/// * `404` when the asset is not visible in this scope
#[post("/1/Bookings", data = "<new_booking>")]
pub async fn create_booking_endpoint(
    db: DbConn,
    scope: CompanyScope,
    feed: &rocket::State<BookingFeed>,
    new_booking: Json<BookingInput>,
) -> Result<status::Created<Json<BookingWithDetails>>, response::status::Custom<Json<ErrorResponse>>>
{
    let input = new_booking.into_inner();
    scoped_asset(&db, scope.company_id, input.asset_id).await.map_err(|_| {
        response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse { error: format!("No asset with id {}", input.asset_id) }),
        )
    })?;

    let date = input.date.unwrap_or_else(|| Utc::now().date_naive());
    let user_id = scope.user.id;
    let asset_id = input.asset_id;

    let details = db
        .run(move |conn| {
            let booking = create_booking(conn, user_id, asset_id, date)?;
            booking_with_details(conn, booking.id).map_err(BookingError::Db)
        })
        .await
        .map_err(map_booking_error)?
        .ok_or_else(|| db_error(diesel::result::Error::NotFound))?;

    feed.publish(BookingEvent::Inserted { booking: details.clone() });
    Ok(status::Created::new("/").body(Json(details)))
}

/// Cancel Booking endpoint.
///
/// - **URL:** `/api/1/Bookings/<id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Cancels the requester's own booking and publishes a
///   `deleted` event. Someone else's booking answers 404, not 403.
/// - **Authentication:** Required
#[delete("/1/Bookings/<id>")]
pub async fn cancel_booking_endpoint(
    db: DbConn,
    scope: CompanyScope,
    feed: &rocket::State<BookingFeed>,
    id: i32,
) -> Result<Status, response::status::Custom<Json<ErrorResponse>>> {
    let user_id = scope.user.id;
    let (booking, office_id) = db
        .run(move |conn| {
            let booking = cancel_booking(conn, id, user_id)?;
            let asset = crate::orm::asset::get_asset_by_id(conn, booking.asset_id)
                .map_err(BookingError::Db)?
                .ok_or(BookingError::NotFound)?;
            Ok::<_, BookingError>((booking, asset.office_id))
        })
        .await
        .map_err(map_booking_error)?;

    feed.publish(BookingEvent::Deleted {
        booking_id: booking.id,
        asset_id: booking.asset_id,
        office_id,
        date: booking.date,
    });
    Ok(Status::NoContent)
}

/// Check In endpoint.
///
/// - **URL:** `/api/1/Bookings/<id>/CheckIn`
/// - **Method:** `POST`
/// - **Purpose:** Marks the requester's booking checked in. Idempotent; a
///   repeat answers the existing state with `already_checked_in: true`.
///   Publishes an `updated` event on a first check-in.
/// - **Authentication:** Required
#[post("/1/Bookings/<id>/CheckIn")]
pub async fn check_in_endpoint(
    db: DbConn,
    scope: CompanyScope,
    feed: &rocket::State<BookingFeed>,
    id: i32,
) -> Result<Json<CheckInResponse>, response::status::Custom<Json<ErrorResponse>>> {
    let user_id = scope.user.id;
    let (result, office_id) = db
        .run(move |conn| {
            let booking = get_booking_by_id(conn, id)
                .map_err(BookingError::Db)?
                .filter(|b| b.user_id == user_id)
                .ok_or(BookingError::NotFound)?;
            let result = check_in(conn, booking.id)?;
            let asset = crate::orm::asset::get_asset_by_id(conn, booking.asset_id)
                .map_err(BookingError::Db)?
                .ok_or(BookingError::NotFound)?;
            Ok::<_, BookingError>((result, asset.office_id))
        })
        .await
        .map_err(map_booking_error)?;

    if !result.already_checked_in {
        feed.publish(BookingEvent::Updated {
            booking_id: result.booking.id,
            asset_id: result.booking.asset_id,
            office_id,
            date: result.booking.date,
        });
    }
    Ok(Json(result))
}

/// Booking Events endpoint.
///
/// - **URL:** `/api/1/Bookings/Events?office_id=<id>&date=<YYYY-MM-DD>`
/// - **Method:** `GET` (Server-Sent Events)
/// - **Purpose:** Streams booking changes for one office and date as they
///   happen. Each event is the JSON form of a feed event; a lagged client
///   is told to refetch instead of receiving a gap silently.
/// - **Authentication:** Required
#[get("/1/Bookings/Events?<office_id>&<date>")]
pub async fn booking_events(
    db: DbConn,
    scope: CompanyScope,
    feed: &rocket::State<BookingFeed>,
    office_id: i32,
    date: Option<String>,
    mut end: Shutdown,
) -> Result<EventStream![], response::status::Custom<Json<ErrorResponse>>> {
    scoped_office(&db, scope.company_id, office_id).await.map_err(office_error)?;
    let date = parse_date(date)?;
    let mut rx = feed.subscribe();

    Ok(EventStream! {
        loop {
            let event = select! {
                received = rx.recv() => match received {
                    Ok(event) => event,
                    Err(RecvError::Lagged(_)) => {
                        yield Event::empty().event("refetch");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut end => break,
            };
            if event.office_id() == office_id && event.date() == date {
                yield Event::json(&event);
            }
        }
    })
}

/// Team Today endpoint.
///
/// - **URL:** `/api/1/TeamToday?date=<YYYY-MM-DD>`
/// - **Method:** `GET`
/// - **Purpose:** The "who's in" roster: every active profile of the scope
///   company merged with its booking for the date, if any
/// - **Authentication:** Required
#[get("/1/TeamToday?<date>")]
pub async fn team_today(
    db: DbConn,
    scope: CompanyScope,
    date: Option<String>,
) -> Result<Json<Vec<TeamPresence>>, response::status::Custom<Json<ErrorResponse>>> {
    let date = parse_date(date)?;
    let company_id = scope.company_id;

    db.run(move |conn| team_presence(conn, company_id, date))
        .await
        .map(Json)
        .map_err(db_error)
}

pub fn routes() -> Vec<Route> {
    routes![
        list_bookings,
        todays_bookings,
        my_booking,
        create_booking_endpoint,
        cancel_booking_endpoint,
        check_in_endpoint,
        booking_events,
        team_today,
    ]
}
