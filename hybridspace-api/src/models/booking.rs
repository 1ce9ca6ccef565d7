use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::bookings;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CHECKED_IN: &str = "checked_in";

/// A reservation of one asset by one user for one calendar day.
///
/// Two invariants hold at all times, backed by unique indexes on the
/// bookings table: at most one booking per `(asset_id, date)` and at most
/// one per `(user_id, date)`.
#[derive(
    Queryable, Identifiable, Associations, QueryableByName, Debug, Serialize, Deserialize, Clone, TS,
)]
#[diesel(belongs_to(crate::models::asset::Asset))]
#[diesel(table_name = bookings)]
#[ts(export)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub asset_id: i32,
    #[ts(type = "string")]
    pub date: NaiveDate,
    /// `pending` until check-in; the transition is one-way.
    pub check_in_status: String,
    #[ts(type = "string | null")]
    pub checked_in_at: Option<NaiveDateTime>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn is_checked_in(&self) -> bool {
        self.check_in_status == STATUS_CHECKED_IN
    }
}

#[derive(Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    pub user_id: i32,
    pub asset_id: i32,
    pub date: NaiveDate,
    pub check_in_status: String,
    pub checked_in_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct BookingInput {
    pub asset_id: i32,
    /// Defaults to today (server date) when omitted.
    #[ts(type = "string | null")]
    pub date: Option<NaiveDate>,
}

/// Slim profile reference embedded in booking views.
#[derive(Debug, Serialize, Deserialize, Clone, TS)]
#[ts(export)]
pub struct UserRef {
    pub id: i32,
    pub name: String,
    pub avatar: String,
    pub team_id: Option<i32>,
}

/// Slim asset reference embedded in booking views. `zone_label` is `None`
/// for zone-less assets.
#[derive(Debug, Serialize, Deserialize, Clone, TS)]
#[ts(export)]
pub struct AssetRef {
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub office_id: i32,
    pub zone_label: Option<String>,
}

/// Booking with the joined display fields the map and rosters need.
#[derive(Debug, Serialize, Deserialize, Clone, TS)]
#[ts(export)]
pub struct BookingWithDetails {
    pub id: i32,
    pub user_id: i32,
    pub asset_id: i32,
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub check_in_status: String,
    #[ts(type = "string | null")]
    pub checked_in_at: Option<NaiveDateTime>,
    pub user: UserRef,
    pub asset: AssetRef,
}

/// One row of the "who's in today" roster: a company profile merged with
/// its booking for the queried date, if any.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamPresence {
    pub user_id: i32,
    pub name: String,
    pub avatar: String,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub team_color: Option<String>,
    /// `"office"` when a booking exists for the date, else `"none"`.
    pub status: String,
    pub desk: Option<String>,
    pub check_in_status: Option<String>,
}

/// Check-in result. `already_checked_in` distinguishes the idempotent
/// retry path (still a success) from a first check-in.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckInResponse {
    pub booking: Booking,
    pub already_checked_in: bool,
}
