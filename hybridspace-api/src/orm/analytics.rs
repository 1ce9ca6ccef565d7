//! Occupancy aggregates for the company dashboard. Display-only numbers
//! computed in Rust over date-ranged queries; nothing here feeds back
//! into booking decisions.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{bookings, users};

/// How many ISO weeks the trend looks back.
pub const TREND_WEEKS: i64 = 6;

/// Booking counts per weekday (Monday through Sunday) over the trend
/// window.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeekdayBreakdown {
    /// Seven counters, index 0 = Monday.
    pub counts: [i64; 7],
}

/// One point of the weekly trend.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeekPoint {
    /// Monday of the ISO week.
    #[ts(type = "string")]
    pub week_start: NaiveDate,
    pub bookings: i64,
}

/// Both dashboard charts in one payload.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompanyAnalytics {
    pub weekday: WeekdayBreakdown,
    pub weekly_trend: Vec<WeekPoint>,
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// All booking dates for a company's users inside the trend window.
fn booking_dates(
    conn: &mut SqliteConnection,
    company_id: i32,
    since: NaiveDate,
) -> Result<Vec<NaiveDate>, diesel::result::Error> {
    bookings::table
        .inner_join(users::table)
        .filter(users::company_id.eq(company_id))
        .filter(bookings::date.ge(since))
        .select(bookings::date)
        .load(conn)
}

/// Computes the weekday breakdown and weekly trend for one company,
/// looking back [`TREND_WEEKS`] ISO weeks from today.
pub fn company_analytics(
    conn: &mut SqliteConnection,
    company_id: i32,
) -> Result<CompanyAnalytics, diesel::result::Error> {
    let today = Utc::now().date_naive();
    company_analytics_as_of(conn, company_id, today)
}

/// Same as [`company_analytics`] with an injectable reference date.
pub fn company_analytics_as_of(
    conn: &mut SqliteConnection,
    company_id: i32,
    today: NaiveDate,
) -> Result<CompanyAnalytics, diesel::result::Error> {
    let window_start = monday_of(today) - Duration::weeks(TREND_WEEKS - 1);
    let dates = booking_dates(conn, company_id, window_start)?;

    let mut counts = [0i64; 7];
    for date in &dates {
        counts[date.weekday().num_days_from_monday() as usize] += 1;
    }

    let weekly_trend = (0..TREND_WEEKS)
        .map(|i| {
            let week_start = window_start + Duration::weeks(i);
            let week_end = week_start + Duration::days(7);
            let bookings = dates.iter().filter(|d| **d >= week_start && **d < week_end).count();
            WeekPoint { week_start, bookings: bookings as i64 }
        })
        .collect();

    Ok(CompanyAnalytics { weekday: WeekdayBreakdown { counts }, weekly_trend })
}
