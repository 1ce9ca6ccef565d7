//! The availability engine: conflict-checked booking creation, owner-only
//! cancellation, idempotent check-in, and the joined queries behind the
//! map and rosters.
//!
//! Both invariants (one booking per asset per day, one per user per day)
//! are checked inside an immediate transaction and additionally backed by
//! unique indexes. A constraint violation that still surfaces from the
//! insert is mapped back onto the matching conflict error, so callers see
//! the same taxonomy either way.

use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use crate::models::{
    Asset, Booking, NewBooking, User,
    booking::{AssetRef, BookingWithDetails, CheckInResponse, TeamPresence, UserRef,
              STATUS_CHECKED_IN, STATUS_PENDING},
};
use crate::schema::{assets, bookings, teams, users, zones};

#[derive(Debug, Error)]
pub enum BookingError {
    /// The requester already holds a booking for this date.
    #[error("You already have a booking for this date ({asset_name})")]
    AlreadyBookedByUser { asset_name: String },
    /// Someone else already holds this asset for this date.
    #[error("{asset_name} is already booked by {user_name} for this date")]
    AssetAlreadyTaken { asset_name: String, user_name: String },
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),
}

/// Creates a booking for `user_id` on `asset_id` at `date`.
///
/// Conflict checks run in order: the user's own double-booking first, then
/// the asset's availability, matching what a requester can act on (cancel
/// their own booking vs. pick another asset).
pub fn create_booking(
    conn: &mut SqliteConnection,
    user_id: i32,
    asset_id: i32,
    date: NaiveDate,
) -> Result<Booking, BookingError> {
    conn.immediate_transaction(|conn| {
        let asset = assets::table
            .filter(assets::id.eq(asset_id))
            .first::<Asset>(conn)
            .optional()?
            .ok_or(BookingError::NotFound)?;

        if let Some(own) = user_booking_for_date(conn, user_id, date)? {
            let held_asset = assets::table
                .filter(assets::id.eq(own.asset_id))
                .select(assets::name)
                .first::<String>(conn)?;
            return Err(BookingError::AlreadyBookedByUser { asset_name: held_asset });
        }

        if let Some(taken) = asset_booking_for_date(conn, asset_id, date)? {
            let holder = users::table
                .filter(users::id.eq(taken.user_id))
                .select(users::name)
                .first::<String>(conn)?;
            return Err(BookingError::AssetAlreadyTaken {
                asset_name: asset.name,
                user_name: holder,
            });
        }

        let new_booking = NewBooking {
            user_id,
            asset_id,
            date,
            check_in_status: STATUS_PENDING.to_string(),
            checked_in_at: None,
            created_at: Utc::now().naive_utc(),
        };

        let inserted = diesel::insert_into(bookings::table)
            .values(&new_booking)
            .execute(conn);

        match inserted {
            Ok(_) => {}
            // Raced past the checks into a unique index; report it as the
            // conflict it is rather than a bare 500.
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                return Err(map_raced_conflict(conn, user_id, asset_id, date, asset.name)?);
            }
            Err(e) => return Err(e.into()),
        }

        bookings::table
            .order(bookings::id.desc())
            .first::<Booking>(conn)
            .map_err(Into::into)
    })
}

/// After a unique violation, work out which invariant tripped.
fn map_raced_conflict(
    conn: &mut SqliteConnection,
    user_id: i32,
    asset_id: i32,
    date: NaiveDate,
    asset_name: String,
) -> Result<BookingError, diesel::result::Error> {
    if let Some(own) = user_booking_for_date(conn, user_id, date)? {
        let held_asset = assets::table
            .filter(assets::id.eq(own.asset_id))
            .select(assets::name)
            .first::<String>(conn)?;
        return Ok(BookingError::AlreadyBookedByUser { asset_name: held_asset });
    }
    let user_name = match asset_booking_for_date(conn, asset_id, date)? {
        Some(taken) => users::table
            .filter(users::id.eq(taken.user_id))
            .select(users::name)
            .first::<String>(conn)?,
        None => "another user".to_string(),
    };
    Ok(BookingError::AssetAlreadyTaken { asset_name, user_name })
}

/// Cancels a booking. Only the owner may cancel; a foreign booking id
/// reports NotFound, the same as a missing one, so existence is not
/// leaked.
pub fn cancel_booking(
    conn: &mut SqliteConnection,
    booking_id: i32,
    requester_id: i32,
) -> Result<Booking, BookingError> {
    let booking = bookings::table
        .filter(bookings::id.eq(booking_id))
        .first::<Booking>(conn)
        .optional()?;

    match booking {
        Some(b) if b.user_id == requester_id => {
            diesel::delete(bookings::table.filter(bookings::id.eq(booking_id))).execute(conn)?;
            Ok(b)
        }
        _ => Err(BookingError::NotFound),
    }
}

/// Marks a booking checked in. The transition is one-way; a second call
/// is answered with the existing state and `already_checked_in = true`
/// rather than an error, so a re-scan at the desk stays harmless.
pub fn check_in(
    conn: &mut SqliteConnection,
    booking_id: i32,
) -> Result<CheckInResponse, BookingError> {
    conn.immediate_transaction(|conn| {
        let booking = bookings::table
            .filter(bookings::id.eq(booking_id))
            .first::<Booking>(conn)
            .optional()?
            .ok_or(BookingError::NotFound)?;

        if booking.is_checked_in() {
            return Ok(CheckInResponse { booking, already_checked_in: true });
        }

        diesel::update(bookings::table.filter(bookings::id.eq(booking_id)))
            .set((
                bookings::check_in_status.eq(STATUS_CHECKED_IN),
                bookings::checked_in_at.eq(Some(Utc::now().naive_utc())),
            ))
            .execute(conn)?;

        let updated = bookings::table
            .filter(bookings::id.eq(booking_id))
            .first::<Booking>(conn)?;
        Ok(CheckInResponse { booking: updated, already_checked_in: false })
    })
}

pub fn get_booking_by_id(
    conn: &mut SqliteConnection,
    booking_id: i32,
) -> Result<Option<Booking>, diesel::result::Error> {
    bookings::table
        .filter(bookings::id.eq(booking_id))
        .first::<Booking>(conn)
        .optional()
}

pub fn user_booking_for_date(
    conn: &mut SqliteConnection,
    user_id: i32,
    date: NaiveDate,
) -> Result<Option<Booking>, diesel::result::Error> {
    bookings::table
        .filter(bookings::user_id.eq(user_id))
        .filter(bookings::date.eq(date))
        .first::<Booking>(conn)
        .optional()
}

pub fn asset_booking_for_date(
    conn: &mut SqliteConnection,
    asset_id: i32,
    date: NaiveDate,
) -> Result<Option<Booking>, diesel::result::Error> {
    bookings::table
        .filter(bookings::asset_id.eq(asset_id))
        .filter(bookings::date.eq(date))
        .first::<Booking>(conn)
        .optional()
}

type DetailRow = (Booking, (String, String, Option<i32>), (String, String, i32), Option<String>);

fn to_details(row: DetailRow) -> BookingWithDetails {
    let (booking, (user_name, avatar, team_id), (asset_name, kind, office_id), zone_label) = row;
    BookingWithDetails {
        id: booking.id,
        user_id: booking.user_id,
        asset_id: booking.asset_id,
        date: booking.date,
        check_in_status: booking.check_in_status,
        checked_in_at: booking.checked_in_at,
        user: UserRef { id: booking.user_id, name: user_name, avatar, team_id },
        asset: AssetRef { id: booking.asset_id, name: asset_name, kind, office_id, zone_label },
    }
}

/// All bookings for one office and date, with the joined display fields
/// the map needs.
pub fn bookings_for_office_date(
    conn: &mut SqliteConnection,
    office_id: i32,
    date: NaiveDate,
) -> Result<Vec<BookingWithDetails>, diesel::result::Error> {
    let rows: Vec<DetailRow> = bookings::table
        .inner_join(users::table)
        .inner_join(assets::table.left_join(zones::table))
        .filter(assets::office_id.eq(office_id))
        .filter(bookings::date.eq(date))
        .order(bookings::id.asc())
        .select((
            bookings::all_columns,
            (users::name, users::avatar, users::team_id),
            (assets::name, assets::kind, assets::office_id),
            zones::label.nullable(),
        ))
        .load(conn)?;

    Ok(rows.into_iter().map(to_details).collect())
}

/// One booking with details, as published on the change feed.
pub fn booking_with_details(
    conn: &mut SqliteConnection,
    booking_id: i32,
) -> Result<Option<BookingWithDetails>, diesel::result::Error> {
    let row: Option<DetailRow> = bookings::table
        .inner_join(users::table)
        .inner_join(assets::table.left_join(zones::table))
        .filter(bookings::id.eq(booking_id))
        .select((
            bookings::all_columns,
            (users::name, users::avatar, users::team_id),
            (assets::name, assets::kind, assets::office_id),
            zones::label.nullable(),
        ))
        .first(conn)
        .optional()?;

    Ok(row.map(to_details))
}

/// The "who's in today" roster: every active profile of the company,
/// merged with its booking for the date when one exists.
pub fn team_presence(
    conn: &mut SqliteConnection,
    company_id: i32,
    date: NaiveDate,
) -> Result<Vec<TeamPresence>, diesel::result::Error> {
    let profiles: Vec<(User, Option<(String, String)>)> = users::table
        .left_join(teams::table)
        .filter(users::company_id.eq(company_id))
        .filter(users::active.eq(true))
        .order(users::name.asc())
        .select((users::all_columns, (teams::name, teams::color).nullable()))
        .load(conn)?;

    let booked: Vec<(Booking, String)> = bookings::table
        .inner_join(users::table)
        .inner_join(assets::table)
        .filter(users::company_id.eq(company_id))
        .filter(bookings::date.eq(date))
        .select((bookings::all_columns, assets::name))
        .load(conn)?;

    Ok(profiles
        .into_iter()
        .map(|(user, team)| {
            let (team_name, team_color) = match team {
                Some((n, c)) => (Some(n), Some(c)),
                None => (None, None),
            };
            let booking = booked.iter().find(|(b, _)| b.user_id == user.id);
            TeamPresence {
                user_id: user.id,
                name: user.name,
                avatar: user.avatar,
                team_id: user.team_id,
                team_name,
                team_color,
                status: if booking.is_some() { "office" } else { "none" }.to_string(),
                desk: booking.map(|(_, desk)| desk.clone()),
                check_in_status: booking.map(|(b, _)| b.check_in_status.clone()),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetInput, AssetKind, UserInput};
    use crate::orm::asset::insert_asset;
    use crate::orm::company::insert_company;
    use crate::orm::login::hash_password;
    use crate::orm::office::insert_office;
    use crate::orm::testing::setup_test_db;
    use crate::orm::user::insert_user;

    struct Fixture {
        user: User,
        other_user: User,
        desk: Asset,
        other_desk: Asset,
        company_id: i32,
    }

    fn fixture(conn: &mut SqliteConnection) -> Fixture {
        let company = insert_company(conn, "Acme".to_string(), "free", None).unwrap();
        let office =
            insert_office(conn, company.id, "HQ".to_string(), "1 Main St".to_string()).unwrap();

        let user = insert_user(
            conn,
            UserInput {
                name: "Ana Torres".to_string(),
                email: "ana@acme.test".to_string(),
                password_hash: hash_password("pw"),
                role: "employee".to_string(),
                company_id: company.id,
                team_id: None,
            },
        )
        .unwrap();
        let other_user = insert_user(
            conn,
            UserInput {
                name: "Ben Okafor".to_string(),
                email: "ben@acme.test".to_string(),
                password_hash: hash_password("pw"),
                role: "employee".to_string(),
                company_id: company.id,
                team_id: None,
            },
        )
        .unwrap();

        let desk_input = |x| AssetInput {
            kind: AssetKind::Desk,
            name: None,
            coord_x: x,
            coord_y: 100,
            capacity: None,
        };
        let desk = insert_asset(conn, office.id, &desk_input(100)).unwrap();
        let other_desk = insert_asset(conn, office.id, &desk_input(140)).unwrap();

        Fixture { user, other_user, desk, other_desk, company_id: company.id }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
    }

    #[test]
    fn booking_starts_pending() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        let booking = create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();
        assert_eq!(booking.check_in_status, STATUS_PENDING);
        assert!(booking.checked_in_at.is_none());
    }

    #[test]
    fn asset_conflict_names_the_holder() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();
        let err = create_booking(&mut conn, fx.other_user.id, fx.desk.id, day(1)).unwrap_err();

        match err {
            BookingError::AssetAlreadyTaken { asset_name, user_name } => {
                assert_eq!(asset_name, "D-01");
                assert_eq!(user_name, "Ana Torres");
            }
            other => panic!("expected AssetAlreadyTaken, got {other:?}"),
        }

        // Same asset on another date is fine.
        create_booking(&mut conn, fx.other_user.id, fx.desk.id, day(2)).unwrap();
    }

    #[test]
    fn user_conflict_names_the_held_asset() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();
        let err = create_booking(&mut conn, fx.user.id, fx.other_desk.id, day(1)).unwrap_err();

        match err {
            BookingError::AlreadyBookedByUser { asset_name } => assert_eq!(asset_name, "D-01"),
            other => panic!("expected AlreadyBookedByUser, got {other:?}"),
        }
    }

    #[test]
    fn user_conflict_checked_before_asset_conflict() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        // Both conflicts apply at once; the user's own double-booking wins.
        create_booking(&mut conn, fx.user.id, fx.other_desk.id, day(1)).unwrap();
        create_booking(&mut conn, fx.other_user.id, fx.desk.id, day(1)).unwrap();

        let err = create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap_err();
        assert!(matches!(err, BookingError::AlreadyBookedByUser { .. }));
    }

    #[test]
    fn cancel_then_rebook_succeeds() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        let booking = create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();
        cancel_booking(&mut conn, booking.id, fx.user.id).unwrap();

        let rebooked = create_booking(&mut conn, fx.other_user.id, fx.desk.id, day(1)).unwrap();
        assert_eq!(rebooked.asset_id, fx.desk.id);
    }

    #[test]
    fn cancel_is_owner_only() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        let booking = create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();
        let err = cancel_booking(&mut conn, booking.id, fx.other_user.id).unwrap_err();
        assert!(matches!(err, BookingError::NotFound));

        // Booking still stands.
        assert!(get_booking_by_id(&mut conn, booking.id).unwrap().is_some());
    }

    #[test]
    fn check_in_is_idempotent() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        let booking = create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();

        let first = check_in(&mut conn, booking.id).unwrap();
        assert!(!first.already_checked_in);
        assert_eq!(first.booking.check_in_status, STATUS_CHECKED_IN);
        let stamped_at = first.booking.checked_in_at.expect("timestamp set");

        let second = check_in(&mut conn, booking.id).unwrap();
        assert!(second.already_checked_in);
        assert_eq!(second.booking.checked_in_at, Some(stamped_at));

        assert!(matches!(check_in(&mut conn, 9999), Err(BookingError::NotFound)));
    }

    #[test]
    fn office_date_query_joins_display_fields() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();
        create_booking(&mut conn, fx.other_user.id, fx.other_desk.id, day(1)).unwrap();
        create_booking(&mut conn, fx.user.id, fx.other_desk.id, day(2)).unwrap();

        let details = bookings_for_office_date(&mut conn, fx.desk.office_id, day(1)).unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].user.name, "Ana Torres");
        assert_eq!(details[0].user.avatar, "AT");
        assert_eq!(details[0].asset.name, "D-01");
        assert!(details[0].asset.zone_label.is_none());
    }

    #[test]
    fn presence_merges_profiles_with_bookings() {
        let mut conn = setup_test_db();
        let fx = fixture(&mut conn);

        create_booking(&mut conn, fx.user.id, fx.desk.id, day(1)).unwrap();

        let roster = team_presence(&mut conn, fx.company_id, day(1)).unwrap();
        assert_eq!(roster.len(), 2);

        let ana = roster.iter().find(|p| p.name == "Ana Torres").unwrap();
        assert_eq!(ana.status, "office");
        assert_eq!(ana.desk.as_deref(), Some("D-01"));
        assert_eq!(ana.check_in_status.as_deref(), Some(STATUS_PENDING));

        let ben = roster.iter().find(|p| p.name == "Ben Okafor").unwrap();
        assert_eq!(ben.status, "none");
        assert!(ben.desk.is_none());
    }
}
