use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewOffice, Office};
use crate::schema::offices;

pub fn insert_office(
    conn: &mut SqliteConnection,
    company_id: i32,
    name: String,
    address: String,
) -> Result<Office, diesel::result::Error> {
    let new_office = NewOffice {
        company_id,
        name,
        address,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(offices::table)
        .values(&new_office)
        .execute(conn)?;

    offices::table.order(offices::id.desc()).first::<Office>(conn)
}

pub fn get_office_by_id(
    conn: &mut SqliteConnection,
    office_id: i32,
) -> Result<Option<Office>, diesel::result::Error> {
    offices::table
        .filter(offices::id.eq(office_id))
        .first::<Office>(conn)
        .optional()
}

pub fn get_offices_for_company(
    conn: &mut SqliteConnection,
    company_id: i32,
) -> Result<Vec<Office>, diesel::result::Error> {
    offices::table
        .filter(offices::company_id.eq(company_id))
        .order(offices::name.asc())
        .load::<Office>(conn)
}

pub fn update_office(
    conn: &mut SqliteConnection,
    office_id: i32,
    name: Option<String>,
    address: Option<String>,
) -> Result<Office, diesel::result::Error> {
    let current = offices::table.filter(offices::id.eq(office_id)).first::<Office>(conn)?;

    diesel::update(offices::table.filter(offices::id.eq(office_id)))
        .set((
            offices::name.eq(name.unwrap_or(current.name)),
            offices::address.eq(address.unwrap_or(current.address)),
        ))
        .execute(conn)?;

    offices::table.filter(offices::id.eq(office_id)).first::<Office>(conn)
}

/// Delete an office. Its zones and assets go with it through the FK
/// cascade. Returns Ok(true) if deleted, Ok(false) if not found.
pub fn delete_office(
    conn: &mut SqliteConnection,
    office_id: i32,
) -> Result<bool, diesel::result::Error> {
    let rows = diesel::delete(offices::table.filter(offices::id.eq(office_id))).execute(conn)?;
    Ok(rows > 0)
}
