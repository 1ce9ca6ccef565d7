use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};

use crate::schema::magic_links;

/// One-shot login token. Consumed (or expired) tokens stay in the table
/// for auditing, marked `used`.
#[derive(Queryable, Identifiable, Debug)]
#[diesel(table_name = magic_links)]
#[diesel(primary_key(token))]
pub struct MagicLink {
    pub token: String,
    pub user_id: i32,
    pub expires_at: NaiveDateTime,
    pub used: bool,
}

#[derive(Insertable)]
#[diesel(table_name = magic_links)]
pub struct NewMagicLink {
    pub token: String,
    pub user_id: i32,
    pub expires_at: NaiveDateTime,
    pub used: bool,
}
