use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};

use crate::schema::password_resets;

/// One-shot password reset token. Spent (or expired) tokens stay in the
/// table for auditing, marked `used`.
#[derive(Queryable, Identifiable, Debug)]
#[diesel(table_name = password_resets)]
#[diesel(primary_key(token))]
pub struct PasswordReset {
    pub token: String,
    pub user_id: i32,
    pub expires_at: NaiveDateTime,
    pub used: bool,
}

#[derive(Insertable)]
#[diesel(table_name = password_resets)]
pub struct NewPasswordReset {
    pub token: String,
    pub user_id: i32,
    pub expires_at: NaiveDateTime,
    pub used: bool,
}
