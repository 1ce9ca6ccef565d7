//! One-shot password reset tokens, same lifecycle as magic links.
//!
//! A token is issued only for an existing active profile, lives for an
//! hour, and is burned on first use. Spending one replaces the password
//! hash and revokes every open session of the account, so a stolen
//! cookie dies with the old password.

use chrono::Utc;
use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewPasswordReset, PasswordReset, User};
use crate::orm::login::hash_password;
use crate::schema::{password_resets, sessions, users};

pub const PASSWORD_RESET_TTL_MINUTES: i64 = 60;

#[derive(Debug, Error)]
pub enum PasswordResetError {
    /// No active profile for the address. Surfaced rather than silently
    /// swallowed, matching the magic-link path.
    #[error("No account found for this email")]
    UnknownEmail,
    #[error("This reset link is invalid or has expired")]
    InvalidOrExpired,
    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),
}

/// Issues a fresh reset token for the active profile behind `email`.
pub fn issue_password_reset(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<PasswordReset, PasswordResetError> {
    let user = users::table
        .filter(users::email.eq(email))
        .filter(users::active.eq(true))
        .first::<User>(conn)
        .optional()?
        .ok_or(PasswordResetError::UnknownEmail)?;

    let new_reset = NewPasswordReset {
        token: Uuid::new_v4().to_string(),
        user_id: user.id,
        expires_at: Utc::now().naive_utc()
            + chrono::Duration::minutes(PASSWORD_RESET_TTL_MINUTES),
        used: false,
    };

    diesel::insert_into(password_resets::table)
        .values(&new_reset)
        .execute(conn)?;

    password_resets::table
        .filter(password_resets::token.eq(&new_reset.token))
        .first::<PasswordReset>(conn)
        .map_err(Into::into)
}

/// Spends a token and sets the new password, returning the user it
/// belongs to. The token is marked used, the hash replaced, and all of
/// the account's sessions revoked inside one transaction.
pub fn reset_password(
    conn: &mut SqliteConnection,
    token: &str,
    new_password: &str,
) -> Result<User, PasswordResetError> {
    let token = token.to_string();
    let new_hash = hash_password(new_password);
    conn.immediate_transaction(|conn| {
        let reset = password_resets::table
            .filter(password_resets::token.eq(&token))
            .first::<PasswordReset>(conn)
            .optional()?
            .ok_or(PasswordResetError::InvalidOrExpired)?;

        if reset.used || reset.expires_at < Utc::now().naive_utc() {
            return Err(PasswordResetError::InvalidOrExpired);
        }

        let user = users::table
            .filter(users::id.eq(reset.user_id))
            .filter(users::active.eq(true))
            .first::<User>(conn)
            .optional()?
            .ok_or(PasswordResetError::InvalidOrExpired)?;

        diesel::update(password_resets::table.filter(password_resets::token.eq(&token)))
            .set(password_resets::used.eq(true))
            .execute(conn)?;

        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(users::password_hash.eq(&new_hash))
            .execute(conn)?;

        diesel::update(sessions::table.filter(sessions::user_id.eq(user.id)))
            .set(sessions::revoked.eq(true))
            .execute(conn)?;

        Ok(user)
    })
}
