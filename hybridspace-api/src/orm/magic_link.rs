//! One-shot login tokens, the passwordless path into a session.
//!
//! A token is issued only for an existing active profile, lives for
//! fifteen minutes, and is burned on first use. Consuming one ends in
//! [`crate::orm::login::create_and_store_session`] like a password login.

use chrono::Utc;
use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{MagicLink, NewMagicLink, User};
use crate::schema::{magic_links, users};

pub const MAGIC_LINK_TTL_MINUTES: i64 = 15;

#[derive(Debug, Error)]
pub enum MagicLinkError {
    /// No active profile for the address. Magic links never create
    /// accounts, so this is surfaced rather than silently swallowed.
    #[error("No account found for this email")]
    UnknownEmail,
    #[error("This sign-in link is invalid or has expired")]
    InvalidOrExpired,
    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),
}

/// Issues a fresh token for the active profile behind `email`.
pub fn issue_magic_link(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<MagicLink, MagicLinkError> {
    let user = users::table
        .filter(users::email.eq(email))
        .filter(users::active.eq(true))
        .first::<User>(conn)
        .optional()?
        .ok_or(MagicLinkError::UnknownEmail)?;

    let new_link = NewMagicLink {
        token: Uuid::new_v4().to_string(),
        user_id: user.id,
        expires_at: Utc::now().naive_utc() + chrono::Duration::minutes(MAGIC_LINK_TTL_MINUTES),
        used: false,
    };

    diesel::insert_into(magic_links::table)
        .values(&new_link)
        .execute(conn)?;

    magic_links::table
        .filter(magic_links::token.eq(&new_link.token))
        .first::<MagicLink>(conn)
        .map_err(Into::into)
}

/// Consumes a token, returning the user it belongs to. The token is
/// marked used inside the same transaction, so it opens one session at
/// most.
pub fn consume_magic_link(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<User, MagicLinkError> {
    let token = token.to_string();
    conn.immediate_transaction(|conn| {
        let link = magic_links::table
            .filter(magic_links::token.eq(&token))
            .first::<MagicLink>(conn)
            .optional()?
            .ok_or(MagicLinkError::InvalidOrExpired)?;

        if link.used || link.expires_at < Utc::now().naive_utc() {
            return Err(MagicLinkError::InvalidOrExpired);
        }

        diesel::update(magic_links::table.filter(magic_links::token.eq(&token)))
            .set(magic_links::used.eq(true))
            .execute(conn)?;

        let user = users::table
            .filter(users::id.eq(link.user_id))
            .filter(users::active.eq(true))
            .first::<User>(conn)
            .optional()?
            .ok_or(MagicLinkError::InvalidOrExpired)?;

        Ok(user)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInput;
    use crate::orm::company::insert_company;
    use crate::orm::login::hash_password;
    use crate::orm::testing::setup_test_db;
    use crate::orm::user::{insert_user, set_user_active};

    fn seeded_user(conn: &mut SqliteConnection) -> User {
        let company = insert_company(conn, "Acme".to_string(), "free", None).unwrap();
        insert_user(
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
        .unwrap()
    }

    #[test]
    fn issue_and_consume_once() {
        let mut conn = setup_test_db();
        let user = seeded_user(&mut conn);

        let link = issue_magic_link(&mut conn, "ana@acme.test").unwrap();
        assert_eq!(link.user_id, user.id);

        let signed_in = consume_magic_link(&mut conn, &link.token).unwrap();
        assert_eq!(signed_in.id, user.id);

        let err = consume_magic_link(&mut conn, &link.token).unwrap_err();
        assert!(matches!(err, MagicLinkError::InvalidOrExpired));
    }

    #[test]
    fn unknown_email_does_not_issue() {
        let mut conn = setup_test_db();
        seeded_user(&mut conn);
        assert!(matches!(
            issue_magic_link(&mut conn, "stranger@acme.test"),
            Err(MagicLinkError::UnknownEmail)
        ));
    }

    #[test]
    fn deactivated_profile_cannot_use_the_path() {
        let mut conn = setup_test_db();
        let user = seeded_user(&mut conn);
        let link = issue_magic_link(&mut conn, "ana@acme.test").unwrap();

        set_user_active(&mut conn, user.id, false).unwrap();

        // Neither fresh issuance nor a pre-issued token works.
        assert!(matches!(
            issue_magic_link(&mut conn, "ana@acme.test"),
            Err(MagicLinkError::UnknownEmail)
        ));
        assert!(matches!(
            consume_magic_link(&mut conn, &link.token),
            Err(MagicLinkError::InvalidOrExpired)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut conn = setup_test_db();
        seeded_user(&mut conn);
        let link = issue_magic_link(&mut conn, "ana@acme.test").unwrap();

        diesel::update(magic_links::table.filter(magic_links::token.eq(&link.token)))
            .set(magic_links::expires_at.eq(Utc::now().naive_utc() - chrono::Duration::minutes(1)))
            .execute(&mut conn)
            .unwrap();

        assert!(matches!(
            consume_magic_link(&mut conn, &link.token),
            Err(MagicLinkError::InvalidOrExpired)
        ));
    }
}
