//! Invitation issuance and acceptance.
//!
//! An invitation is a bearer capability: whoever presents an unused,
//! unexpired token may create exactly one account under the issuing
//! company. Issuance enforces the plan's seat limit; acceptance runs in a
//! single transaction so a token can never mint two accounts.

use chrono::Utc;
use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Invitation, InvitePreview, NewInvitation, User, UserInput};
use crate::orm::company::{count_active_users, get_company_by_id};
use crate::orm::login::hash_password;
use crate::orm::user::insert_user;
use crate::schema::invitations;

/// Invitations expire this many days after issuance.
pub const INVITE_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum InvitationError {
    /// Every seat the plan grants is occupied by an active user.
    #[error("All {max_users} seats on your plan are in use")]
    SeatLimitExceeded { max_users: i32 },
    #[error("This invitation is invalid or has expired")]
    InvalidOrExpired,
    /// The invited email already has an account.
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),
}

/// Issues an invitation for `email` to join `company_id` with `role`.
///
/// Counts active users against the company's seat limit first; at or over
/// the limit nothing is written. Deactivated users do not hold a seat, so
/// deactivating someone frees one.
pub fn create_invitation(
    conn: &mut SqliteConnection,
    company_id: i32,
    email: &str,
    role: &str,
) -> Result<Invitation, InvitationError> {
    conn.immediate_transaction(|conn| {
        let company = get_company_by_id(conn, company_id)?.ok_or(InvitationError::NotFound)?;

        let active = count_active_users(conn, company_id)?;
        if active >= i64::from(company.max_users) {
            return Err(InvitationError::SeatLimitExceeded { max_users: company.max_users });
        }

        let new_invitation = NewInvitation {
            company_id,
            email: email.to_string(),
            role: role.to_string(),
            token: Uuid::new_v4().to_string(),
            expires_at: Utc::now().naive_utc() + chrono::Duration::days(INVITE_TTL_DAYS),
            used: false,
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(invitations::table)
            .values(&new_invitation)
            .execute(conn)?;

        invitations::table
            .order(invitations::id.desc())
            .first::<Invitation>(conn)
            .map_err(Into::into)
    })
}

pub fn get_invitations_for_company(
    conn: &mut SqliteConnection,
    company_id: i32,
) -> Result<Vec<Invitation>, diesel::result::Error> {
    invitations::table
        .filter(invitations::company_id.eq(company_id))
        .order(invitations::created_at.desc())
        .load::<Invitation>(conn)
}

fn find_valid(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Invitation, InvitationError> {
    let invitation = invitations::table
        .filter(invitations::token.eq(token))
        .first::<Invitation>(conn)
        .optional()?
        .ok_or(InvitationError::InvalidOrExpired)?;

    if invitation.used || invitation.expires_at < Utc::now().naive_utc() {
        return Err(InvitationError::InvalidOrExpired);
    }
    Ok(invitation)
}

/// Validates a token and returns what the acceptance form needs. Used and
/// expired tokens are indistinguishable from unknown ones.
pub fn preview_invitation(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<InvitePreview, InvitationError> {
    let invitation = find_valid(conn, token)?;
    let company =
        get_company_by_id(conn, invitation.company_id)?.ok_or(InvitationError::InvalidOrExpired)?;

    Ok(InvitePreview {
        email: invitation.email,
        role: invitation.role,
        company_name: company.name,
    })
}

/// Redeems a token: re-validates, creates the user under the issuing
/// company with the invited role, and marks the token used, all in one
/// transaction. A second acceptance of the same token fails
/// [`InvitationError::InvalidOrExpired`].
pub fn accept_invitation(
    conn: &mut SqliteConnection,
    token: &str,
    name: &str,
    password: &str,
) -> Result<User, InvitationError> {
    let name = name.to_string();
    let password_hash = hash_password(password);

    conn.immediate_transaction(|conn| {
        let invitation = find_valid(conn, token)?;

        let user = insert_user(
            conn,
            UserInput {
                name,
                email: invitation.email.clone(),
                password_hash,
                role: invitation.role.clone(),
                company_id: invitation.company_id,
                team_id: None,
            },
        )
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => InvitationError::EmailTaken,
            other => InvitationError::Db(other),
        })?;

        diesel::update(invitations::table.filter(invitations::id.eq(invitation.id)))
            .set(invitations::used.eq(true))
            .execute(conn)?;

        Ok(user)
    })
}
