use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::invitations;

/// A token-capability invite: the bearer of an unused, unexpired token may
/// create an account under the issuing company. `expired` is derived from
/// `expires_at`, never stored.
#[derive(
    Queryable, Identifiable, Associations, QueryableByName, Debug, Serialize, Deserialize, Clone, TS,
)]
#[diesel(belongs_to(crate::models::company::Company))]
#[diesel(table_name = invitations)]
#[ts(export)]
pub struct Invitation {
    pub id: i32,
    pub company_id: i32,
    pub email: String,
    pub role: String,
    pub token: String,
    #[ts(type = "string")]
    pub expires_at: NaiveDateTime,
    pub used: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = invitations)]
pub struct NewInvitation {
    pub company_id: i32,
    pub email: String,
    pub role: String,
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub used: bool,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct InvitationInput {
    pub email: String,
    /// Defaults to `employee`.
    pub role: Option<String>,
}

/// What the acceptance form needs to render, without leaking the row.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvitePreview {
    pub email: String,
    pub role: String,
    pub company_name: String,
}

/// Acceptance payload: the invitee picks a display name and password.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct AcceptInviteInput {
    pub name: String,
    pub password: String,
}
