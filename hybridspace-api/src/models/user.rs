use diesel::{Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::users;

/// The three access levels a profile can hold. Stored as text in the
/// `users.role` column; anything unrecognized is treated as `Employee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Employee,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn parse(s: &str) -> Role {
        match s {
            "admin" => Role::Admin,
            "superadmin" => Role::Superadmin,
            _ => Role::Employee,
        }
    }
}

#[derive(Deserialize, Queryable, Identifiable, QueryableByName, Debug, Serialize, Clone, TS)]
#[diesel(table_name = users)]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String, // Will be unique
    pub password_hash: String,
    pub role: String,
    pub company_id: i32,
    pub team_id: Option<i32>,
    pub active: bool,
    /// Display initials derived from the name at creation time.
    pub avatar: String,
}

impl User {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    /// Admins and superadmins both clear the admin bar.
    pub fn is_admin(&self) -> bool {
        matches!(self.role(), Role::Admin | Role::Superadmin)
    }

    pub fn is_superadmin(&self) -> bool {
        self.role() == Role::Superadmin
    }
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub company_id: i32,
    pub team_id: Option<i32>,
    pub active: bool,
    pub avatar: String,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub company_id: i32,
    pub team_id: Option<i32>,
}

/// Profile joined with its (optional) team, for company rosters.
/// The team really is optional, a profile may belong to no team.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserWithTeam {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub team_id: Option<i32>,
    pub active: bool,
    pub avatar: String,
    pub team_name: Option<String>,
    pub team_color: Option<String>,
}

/// Computes the avatar initials for a display name: first letter of the
/// first and last word, uppercased. Single-word names yield one letter.
pub fn avatar_initials(name: &str) -> String {
    let mut words = name.split_whitespace().filter(|w| !w.is_empty());
    let first = words.next().and_then(|w| w.chars().next());
    let last = words.last().and_then(|w| w.chars().next());
    match (first, last) {
        (Some(f), Some(l)) => format!("{}{}", f, l).to_uppercase(),
        (Some(f), None) => f.to_uppercase().to_string(),
        _ => "?".to_string(),
    }
}
