use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::companies;

/// Subscription plans a tenant company can be on.
pub const PLANS: [&str; 4] = ["free", "starter", "pro", "enterprise"];

#[derive(Deserialize, Queryable, Identifiable, QueryableByName, Debug, Serialize, TS)]
#[diesel(table_name = companies)]
#[ts(export)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub plan: String,
    pub active: bool,
    /// Seat limit: number of active users the plan permits.
    pub max_users: i32,
    pub timezone: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Deserialize)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub name: String,
    pub plan: String,
    pub max_users: i32,
    pub timezone: String,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CompanyInput {
    pub name: String,
    pub plan: Option<String>,
    pub timezone: Option<String>,
}

/// Partial update payload for a company (superadmin only).
#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub plan: Option<String>,
    pub active: Option<bool>,
    pub max_users: Option<i32>,
    pub timezone: Option<String>,
}

/// Company row joined with its active-user count, for the SaaS dashboard.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct CompanyWithUsage {
    pub id: i32,
    pub name: String,
    pub plan: String,
    pub active: bool,
    pub max_users: i32,
    pub timezone: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    pub active_users: i64,
}

/// Platform-wide counters shown on the superadmin dashboard.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlatformStats {
    pub total_companies: i64,
    pub total_users: i64,
    /// Bookings created for dates in the last 30 days.
    pub monthly_bookings: i64,
}
