use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::offices;

#[derive(
    Queryable, Identifiable, Associations, QueryableByName, Debug, Serialize, Deserialize, TS,
)]
#[diesel(belongs_to(crate::models::company::Company))]
#[diesel(table_name = offices)]
#[ts(export)]
pub struct Office {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub address: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = offices)]
pub struct NewOffice {
    pub company_id: i32,
    pub name: String,
    pub address: String,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct OfficeInput {
    pub name: String,
    pub address: String,
}
