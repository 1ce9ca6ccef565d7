use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::teams;

#[derive(
    Queryable, Identifiable, Associations, QueryableByName, Debug, Serialize, Deserialize, Clone, TS,
)]
#[diesel(belongs_to(crate::models::company::Company))]
#[diesel(table_name = teams)]
#[ts(export)]
pub struct Team {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Insertable)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub company_id: i32,
    pub name: String,
    pub color: String,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TeamInput {
    pub name: String,
    pub color: Option<String>,
}
