use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::zones;

/// A rectangular floor-plan region. Coordinates are snapped canvas units,
/// axis-aligned, `(coord_x, coord_y)` the top-left corner.
#[derive(
    Queryable, Identifiable, Associations, QueryableByName, Debug, Serialize, Deserialize, Clone, TS,
)]
#[diesel(belongs_to(crate::models::office::Office))]
#[diesel(table_name = zones)]
#[ts(export)]
pub struct Zone {
    pub id: i32,
    pub office_id: i32,
    /// Single letter, unique per office, assigned by gap-fill (A, B, C, ...).
    pub label: String,
    pub name: String,
    pub color: String,
    pub team_id: Option<i32>,
    pub max_capacity: i32,
    pub coord_x: i32,
    pub coord_y: i32,
    pub coord_w: i32,
    pub coord_h: i32,
}

#[derive(Insertable)]
#[diesel(table_name = zones)]
pub struct NewZone {
    pub office_id: i32,
    pub label: String,
    pub name: String,
    pub color: String,
    pub team_id: Option<i32>,
    pub max_capacity: i32,
    pub coord_x: i32,
    pub coord_y: i32,
    pub coord_w: i32,
    pub coord_h: i32,
}

/// Creation payload: the drag rectangle plus display fields. The label is
/// assigned server-side, never supplied by the client.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ZoneInput {
    pub name: String,
    pub color: Option<String>,
    pub team_id: Option<i32>,
    pub max_capacity: Option<i32>,
    pub coord_x: i32,
    pub coord_y: i32,
    pub coord_w: i32,
    pub coord_h: i32,
}

/// Partial update: rename, recolor, reassign team, change capacity, or move.
#[derive(Deserialize, Serialize, Default, TS)]
#[ts(export)]
pub struct ZoneUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the team assignment.
    pub team_id: Option<Option<i32>>,
    pub max_capacity: Option<i32>,
    pub coord_x: Option<i32>,
    pub coord_y: Option<i32>,
}

/// Zone joined with its (optional) owning team for display.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ZoneWithTeam {
    #[serde(flatten)]
    pub zone: Zone,
    pub team_name: Option<String>,
    pub team_color: Option<String>,
}
