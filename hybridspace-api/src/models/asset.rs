use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::assets;

/// What a bookable asset is. Stored as text in `assets.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AssetKind {
    Desk,
    Room,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Desk => "desk",
            AssetKind::Room => "room",
        }
    }
}

/// A bookable desk or room. Desk coordinates are the center point of the
/// desk footprint; room coordinates are the top-left corner.
#[derive(
    Queryable, Identifiable, Associations, QueryableByName, Debug, Serialize, Deserialize, Clone, TS,
)]
#[diesel(belongs_to(crate::models::office::Office))]
#[diesel(table_name = assets)]
#[ts(export)]
pub struct Asset {
    pub id: i32,
    pub office_id: i32,
    /// `None` when the asset sits outside every zone.
    pub zone_id: Option<i32>,
    pub kind: String,
    pub name: String,
    pub coord_x: i32,
    pub coord_y: i32,
    pub capacity: i32,
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        if self.kind == "room" { AssetKind::Room } else { AssetKind::Desk }
    }
}

#[derive(Insertable)]
#[diesel(table_name = assets)]
pub struct NewAsset {
    pub office_id: i32,
    pub zone_id: Option<i32>,
    pub kind: String,
    pub name: String,
    pub coord_x: i32,
    pub coord_y: i32,
    pub capacity: i32,
}

/// Creation payload. Desks leave `name` empty (auto-named `D-NN`); rooms
/// must name themselves and may set a capacity (>= 1, default 1). Zone
/// membership is inferred server-side from the point, never supplied.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct AssetInput {
    pub kind: AssetKind,
    pub name: Option<String>,
    pub coord_x: i32,
    pub coord_y: i32,
    pub capacity: Option<i32>,
}

/// Partial update: rename or move. Moving re-infers zone membership.
#[derive(Deserialize, Serialize, Default, TS)]
#[ts(export)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub coord_x: Option<i32>,
    pub coord_y: Option<i32>,
}

/// Slim zone reference embedded in asset views.
#[derive(Debug, Serialize, Deserialize, Clone, TS)]
#[ts(export)]
pub struct ZoneRef {
    pub id: i32,
    pub label: String,
    pub name: String,
    pub color: String,
}

/// Asset joined with its (optional) zone for map rendering.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssetWithZone {
    #[serde(flatten)]
    pub asset: Asset,
    pub zone: Option<ZoneRef>,
}
