use diesel::prelude::*;

use crate::layout;
use crate::models::{Asset, AssetInput, AssetKind, AssetUpdate, NewAsset, ZoneRef};
use crate::models::asset::AssetWithZone;
use crate::schema::{assets, zones};

/// Insert a new asset at a snapped position. Desks are auto-named `D-NN`
/// (highest existing number plus one); rooms use the supplied name. Zone
/// membership is inferred from the snapped point, never taken from the
/// client.
pub fn insert_asset(
    conn: &mut SqliteConnection,
    office_id: i32,
    input: &AssetInput,
) -> Result<Asset, diesel::result::Error> {
    conn.immediate_transaction(|conn| {
        let x = layout::snap(input.coord_x);
        let y = layout::snap(input.coord_y);

        let name = match input.kind {
            AssetKind::Desk => {
                let existing: Vec<String> = assets::table
                    .filter(assets::office_id.eq(office_id))
                    .filter(assets::kind.eq("desk"))
                    .select(assets::name)
                    .load(conn)?;
                layout::next_desk_name(existing.iter().map(|s| s.as_str()))
            }
            AssetKind::Room => input.name.clone().unwrap_or_else(|| "Room".to_string()),
        };

        let capacity = match input.kind {
            AssetKind::Desk => 1,
            AssetKind::Room => input.capacity.unwrap_or(1).max(1),
        };

        let zone_id = infer_zone(conn, office_id, x, y)?;

        let new_asset = NewAsset {
            office_id,
            zone_id,
            kind: input.kind.as_str().to_string(),
            name,
            coord_x: x,
            coord_y: y,
            capacity,
        };

        diesel::insert_into(assets::table)
            .values(&new_asset)
            .execute(conn)?;

        assets::table.order(assets::id.desc()).first::<Asset>(conn)
    })
}

/// The zone containing a point, by label order. First match wins when
/// zones overlap.
fn infer_zone(
    conn: &mut SqliteConnection,
    office_id: i32,
    x: i32,
    y: i32,
) -> Result<Option<i32>, diesel::result::Error> {
    let office_zones = crate::orm::zone::get_zones_for_office(conn, office_id)?;
    Ok(layout::zone_at_point(x, y, &office_zones))
}

pub fn get_asset_by_id(
    conn: &mut SqliteConnection,
    asset_id: i32,
) -> Result<Option<Asset>, diesel::result::Error> {
    assets::table
        .filter(assets::id.eq(asset_id))
        .first::<Asset>(conn)
        .optional()
}

pub fn get_assets_for_office(
    conn: &mut SqliteConnection,
    office_id: i32,
) -> Result<Vec<Asset>, diesel::result::Error> {
    assets::table
        .filter(assets::office_id.eq(office_id))
        .order(assets::name.asc())
        .load::<Asset>(conn)
}

/// Assets of an office with their (optional) zone joined for the map.
pub fn get_assets_with_zones(
    conn: &mut SqliteConnection,
    office_id: i32,
) -> Result<Vec<AssetWithZone>, diesel::result::Error> {
    let rows: Vec<(Asset, Option<(i32, String, String, String)>)> = assets::table
        .left_join(zones::table)
        .filter(assets::office_id.eq(office_id))
        .order(assets::name.asc())
        .select((
            assets::all_columns,
            (zones::id, zones::label, zones::name, zones::color).nullable(),
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(asset, zone)| AssetWithZone {
            asset,
            zone: zone.map(|(id, label, name, color)| ZoneRef { id, label, name, color }),
        })
        .collect())
}

/// Applies a rename or a move. Moves persist only the final snapped
/// position and re-infer zone membership from it.
pub fn update_asset(
    conn: &mut SqliteConnection,
    asset_id: i32,
    changes: &AssetUpdate,
) -> Result<Asset, diesel::result::Error> {
    conn.immediate_transaction(|conn| {
        let current = assets::table.filter(assets::id.eq(asset_id)).first::<Asset>(conn)?;

        let x = changes.coord_x.map(layout::snap).unwrap_or(current.coord_x);
        let y = changes.coord_y.map(layout::snap).unwrap_or(current.coord_y);

        let zone_id = if changes.coord_x.is_some() || changes.coord_y.is_some() {
            infer_zone(conn, current.office_id, x, y)?
        } else {
            current.zone_id
        };

        diesel::update(assets::table.filter(assets::id.eq(asset_id)))
            .set((
                assets::name.eq(changes.name.clone().unwrap_or(current.name)),
                assets::coord_x.eq(x),
                assets::coord_y.eq(y),
                assets::zone_id.eq(zone_id),
            ))
            .execute(conn)?;

        assets::table.filter(assets::id.eq(asset_id)).first::<Asset>(conn)
    })
}

/// Delete an asset. Its bookings go with it through the FK cascade.
/// Returns Ok(true) if deleted, Ok(false) if not found.
pub fn delete_asset(
    conn: &mut SqliteConnection,
    asset_id: i32,
) -> Result<bool, diesel::result::Error> {
    let rows = diesel::delete(assets::table.filter(assets::id.eq(asset_id))).execute(conn)?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ZoneInput;
    use crate::orm::company::insert_company;
    use crate::orm::office::insert_office;
    use crate::orm::testing::setup_test_db;
    use crate::orm::zone::insert_zone;

    fn office(conn: &mut SqliteConnection) -> crate::models::Office {
        let company = insert_company(conn, "Acme".to_string(), "free", None).unwrap();
        insert_office(conn, company.id, "HQ".to_string(), "1 Main St".to_string()).unwrap()
    }

    fn desk_at(x: i32, y: i32) -> AssetInput {
        AssetInput { kind: AssetKind::Desk, name: None, coord_x: x, coord_y: y, capacity: None }
    }

    #[test]
    fn desks_are_auto_named_max_plus_one() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);

        let d1 = insert_asset(&mut conn, office.id, &desk_at(100, 100)).unwrap();
        let d2 = insert_asset(&mut conn, office.id, &desk_at(140, 100)).unwrap();
        assert_eq!(d1.name, "D-01");
        assert_eq!(d2.name, "D-02");

        // Deleting D-01 does not free its number.
        assert!(delete_asset(&mut conn, d1.id).unwrap());
        let d3 = insert_asset(&mut conn, office.id, &desk_at(180, 100)).unwrap();
        assert_eq!(d3.name, "D-03");
    }

    #[test]
    fn rooms_keep_their_name_and_capacity() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);

        let room = insert_asset(
            &mut conn,
            office.id,
            &AssetInput {
                kind: AssetKind::Room,
                name: Some("War Room".to_string()),
                coord_x: 200,
                coord_y: 200,
                capacity: Some(8),
            },
        )
        .unwrap();
        assert_eq!(room.name, "War Room");
        assert_eq!(room.capacity, 8);
        assert_eq!(room.kind, "room");
    }

    #[test]
    fn zone_membership_inferred_from_snapped_point() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);
        let zone = insert_zone(
            &mut conn,
            office.id,
            &ZoneInput {
                name: "Eng".to_string(),
                color: None,
                team_id: None,
                max_capacity: None,
                coord_x: 0,
                coord_y: 0,
                coord_w: 200,
                coord_h: 160,
            },
        )
        .unwrap();

        // 195 snaps to 200, which is still on the zone's inclusive edge.
        let inside = insert_asset(&mut conn, office.id, &desk_at(195, 80)).unwrap();
        assert_eq!(inside.zone_id, Some(zone.id));
        assert_eq!(inside.coord_x, 200);

        let outside = insert_asset(&mut conn, office.id, &desk_at(400, 400)).unwrap();
        assert!(outside.zone_id.is_none());
    }

    #[test]
    fn moving_reinfers_zone() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);
        let zone = insert_zone(
            &mut conn,
            office.id,
            &ZoneInput {
                name: "Eng".to_string(),
                color: None,
                team_id: None,
                max_capacity: None,
                coord_x: 0,
                coord_y: 0,
                coord_w: 200,
                coord_h: 160,
            },
        )
        .unwrap();

        let desk = insert_asset(&mut conn, office.id, &desk_at(100, 80)).unwrap();
        assert_eq!(desk.zone_id, Some(zone.id));

        let moved = update_asset(
            &mut conn,
            desk.id,
            &AssetUpdate { name: None, coord_x: Some(400), coord_y: Some(400) },
        )
        .unwrap();
        assert!(moved.zone_id.is_none());
        assert_eq!((moved.coord_x, moved.coord_y), (400, 400));

        // A rename alone leaves position and zone untouched.
        let renamed = update_asset(
            &mut conn,
            desk.id,
            &AssetUpdate { name: Some("Window desk".to_string()), coord_x: None, coord_y: None },
        )
        .unwrap();
        assert_eq!(renamed.name, "Window desk");
        assert!(renamed.zone_id.is_none());
    }
}
