use diesel::prelude::*;

use crate::layout;
use crate::models::{NewZone, Zone, ZoneInput, ZoneUpdate, ZoneWithTeam};
use crate::schema::{teams, zones};

/// Color applied when a zone is created without one.
pub const DEFAULT_ZONE_COLOR: &str = "#8b5cf6";

/// Capacity applied when a zone is created without one.
pub const DEFAULT_ZONE_CAPACITY: i32 = 10;

/// Insert a new zone, assigning the next free letter label inside the
/// insert transaction so concurrent creations cannot collide. Coordinates
/// are snapped here; rects under the minimum size are rejected upstream by
/// the handler, but a raw caller gets NotFound-free validation too.
pub fn insert_zone(
    conn: &mut SqliteConnection,
    office_id: i32,
    input: &ZoneInput,
) -> Result<Zone, diesel::result::Error> {
    conn.immediate_transaction(|conn| {
        let existing: Vec<String> = zones::table
            .filter(zones::office_id.eq(office_id))
            .select(zones::label)
            .load(conn)?;
        let label = layout::next_zone_label(existing.iter().map(|s| s.as_str()));

        let new_zone = NewZone {
            office_id,
            label,
            name: input.name.clone(),
            color: input.color.clone().unwrap_or_else(|| DEFAULT_ZONE_COLOR.to_string()),
            team_id: input.team_id,
            max_capacity: input.max_capacity.unwrap_or(DEFAULT_ZONE_CAPACITY),
            coord_x: layout::snap(input.coord_x),
            coord_y: layout::snap(input.coord_y),
            coord_w: layout::snap(input.coord_w),
            coord_h: layout::snap(input.coord_h),
        };

        diesel::insert_into(zones::table)
            .values(&new_zone)
            .execute(conn)?;

        zones::table.order(zones::id.desc()).first::<Zone>(conn)
    })
}

pub fn get_zone_by_id(
    conn: &mut SqliteConnection,
    zone_id: i32,
) -> Result<Option<Zone>, diesel::result::Error> {
    zones::table
        .filter(zones::id.eq(zone_id))
        .first::<Zone>(conn)
        .optional()
}

pub fn get_zones_for_office(
    conn: &mut SqliteConnection,
    office_id: i32,
) -> Result<Vec<Zone>, diesel::result::Error> {
    zones::table
        .filter(zones::office_id.eq(office_id))
        .order(zones::label.asc())
        .load::<Zone>(conn)
}

/// Zones of an office with their owning team's display fields joined in.
pub fn get_zones_with_teams(
    conn: &mut SqliteConnection,
    office_id: i32,
) -> Result<Vec<ZoneWithTeam>, diesel::result::Error> {
    let rows: Vec<(Zone, Option<(String, String)>)> = zones::table
        .left_join(teams::table)
        .filter(zones::office_id.eq(office_id))
        .order(zones::label.asc())
        .select((zones::all_columns, (teams::name, teams::color).nullable()))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(zone, team)| {
            let (team_name, team_color) = match team {
                Some((n, c)) => (Some(n), Some(c)),
                None => (None, None),
            };
            ZoneWithTeam { zone, team_name, team_color }
        })
        .collect())
}

/// Applies a partial update. Moves are snapped; the label never changes
/// after creation. `team_id: Some(None)` clears the team assignment.
pub fn update_zone(
    conn: &mut SqliteConnection,
    zone_id: i32,
    changes: &ZoneUpdate,
) -> Result<Zone, diesel::result::Error> {
    let current = zones::table.filter(zones::id.eq(zone_id)).first::<Zone>(conn)?;

    let team_id = match changes.team_id {
        Some(new_team) => new_team,
        None => current.team_id,
    };

    diesel::update(zones::table.filter(zones::id.eq(zone_id)))
        .set((
            zones::name.eq(changes.name.clone().unwrap_or(current.name)),
            zones::color.eq(changes.color.clone().unwrap_or(current.color)),
            zones::team_id.eq(team_id),
            zones::max_capacity.eq(changes.max_capacity.unwrap_or(current.max_capacity)),
            zones::coord_x.eq(changes.coord_x.map(layout::snap).unwrap_or(current.coord_x)),
            zones::coord_y.eq(changes.coord_y.map(layout::snap).unwrap_or(current.coord_y)),
        ))
        .execute(conn)?;

    zones::table.filter(zones::id.eq(zone_id)).first::<Zone>(conn)
}

/// Delete a zone. Assets inside it survive and become zone-less through
/// the FK SET NULL, in contrast with office deletion which takes the
/// assets with it. The freed letter becomes assignable again.
/// Returns Ok(true) if deleted, Ok(false) if not found.
pub fn delete_zone(
    conn: &mut SqliteConnection,
    zone_id: i32,
) -> Result<bool, diesel::result::Error> {
    let rows = diesel::delete(zones::table.filter(zones::id.eq(zone_id))).execute(conn)?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetInput, AssetKind};
    use crate::orm::asset::{get_asset_by_id, insert_asset};
    use crate::orm::company::insert_company;
    use crate::orm::office::insert_office;
    use crate::orm::testing::setup_test_db;

    fn zone_input(name: &str, x: i32, y: i32, w: i32, h: i32) -> ZoneInput {
        ZoneInput {
            name: name.to_string(),
            color: None,
            team_id: None,
            max_capacity: None,
            coord_x: x,
            coord_y: y,
            coord_w: w,
            coord_h: h,
        }
    }

    fn office(conn: &mut SqliteConnection) -> crate::models::Office {
        let company = insert_company(conn, "Acme".to_string(), "free", None).unwrap();
        insert_office(conn, company.id, "HQ".to_string(), "1 Main St".to_string()).unwrap()
    }

    #[test]
    fn labels_assigned_by_gap_fill() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);

        let a = insert_zone(&mut conn, office.id, &zone_input("Eng", 0, 0, 200, 160)).unwrap();
        let b = insert_zone(&mut conn, office.id, &zone_input("Sales", 200, 0, 200, 160)).unwrap();
        let c = insert_zone(&mut conn, office.id, &zone_input("Ops", 400, 0, 200, 160)).unwrap();
        assert_eq!((a.label.as_str(), b.label.as_str(), c.label.as_str()), ("A", "B", "C"));

        // Deleting B frees the letter for the next zone.
        assert!(delete_zone(&mut conn, b.id).unwrap());
        let d = insert_zone(&mut conn, office.id, &zone_input("Legal", 200, 200, 200, 160)).unwrap();
        assert_eq!(d.label, "B");
    }

    #[test]
    fn labels_are_per_office() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Acme".to_string(), "free", None).unwrap();
        let hq = insert_office(&mut conn, company.id, "HQ".to_string(), "1 Main St".to_string())
            .unwrap();
        let annex =
            insert_office(&mut conn, company.id, "Annex".to_string(), "2 Main St".to_string())
                .unwrap();

        let a1 = insert_zone(&mut conn, hq.id, &zone_input("Eng", 0, 0, 200, 160)).unwrap();
        let a2 = insert_zone(&mut conn, annex.id, &zone_input("Eng", 0, 0, 200, 160)).unwrap();
        assert_eq!(a1.label, "A");
        assert_eq!(a2.label, "A");
    }

    #[test]
    fn creation_snaps_coordinates() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);

        let z = insert_zone(&mut conn, office.id, &zone_input("Eng", 11, 29, 93, 170)).unwrap();
        assert_eq!((z.coord_x, z.coord_y, z.coord_w, z.coord_h), (20, 20, 100, 160));
    }

    #[test]
    fn delete_zone_leaves_assets_zone_less() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);
        let zone = insert_zone(&mut conn, office.id, &zone_input("Eng", 0, 0, 200, 160)).unwrap();

        let desk = insert_asset(
            &mut conn,
            office.id,
            &AssetInput { kind: AssetKind::Desk, name: None, coord_x: 100, coord_y: 80, capacity: None },
        )
        .unwrap();
        assert_eq!(desk.zone_id, Some(zone.id));

        assert!(delete_zone(&mut conn, zone.id).unwrap());
        let reloaded = get_asset_by_id(&mut conn, desk.id).unwrap().unwrap();
        assert!(reloaded.zone_id.is_none());
    }

    #[test]
    fn update_clears_team_with_explicit_null() {
        let mut conn = setup_test_db();
        let office = office(&mut conn);
        let company_id = office.company_id;
        let team =
            crate::orm::team::insert_team(&mut conn, company_id, "Platform".to_string(), None)
                .unwrap();

        let zone = insert_zone(
            &mut conn,
            office.id,
            &ZoneInput { team_id: Some(team.id), ..zone_input("Eng", 0, 0, 200, 160) },
        )
        .unwrap();
        assert_eq!(zone.team_id, Some(team.id));

        let cleared = update_zone(
            &mut conn,
            zone.id,
            &ZoneUpdate { team_id: Some(None), ..Default::default() },
        )
        .unwrap();
        assert!(cleared.team_id.is_none());

        // Absent field leaves the assignment alone.
        let untouched = update_zone(
            &mut conn,
            zone.id,
            &ZoneUpdate { name: Some("Engineering".to_string()), ..Default::default() },
        )
        .unwrap();
        assert!(untouched.team_id.is_none());
        assert_eq!(untouched.name, "Engineering");
    }
}
