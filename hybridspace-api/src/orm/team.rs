use diesel::prelude::*;

use crate::models::{NewTeam, Team};
use crate::schema::teams;

/// Color applied when a team is created without one.
pub const DEFAULT_TEAM_COLOR: &str = "#6366f1";

pub fn insert_team(
    conn: &mut SqliteConnection,
    company_id: i32,
    name: String,
    color: Option<String>,
) -> Result<Team, diesel::result::Error> {
    let new_team = NewTeam {
        company_id,
        name,
        color: color.unwrap_or_else(|| DEFAULT_TEAM_COLOR.to_string()),
    };

    diesel::insert_into(teams::table)
        .values(&new_team)
        .execute(conn)?;

    teams::table.order(teams::id.desc()).first::<Team>(conn)
}

pub fn get_team_by_id(
    conn: &mut SqliteConnection,
    team_id: i32,
) -> Result<Option<Team>, diesel::result::Error> {
    teams::table
        .filter(teams::id.eq(team_id))
        .first::<Team>(conn)
        .optional()
}

pub fn get_teams_for_company(
    conn: &mut SqliteConnection,
    company_id: i32,
) -> Result<Vec<Team>, diesel::result::Error> {
    teams::table
        .filter(teams::company_id.eq(company_id))
        .order(teams::name.asc())
        .load::<Team>(conn)
}

pub fn update_team(
    conn: &mut SqliteConnection,
    team_id: i32,
    name: Option<String>,
    color: Option<String>,
) -> Result<Team, diesel::result::Error> {
    let current = teams::table.filter(teams::id.eq(team_id)).first::<Team>(conn)?;

    diesel::update(teams::table.filter(teams::id.eq(team_id)))
        .set((
            teams::name.eq(name.unwrap_or(current.name)),
            teams::color.eq(color.unwrap_or(current.color)),
        ))
        .execute(conn)?;

    teams::table.filter(teams::id.eq(team_id)).first::<Team>(conn)
}

/// Delete a team. Members keep their profiles; their `team_id` is set to
/// NULL by the FK action, and zones pointing at the team likewise.
/// Returns Ok(true) if deleted, Ok(false) if not found.
pub fn delete_team(
    conn: &mut SqliteConnection,
    team_id: i32,
) -> Result<bool, diesel::result::Error> {
    let rows = diesel::delete(teams::table.filter(teams::id.eq(team_id))).execute(conn)?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInput;
    use crate::orm::company::insert_company;
    use crate::orm::login::hash_password;
    use crate::orm::testing::setup_test_db;
    use crate::orm::user::{get_user_by_id, insert_user};

    #[test]
    fn insert_defaults_color() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Acme".to_string(), "free", None).unwrap();

        let team = insert_team(&mut conn, company.id, "Platform".to_string(), None).unwrap();
        assert_eq!(team.color, DEFAULT_TEAM_COLOR);

        let custom =
            insert_team(&mut conn, company.id, "Design".to_string(), Some("#ff0066".to_string()))
                .unwrap();
        assert_eq!(custom.color, "#ff0066");
    }

    #[test]
    fn delete_team_unassigns_members() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Acme".to_string(), "free", None).unwrap();
        let team = insert_team(&mut conn, company.id, "Platform".to_string(), None).unwrap();

        let user = insert_user(
            &mut conn,
            UserInput {
                name: "Ana Torres".to_string(),
                email: "ana@acme.test".to_string(),
                password_hash: hash_password("pw"),
                role: "employee".to_string(),
                company_id: company.id,
                team_id: Some(team.id),
            },
        )
        .unwrap();

        assert!(delete_team(&mut conn, team.id).unwrap());
        assert!(!delete_team(&mut conn, team.id).unwrap());

        let reloaded = get_user_by_id(&mut conn, user.id).unwrap().unwrap();
        assert!(reloaded.team_id.is_none());
    }
}
