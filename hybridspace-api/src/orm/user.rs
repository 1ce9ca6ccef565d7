use diesel::prelude::*;

use crate::models::{NewUser, User, UserInput, UserWithTeam};
use crate::models::user::avatar_initials;
use crate::schema::{teams, users};

/// Insert a new user. The avatar initials are derived from the name here;
/// callers never supply them. New users start active.
pub fn insert_user(
    conn: &mut SqliteConnection,
    input: UserInput,
) -> Result<User, diesel::result::Error> {
    let avatar = avatar_initials(&input.name);
    let new_user = NewUser {
        name: input.name,
        email: input.email,
        password_hash: input.password_hash,
        role: input.role,
        company_id: input.company_id,
        team_id: input.team_id,
        active: true,
        avatar,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)?;

    users::table.order(users::id.desc()).first::<User>(conn)
}

pub fn get_user_by_id(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<Option<User>, diesel::result::Error> {
    users::table
        .filter(users::id.eq(user_id))
        .first::<User>(conn)
        .optional()
}

/// All profiles of one company with their team join, ordered by name.
pub fn get_users_for_company(
    conn: &mut SqliteConnection,
    company_id: i32,
) -> Result<Vec<UserWithTeam>, diesel::result::Error> {
    let rows: Vec<(User, Option<(String, String)>)> = users::table
        .left_join(teams::table)
        .filter(users::company_id.eq(company_id))
        .order(users::name.asc())
        .select((
            users::all_columns,
            (teams::name, teams::color).nullable(),
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(user, team)| {
            let (team_name, team_color) = match team {
                Some((n, c)) => (Some(n), Some(c)),
                None => (None, None),
            };
            UserWithTeam {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
                team_id: user.team_id,
                active: user.active,
                avatar: user.avatar,
                team_name,
                team_color,
            }
        })
        .collect())
}

/// Toggles a profile active or inactive. Deactivated profiles cannot log
/// in and do not occupy a plan seat. Returns the updated row, or NotFound.
pub fn set_user_active(
    conn: &mut SqliteConnection,
    user_id: i32,
    is_active: bool,
) -> Result<User, diesel::result::Error> {
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set(users::active.eq(is_active))
        .execute(conn)?;

    users::table.filter(users::id.eq(user_id)).first::<User>(conn)
}

/// Sets a profile's role. Returns the updated row, or NotFound.
pub fn set_user_role(
    conn: &mut SqliteConnection,
    user_id: i32,
    role: &str,
) -> Result<User, diesel::result::Error> {
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set(users::role.eq(role))
        .execute(conn)?;

    users::table.filter(users::id.eq(user_id)).first::<User>(conn)
}

/// Assigns a profile to a team, or clears the assignment with `None`.
pub fn set_user_team(
    conn: &mut SqliteConnection,
    user_id: i32,
    team_id: Option<i32>,
) -> Result<User, diesel::result::Error> {
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set(users::team_id.eq(team_id))
        .execute(conn)?;

    users::table.filter(users::id.eq(user_id)).first::<User>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::company::insert_company;
    use crate::orm::login::hash_password;
    use crate::orm::team::insert_team;
    use crate::orm::testing::setup_test_db;

    fn user_input(name: &str, email: &str, company_id: i32, team_id: Option<i32>) -> UserInput {
        UserInput {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password("pw"),
            role: "employee".to_string(),
            company_id,
            team_id,
        }
    }

    #[test]
    fn insert_derives_avatar_and_starts_active() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Acme".to_string(), "free", None).unwrap();

        let user = insert_user(&mut conn, user_input("Ana Torres", "ana@acme.test", company.id, None))
            .expect("insert should succeed");

        assert_eq!(user.avatar, "AT");
        assert!(user.active);
        assert_eq!(user.role, "employee");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Acme".to_string(), "free", None).unwrap();

        insert_user(&mut conn, user_input("Ana Torres", "ana@acme.test", company.id, None)).unwrap();
        let dup = insert_user(&mut conn, user_input("Other Ana", "ana@acme.test", company.id, None));

        assert!(matches!(
            dup,
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            ))
        ));
    }

    #[test]
    fn company_roster_includes_team_join() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Acme".to_string(), "free", None).unwrap();
        let other = insert_company(&mut conn, "Rival".to_string(), "free", None).unwrap();
        let team = insert_team(&mut conn, company.id, "Platform".to_string(), None).unwrap();

        insert_user(&mut conn, user_input("Ana Torres", "ana@acme.test", company.id, Some(team.id)))
            .unwrap();
        insert_user(&mut conn, user_input("Ben Okafor", "ben@acme.test", company.id, None)).unwrap();
        insert_user(&mut conn, user_input("Eve Stranger", "eve@rival.test", other.id, None)).unwrap();

        let roster = get_users_for_company(&mut conn, company.id).expect("query should succeed");
        assert_eq!(roster.len(), 2);

        let ana = roster.iter().find(|u| u.name == "Ana Torres").unwrap();
        assert_eq!(ana.team_name.as_deref(), Some("Platform"));
        let ben = roster.iter().find(|u| u.name == "Ben Okafor").unwrap();
        assert!(ben.team_name.is_none());
    }

    #[test]
    fn deactivate_and_reactivate() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Acme".to_string(), "free", None).unwrap();
        let user =
            insert_user(&mut conn, user_input("Ana Torres", "ana@acme.test", company.id, None)).unwrap();

        let off = set_user_active(&mut conn, user.id, false).unwrap();
        assert!(!off.active);
        let on = set_user_active(&mut conn, user.id, true).unwrap();
        assert!(on.active);
    }
}
