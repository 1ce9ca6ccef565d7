//! Superadmin scope override, stored on the session row.
//!
//! A superadmin browsing the platform can act "as" a tenant company. The
//! override lives in `sessions.acting_company_id`, so it follows exactly
//! one session, dies with logout, and never leaks across requests the way
//! a process-wide setting would.

use diesel::prelude::*;

use crate::schema::sessions;

/// Sets the acting company for a session. The caller has already verified
/// the session belongs to a superadmin and the company exists.
pub fn set_acting_company(
    conn: &mut SqliteConnection,
    session_id: &str,
    company_id: i32,
) -> Result<(), diesel::result::Error> {
    diesel::update(sessions::table.filter(sessions::id.eq(session_id)))
        .set(sessions::acting_company_id.eq(Some(company_id)))
        .execute(conn)?;
    Ok(())
}

/// Clears the override; subsequent requests scope to the user's own
/// company again.
pub fn clear_acting_company(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<(), diesel::result::Error> {
    diesel::update(sessions::table.filter(sessions::id.eq(session_id)))
        .set(sessions::acting_company_id.eq(None::<i32>))
        .execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, UserInput};
    use crate::orm::company::insert_company;
    use crate::orm::login::{create_and_store_session, hash_password};
    use crate::orm::testing::{setup_test_db, setup_test_dbconn};
    use crate::orm::user::insert_user;

    #[tokio::test]
    async fn override_set_and_cleared() {
        let mut conn = setup_test_db();
        let company = insert_company(&mut conn, "Platform".to_string(), "enterprise", None).unwrap();
        let tenant = insert_company(&mut conn, "Tenant".to_string(), "free", None).unwrap();
        let user = insert_user(
            &mut conn,
            UserInput {
                name: "Root Admin".to_string(),
                email: "root@platform.test".to_string(),
                password_hash: hash_password("pw"),
                role: "superadmin".to_string(),
                company_id: company.id,
                team_id: None,
            },
        )
        .unwrap();

        let token = {
            let fake_db = setup_test_dbconn(&mut conn);
            create_and_store_session(&fake_db, user.id).await.unwrap()
        };

        let load = |conn: &mut SqliteConnection, token: &str| {
            sessions::table
                .filter(sessions::id.eq(token))
                .first::<Session>(conn)
                .unwrap()
        };

        set_acting_company(&mut conn, &token, tenant.id).unwrap();
        assert_eq!(load(&mut conn, &token).acting_company_id, Some(tenant.id));

        clear_acting_company(&mut conn, &token).unwrap();
        assert!(load(&mut conn, &token).acting_company_id.is_none());
    }
}
