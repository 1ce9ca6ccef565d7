//! Test scaffolding: an in-memory Rocket instance with seeded fixtures,
//! plus synchronous connection helpers for unit tests. Compiled into the
//! crate so integration tests in `tests/` can use it without feature
//! flags; nothing in here is mounted or reachable in production.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use rocket_sync_db_pools::diesel;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::admin_init_fairing::admin_init_fairing;
use crate::models::{Company, UserInput};
use crate::orm::company::{get_company_by_name, insert_company};
use crate::orm::login::hash_password;
use crate::orm::office::insert_office;
use crate::orm::user::insert_user;
use crate::schema::users;

/// Configures SQLite with performance-oriented settings for testing.
///
/// Disables synchronous writes and the rollback journal. Faster, less
/// durable; testing only.
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
    .expect("Failed to set SQLite PRAGMAs");
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for migration");
        conn.run(|c| {
            set_sqlite_test_pragmas(c);
        })
        .await;
        rocket
    })
}

/// Creates a Rocket fairing that seeds the standard test fixtures.
fn test_data_init_fairing() -> AdHoc {
    AdHoc::on_ignite("Test Data Initialization", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test data initialization");

        conn.run(|c| {
            if let Err(e) = create_test_data(c) {
                eprintln!("[test-data-init] ERROR: Failed to create test data: {:?}", e);
            }
        })
        .await;

        rocket
    })
}

/// Standard fixtures every integration test can rely on:
///
/// - "Test Company 1" with admin@company1.test, employee@company1.test,
///   second@company1.test and an office named "HQ"
/// - "Test Company 2" with admin@company2.test, employee@company2.test
///   and an office named "Branch"
/// - the platform company and superadmin from `admin_init_fairing`
///
/// Every seeded password is "admin".
fn create_test_data(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    let company1 = find_or_create_company(conn, "Test Company 1")?;
    let company2 = find_or_create_company(conn, "Test Company 2")?;

    create_test_user(conn, "Admin One", "admin@company1.test", company1.id, "admin")?;
    create_test_user(conn, "Employee One", "employee@company1.test", company1.id, "employee")?;
    create_test_user(conn, "Second Employee", "second@company1.test", company1.id, "employee")?;
    create_test_user(conn, "Admin Two", "admin@company2.test", company2.id, "admin")?;
    create_test_user(conn, "Employee Two", "employee@company2.test", company2.id, "employee")?;

    insert_office(conn, company1.id, "HQ".to_string(), "1 Main St".to_string())?;
    insert_office(conn, company2.id, "Branch".to_string(), "9 Side St".to_string())?;

    Ok(())
}

fn find_or_create_company(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Company, diesel::result::Error> {
    match get_company_by_name(conn, name)? {
        Some(company) => Ok(company),
        None => insert_company(conn, name.to_string(), "pro", None),
    }
}

fn create_test_user(
    conn: &mut SqliteConnection,
    name: &str,
    user_email: &str,
    company_id: i32,
    role: &str,
) -> Result<(), diesel::result::Error> {
    let existing = users::table
        .filter(users::email.eq(user_email))
        .count()
        .get_result::<i64>(conn)?;
    if existing > 0 {
        return Ok(());
    }

    insert_user(
        conn,
        UserInput {
            name: name.to_string(),
            email: user_email.to_string(),
            password_hash: hash_password("admin"),
            role: role.to_string(),
            company_id,
            team_id: None,
        },
    )?;
    Ok(())
}

/// Creates and configures a Rocket instance for testing with an in-memory
/// SQLite database.
///
/// The returned Rocket instance will have:
/// - A unique in-memory SQLite database
/// - Foreign keys enabled and testing pragmas set
/// - All migrations run
/// - The platform superadmin and the standard test fixtures seeded
/// - All API routes mounted
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    // Unique shared in-memory DB per test instance
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };
    let databases = map!["hybridspace_db" => db_config];

    let figment = rocket::Config::figment().merge(("databases", databases));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(admin_init_fairing())
        .attach(test_data_init_fairing())
        .manage(crate::feed::BookingFeed::new());

    crate::mount_api_routes(rocket)
}

/// Creates a synchronous in-memory SQLite database connection for unit
/// tests, with migrations run and foreign keys on. Each call returns a
/// new, independent database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    conn
}

/// A minimal async-compatible wrapper for a synchronous SQLite connection.
///
/// Lets unit tests drive functions written against the Rocket-style
/// `.run()` interface without standing up a full Rocket instance.
pub struct FakeDbConn<'a>(pub &'a mut diesel::SqliteConnection);

impl<'a> FakeDbConn<'a> {
    /// Executes a closure with a mutable reference to the underlying
    /// connection, mimicking the async `.run()` interface synchronously.
    ///
    /// # Safety
    /// Converts an immutable reference to mutable; sound here because the
    /// wrapper holds the only reference for its lifetime.
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        unsafe {
            let conn_ptr =
                self.0 as *const diesel::SqliteConnection as *mut diesel::SqliteConnection;
            f(&mut *conn_ptr)
        }
    }
}

/// Wraps a connection from [`setup_test_db`] for async-style testing.
pub fn setup_test_dbconn<'a>(conn: &'a mut diesel::SqliteConnection) -> FakeDbConn<'a> {
    FakeDbConn(conn)
}
