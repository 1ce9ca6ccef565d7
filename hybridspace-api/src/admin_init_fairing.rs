use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::Rocket;
use rocket::fairing::AdHoc;

use crate::models::{Company, User, UserInput};
use crate::orm::DbConn;
use crate::orm::company::{get_company_by_name, insert_company};
use crate::orm::login::hash_password;
use crate::orm::user::insert_user;
use crate::schema::users::dsl::*;

/// Default credentials used when the envars are unset (local dev only).
const DEFAULT_SUPERADMIN_EMAIL: &str = "superadmin@hybridspace.io";
const DEFAULT_SUPERADMIN_PASSWORD: &str = "admin";

/// The platform-owner company the superadmin belongs to.
const PLATFORM_COMPANY: &str = "HybridSpace";

/// Ensures the platform company and its superadmin user exist.
///
/// Credentials come from HSPACE_DEFAULT_EMAIL and HSPACE_DEFAULT_PASSWORD.
/// Runs on every ignition and is a no-op when both rows already exist.
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Superadmin Initialization", |rocket| async {
        dotenv().ok();

        let conn = match get_db_connection(&rocket).await {
            Some(conn) => conn,
            None => return Err(rocket),
        };

        let company = match setup_company(&conn).await {
            Ok(company) => company,
            Err(rocket) => return Err(rocket),
        };

        match setup_superadmin(&conn, company).await {
            Ok(()) => Ok(rocket),
            Err(rocket) => Err(rocket),
        }
    })
}

async fn get_db_connection(rocket: &Rocket<rocket::Build>) -> Option<DbConn> {
    match DbConn::get_one(rocket).await {
        Some(conn) => Some(conn),
        None => {
            error!("[admin-init] ERROR: Could not get DB connection.");
            None
        }
    }
}

async fn setup_company(conn: &DbConn) -> Result<Company, rocket::Rocket<rocket::Build>> {
    conn.run(find_or_create_platform_company)
        .await
        .map_err(|_| rocket::build())
}

fn find_or_create_platform_company(
    c: &mut SqliteConnection,
) -> Result<Company, diesel::result::Error> {
    match get_company_by_name(c, PLATFORM_COMPANY) {
        Ok(Some(found)) => {
            info!("[admin-init] Matched platform company: '{}'", PLATFORM_COMPANY);
            return Ok(found);
        }
        Ok(None) => {}
        Err(e) => {
            error!("[admin-init] ERROR querying company '{}': {:?}", PLATFORM_COMPANY, e);
            return Err(e);
        }
    }

    info!("[admin-init] Creating platform company '{}'.", PLATFORM_COMPANY);
    match insert_company(c, PLATFORM_COMPANY.to_string(), "enterprise", None) {
        Ok(company) => Ok(company),
        Err(e) => {
            error!("[admin-init] ERROR creating company: {:?}", e);
            Err(e)
        }
    }
}

async fn setup_superadmin(
    conn: &DbConn,
    company: Company,
) -> Result<(), rocket::Rocket<rocket::Build>> {
    let admin_email = get_admin_email();

    conn.run(move |c| create_superadmin_if_needed(c, &admin_email, &company))
        .await
        .map_err(|e| {
            error!("[admin-init] FATAL: Superadmin creation failed: {:?}", e);
            rocket::build()
        })
}

fn get_admin_email() -> String {
    std::env::var("HSPACE_DEFAULT_EMAIL").unwrap_or_else(|_| DEFAULT_SUPERADMIN_EMAIL.to_string())
}

fn get_admin_password() -> String {
    std::env::var("HSPACE_DEFAULT_PASSWORD")
        .unwrap_or_else(|_| DEFAULT_SUPERADMIN_PASSWORD.to_string())
}

fn create_superadmin_if_needed(
    c: &mut SqliteConnection,
    admin_email: &str,
    company: &Company,
) -> Result<(), diesel::result::Error> {
    let existing: Option<User> = users
        .filter(email.eq(admin_email))
        .first::<User>(c)
        .optional()?;

    if existing.is_some() {
        info!("[admin-init] Superadmin '{}' already exists", admin_email);
        return Ok(());
    }

    let admin_user = UserInput {
        name: "Platform Admin".to_string(),
        email: admin_email.to_string(),
        password_hash: hash_password(&get_admin_password()),
        role: "superadmin".to_string(),
        company_id: company.id,
        team_id: None,
    };

    match insert_user(c, admin_user) {
        Ok(_) => {
            info!("[admin-init] Created superadmin: '{}'", admin_email);
            Ok(())
        }
        Err(e) => {
            error!("[admin-init] ERROR creating superadmin: {:?}", e);
            Err(e)
        }
    }
}
