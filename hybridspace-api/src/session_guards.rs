//! Session-based authentication and authorization guards for Rocket routes.
//!
//! Three layers of guard build on each other:
//!
//! 1. [`AuthenticatedUser`] validates the session cookie and loads the
//!    profile (which must be active).
//! 2. [`AdminUser`] and [`SuperadminUser`] add a role floor on top.
//! 3. [`CompanyScope`] resolves the company every tenant-scoped query in
//!    the request should use: the user's own company, unless the session
//!    carries a superadmin scope override.
//!
//! # Basic Authentication
//!
//! ```rust
//! use rocket::get;
//! use hybridspace_api::session_guards::AuthenticatedUser;
//!
//! #[get("/profile")]
//! fn get_profile(user: AuthenticatedUser) -> String {
//!     format!("Welcome, {}!", user.user.email)
//! }
//! ```
//!
//! # Tenant Scoping
//!
//! ```rust
//! use rocket::get;
//! use hybridspace_api::session_guards::CompanyScope;
//!
//! #[get("/scoped")]
//! fn scoped_route(scope: CompanyScope) -> String {
//!     format!("Operating on company {}", scope.company_id)
//! }
//! ```

use chrono::Utc;
use diesel::prelude::*;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::models::{Session, User};
use crate::schema::{sessions, users};

/// A request guard for routes that require an authenticated user.
///
/// Validation steps:
///
/// 1. Extracts the session cookie from the request
/// 2. Validates the session exists, is not revoked, and has not expired
/// 3. Retrieves the associated user
/// 4. Rejects deactivated profiles
///
/// Carries the session row alongside the user so downstream guards can
/// read the scope override without a second lookup.
///
/// # Returns
///
/// - `Outcome::Success(AuthenticatedUser)` if authentication succeeds
/// - `Outcome::Error(Status::Unauthorized)` if authentication fails
/// - `Outcome::Error(Status::InternalServerError)` if the DB pool is unavailable
#[derive(Debug)]
pub struct AuthenticatedUser {
    /// The authenticated user from the database
    pub user: User,
    /// The session backing this request
    pub session: Session,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let cookies = request.cookies();
        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let session_cookie = match cookies.get("session") {
            Some(cookie) => cookie,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let session_id = session_cookie.value().to_string();

        let session_result = db
            .run(move |conn| {
                sessions::table
                    .filter(sessions::id.eq(&session_id))
                    .filter(sessions::revoked.eq(false))
                    .filter(
                        sessions::expires_at
                            .is_null()
                            .or(sessions::expires_at.gt(Utc::now().naive_utc())),
                    )
                    .first::<Session>(conn)
                    .optional()
            })
            .await;

        let session = match session_result {
            Ok(Some(sess)) => sess,
            Ok(None) => return Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error finding session: {:?}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        let session_user_id = session.user_id;
        let user_result = db
            .run(move |conn| {
                users::table
                    .filter(users::id.eq(session_user_id))
                    .first::<User>(conn)
                    .optional()
            })
            .await;

        let user = match user_result {
            Ok(Some(u)) => u,
            Ok(None) => return Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error finding user: {:?}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        // Deactivation takes effect on the next request, not just the
        // next login.
        if !user.active {
            return Outcome::Error((Status::Unauthorized, ()));
        }

        Outcome::Success(AuthenticatedUser { user, session })
    }
}

/// Macro to create role-specific request guards
macro_rules! create_role_guard {
    ($name:ident, $check:expr) => {
        #[derive(Debug)]
        pub struct $name {
            pub user: User,
            pub session: Session,
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                let auth_user = match AuthenticatedUser::from_request(request).await {
                    Outcome::Success(user) => user,
                    Outcome::Error(e) => return Outcome::Error(e),
                    Outcome::Forward(f) => return Outcome::Forward(f),
                };

                let check: fn(&User) -> bool = $check;
                if check(&auth_user.user) {
                    Outcome::Success($name {
                        user: auth_user.user,
                        session: auth_user.session,
                    })
                } else {
                    Outcome::Error((Status::Forbidden, ()))
                }
            }
        }
    };
}

// A request guard that requires the admin role or better.
//
// # Returns
//
// - `Outcome::Success(AdminUser)` for admins and superadmins
// - `Outcome::Error(Status::Forbidden)` for authenticated employees
// - `Outcome::Error(Status::Unauthorized)` if not authenticated
create_role_guard!(AdminUser, |user| user.is_admin());

// A request guard that requires the superadmin role.
create_role_guard!(SuperadminUser, |user| user.is_superadmin());

/// The effective tenant scope of a request.
///
/// For everyone this is their own `company_id`. For a superadmin whose
/// session carries an `acting_company_id` override it is that company
/// instead. Snapshotted once per request; changing the override mid-flight
/// affects only later requests.
#[derive(Debug)]
pub struct CompanyScope {
    pub user: User,
    pub session: Session,
    /// The company id all tenant-scoped queries in this request use.
    pub company_id: i32,
}

impl CompanyScope {
    /// Whether the request is operating under an override rather than the
    /// user's own company.
    pub fn is_overridden(&self) -> bool {
        self.company_id != self.user.company_id
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CompanyScope {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let auth_user = match AuthenticatedUser::from_request(request).await {
            Outcome::Success(user) => user,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        // The override only binds for superadmins; a stale value on a
        // demoted account is ignored.
        let company_id = match auth_user.session.acting_company_id {
            Some(acting) if auth_user.user.is_superadmin() => acting,
            _ => auth_user.user.company_id,
        };

        Outcome::Success(CompanyScope {
            user: auth_user.user,
            session: auth_user.session,
            company_id,
        })
    }
}
