//! Session revocation.

use diesel::prelude::*;

use crate::{DbConn, schema::sessions::dsl::*};

/// Revokes a session by marking it as revoked in the database.
///
/// The record is kept rather than deleted, for auditing. Revocation also
/// retires any superadmin scope override the session carried, since the
/// override is a column on the same row.
///
/// # Returns
/// * `Ok(usize)` - Number of rows affected (1 on success, 0 for unknown ids)
/// * `Err(diesel::result::Error)` - Database operation failed
pub async fn revoke_session(db: &DbConn, session_id: &str) -> Result<usize, diesel::result::Error> {
    let session_id = session_id.to_string();
    db.run(move |conn| {
        diesel::update(sessions.filter(id.eq(&session_id)))
            .set(revoked.eq(true))
            .execute(conn)
    })
    .await
}
