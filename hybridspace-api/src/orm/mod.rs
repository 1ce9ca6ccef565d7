//! Database layer: Diesel queries and the domain rules that sit directly
//! on top of them. API handlers call these functions inside `db.run`.

pub mod analytics;
pub mod asset;
pub mod booking;
pub mod company;
pub mod db;
pub mod invitation;
pub mod login;
pub mod logout;
pub mod magic_link;
pub mod office;
pub mod password_reset;
pub mod scope;
pub mod team;
pub mod testing;
pub mod user;
pub mod zone;

pub use db::DbConn;
