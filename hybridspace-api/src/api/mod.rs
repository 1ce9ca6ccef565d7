pub mod analytics;
pub mod asset;
pub mod booking;
pub mod company;
pub mod invitation;
pub mod login;
pub mod logout;
pub mod magic_link;
pub mod office;
pub mod password_reset;
pub mod register;
pub mod scope;
pub mod status;
pub mod team;
pub mod user;
pub mod zone;

use rocket::Route;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(analytics::routes());
    routes.extend(asset::routes());
    routes.extend(booking::routes());
    routes.extend(company::routes());
    routes.extend(invitation::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes.extend(magic_link::routes());
    routes.extend(office::routes());
    routes.extend(password_reset::routes());
    routes.extend(register::routes());
    routes.extend(scope::routes());
    routes.extend(status::routes());
    routes.extend(team::routes());
    routes.extend(user::routes());
    routes.extend(zone::routes());
    routes
}
