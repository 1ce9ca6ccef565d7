pub mod asset;
pub mod booking;
pub mod company;
pub mod invitation;
pub mod magic_link;
pub mod office;
pub mod password_reset;
pub mod session;
pub mod team;
pub mod user;
pub mod zone;

// Re-export models for easier access
pub use asset::*;
pub use booking::*;
pub use company::*;
pub use invitation::*;
pub use magic_link::*;
pub use office::*;
pub use password_reset::*;
pub use session::*;
pub use team::*;
pub use user::*;
pub use zone::*;
