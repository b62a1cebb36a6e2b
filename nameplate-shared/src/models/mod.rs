/// Data model for Nameplate
///
/// - `user`: profile owners and login principals
/// - `login_token`: one-time magic-link credentials

pub mod login_token;
pub mod user;

pub use login_token::LoginToken;
pub use user::{CreateUser, User, UserPage, USERS_PER_PAGE};
