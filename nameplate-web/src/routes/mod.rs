/// Route handlers, organized by page:
///
/// - `home`: home page and the dashboard placeholder
/// - `login`: magic-link request, consumption, logout
/// - `register`: registration and account activation
/// - `users`: directory listing and profile pages

pub mod home;
pub mod login;
pub mod register;
pub mod users;
