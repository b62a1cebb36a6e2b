/// Magic-link authentication
///
/// - `token`: opaque credential generation
/// - `flow`: the request-link / consume-token state machine

pub mod flow;
pub mod token;

pub use flow::{consume_token, request_link, LoginError};
