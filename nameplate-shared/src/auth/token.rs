/// Opaque token generation
///
/// Login tokens, activation tokens, and session ids all share this
/// generator: a fixed-length alphanumeric string drawn from a
/// cryptographically secure RNG (`rand::thread_rng` is a CSPRNG). The
/// value carries no structure; it is matched by exact value only.

use rand::Rng;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every generated token.
pub const TOKEN_LEN: usize = 40;

/// Generates a fresh opaque token.
///
/// # Example
///
/// ```
/// use nameplate_shared::auth::token;
///
/// let value = token::generate();
/// assert_eq!(value.len(), token::TOKEN_LEN);
/// ```
pub fn generate() -> String {
    let mut rng = rand::thread_rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
