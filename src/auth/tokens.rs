use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime};

const TOKEN_BYTES: usize = 32;
const BEARER_PREFIX: &str = "Bearer ";

/// Opaque random token: 32 bytes from the OS RNG, URL-safe base64.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Fresh token plus its expiry `ttl_secs` from now.
pub fn issue(ttl_secs: i64) -> (String, OffsetDateTime) {
    let expires_at = OffsetDateTime::now_utc() + Duration::seconds(ttl_secs);
    (generate_token(), expires_at)
}

/// Expired means strictly before now; a token expiring this instant still passes.
pub fn is_expired(expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    match expires_at {
        Some(at) => at < now,
        None => true,
    }
}

/// Returns the trimmed token if the header starts with the literal `"Bearer "`.
pub fn parse_bearer(header: &str) -> Option<&str> {
    header.strip_prefix(BEARER_PREFIX).map(str::trim)
}

pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
