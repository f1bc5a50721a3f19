//! Stateless admin sessions and password hashing.
//!
//! A session token is `base64url(payload).base64url(hmac_sha256(payload))`
//! signed with the configured session secret. Nothing is stored server
//! side; revocation happens by rotating the secret.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "adzan_admin_session";

/// Signed session payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub admin_id: String,
    pub email: String,
    /// Unix seconds.
    pub exp: i64,
}

fn sign(secret: &str, payload: &str) -> String {
    // Hmac::new_from_slice only fails on a zero-length key, which the
    // config layer rejects before the server starts.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| HmacSha256::new_from_slice(b"-").unwrap());
    mac.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Mint a session token for a freshly authenticated admin.
pub fn issue(secret: &str, admin_id: &str, email: &str, ttl_secs: u64) -> String {
    let session = Session {
        admin_id: admin_id.to_string(),
        email: email.to_string(),
        exp: chrono::Utc::now().timestamp() + ttl_secs as i64,
    };
    // Serializing a struct of strings and an integer cannot fail.
    let payload =
        URL_SAFE_NO_PAD.encode(serde_json::to_string(&session).unwrap_or_default());
    let signature = sign(secret, &payload);
    format!("{payload}.{signature}")
}

/// Verify a token's signature and expiry. Returns `None` for anything
/// malformed, tampered or expired.
pub fn verify(secret: &str, token: &str) -> Option<Session> {
    let (payload, provided) = token.split_once('.')?;

    let expected = sign(secret, payload);
    if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        return None;
    }

    let raw = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let session: Session = serde_json::from_slice(&raw).ok()?;
    if session.admin_id.is_empty() || session.email.is_empty() {
        return None;
    }
    if session.exp < chrono::Utc::now().timestamp() {
        return None;
    }
    Some(session)
}

/// Pull the session token out of a `Cookie` header value.
pub fn token_from_cookies(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE).and_then(|rest| rest.strip_prefix('=')))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ─── Password hashing ─────────────────────────────────────

/// Fresh random salt for a new admin account.
pub fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Salted SHA-256 digest, base64url encoded.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Check a login attempt against a stored salt and hash.
pub fn verify_password(salt: &str, stored_hash: &str, password: &str) -> bool {
    constant_time_eq(
        hash_password(salt, password).as_bytes(),
        stored_hash.as_bytes(),
    )
}
