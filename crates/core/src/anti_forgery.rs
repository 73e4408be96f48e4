//! Anti-forgery tokens for form submissions.
//!
//! Each client holds a random nonce in a cookie (see [`new_nonce`]). Every
//! form view carries a token issued for that nonce by [`AntiForgeryKey::issue`],
//! and the HTTP layer refuses a POST unless the token verifies and names the
//! nonce the client's cookie holds. A token harvested by another client is
//! therefore useless without that client's cookie. Tokens are stateless:
//!
//! ```text
//! <nonce hex>.<issued-at unix secs>.<HMAC-SHA256(secret, "<nonce hex>.<issued-at>") hex>
//! ```

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// Number of random bytes in a client nonce.
pub const NONCE_BYTES: usize = 16;

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINS: i64 = 120;

/// Reasons a submitted token is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("anti-forgery token is missing")]
    Missing,

    #[error("anti-forgery token is malformed")]
    Malformed,

    #[error("anti-forgery token signature does not match")]
    BadSignature,

    #[error("anti-forgery token has expired")]
    Expired,

    #[error("anti-forgery cookie is missing")]
    MissingCookie,

    #[error("anti-forgery token was issued to a different client")]
    CookieMismatch,
}

/// Generate a fresh client nonce as lowercase hex.
pub fn new_nonce() -> String {
    let mut nonce = [0u8; NONCE_BYTES];
    rand::rng().fill(&mut nonce);
    hex::encode(nonce)
}

/// Whether `value` has the shape of a nonce from [`new_nonce`].
pub fn is_nonce(value: &str) -> bool {
    value.len() == NONCE_BYTES * 2 && hex::decode(value).is_some()
}

/// Signing key plus token lifetime.
#[derive(Clone)]
pub struct AntiForgeryKey {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for AntiForgeryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AntiForgeryKey")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl AntiForgeryKey {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl,
        }
    }

    /// Issue a token for the client holding `nonce`, stamped with the
    /// current time.
    pub fn issue(&self, nonce: &str) -> String {
        self.issue_at(nonce, Utc::now())
    }

    /// Issue a token for `nonce` as if the current time were `now`.
    pub fn issue_at(&self, nonce: &str, now: Timestamp) -> String {
        let payload = format!("{nonce}.{}", now.timestamp());
        let signature = hex::encode(self.sign(&payload));
        format!("{payload}.{signature}")
    }

    /// Verify a submitted token against the client's cookie nonce and the
    /// current time.
    pub fn verify(&self, token: &str, cookie_nonce: Option<&str>) -> Result<(), TokenError> {
        self.verify_at(token, cookie_nonce, Utc::now())
    }

    /// Verify a submitted token as if the current time were `now`.
    pub fn verify_at(
        &self,
        token: &str,
        cookie_nonce: Option<&str>,
        now: Timestamp,
    ) -> Result<(), TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (nonce, issued_at) = payload.split_once('.').ok_or(TokenError::Malformed)?;

        if !is_nonce(nonce) {
            return Err(TokenError::Malformed);
        }
        let issued_at: i64 = issued_at.parse().map_err(|_| TokenError::Malformed)?;
        let signature = hex::decode(signature).ok_or(TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        if now.timestamp() - issued_at > self.ttl.num_seconds() {
            return Err(TokenError::Expired);
        }

        match cookie_nonce {
            None => Err(TokenError::MissingCookie),
            Some(cookie) if cookie == nonce => Ok(()),
            Some(_) => Err(TokenError::CookieMismatch),
        }
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string, returning `None` on odd length or non-hex input.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect()
    }
}
