//! HMAC-SHA256 signed bearer tokens.
//!
//! Token layout: `base64url(claims_json) "." base64url(hmac_sha256(claims_b64))`.
//! The claims carry the user id (`sub`), issue time (`iat`) and expiry (`exp`)
//! as Unix seconds. No server-side session state is kept.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chatter_core::auth::credentials::TokenCodec;
use chatter_types::error::AuthError;
use chatter_types::user::UserId;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: UserId,
    iat: i64,
    exp: i64,
}

/// Stateless token issuer/verifier keyed by a shared secret.
#[derive(Clone)]
pub struct HmacTokenCodec {
    key: Vec<u8>,
    ttl: Duration,
}

impl HmacTokenCodec {
    pub fn new(key: impl Into<Vec<u8>>, ttl_days: u32) -> Self {
        Self {
            key: key.into(),
            ttl: Duration::days(i64::from(ttl_days)),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.key).map_err(|_| AuthError::Signing)
    }

    /// Issue a token as of `now`.
    ///
    /// Fails with `Signing` when `now + ttl` is outside chrono's date range.
    pub fn issue_token_at(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or(AuthError::Signing)?;
        let claims = TokenClaims {
            sub: *user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let json = serde_json::to_vec(&claims).map_err(|_| AuthError::Signing)?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Verify a token as of `now`.
    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Option<UserId> {
        let (payload, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(payload.as_bytes());
        // Constant-time verification (via hmac crate's `verify_slice`)
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: TokenClaims = serde_json::from_slice(&json).ok()?;
        if claims.exp <= now.timestamp() {
            tracing::debug!(user_id = %claims.sub, "Token expired");
            return None;
        }
        Some(claims.sub)
    }
}

impl TokenCodec for HmacTokenCodec {
    fn issue_token(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.issue_token_at(user_id, Utc::now())
    }

    fn verify_token(&self, token: &str) -> Option<UserId> {
        self.verify_token_at(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> HmacTokenCodec {
        HmacTokenCodec::new(b"test-secret-key".to_vec(), 7)
    }

    #[test]
    fn test_issue_then_verify() {
        let codec = codec();
        let user = UserId::new();
        let token = codec.issue_token(&user).unwrap();
        assert_eq!(codec.verify_token(&token), Some(user));
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let codec = HmacTokenCodec::new(b"k".to_vec(), u32::MAX);
        let result = codec.issue_token(&UserId::new());
        assert!(matches!(result, Err(AuthError::Signing)));
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let codec = codec();
        let user = UserId::new();
        let issued = Utc::now();
        let token = codec.issue_token_at(&user, issued).unwrap();

        assert_eq!(
            codec.verify_token_at(&token, issued + Duration::days(6)),
            Some(user)
        );
        assert_eq!(codec.verify_token_at(&token, issued + Duration::days(7)), None);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let token = codec.issue_token(&UserId::new()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged_claims = TokenClaims {
            sub: UserId::new(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{signature}");
        assert_eq!(codec.verify_token(&forged), None);
    }

    #[test]
    fn test_other_key_rejected() {
        let token = codec().issue_token(&UserId::new()).unwrap();
        let other = HmacTokenCodec::new(b"another-key".to_vec(), 7);
        assert_eq!(other.verify_token(&token), None);
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();
        for token in ["", "no-dot", "a.b", "...", "!!!.???"] {
            assert_eq!(codec.verify_token(token), None, "accepted {token:?}");
        }
    }
}
