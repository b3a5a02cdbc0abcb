//! Signed session tokens
//!
//! Sessions are stateless: an HS256 JWT carrying the user id and username.
//! Clients present it as `Authorization: Bearer <token>` or in the
//! `fintrack_session` cookie.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use fintrack_core::auth::generate_secret;
use fintrack_core::models::User;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "fintrack_session";

/// Upper bound on token lifetime (one year)
const MAX_TTL_HOURS: u64 = 24 * 365;

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Signing and verification keys plus token lifetime
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: u64, secure_cookies: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours.min(MAX_TTL_HOURS) as i64),
            secure_cookies,
        }
    }

    /// Use the configured secret, or a random one that dies with the process
    pub fn from_secret_or_random(
        secret: Option<&str>,
        ttl_hours: u64,
        secure_cookies: bool,
    ) -> Self {
        match secret {
            Some(secret) => Self::new(secret, ttl_hours, secure_cookies),
            None => {
                warn!(
                    "No session secret configured (set FINTRACK_SECRET_KEY); sessions will not survive restarts"
                );
                Self::new(&generate_secret(), ttl_hours, secure_cookies)
            }
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for `user`
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify signature and expiry; `None` for anything invalid
    pub fn verify(&self, token: &str) -> Option<CurrentUser> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;
        let id = data.claims.sub.parse().ok()?;
        Some(CurrentUser {
            id,
            username: data.claims.username,
        })
    }

    /// `Set-Cookie` value carrying `token`
    pub fn cookie(&self, token: &str) -> String {
        self.cookie_with_age(token, self.ttl_seconds())
    }

    /// `Set-Cookie` value that clears the session
    pub fn clear_cookie(&self) -> String {
        self.cookie_with_age("", 0)
    }

    fn cookie_with_age(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE, value, max_age
        );
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Pull the session token from the Authorization header, then the cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|t| t.trim())
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = SessionKeys::new("secret", 24, false);
        let token = keys.issue(&user()).unwrap();
        let current = keys.verify(&token).unwrap();
        assert_eq!(current.id, 7);
        assert_eq!(current.username, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = SessionKeys::new("one", 24, false).issue(&user()).unwrap();
        assert!(SessionKeys::new("two", 24, false).verify(&token).is_none());
        assert!(SessionKeys::new("one", 24, false).verify("garbage").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = SessionKeys::new("secret", 24, false);
        let claims = Claims {
            sub: "7".to_string(),
            username: "alice".to_string(),
            iat: 0,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let keys = SessionKeys::new("secret", 1, true);
        let cookie = keys.cookie("abc");
        assert!(cookie.starts_with("fintrack_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));

        let cleared = SessionKeys::new("secret", 1, false).clear_cookie();
        assert_eq!(
            cleared,
            "fintrack_session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
        );
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; fintrack_session=from-cookie"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_similar_cookie_name_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("fintrack_session_old=stale"),
        );
        assert_eq!(token_from_headers(&headers), None);
    }
}
