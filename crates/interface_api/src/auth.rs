//! Bearer token authentication for the scoring API
//!
//! Tokens are HS256 JWTs carrying the caller's roles. A role string doubles
//! as a permission (`claim:score`, `alarm:read`); `admin` holds them all.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

/// Permissions checked by the handlers
pub mod permissions {
    pub const CLAIM_SCORE: &str = "claim:score";
    pub const ALARM_READ: &str = "alarm:read";
}

pub const ADMIN_ROLE: &str = "admin";

/// Ten years; longer lifetimes are capped
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 3_600;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller id, logged by the audit middleware
    pub sub: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Claims for `subject` valid for `ttl_secs` from now
    pub fn new(subject: impl Into<String>, roles: Vec<String>, ttl_secs: u64) -> Self {
        let now = Utc::now();
        let ttl = Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64);
        Self {
            sub: subject.into(),
            roles,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn holds(&self, permission: &str) -> bool {
        self.roles.iter().any(|r| r == permission || r == ADMIN_ROLE)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing permission: {0}")]
    MissingPermission(&'static str),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
            AuthError::MissingPermission(permission) => {
                ApiError::Forbidden(format!("Missing permission: {permission}"))
            }
            AuthError::Signing(msg) => ApiError::Internal(msg),
        }
    }
}

/// Signs `claims` with the shared secret
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Checks the signature and expiry of `token`
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
}

/// Passes when auth is disabled (no caller) or the caller holds `permission`
pub fn require_permission(caller: Option<&Claims>, permission: &'static str) -> Result<(), AuthError> {
    match caller {
        Some(claims) if !claims.holds(permission) => Err(AuthError::MissingPermission(permission)),
        _ => Ok(()),
    }
}
