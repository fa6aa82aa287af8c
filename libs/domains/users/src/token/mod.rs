//! Compact signed bearer tokens.
//!
//! Wire format: `<base64 header>.<base64 payload>.<base64 signature>`, where
//! the signature is `SHA3-512(header_b64 ++ payload_b64 ++ secret)`. This is
//! secret-suffix hashing, not HMAC; it is kept for compatibility with tokens
//! already issued under the same secret.

mod codec;
mod config;

pub use codec::{authorize, decode_payload, generate, issue, now_millis, verify, verify_at};
pub use config::TokenConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_TYPE: &str = "JWT";
pub const SIGNING_ALGORITHM: &str = "SHA3-512";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token cannot be empty")]
    EmptyToken,

    #[error("signing key cannot be empty")]
    EmptyKey,

    #[error("wrong token format")]
    WrongFormat,

    #[error("token header is empty")]
    EmptyHeader,

    #[error("token payload is empty")]
    EmptyPayload,

    #[error("token signature is empty")]
    EmptySignature,

    #[error("token signature does not match")]
    SignatureMismatch,

    #[error("token has expired")]
    Expired,

    #[error("malformed token segment: {0}")]
    MalformedSegment(String),

    #[error("failed to encode token segment: {0}")]
    Encode(String),
}

pub type TokenResult<T> = Result<T, TokenError>;

/// First token segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: SIGNING_ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// Second token segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    pub name: String,
    pub roles: Vec<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub iss: String,
    /// Expiry, epoch milliseconds
    pub exp: i64,
}

impl TokenClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}
