use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha3::{Digest, Sha3_512};

use super::{TokenClaims, TokenError, TokenHeader, TokenResult};

const SEPARATOR: char = '.';

/// Current time in epoch milliseconds, the unit of `exp`.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Encode `header` and `payload` and sign them with `secret`.
pub fn generate(header: &str, payload: &str, secret: &str) -> String {
    let header_b64 = STANDARD.encode(header.as_bytes());
    let payload_b64 = STANDARD.encode(payload.as_bytes());
    let signature = sign(&header_b64, &payload_b64, secret);

    format!("{header_b64}{SEPARATOR}{payload_b64}{SEPARATOR}{signature}")
}

/// Serialize typed header and claims as JSON, then [`generate`].
pub fn issue(header: &TokenHeader, claims: &TokenClaims, secret: &str) -> TokenResult<String> {
    let header = serde_json::to_string(header).map_err(|e| TokenError::Encode(e.to_string()))?;
    let payload = serde_json::to_string(claims).map_err(|e| TokenError::Encode(e.to_string()))?;
    Ok(generate(&header, &payload, secret))
}

/// Verify `token` against `secret` at the current time.
///
/// Returns `Ok(false)` when the signature does not match and
/// [`TokenError::Expired`] when it matches but `exp` has passed.
pub fn verify(token: &str, secret: &str) -> TokenResult<bool> {
    verify_at(token, secret, now_millis())
}

/// [`verify`] against an explicit clock, `now` in epoch milliseconds.
pub fn verify_at(token: &str, secret: &str, now: i64) -> TokenResult<bool> {
    let segments = split(token, secret)?;

    let expected = sign(segments.header, segments.payload, secret);
    if expected.as_bytes() != segments.signature.as_bytes() {
        return Ok(false);
    }

    #[derive(Deserialize)]
    struct Expiry {
        exp: i64,
    }

    let Expiry { exp } = decode_segment(segments.payload)?;
    if exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(true)
}

/// Verify `token` and decode its claims. A signature mismatch is an error here.
pub fn authorize(token: &str, secret: &str, now: i64) -> TokenResult<TokenClaims> {
    if !verify_at(token, secret, now)? {
        return Err(TokenError::SignatureMismatch);
    }
    decode_payload(token)
}

/// Decode the payload segment without checking the signature.
pub fn decode_payload<T: DeserializeOwned>(token: &str) -> TokenResult<T> {
    let payload = token.split(SEPARATOR).nth(1).ok_or(TokenError::WrongFormat)?;
    decode_segment(payload)
}

struct Segments<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

fn split<'a>(token: &'a str, secret: &str) -> TokenResult<Segments<'a>> {
    if token.trim().is_empty() {
        return Err(TokenError::EmptyToken);
    }
    if secret.trim().is_empty() {
        return Err(TokenError::EmptyKey);
    }

    let parts: Vec<&str> = token.split(SEPARATOR).collect();
    let [header, payload, signature] = parts[..] else {
        return Err(TokenError::WrongFormat);
    };

    if header.trim().is_empty() {
        return Err(TokenError::EmptyHeader);
    }
    if payload.trim().is_empty() {
        return Err(TokenError::EmptyPayload);
    }
    if signature.trim().is_empty() {
        return Err(TokenError::EmptySignature);
    }

    Ok(Segments {
        header,
        payload,
        signature,
    })
}

fn sign(header_b64: &str, payload_b64: &str, secret: &str) -> String {
    let mut hasher = Sha3_512::new();
    hasher.update(header_b64.as_bytes());
    hasher.update(payload_b64.as_bytes());
    hasher.update(secret.as_bytes());
    STANDARD.encode(hasher.finalize())
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> TokenResult<T> {
    let bytes = STANDARD
        .decode(segment)
        .map_err(|e| TokenError::MalformedSegment(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::MalformedSegment(e.to_string()))
}
