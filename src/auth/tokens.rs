use std::{fmt, time::Duration};

use data_encoding::BASE32_NOPAD;
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;

/// Random bytes per token; 128 bits of entropy.
const TOKEN_BYTES: usize = 16;
/// Unpadded base-32 length of `TOKEN_BYTES`.
pub const TOKEN_LEN: usize = 26;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("random source unavailable")]
    RandomSource(#[source] rand::Error),
    #[error("token lifetime of {0:?} is out of range")]
    TtlOutOfRange(Duration),
}

/// A freshly issued authentication token.
///
/// `plaintext` exists only here, between generation and the response that
/// hands it to the client. Storage sees `hash`, `user_id` and `expiry`.
#[derive(Clone, Serialize)]
pub struct Token {
    #[serde(rename = "token")]
    pub plaintext: String,
    #[serde(skip_serializing)]
    pub hash: Vec<u8>,
    #[serde(skip_serializing)]
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub expiry: OffsetDateTime,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("plaintext", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("expiry", &self.expiry)
            .finish()
    }
}

pub fn generate(user_id: i64, ttl: Duration) -> Result<Token, TokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(TokenError::RandomSource)?;

    let expiry = time::Duration::try_from(ttl)
        .ok()
        .and_then(|ttl| OffsetDateTime::now_utc().checked_add(ttl))
        .ok_or(TokenError::TtlOutOfRange(ttl))?;

    let plaintext = BASE32_NOPAD.encode(&bytes);
    let hash = hash_token(&plaintext);

    Ok(Token {
        plaintext,
        hash,
        user_id,
        expiry,
    })
}

/// sha256(token) -> raw 32 bytes, stored as BYTEA and looked up by equality.
pub fn hash_token(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

pub fn validate_format(plaintext: &str) -> bool {
    !plaintext.is_empty() && plaintext.len() == TOKEN_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn generated_token_is_26_base32_chars() {
        let token = generate(7, DAY).expect("generate");
        assert_eq!(token.plaintext.len(), TOKEN_LEN);
        assert!(token
            .plaintext
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
        assert!(validate_format(&token.plaintext));
        assert_eq!(token.user_id, 7);
    }

    #[test]
    fn hash_is_sha256_of_plaintext() {
        let token = generate(1, DAY).expect("generate");
        assert_eq!(token.hash.len(), 32);
        assert_eq!(token.hash, hash_token(&token.plaintext));
        assert_ne!(hash_token("AAAAAAAAAAAAAAAAAAAAAAAAAA"), token.hash);
    }

    #[test]
    fn tokens_in_sequence_differ() {
        let a = generate(1, DAY).expect("generate");
        let b = generate(1, DAY).expect("generate");
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn expiry_is_now_plus_ttl() {
        let before = OffsetDateTime::now_utc();
        let token = generate(1, DAY).expect("generate");
        let after = OffsetDateTime::now_utc();
        assert!(token.expiry >= before + DAY);
        assert!(token.expiry <= after + DAY);
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let err = generate(1, Duration::from_secs(100_000_000 * 3600)).unwrap_err();
        assert!(matches!(err, TokenError::TtlOutOfRange(_)));
        let err = generate(1, Duration::MAX).unwrap_err();
        assert!(matches!(err, TokenError::TtlOutOfRange(_)));
    }

    #[test]
    fn format_requires_exactly_26_chars() {
        assert!(!validate_format(""));
        assert!(!validate_format("ABC"));
        assert!(!validate_format(&"A".repeat(27)));
        assert!(validate_format(&"A".repeat(26)));
    }

    #[test]
    fn debug_and_json_never_leak_the_hash() {
        let token = generate(3, DAY).expect("generate");
        let debug = format!("{:?}", token);
        assert!(!debug.contains(&token.plaintext));

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["token"], token.plaintext);
        assert!(json.get("hash").is_none());
        assert!(json.get("user_id").is_none());
        assert!(json["expiry"].is_string());
    }
}
