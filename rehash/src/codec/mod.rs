//! Token codecs: one per hashing function family.
//!
//! A token is the single text string stored in place of a password. It
//! carries the algorithm parameters, the salt and the digest, and its prefix
//! alone tells which family produced it:
//!
//! | Family | Prefix |
//! |--------|--------|
//! | PBKDF2 | `$pbkdf2$` |
//! | Compressed PBKDF2 | `$<decimal>$` |
//! | BCrypt | `$2a$`, `$2b$`, `$2x$`, `$2y$` |
//! | SCrypt | `$s0$` |
//! | Message digest | `$md$` |
//! | Argon2 | `$argon2d$`, `$argon2i$`, `$argon2id$` |
//!
//! Every `decode` is the left inverse of the matching `encode`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::HashError;
use crate::kind::AlgorithmKind;

#[cfg(feature = "argon2")]
pub mod argon2;
pub mod bcrypt;
pub mod digest;
pub mod pbkdf2;
pub mod scrypt;

/// The three things every token carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHash<P> {
    /// The parameter set the token was produced with.
    pub params: P,
    /// The salt embedded in the token (empty for message digests).
    pub salt: Vec<u8>,
    /// The digest embedded in the token.
    pub digest: Vec<u8>,
}

impl<P> DecodedHash<P> {
    pub(crate) fn map<Q>(self, f: impl FnOnce(P) -> Q) -> DecodedHash<Q> {
        DecodedHash {
            params: f(self.params),
            salt: self.salt,
            digest: self.digest,
        }
    }
}

/// Determines which family produced `token` from its prefix.
///
/// This only looks at the prefix; the family's `decode` still validates the
/// rest of the token.
///
/// ## Errors
///
/// Returns `HashError::UnsupportedAlgorithm` for an empty token or an
/// unrecognised prefix.
///
/// ## Examples
///
/// ```rust
/// use rehash::{AlgorithmKind, codec::identify_family};
///
/// let token = "$2b$05$abcdefghijklmnopqrstuuJ8PzT6p.9vAP3JlIN6K0GKMr6X/uOAC";
/// assert_eq!(identify_family(token).unwrap(), AlgorithmKind::Bcrypt);
/// assert!(identify_family("plain text").is_err());
/// ```
pub fn identify_family(token: &str) -> Result<AlgorithmKind, HashError> {
    let kind = if token.starts_with(pbkdf2::PREFIX) {
        Some(AlgorithmKind::Pbkdf2)
    } else if token.starts_with(scrypt::PREFIX) {
        Some(AlgorithmKind::Scrypt)
    } else if token.starts_with(digest::PREFIX) {
        Some(AlgorithmKind::MessageDigest)
    } else if bcrypt::has_prefix(token) {
        Some(AlgorithmKind::Bcrypt)
    } else if pbkdf2::has_compressed_prefix(token) {
        Some(AlgorithmKind::CompressedPbkdf2)
    } else {
        argon2_family(token)
    };

    match kind {
        Some(kind) => {
            debug!(family = %kind, "identified hash family");
            Ok(kind)
        }
        None => {
            debug!("no hash family matches the token prefix");
            Err(HashError::UnsupportedAlgorithm(prefix_label(token)))
        }
    }
}

#[cfg(feature = "argon2")]
fn argon2_family(token: &str) -> Option<AlgorithmKind> {
    argon2::has_prefix(token).then_some(AlgorithmKind::Argon2)
}

#[cfg(not(feature = "argon2"))]
fn argon2_family(_token: &str) -> Option<AlgorithmKind> {
    None
}

/// The first `$`-delimited label of a token, for error messages.
fn prefix_label(token: &str) -> String {
    if token.is_empty() {
        return "empty token".to_string();
    }
    let label = token
        .strip_prefix('$')
        .and_then(|rest| rest.split('$').next())
        .filter(|label| !label.is_empty());
    match label {
        Some(label) => label.chars().take(16).collect(),
        None => "unrecognised token format".to_string(),
    }
}

/// Splits a `$`-delimited token and checks the field count.
///
/// The first field is the empty string before the leading `$`.
pub(crate) fn split_fields(
    token: &str,
    expected: usize,
    family: AlgorithmKind,
) -> Result<Vec<&str>, HashError> {
    let fields: Vec<&str> = token.split('$').collect();
    if fields.len() != expected {
        return Err(HashError::malformed(
            family,
            format!("expected {expected} fields, found {}", fields.len()),
        ));
    }
    if !fields[0].is_empty() {
        return Err(HashError::malformed(family, "token must start with '$'"));
    }
    Ok(fields)
}

/// Parses a field made only of ASCII digits.
pub(crate) fn parse_decimal<T: std::str::FromStr>(
    field: &str,
    family: AlgorithmKind,
    what: &str,
) -> Result<T, HashError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HashError::malformed(family, format!("{what} is not a number")));
    }
    field
        .parse()
        .map_err(|_| HashError::malformed(family, format!("{what} is out of range")))
}

/// Encodes bytes as padded standard base64.
pub(crate) fn encode_b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a padded standard base64 field.
pub(crate) fn decode_b64(
    field: &str,
    family: AlgorithmKind,
    what: &str,
) -> Result<Vec<u8>, HashError> {
    STANDARD
        .decode(field)
        .map_err(|e| HashError::malformed(family, format!("{what} is not valid base64: {e}")))
}

/// Checks that a decoded digest has the length its parameters imply.
pub(crate) fn expect_len(
    bytes: &[u8],
    expected: usize,
    family: AlgorithmKind,
    what: &str,
) -> Result<(), HashError> {
    if bytes.len() != expected {
        return Err(HashError::malformed(
            family,
            format!("{what} must be {expected} bytes, found {}", bytes.len()),
        ));
    }
    Ok(())
}
