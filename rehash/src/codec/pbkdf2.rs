//! PBKDF2 tokens, in spelled-out and compressed form.
//!
//! Spelled out:
//!
//! ```text
//! $pbkdf2$<HMAC>$<iterations>$<key bits>$<salt b64>$<digest b64>
//! ```
//!
//! Compressed:
//!
//! ```text
//! $<iterations << 32 | hmac code << 16 | key bits>$<salt b64>$<digest b64>
//! ```
//!
//! The compressed bit layout is frozen: 32 bits of iterations, 16 bits of
//! HMAC code, 16 bits of key length. Stored hashes depend on it.

use crate::codec::{
    DecodedHash, decode_b64, encode_b64, expect_len, parse_decimal, split_fields,
};
use crate::error::HashError;
use crate::function::pbkdf2::{Hmac, Pbkdf2Function};
use crate::kind::AlgorithmKind;

/// Prefix of a spelled-out PBKDF2 token.
pub const PREFIX: &str = "$pbkdf2$";

const FIELDS: usize = 7;
const COMPRESSED_FIELDS: usize = 4;

/// Returns `true` if `token` starts with `$<decimal digits>$`.
pub fn has_compressed_prefix(token: &str) -> bool {
    token
        .strip_prefix('$')
        .and_then(|rest| rest.split_once('$'))
        .is_some_and(|(packed, _)| !packed.is_empty() && packed.bytes().all(|b| b.is_ascii_digit()))
}

/// Renders a spelled-out PBKDF2 token.
pub fn encode(params: &Pbkdf2Function, salt: &[u8], digest: &[u8]) -> String {
    format!(
        "$pbkdf2${}${}${}${}${}",
        params.algorithm().name(),
        params.iterations(),
        params.length(),
        encode_b64(salt),
        encode_b64(digest)
    )
}

/// Parses a spelled-out PBKDF2 token.
///
/// ## Errors
///
/// Returns `HashError::MalformedHash` for a structural problem and
/// `HashError::UnsupportedAlgorithm` for an unknown HMAC name.
pub fn decode(token: &str) -> Result<DecodedHash<Pbkdf2Function>, HashError> {
    let family = AlgorithmKind::Pbkdf2;
    let fields = split_fields(token, FIELDS, family)?;
    if fields[1] != "pbkdf2" {
        return Err(HashError::malformed(family, "missing pbkdf2 marker"));
    }

    let algorithm: Hmac = fields[2].parse()?;
    let iterations = parse_decimal(fields[3], family, "iterations")?;
    let length = parse_decimal(fields[4], family, "key length")?;
    let params = Pbkdf2Function::new(algorithm, iterations, length)
        .map_err(|e| HashError::malformed(family, e.to_string()))?;

    finish(params, fields[5], fields[6], family)
}

/// Packs iterations, HMAC code and key length into one integer.
pub fn pack(params: &Pbkdf2Function) -> u64 {
    (u64::from(params.iterations()) << 32)
        | (u64::from(params.algorithm().code()) << 16)
        | u64::from(params.length())
}

/// Splits a packed integer back into `(hmac code, iterations, key bits)`.
pub fn unpack(packed: u64) -> (u16, u32, u32) {
    let iterations = (packed >> 32) as u32;
    let code = ((packed >> 16) & 0xFFFF) as u16;
    let length = (packed & 0xFFFF) as u32;
    (code, iterations, length)
}

/// Renders a compressed PBKDF2 token.
pub fn encode_compressed(params: &Pbkdf2Function, salt: &[u8], digest: &[u8]) -> String {
    format!(
        "${}${}${}",
        pack(params),
        encode_b64(salt),
        encode_b64(digest)
    )
}

/// Parses a compressed PBKDF2 token.
///
/// ## Errors
///
/// Returns `HashError::MalformedHash` for a structural problem and
/// `HashError::UnsupportedAlgorithm` for an unknown HMAC code.
pub fn decode_compressed(token: &str) -> Result<DecodedHash<Pbkdf2Function>, HashError> {
    let family = AlgorithmKind::CompressedPbkdf2;
    let fields = split_fields(token, COMPRESSED_FIELDS, family)?;

    let packed: u64 = parse_decimal(fields[1], family, "packed parameters")?;
    let (code, iterations, length) = unpack(packed);
    let algorithm = Hmac::from_code(code)
        .ok_or_else(|| HashError::UnsupportedAlgorithm(format!("PBKDF2 HMAC code {code}")))?;
    let params = Pbkdf2Function::new(algorithm, iterations, length)
        .map_err(|e| HashError::malformed(family, e.to_string()))?;

    finish(params, fields[2], fields[3], family)
}

fn finish(
    params: Pbkdf2Function,
    salt: &str,
    digest: &str,
    family: AlgorithmKind,
) -> Result<DecodedHash<Pbkdf2Function>, HashError> {
    let salt = decode_b64(salt, family, "salt")?;
    let digest = decode_b64(digest, family, "digest")?;
    expect_len(&digest, params.length_bytes(), family, "digest")?;
    Ok(DecodedHash {
        params,
        salt,
        digest,
    })
}
