//! BCrypt tokens in modular crypt format.
//!
//! ```text
//! $2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy
//! └┬┘ └┬┘└──────── salt ──────┘└──────────── digest ─────────┘
//! version cost     22 chars              31 chars
//! ```
//!
//! Salt (16 bytes) and digest (23 bytes) use bcrypt's own radix-64 alphabet
//! `./A-Za-z0-9` without padding.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::codec::DecodedHash;
use crate::error::HashError;
use crate::function::bcrypt::{BcryptFunction, BcryptVersion, MAX_COST, MIN_COST};
use crate::kind::AlgorithmKind;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Digest length in bytes (the last byte of bcrypt's 24-byte output is dropped).
pub const DIGEST_LEN: usize = 23;

const TOKEN_LEN: usize = 60;
const SALT_START: usize = 7;
const DIGEST_START: usize = SALT_START + 22;

const RADIX64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Returns `true` if `token` starts with a BCrypt version marker.
pub fn has_prefix(token: &str) -> bool {
    token.len() >= 4
        && token.is_char_boundary(4)
        && token.starts_with('$')
        && token.as_bytes()[3] == b'$'
        && BcryptVersion::from_marker(&token[1..3]).is_some()
}

/// Renders a BCrypt token. `salt` must be 16 bytes and `digest` 23 bytes.
pub fn encode(params: &BcryptFunction, salt: &[u8], digest: &[u8]) -> String {
    format!(
        "${}${:02}${}{}",
        params.version().marker(),
        params.cost(),
        RADIX64.encode(salt),
        RADIX64.encode(digest)
    )
}

/// Parses a BCrypt token, recovering version, cost, salt and digest.
///
/// ## Errors
///
/// Returns `HashError::MalformedHash` for a wrong length, misplaced
/// delimiters, an unknown version marker, a cost outside 4..=31, or invalid
/// radix-64 content.
pub fn decode(token: &str) -> Result<DecodedHash<BcryptFunction>, HashError> {
    let family = AlgorithmKind::Bcrypt;
    if !token.is_ascii() || token.len() != TOKEN_LEN {
        return Err(HashError::malformed(
            family,
            format!("expected {TOKEN_LEN} ASCII characters, found {}", token.chars().count()),
        ));
    }

    let bytes = token.as_bytes();
    if bytes[0] != b'$' || bytes[3] != b'$' || bytes[6] != b'$' {
        return Err(HashError::malformed(family, "misplaced delimiters"));
    }

    let version = BcryptVersion::from_marker(&token[1..3])
        .ok_or_else(|| HashError::malformed(family, "unknown version marker"))?;

    let cost_field = &token[4..6];
    if !cost_field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HashError::malformed(family, "cost is not a number"));
    }
    let cost: u32 = cost_field
        .parse()
        .map_err(|_| HashError::malformed(family, "cost is not a number"))?;
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(HashError::malformed(
            family,
            format!("cost {cost} outside {MIN_COST}..={MAX_COST}"),
        ));
    }

    let salt = decode_radix64(&token[SALT_START..DIGEST_START], SALT_LEN, "salt")?;
    let digest = decode_radix64(&token[DIGEST_START..], DIGEST_LEN, "digest")?;
    let params = BcryptFunction::with_version(version, cost)
        .map_err(|e| HashError::malformed(family, e.to_string()))?;

    Ok(DecodedHash {
        params,
        salt,
        digest,
    })
}

fn decode_radix64(field: &str, expected: usize, what: &str) -> Result<Vec<u8>, HashError> {
    let family = AlgorithmKind::Bcrypt;
    let bytes = RADIX64
        .decode(field)
        .map_err(|e| HashError::malformed(family, format!("{what} is not radix-64: {e}")))?;
    crate::codec::expect_len(&bytes, expected, family, what)?;
    Ok(bytes)
}
