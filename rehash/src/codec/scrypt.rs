//! SCrypt tokens.
//!
//! ```text
//! $s0$<hex(log2(N) << 16 | r << 8 | p)>$<salt b64>$<digest b64>
//! ```
//!
//! The derived key length is the length of the embedded digest.

use crate::codec::{DecodedHash, decode_b64, encode_b64, split_fields};
use crate::error::HashError;
use crate::function::scrypt::ScryptFunction;
use crate::kind::AlgorithmKind;

/// Prefix of an SCrypt token.
pub const PREFIX: &str = "$s0$";

const FIELDS: usize = 5;

/// Packs `log2(N)`, `r` and `p` into the header integer.
pub fn pack(params: &ScryptFunction) -> u64 {
    (u64::from(params.log_n()) << 16)
        | (u64::from(params.resources()) << 8)
        | u64::from(params.parallelization())
}

/// Renders an SCrypt token.
pub fn encode(params: &ScryptFunction, salt: &[u8], digest: &[u8]) -> String {
    format!(
        "$s0${:x}${}${}",
        pack(params),
        encode_b64(salt),
        encode_b64(digest)
    )
}

/// Parses an SCrypt token.
///
/// ## Errors
///
/// Returns `HashError::MalformedHash` if the header is not hex, `N` is not a
/// power of two greater than one, `r` or `p` is zero, the parameters need
/// more than [`MAX_MEMORY_BYTES`](crate::function::MAX_MEMORY_BYTES) of
/// memory, or salt/digest are not valid base64.
pub fn decode(token: &str) -> Result<DecodedHash<ScryptFunction>, HashError> {
    let family = AlgorithmKind::Scrypt;
    let fields = split_fields(token, FIELDS, family)?;
    if fields[1] != "s0" {
        return Err(HashError::malformed(family, "missing s0 marker"));
    }

    let header = fields[2];
    if header.is_empty() || !header.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HashError::malformed(family, "parameters are not hexadecimal"));
    }
    let packed = u64::from_str_radix(header, 16)
        .map_err(|_| HashError::malformed(family, "parameters are out of range"))?;

    let log_n = packed >> 16;
    let resources = ((packed >> 8) & 0xFF) as u32;
    let parallelization = (packed & 0xFF) as u32;
    if !(1..64).contains(&log_n) {
        return Err(HashError::malformed(
            family,
            format!("work factor 2^{log_n} is not a power of two above one"),
        ));
    }
    if resources == 0 || parallelization == 0 {
        return Err(HashError::malformed(
            family,
            "block size and parallelization must be positive",
        ));
    }

    let salt = decode_b64(fields[3], family, "salt")?;
    let digest = decode_b64(fields[4], family, "digest")?;
    let derived_key_length = u32::try_from(digest.len())
        .map_err(|_| HashError::malformed(family, "digest is too long"))?;

    let params = ScryptFunction::new(1u64 << log_n, resources, parallelization, derived_key_length)
        .map_err(|e| HashError::malformed(family, e.to_string()))?;

    Ok(DecodedHash {
        params,
        salt,
        digest,
    })
}
