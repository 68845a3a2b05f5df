//! Argon2 tokens in PHC string format.
//!
//! ```text
//! $argon2id$v=19$m=<KiB>,t=<passes>,p=<lanes>$<salt b64>$<digest b64>
//! ```
//!
//! Salt and digest use unpadded standard base64, as the PHC format requires.
//! A token without the `v=` field is read as version 16.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;

use crate::codec::{DecodedHash, parse_decimal};
use crate::error::HashError;
use crate::function::argon2::{Argon2Function, Argon2Variant, MIN_SALT_LEN};
use crate::kind::AlgorithmKind;

const FAMILY: AlgorithmKind = AlgorithmKind::Argon2;

/// True if the token starts with an Argon2 PHC identifier.
pub fn has_prefix(token: &str) -> bool {
    Argon2Variant::ALL
        .into_iter()
        .any(|variant| token.starts_with(&format!("${}$", variant.ident())))
}

/// Renders an Argon2 token.
pub fn encode(params: &Argon2Function, salt: &[u8], digest: &[u8]) -> String {
    format!(
        "${}$v={}$m={},t={},p={}${}${}",
        params.variant().ident(),
        params.version(),
        params.memory(),
        params.iterations(),
        params.parallelism(),
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(digest)
    )
}

/// Parses an Argon2 token.
///
/// ## Errors
///
/// Returns `HashError::MalformedHash` if the identifier, version, cost list,
/// salt or digest cannot be read, or if the argon2 crate rejects the
/// embedded parameters.
pub fn decode(token: &str) -> Result<DecodedHash<Argon2Function>, HashError> {
    let fields: Vec<&str> = token.split('$').collect();
    if !fields[0].is_empty() {
        return Err(HashError::malformed(FAMILY, "token must start with '$'"));
    }
    let (ident, version, costs, salt, digest) = match fields.as_slice() {
        [_, ident, version, costs, salt, digest] => {
            let version = version
                .strip_prefix("v=")
                .ok_or_else(|| HashError::malformed(FAMILY, "missing v= version field"))?;
            (*ident, parse_decimal::<u32>(version, FAMILY, "version")?, *costs, *salt, *digest)
        }
        [_, ident, costs, salt, digest] => (*ident, 0x10, *costs, *salt, *digest),
        _ => {
            return Err(HashError::malformed(
                FAMILY,
                format!("expected 5 or 6 fields, found {}", fields.len()),
            ));
        }
    };

    let variant = Argon2Variant::from_ident(ident)
        .ok_or_else(|| HashError::malformed(FAMILY, format!("unknown identifier {ident}")))?;
    let (memory, iterations, parallelism) = parse_costs(costs)?;

    let salt = decode_b64(salt, "salt")?;
    if salt.len() < MIN_SALT_LEN {
        return Err(HashError::malformed(
            FAMILY,
            format!("salt must be at least {MIN_SALT_LEN} bytes"),
        ));
    }
    let digest = decode_b64(digest, "digest")?;
    let output_length = u32::try_from(digest.len())
        .map_err(|_| HashError::malformed(FAMILY, "digest is too long"))?;

    let params = Argon2Function::with_version(
        variant,
        version,
        memory,
        iterations,
        parallelism,
        output_length,
    )
    .map_err(|e| HashError::malformed(FAMILY, e.to_string()))?;

    Ok(DecodedHash {
        params,
        salt,
        digest,
    })
}

/// Reads the `m=..,t=..,p=..` cost list, in that order.
fn parse_costs(costs: &str) -> Result<(u32, u32, u32), HashError> {
    let mut values = [0u32; 3];
    let mut pairs = costs.split(',');
    for (slot, key) in values.iter_mut().zip(["m", "t", "p"]) {
        let value = pairs
            .next()
            .and_then(|pair| pair.strip_prefix(key))
            .and_then(|rest| rest.strip_prefix('='))
            .ok_or_else(|| HashError::malformed(FAMILY, format!("missing {key}= cost")))?;
        *slot = parse_decimal(value, FAMILY, key)?;
    }
    if pairs.next().is_some() {
        return Err(HashError::malformed(FAMILY, "unexpected cost parameter"));
    }
    Ok((values[0], values[1], values[2]))
}

fn decode_b64(field: &str, what: &str) -> Result<Vec<u8>, HashError> {
    STANDARD_NO_PAD
        .decode(field)
        .map_err(|e| HashError::malformed(FAMILY, format!("{what} is not valid base64: {e}")))
}
