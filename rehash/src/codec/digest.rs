//! Message digest tokens.
//!
//! ```text
//! $md$<ALGORITHM>$<lowercase hex digest>
//! ```

use crate::codec::{DecodedHash, expect_len, split_fields};
use crate::error::HashError;
use crate::function::digest::{DigestAlgorithm, MessageDigestFunction};
use crate::kind::AlgorithmKind;

/// Prefix of a message digest token.
pub const PREFIX: &str = "$md$";

const FIELDS: usize = 4;

/// Renders a message digest token. There is no salt to encode.
pub fn encode(params: &MessageDigestFunction, digest: &[u8]) -> String {
    format!("$md${}${}", params.algorithm().name(), hex::encode(digest))
}

/// Parses a message digest token. The decoded salt is always empty.
///
/// ## Errors
///
/// Returns `HashError::UnsupportedAlgorithm` for an unknown algorithm name
/// and `HashError::MalformedHash` for anything else.
pub fn decode(token: &str) -> Result<DecodedHash<MessageDigestFunction>, HashError> {
    let family = AlgorithmKind::MessageDigest;
    let fields = split_fields(token, FIELDS, family)?;
    if fields[1] != "md" {
        return Err(HashError::malformed(family, "missing md marker"));
    }

    let algorithm: DigestAlgorithm = fields[2].parse()?;
    let digest = hex::decode(fields[3])
        .map_err(|e| HashError::malformed(family, format!("digest is not hex: {e}")))?;
    expect_len(&digest, algorithm.output_len(), family, "digest")?;

    Ok(DecodedHash {
        params: MessageDigestFunction::new(algorithm),
        salt: Vec::new(),
        digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn token_layout() {
        let params = MessageDigestFunction::new(DigestAlgorithm::Sha1);
        assert_eq!(
            encode(&params, &[0xab; 20]),
            format!("$md$SHA-1${}", "ab".repeat(20))
        );
    }

    #[test]
    fn rejects_wrong_digest_length() {
        let token = format!("$md$SHA-256${}", "00".repeat(31));
        assert!(matches!(decode(&token), Err(HashError::MalformedHash { .. })));
    }

    #[test]
    fn rejects_bad_hex_and_structure() {
        let token = format!("$md$SHA-1${}", "zz".repeat(20));
        assert!(matches!(decode(&token), Err(HashError::MalformedHash { .. })));
        let token = format!("$md$SHA-1${}$", "00".repeat(20));
        assert!(matches!(decode(&token), Err(HashError::MalformedHash { .. })));
        let token = format!("$mx$SHA-1${}", "00".repeat(20));
        assert!(matches!(decode(&token), Err(HashError::MalformedHash { .. })));
    }

    #[test]
    fn unknown_algorithm_is_unsupported() {
        let token = format!("$md$MD5${}", "00".repeat(16));
        assert!(matches!(decode(&token), Err(HashError::UnsupportedAlgorithm(_))));
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            algorithm in prop::sample::select(DigestAlgorithm::ALL.to_vec()),
            seed in any::<u8>(),
        ) {
            let params = MessageDigestFunction::new(algorithm);
            let digest = vec![seed; algorithm.output_len()];
            let decoded = decode(&encode(&params, &digest)).unwrap();
            prop_assert_eq!(decoded, DecodedHash { params, salt: Vec::new(), digest });
        }
    }
}
