//! The closed set of hashing function families.

use std::fmt;
use std::str::FromStr;

use crate::error::HashError;

/// A family of cryptographic hashing functions.
///
/// Every token encodes exactly one family, and
/// [`identify_family`](crate::codec::identify_family) recovers it from the
/// token prefix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    /// PBKDF2 with every parameter spelled out in the token.
    Pbkdf2,
    /// PBKDF2 with iterations, HMAC and key length packed into one integer.
    CompressedPbkdf2,
    /// BCrypt in its modular crypt format.
    Bcrypt,
    /// SCrypt in the `$s0$` format.
    Scrypt,
    /// A plain, unsalted message digest.
    MessageDigest,
    /// Argon2 in PHC string format.
    #[cfg(feature = "argon2")]
    Argon2,
}

impl AlgorithmKind {
    /// Every family compiled into this build.
    pub const ALL: &'static [AlgorithmKind] = &[
        AlgorithmKind::Pbkdf2,
        AlgorithmKind::CompressedPbkdf2,
        AlgorithmKind::Bcrypt,
        AlgorithmKind::Scrypt,
        AlgorithmKind::MessageDigest,
        #[cfg(feature = "argon2")]
        AlgorithmKind::Argon2,
    ];

    /// The kebab-case name used in configuration and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Pbkdf2 => "pbkdf2",
            AlgorithmKind::CompressedPbkdf2 => "compressed-pbkdf2",
            AlgorithmKind::Bcrypt => "bcrypt",
            AlgorithmKind::Scrypt => "scrypt",
            AlgorithmKind::MessageDigest => "message-digest",
            #[cfg(feature = "argon2")]
            AlgorithmKind::Argon2 => "argon2",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AlgorithmKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| HashError::UnsupportedAlgorithm(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.name().parse::<AlgorithmKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!(
            " BCrypt ".parse::<AlgorithmKind>().unwrap(),
            AlgorithmKind::Bcrypt
        );
    }

    #[test]
    fn unknown_name_is_unsupported() {
        assert!(matches!(
            "md5crypt".parse::<AlgorithmKind>(),
            Err(HashError::UnsupportedAlgorithm(_))
        ));
    }
}
