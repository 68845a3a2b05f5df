//! Salt generation and salt directives.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::HashError;

/// Default salt length in bytes for PBKDF2 and SCrypt.
pub const DEFAULT_SALT_LENGTH: usize = 64;

/// Generates `length` random bytes from the operating system RNG.
///
/// ## Errors
///
/// Returns `HashError::InvalidParameters` if `length` is zero.
pub fn generate(length: usize) -> Result<Vec<u8>, HashError> {
    if length == 0 {
        return Err(HashError::invalid("salt length must be positive"));
    }
    let mut salt = vec![0u8; length];
    OsRng.fill_bytes(&mut salt);
    Ok(salt)
}

/// How the salt for a new hash should be obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaltDirective {
    /// Let the hashing function generate a salt of its default length.
    #[default]
    Generate,
    /// Generate a random salt of the given length.
    Random(usize),
    /// Use exactly these bytes.
    Explicit(Vec<u8>),
}

impl SaltDirective {
    /// Turns the directive into the salt argument of
    /// [`HashingFunction::hash`](crate::HashingFunction::hash).
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` for `Random(0)`.
    pub fn resolve(&self) -> Result<Option<Vec<u8>>, HashError> {
        match self {
            SaltDirective::Generate => Ok(None),
            SaltDirective::Random(length) => generate(*length).map(Some),
            SaltDirective::Explicit(bytes) => Ok(Some(bytes.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate(16).unwrap().len(), 16);
        assert_eq!(generate(DEFAULT_SALT_LENGTH).unwrap().len(), 64);
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(matches!(generate(0), Err(HashError::InvalidParameters(_))));
        assert!(matches!(
            SaltDirective::Random(0).resolve(),
            Err(HashError::InvalidParameters(_))
        ));
    }

    #[test]
    fn generated_salts_differ() {
        assert_ne!(generate(32).unwrap(), generate(32).unwrap());
    }

    #[test]
    fn directives_resolve() {
        assert_eq!(SaltDirective::Generate.resolve().unwrap(), None);
        assert_eq!(
            SaltDirective::Explicit(b"salt".to_vec()).resolve().unwrap(),
            Some(b"salt".to_vec())
        );
        assert_eq!(SaltDirective::Random(8).resolve().unwrap().unwrap().len(), 8);
    }
}
