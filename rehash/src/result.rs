//! Outcomes of hashing and of verify-then-rehash migration.

use std::fmt;

use crate::error::HashError;
use crate::function::HashingFunction;

/// A freshly computed hash.
///
/// Borrows the [`HashingFunction`] that produced it, so the result can be
/// re-checked without the caller keeping track of the parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashResult<'f> {
    bytes: Vec<u8>,
    salt: Option<Vec<u8>>,
    function: &'f HashingFunction,
    token: String,
}

impl<'f> HashResult<'f> {
    pub(crate) fn new(
        bytes: Vec<u8>,
        salt: Option<Vec<u8>>,
        function: &'f HashingFunction,
        token: String,
    ) -> Self {
        Self {
            bytes,
            salt,
            function,
            token,
        }
    }

    /// The raw digest.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The salt the digest was computed with; `None` for message digests.
    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    pub fn function(&self) -> &'f HashingFunction {
        self.function
    }

    /// The encoded token to store.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn into_token(self) -> String {
        self.token
    }

    /// Checks a plaintext against this result with the function that
    /// produced it.
    ///
    /// ## Errors
    ///
    /// Only fails if the stored token cannot be decoded, which does not
    /// happen for results produced by this crate.
    pub fn check(&self, plaintext: &str, pepper: Option<&str>) -> Result<bool, HashError> {
        self.function.check(plaintext, &self.token, pepper)
    }
}

impl fmt::Display for HashResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Outcome of a migration: either unverified with no hash, or verified with
/// the new hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashUpdateResult<'f> {
    verified: bool,
    hash: Option<HashResult<'f>>,
}

impl<'f> HashUpdateResult<'f> {
    /// The plaintext did not match the old token.
    pub const UNVERIFIED: Self = Self {
        verified: false,
        hash: None,
    };

    pub fn verified(hash: HashResult<'f>) -> Self {
        Self {
            verified: true,
            hash: Some(hash),
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// The new hash, present exactly when verified.
    pub fn hash(&self) -> Option<&HashResult<'f>> {
        self.hash.as_ref()
    }

    pub fn into_hash(self) -> Option<HashResult<'f>> {
        self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;

    #[test]
    fn result_rechecks_with_its_function() {
        let function = HashingFunction::bcrypt(4).unwrap();
        let hash = function.hash(&compose("password", Some("pepper")), None).unwrap();
        assert!(hash.check("password", Some("pepper")).unwrap());
        assert!(!hash.check("password", None).unwrap());
        assert_eq!(hash.function(), &function);
        assert_eq!(hash.bytes().len(), 23);
        assert_eq!(hash.to_string(), hash.token());
    }

    #[test]
    fn unverified_has_no_hash() {
        let result = HashUpdateResult::UNVERIFIED;
        assert!(!result.is_verified());
        assert!(result.hash().is_none());
        assert!(result.into_hash().is_none());
    }

    #[test]
    fn verified_carries_the_hash() {
        let function = HashingFunction::default_for(crate::AlgorithmKind::MessageDigest);
        let hash = function.hash(&compose("password", None), None).unwrap();
        let token = hash.token().to_string();
        let result = HashUpdateResult::verified(hash);
        assert!(result.is_verified());
        assert_eq!(result.hash().map(HashResult::token), Some(token.as_str()));
    }
}
