//! Error types for hashing, verification and migration.

use thiserror::Error;

use crate::kind::AlgorithmKind;

/// Errors that can occur while hashing, checking or decoding a token.
///
/// None of these mean "wrong password". A plaintext that does not match a
/// well-formed token is reported as `Ok(false)` (or as an unverified
/// [`HashUpdateResult`](crate::HashUpdateResult)), so calling code cannot
/// mistake malformed input for a failed login.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// A parameter is outside its algorithm's valid domain.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The token does not follow its family's structure.
    #[error("malformed {family} hash: {reason}")]
    MalformedHash {
        /// The family whose rules were violated.
        family: AlgorithmKind,
        /// What was wrong with the token.
        reason: String,
    },

    /// The token (or a field inside it) names an algorithm this build does
    /// not know.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl HashError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        HashError::InvalidParameters(reason.into())
    }

    pub(crate) fn malformed(family: AlgorithmKind, reason: impl Into<String>) -> Self {
        HashError::MalformedHash {
            family,
            reason: reason.into(),
        }
    }
}
