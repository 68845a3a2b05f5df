//! Composition of plaintext and pepper into the bytes a hashing function sees.
//!
//! The pepper is always a prefix. Existing stored hashes depend on that
//! order, so `pepper ++ plaintext` must never become `plaintext ++ pepper`.
//! The salt is not part of the input: each hashing function embeds it
//! according to its own token format.

use std::fmt;

use zeroize::Zeroizing;

/// The exact byte sequence fed to a hashing function.
///
/// The buffer is wiped when dropped and its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CompositeInput(Zeroizing<Vec<u8>>);

impl CompositeInput {
    /// Wraps bytes that are already composed.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Zeroizing::new(bytes.to_vec()))
    }

    /// The composed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the composed input in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when both plaintext and pepper were empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CompositeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeInput([REDACTED; {}])", self.0.len())
    }
}

/// Composes `pepper ++ plaintext`, or just `plaintext` when no pepper is given.
///
/// ## Examples
///
/// ```rust
/// use rehash::compose;
///
/// assert_eq!(compose("password", Some("pepper")).as_bytes(), b"pepperpassword");
/// assert_eq!(compose("password", None).as_bytes(), b"password");
/// ```
pub fn compose(plaintext: &str, pepper: Option<&str>) -> CompositeInput {
    let pepper = pepper.unwrap_or_default();
    let mut bytes = Zeroizing::new(Vec::with_capacity(pepper.len() + plaintext.len()));
    bytes.extend_from_slice(pepper.as_bytes());
    bytes.extend_from_slice(plaintext.as_bytes());
    CompositeInput(bytes)
}
