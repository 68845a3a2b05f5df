//! Hashing function strategies.
//!
//! A [`HashingFunction`] is one family together with one immutable
//! parameter set. It hashes a composed input into a [`HashResult`] and checks
//! a plaintext against a token of its own family, always recomputing with
//! the parameters embedded in the token rather than its own.

use std::fmt;

use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use crate::codec::{self, DecodedHash};
use crate::compose::{CompositeInput, compose};
use crate::error::HashError;
use crate::kind::AlgorithmKind;
use crate::result::HashResult;
use crate::salt;

#[cfg(feature = "argon2")]
pub mod argon2;
pub mod bcrypt;
pub mod digest;
pub mod pbkdf2;
pub mod scrypt;

/// Most working memory a parameter set may ask for, in bytes (1 GiB).
///
/// Applies to SCrypt (`128 * r * N`) and Argon2 (`m` KiB), including
/// parameters read back from a token.
pub const MAX_MEMORY_BYTES: u64 = 1 << 30;

#[cfg(feature = "argon2")]
use self::argon2::{Argon2Function, Argon2Variant};
use self::bcrypt::BcryptFunction;
use self::digest::{DigestAlgorithm, MessageDigestFunction};
use self::pbkdf2::{Hmac, Pbkdf2Function};
use self::scrypt::ScryptFunction;

/// A hashing function family with its parameters.
///
/// Two values are equal when they are the same variant with the same
/// parameters, which is what [`HashingFunction::produced`] relies on.
///
/// ## Examples
///
/// ```rust
/// use rehash::{HashingFunction, compose};
///
/// let bcrypt = HashingFunction::bcrypt(5).unwrap();
/// let hash = bcrypt.hash(&compose("password", None), None).unwrap();
///
/// assert!(bcrypt.check("password", hash.token(), None).unwrap());
/// assert!(!bcrypt.check("Password", hash.token(), None).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashingFunction {
    Pbkdf2(Pbkdf2Function),
    /// PBKDF2 rendered in the compressed `$<packed>$salt$digest` layout.
    CompressedPbkdf2(Pbkdf2Function),
    Bcrypt(BcryptFunction),
    Scrypt(ScryptFunction),
    MessageDigest(MessageDigestFunction),
    #[cfg(feature = "argon2")]
    Argon2(Argon2Function),
}

impl HashingFunction {
    /// PBKDF2 with the given HMAC, iteration count and key length in bits.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` for zero iterations or a key
    /// length that is not a positive multiple of 8 up to 65535 bits.
    pub fn pbkdf2(algorithm: Hmac, iterations: u32, length: u32) -> Result<Self, HashError> {
        Pbkdf2Function::new(algorithm, iterations, length).map(HashingFunction::Pbkdf2)
    }

    /// Same parameters as [`HashingFunction::pbkdf2`], compressed token layout.
    ///
    /// ## Errors
    ///
    /// See [`HashingFunction::pbkdf2`].
    pub fn compressed_pbkdf2(
        algorithm: Hmac,
        iterations: u32,
        length: u32,
    ) -> Result<Self, HashError> {
        Pbkdf2Function::new(algorithm, iterations, length).map(HashingFunction::CompressedPbkdf2)
    }

    /// BCrypt `2b` at the given cost.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if `cost` is outside 4..=31.
    pub fn bcrypt(cost: u32) -> Result<Self, HashError> {
        BcryptFunction::new(cost).map(HashingFunction::Bcrypt)
    }

    /// SCrypt with work factor N, block size r, parallelization p and
    /// derived key length in bytes.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` when the parameters are outside
    /// the ranges documented on [`ScryptFunction::new`].
    pub fn scrypt(
        work_factor: u64,
        resources: u32,
        parallelization: u32,
        derived_key_length: u32,
    ) -> Result<Self, HashError> {
        ScryptFunction::new(work_factor, resources, parallelization, derived_key_length)
            .map(HashingFunction::Scrypt)
    }

    pub fn message_digest(algorithm: DigestAlgorithm) -> Self {
        HashingFunction::MessageDigest(MessageDigestFunction::new(algorithm))
    }

    /// Argon2 version 19.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` when the `argon2` crate rejects
    /// the costs.
    #[cfg(feature = "argon2")]
    pub fn argon2(
        variant: Argon2Variant,
        memory: u32,
        iterations: u32,
        parallelism: u32,
        output_length: u32,
    ) -> Result<Self, HashError> {
        Argon2Function::new(variant, memory, iterations, parallelism, output_length)
            .map(HashingFunction::Argon2)
    }

    /// The default parameter set of a family.
    pub fn default_for(kind: AlgorithmKind) -> Self {
        match kind {
            AlgorithmKind::Pbkdf2 => HashingFunction::Pbkdf2(Pbkdf2Function::default()),
            AlgorithmKind::CompressedPbkdf2 => {
                HashingFunction::CompressedPbkdf2(Pbkdf2Function::default())
            }
            AlgorithmKind::Bcrypt => HashingFunction::Bcrypt(BcryptFunction::default()),
            AlgorithmKind::Scrypt => HashingFunction::Scrypt(ScryptFunction::default()),
            AlgorithmKind::MessageDigest => {
                HashingFunction::MessageDigest(MessageDigestFunction::default())
            }
            #[cfg(feature = "argon2")]
            AlgorithmKind::Argon2 => HashingFunction::Argon2(Argon2Function::default()),
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            HashingFunction::Pbkdf2(_) => AlgorithmKind::Pbkdf2,
            HashingFunction::CompressedPbkdf2(_) => AlgorithmKind::CompressedPbkdf2,
            HashingFunction::Bcrypt(_) => AlgorithmKind::Bcrypt,
            HashingFunction::Scrypt(_) => AlgorithmKind::Scrypt,
            HashingFunction::MessageDigest(_) => AlgorithmKind::MessageDigest,
            #[cfg(feature = "argon2")]
            HashingFunction::Argon2(_) => AlgorithmKind::Argon2,
        }
    }

    /// Length of the salt generated when `hash` is called without one.
    /// Zero for message digests, which take no salt.
    pub fn default_salt_length(&self) -> usize {
        match self {
            HashingFunction::Pbkdf2(_)
            | HashingFunction::CompressedPbkdf2(_)
            | HashingFunction::Scrypt(_) => salt::DEFAULT_SALT_LENGTH,
            HashingFunction::Bcrypt(_) => codec::bcrypt::SALT_LEN,
            HashingFunction::MessageDigest(_) => 0,
            #[cfg(feature = "argon2")]
            HashingFunction::Argon2(_) => self::argon2::DEFAULT_SALT_LEN,
        }
    }

    /// Re-checks the parameters against their family's domain.
    ///
    /// Constructors already validate; this is for values deserialized from
    /// configuration.
    pub fn validate(&self) -> Result<(), HashError> {
        match self {
            HashingFunction::Pbkdf2(params) | HashingFunction::CompressedPbkdf2(params) => {
                params.validate()
            }
            HashingFunction::Bcrypt(params) => params.validate(),
            HashingFunction::Scrypt(params) => params.validate(),
            HashingFunction::MessageDigest(_) => Ok(()),
            #[cfg(feature = "argon2")]
            HashingFunction::Argon2(params) => params.validate(),
        }
    }

    /// Hashes a composed input.
    ///
    /// Without a salt, one of [`default_salt_length`](Self::default_salt_length)
    /// bytes is generated. Message digests ignore a supplied salt and record
    /// none.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` for an empty salt, or when the
    /// salt does not suit the family (BCrypt needs exactly 16 bytes, Argon2
    /// at least 8).
    #[instrument(skip_all, fields(family = %self.kind()))]
    pub fn hash(
        &self,
        input: &CompositeInput,
        salt: Option<&[u8]>,
    ) -> Result<HashResult<'_>, HashError> {
        if let HashingFunction::MessageDigest(params) = self {
            if salt.is_some() {
                warn!("message digests are unsalted, ignoring the supplied salt");
            }
            let digest = params.derive(input.as_bytes());
            let token = codec::digest::encode(params, &digest);
            return Ok(HashResult::new(digest, None, self, token));
        }

        let salt = match salt {
            Some([]) => return Err(HashError::invalid("salt length must be positive")),
            Some(salt) => salt.to_vec(),
            None => salt::generate(self.default_salt_length())?,
        };
        let digest = self.derive(input.as_bytes(), &salt)?;
        let token = self.encode(&salt, &digest);
        debug!(salt_len = salt.len(), "hashed input");
        Ok(HashResult::new(digest.to_vec(), Some(salt), self, token))
    }

    /// Checks a plaintext (prefixed with the pepper, if any) against a token.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::MalformedHash` if the token is not a well-formed
    /// token of this function's family, including tokens of other families.
    pub fn check(
        &self,
        plaintext: &str,
        token: &str,
        pepper: Option<&str>,
    ) -> Result<bool, HashError> {
        self.check_input(&compose(plaintext, pepper), token)
    }

    /// Checks an already composed input against a token.
    ///
    /// The digest is recomputed with the parameters and salt embedded in the
    /// token and compared in constant time.
    ///
    /// ## Errors
    ///
    /// See [`HashingFunction::check`].
    #[instrument(skip_all, fields(family = %self.kind()))]
    pub fn check_input(&self, input: &CompositeInput, token: &str) -> Result<bool, HashError> {
        let decoded = Self::decode_as(self.kind(), token).inspect_err(|e| {
            debug!(error = %e, "token rejected");
        })?;
        let actual = decoded.params.derive(input.as_bytes(), &decoded.salt)?;
        let matched = bool::from(actual.as_slice().ct_eq(decoded.digest.as_slice()));
        debug!(matched, "compared digests");
        Ok(matched)
    }

    /// Rebuilds the function that produced `token`, parameters included.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::UnsupportedAlgorithm` for an unrecognised prefix
    /// and `HashError::MalformedHash` if the token does not decode.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use rehash::{AlgorithmKind, HashingFunction};
    ///
    /// let token = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
    /// let function = HashingFunction::from_hash(token).unwrap();
    /// assert_eq!(function.kind(), AlgorithmKind::Bcrypt);
    /// assert!(function.check("U*U", token, None).unwrap());
    /// ```
    pub fn from_hash(token: &str) -> Result<Self, HashError> {
        let kind = codec::identify_family(token)?;
        Ok(Self::decode_as(kind, token)?.params)
    }

    /// Whether `token` was produced by exactly this function and parameters.
    ///
    /// ## Errors
    ///
    /// See [`HashingFunction::from_hash`].
    pub fn produced(&self, token: &str) -> Result<bool, HashError> {
        Ok(Self::from_hash(token)? == *self)
    }

    fn decode_as(kind: AlgorithmKind, token: &str) -> Result<DecodedHash<Self>, HashError> {
        Ok(match kind {
            AlgorithmKind::Pbkdf2 => codec::pbkdf2::decode(token)?.map(HashingFunction::Pbkdf2),
            AlgorithmKind::CompressedPbkdf2 => {
                codec::pbkdf2::decode_compressed(token)?.map(HashingFunction::CompressedPbkdf2)
            }
            AlgorithmKind::Bcrypt => codec::bcrypt::decode(token)?.map(HashingFunction::Bcrypt),
            AlgorithmKind::Scrypt => codec::scrypt::decode(token)?.map(HashingFunction::Scrypt),
            AlgorithmKind::MessageDigest => {
                codec::digest::decode(token)?.map(HashingFunction::MessageDigest)
            }
            #[cfg(feature = "argon2")]
            AlgorithmKind::Argon2 => codec::argon2::decode(token)?.map(HashingFunction::Argon2),
        })
    }

    fn derive(&self, input: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, HashError> {
        match self {
            HashingFunction::Pbkdf2(params) | HashingFunction::CompressedPbkdf2(params) => {
                Ok(params.derive(input, salt))
            }
            HashingFunction::Bcrypt(params) => params.derive(input, salt),
            HashingFunction::Scrypt(params) => params.derive(input, salt),
            HashingFunction::MessageDigest(params) => Ok(Zeroizing::new(params.derive(input))),
            #[cfg(feature = "argon2")]
            HashingFunction::Argon2(params) => params.derive(input, salt),
        }
    }

    fn encode(&self, salt: &[u8], digest: &[u8]) -> String {
        match self {
            HashingFunction::Pbkdf2(params) => codec::pbkdf2::encode(params, salt, digest),
            HashingFunction::CompressedPbkdf2(params) => {
                codec::pbkdf2::encode_compressed(params, salt, digest)
            }
            HashingFunction::Bcrypt(params) => codec::bcrypt::encode(params, salt, digest),
            HashingFunction::Scrypt(params) => codec::scrypt::encode(params, salt, digest),
            HashingFunction::MessageDigest(params) => codec::digest::encode(params, digest),
            #[cfg(feature = "argon2")]
            HashingFunction::Argon2(params) => codec::argon2::encode(params, salt, digest),
        }
    }
}

impl fmt::Display for HashingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashingFunction::Pbkdf2(p) | HashingFunction::CompressedPbkdf2(p) => write!(
                f,
                "{} ({}, {} iterations, {} bits)",
                self.kind(),
                p.algorithm(),
                p.iterations(),
                p.length()
            ),
            HashingFunction::Bcrypt(p) => {
                write!(f, "bcrypt ({}, cost {})", p.version(), p.cost())
            }
            HashingFunction::Scrypt(p) => write!(
                f,
                "scrypt (N={}, r={}, p={}, {} bytes)",
                p.work_factor(),
                p.resources(),
                p.parallelization(),
                p.derived_key_length()
            ),
            HashingFunction::MessageDigest(p) => write!(f, "message-digest ({})", p.algorithm()),
            #[cfg(feature = "argon2")]
            HashingFunction::Argon2(p) => write!(
                f,
                "argon2 ({}, v={}, m={}, t={}, p={}, {} bytes)",
                p.variant(),
                p.version(),
                p.memory(),
                p.iterations(),
                p.parallelism(),
                p.output_length()
            ),
        }
    }
}
