//! Fluent requests over configured defaults.
//!
//! ```rust
//! use rehash::{HashingConfig, Password};
//!
//! let config = HashingConfig::from_toml_str(
//!     "pepper = \"spice\"\n[bcrypt]\ncost = 4\n[scrypt]\nwork-factor = 16",
//! )
//! .unwrap();
//! let password = Password::new(&config).unwrap();
//!
//! let hash = password.hash("secret").add_pepper().with_bcrypt().unwrap();
//! assert!(password.check(hash.token(), "secret").add_pepper().with_detected().unwrap());
//!
//! let update = password
//!     .check(hash.token(), "secret")
//!     .add_pepper()
//!     .and_update()
//!     .with_scrypt()
//!     .unwrap();
//! assert!(update.is_verified());
//! ```

use std::fmt;

use tracing::warn;

use crate::compose::compose;
use crate::config::HashingConfig;
use crate::error::HashError;
use crate::function::HashingFunction;
use crate::kind::AlgorithmKind;
use crate::result::{HashResult, HashUpdateResult};
use crate::salt::SaltDirective;
use crate::update::{Credential, RehashOptions, migrate, migrate_from_token};

/// Entry point for hash, check and update requests.
///
/// Holds one configured [`HashingFunction`] per family, the configured pepper
/// and the random salt length. Results of the `with_<family>` terminals
/// borrow their function from here.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    pbkdf2: HashingFunction,
    compressed_pbkdf2: HashingFunction,
    bcrypt: HashingFunction,
    scrypt: HashingFunction,
    message_digest: HashingFunction,
    #[cfg(feature = "argon2")]
    argon2: HashingFunction,
    pepper: Option<String>,
    salt_length: usize,
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Password");
        debug
            .field("pbkdf2", &self.pbkdf2)
            .field("compressed_pbkdf2", &self.compressed_pbkdf2)
            .field("bcrypt", &self.bcrypt)
            .field("scrypt", &self.scrypt)
            .field("message_digest", &self.message_digest);
        #[cfg(feature = "argon2")]
        debug.field("argon2", &self.argon2);
        debug
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .field("salt_length", &self.salt_length)
            .finish()
    }
}

impl Default for Password {
    fn default() -> Self {
        Self::from_valid(&HashingConfig::default())
    }
}

impl Password {
    /// Resolves a configuration into ready-to-use functions.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if any section is out of its
    /// family's domain.
    pub fn new(config: &HashingConfig) -> Result<Self, HashError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: &HashingConfig) -> Self {
        Self {
            pbkdf2: config.function(AlgorithmKind::Pbkdf2),
            compressed_pbkdf2: config.function(AlgorithmKind::CompressedPbkdf2),
            bcrypt: config.function(AlgorithmKind::Bcrypt),
            scrypt: config.function(AlgorithmKind::Scrypt),
            message_digest: config.function(AlgorithmKind::MessageDigest),
            #[cfg(feature = "argon2")]
            argon2: config.function(AlgorithmKind::Argon2),
            pepper: config.pepper.clone(),
            salt_length: config.salt_length,
        }
    }

    /// The configured function of a family.
    pub fn function(&self, kind: AlgorithmKind) -> &HashingFunction {
        match kind {
            AlgorithmKind::Pbkdf2 => &self.pbkdf2,
            AlgorithmKind::CompressedPbkdf2 => &self.compressed_pbkdf2,
            AlgorithmKind::Bcrypt => &self.bcrypt,
            AlgorithmKind::Scrypt => &self.scrypt,
            AlgorithmKind::MessageDigest => &self.message_digest,
            #[cfg(feature = "argon2")]
            AlgorithmKind::Argon2 => &self.argon2,
        }
    }

    /// Starts a hash request for `plaintext`.
    pub fn hash<'p>(&'p self, plaintext: &'p str) -> HashRequest<'p> {
        HashRequest {
            password: self,
            plaintext,
            salt: SaltDirective::Generate,
            pepper: None,
        }
    }

    /// Starts a check of `plaintext` against a stored `token`.
    pub fn check<'p>(&'p self, token: &'p str, plaintext: &'p str) -> CheckRequest<'p> {
        CheckRequest {
            password: self,
            token,
            plaintext,
            pepper: None,
        }
    }

    fn configured_pepper(&self) -> Option<String> {
        if self.pepper.is_none() {
            warn!("pepper requested but none is configured");
        }
        self.pepper.clone()
    }
}

/// A pending hash; finish it with one of the `with` terminals.
#[must_use]
pub struct HashRequest<'p> {
    password: &'p Password,
    plaintext: &'p str,
    salt: SaltDirective,
    pepper: Option<String>,
}

impl<'p> HashRequest<'p> {
    pub fn add_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = SaltDirective::Explicit(salt.into());
        self
    }

    /// Uses a random salt of the configured `salt-length`.
    pub fn add_random_salt(mut self) -> Self {
        self.salt = SaltDirective::Random(self.password.salt_length);
        self
    }

    pub fn add_random_salt_of(mut self, length: usize) -> Self {
        self.salt = SaltDirective::Random(length);
        self
    }

    /// Prefixes the configured pepper.
    pub fn add_pepper(mut self) -> Self {
        self.pepper = self.password.configured_pepper();
        self
    }

    pub fn add_pepper_str(mut self, pepper: impl Into<String>) -> Self {
        self.pepper = Some(pepper.into());
        self
    }

    /// Hashes with an explicit function.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if the salt does not suit the
    /// function's family.
    pub fn with<'f>(self, function: &'f HashingFunction) -> Result<HashResult<'f>, HashError> {
        let salt = self.salt.resolve()?;
        let input = compose(self.plaintext, self.pepper.as_deref());
        function.hash(&input, salt.as_deref())
    }

    /// Hashes with the configured function of `kind`.
    ///
    /// ## Errors
    ///
    /// See [`HashRequest::with`].
    pub fn with_kind(self, kind: AlgorithmKind) -> Result<HashResult<'p>, HashError> {
        let function = self.password.function(kind);
        self.with(function)
    }

    pub fn with_pbkdf2(self) -> Result<HashResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Pbkdf2)
    }

    pub fn with_compressed_pbkdf2(self) -> Result<HashResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::CompressedPbkdf2)
    }

    pub fn with_bcrypt(self) -> Result<HashResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Bcrypt)
    }

    pub fn with_scrypt(self) -> Result<HashResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Scrypt)
    }

    pub fn with_message_digest(self) -> Result<HashResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::MessageDigest)
    }

    #[cfg(feature = "argon2")]
    pub fn with_argon2(self) -> Result<HashResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Argon2)
    }
}

/// A pending check of a plaintext against a stored token.
#[must_use]
pub struct CheckRequest<'p> {
    password: &'p Password,
    token: &'p str,
    plaintext: &'p str,
    pepper: Option<String>,
}

impl<'p> CheckRequest<'p> {
    /// The stored token was made with the configured pepper.
    pub fn add_pepper(mut self) -> Self {
        self.pepper = self.password.configured_pepper();
        self
    }

    pub fn add_pepper_str(mut self, pepper: impl Into<String>) -> Self {
        self.pepper = Some(pepper.into());
        self
    }

    /// Checks with an explicit function. The token's own parameters are used.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::MalformedHash` if the token is not a token of the
    /// function's family.
    pub fn with(self, function: &HashingFunction) -> Result<bool, HashError> {
        function.check(self.plaintext, self.token, self.pepper.as_deref())
    }

    /// Checks with the family named by the token's prefix.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::UnsupportedAlgorithm` for an unrecognised prefix
    /// and `HashError::MalformedHash` if the token does not decode.
    pub fn with_detected(self) -> Result<bool, HashError> {
        let function = HashingFunction::from_hash(self.token)?;
        self.with(&function)
    }

    /// Checks as a token of family `kind`.
    ///
    /// ## Errors
    ///
    /// See [`CheckRequest::with`].
    pub fn with_kind(self, kind: AlgorithmKind) -> Result<bool, HashError> {
        let function = self.password.function(kind);
        self.with(function)
    }

    pub fn with_pbkdf2(self) -> Result<bool, HashError> {
        self.with_kind(AlgorithmKind::Pbkdf2)
    }

    pub fn with_compressed_pbkdf2(self) -> Result<bool, HashError> {
        self.with_kind(AlgorithmKind::CompressedPbkdf2)
    }

    pub fn with_bcrypt(self) -> Result<bool, HashError> {
        self.with_kind(AlgorithmKind::Bcrypt)
    }

    pub fn with_scrypt(self) -> Result<bool, HashError> {
        self.with_kind(AlgorithmKind::Scrypt)
    }

    pub fn with_message_digest(self) -> Result<bool, HashError> {
        self.with_kind(AlgorithmKind::MessageDigest)
    }

    #[cfg(feature = "argon2")]
    pub fn with_argon2(self) -> Result<bool, HashError> {
        self.with_kind(AlgorithmKind::Argon2)
    }

    /// Turns the check into a verify-then-rehash request.
    pub fn and_update(self) -> UpdateRequest<'p> {
        UpdateRequest {
            check: self,
            options: RehashOptions::default(),
        }
    }
}

/// A pending migration; the old token is only replaced if it verifies.
#[must_use]
pub struct UpdateRequest<'p> {
    check: CheckRequest<'p>,
    options: RehashOptions,
}

impl<'p> UpdateRequest<'p> {
    pub fn add_new_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.options.salt = SaltDirective::Explicit(salt.into());
        self
    }

    /// Uses a random salt of the configured `salt-length` for the new hash.
    pub fn add_new_random_salt(mut self) -> Self {
        self.options.salt = SaltDirective::Random(self.check.password.salt_length);
        self
    }

    pub fn add_new_random_salt_of(mut self, length: usize) -> Self {
        self.options.salt = SaltDirective::Random(length);
        self
    }

    /// Prefixes the configured pepper to the new hash's input.
    pub fn add_new_pepper(mut self) -> Self {
        self.options.pepper = self.check.password.configured_pepper();
        self
    }

    pub fn add_new_pepper_str(mut self, pepper: impl Into<String>) -> Self {
        self.options.pepper = Some(pepper.into());
        self
    }

    fn credential(&self) -> Credential<'_> {
        Credential {
            plaintext: self.check.plaintext,
            token: self.check.token,
            pepper: self.check.pepper.as_deref(),
        }
    }

    /// Checks with `old` and rehashes with `new`.
    ///
    /// ## Errors
    ///
    /// See [`migrate`].
    pub fn with<'f>(
        self,
        old: &HashingFunction,
        new: &'f HashingFunction,
    ) -> Result<HashUpdateResult<'f>, HashError> {
        migrate(&self.credential(), old, new, &self.options)
    }

    /// Rebuilds the old function from the token and rehashes with the
    /// configured function of `kind`.
    ///
    /// ## Errors
    ///
    /// See [`migrate_from_token`].
    pub fn with_kind(self, kind: AlgorithmKind) -> Result<HashUpdateResult<'p>, HashError> {
        let new = self.check.password.function(kind);
        migrate_from_token(&self.credential(), new, &self.options)
    }

    pub fn with_pbkdf2(self) -> Result<HashUpdateResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Pbkdf2)
    }

    pub fn with_compressed_pbkdf2(self) -> Result<HashUpdateResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::CompressedPbkdf2)
    }

    pub fn with_bcrypt(self) -> Result<HashUpdateResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Bcrypt)
    }

    pub fn with_scrypt(self) -> Result<HashUpdateResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Scrypt)
    }

    pub fn with_message_digest(self) -> Result<HashUpdateResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::MessageDigest)
    }

    #[cfg(feature = "argon2")]
    pub fn with_argon2(self) -> Result<HashUpdateResult<'p>, HashError> {
        self.with_kind(AlgorithmKind::Argon2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: &str = r#"
        pepper = "pepper"
        salt-length = 24

        [pbkdf2]
        iterations = 1000
        length = 256

        [bcrypt]
        cost = 4

        [scrypt]
        work-factor = 16

        [argon2]
        memory = 256
        iterations = 1
    "#;

    fn password() -> Password {
        Password::new(&HashingConfig::from_toml_str(FAST).unwrap()).unwrap()
    }

    #[test]
    fn hash_uses_configured_parameters() {
        let password = password();
        let hash = password.hash("secret").with_pbkdf2().unwrap();
        assert!(hash.token().starts_with("$pbkdf2$SHA512$1000$256$"), "{}", hash.token());
        assert_eq!(hash.function(), password.function(AlgorithmKind::Pbkdf2));
    }

    #[test]
    fn random_salt_uses_configured_length() {
        let password = password();
        let hash = password.hash("secret").add_random_salt().with_scrypt().unwrap();
        assert_eq!(hash.salt().map(<[u8]>::len), Some(24));
        let hash = password.hash("secret").add_random_salt_of(12).with_scrypt().unwrap();
        assert_eq!(hash.salt().map(<[u8]>::len), Some(12));
        let hash = password.hash("secret").with_scrypt().unwrap();
        assert_eq!(hash.salt().map(<[u8]>::len), Some(64));
    }

    #[test]
    fn empty_salt_is_rejected() {
        let password = password();
        assert!(matches!(
            password.hash("secret").add_salt(Vec::new()).with_pbkdf2(),
            Err(HashError::InvalidParameters(_))
        ));

        let hash = password.hash("secret").with_pbkdf2().unwrap();
        let update = password
            .check(hash.token(), "secret")
            .and_update()
            .add_new_salt(Vec::new())
            .with_scrypt();
        assert!(matches!(update, Err(HashError::InvalidParameters(_))));
    }

    #[test]
    fn debug_output_hides_the_pepper() {
        let rendered = format!("{:?}", password());
        assert!(!rendered.contains("\"pepper\""), "{rendered}");
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn pepper_must_match_on_check() {
        let password = password();
        let hash = password.hash("secret").add_pepper().add_salt("salt").with_pbkdf2().unwrap();
        assert!(password.check(hash.token(), "secret").add_pepper().with_pbkdf2().unwrap());
        assert!(
            password
                .check(hash.token(), "secret")
                .add_pepper_str("pepper")
                .with_detected()
                .unwrap()
        );
        assert!(!password.check(hash.token(), "secret").with_pbkdf2().unwrap());
        assert!(
            !password
                .check(hash.token(), "secret")
                .add_pepper_str("wrong")
                .with_pbkdf2()
                .unwrap()
        );
    }

    #[test]
    fn check_with_the_wrong_family_is_an_error() {
        let password = password();
        let hash = password.hash("secret").with_bcrypt().unwrap();
        assert!(matches!(
            password.check(hash.token(), "secret").with_scrypt(),
            Err(HashError::MalformedHash { .. })
        ));
    }

    #[test]
    fn update_moves_to_another_family() {
        let password = password();
        let old = password.hash("secret").with_compressed_pbkdf2().unwrap();

        let update = password
            .check(old.token(), "secret")
            .and_update()
            .add_new_pepper()
            .add_new_random_salt()
            .with_bcrypt()
            .unwrap_err();
        // A 24-byte salt does not suit BCrypt.
        assert!(matches!(update, HashError::InvalidParameters(_)));

        let update = password
            .check(old.token(), "secret")
            .and_update()
            .add_new_pepper()
            .with_bcrypt()
            .unwrap();
        let new = update.hash().unwrap();
        assert!(new.token().starts_with("$2b$04$"));
        assert!(password.check(new.token(), "secret").add_pepper().with_bcrypt().unwrap());

        let update = password
            .check(old.token(), "not secret")
            .and_update()
            .with_bcrypt()
            .unwrap();
        assert!(!update.is_verified());
    }

    #[test]
    fn update_with_explicit_functions() {
        let password = password();
        let old = password.function(AlgorithmKind::MessageDigest);
        let new = HashingFunction::bcrypt(5).unwrap();
        let token = password.hash("secret").with(old).unwrap().into_token();

        let update = password
            .check(&token, "secret")
            .and_update()
            .add_new_salt(*b"0123456789abcdef")
            .add_new_pepper_str("new")
            .with(old, &new)
            .unwrap();
        let hash = update.into_hash().unwrap();
        assert_eq!(hash.salt(), Some(&b"0123456789abcdef"[..]));
        assert!(hash.check("secret", Some("new")).unwrap());
    }

    #[test]
    #[tracing_test::traced_test]
    fn missing_pepper_is_logged() {
        let password = Password::default();
        let _request = password.hash("secret").add_pepper();
        assert!(logs_contain("none is configured"));
    }
}
