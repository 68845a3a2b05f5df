//! Verify-then-rehash migration.
//!
//! A stored token is only replaced after the plaintext has been verified
//! against it. A wrong plaintext yields [`HashUpdateResult::UNVERIFIED`]; a
//! token that cannot be decoded is an error, so the two can never be
//! confused.

use tracing::{debug, instrument};

use crate::compose::compose;
use crate::error::HashError;
use crate::function::HashingFunction;
use crate::result::HashUpdateResult;
use crate::salt::SaltDirective;

/// The credential presented for migration.
#[derive(Clone, Copy)]
pub struct Credential<'a> {
    pub plaintext: &'a str,
    pub token: &'a str,
    /// Pepper the stored token was created with.
    pub pepper: Option<&'a str>,
}

impl<'a> Credential<'a> {
    pub fn new(plaintext: &'a str, token: &'a str) -> Self {
        Self {
            plaintext,
            token,
            pepper: None,
        }
    }

    pub fn with_pepper(mut self, pepper: &'a str) -> Self {
        self.pepper = Some(pepper);
        self
    }
}

impl std::fmt::Debug for Credential<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("plaintext", &"<redacted>")
            .field("token", &self.token)
            .field("pepper", &self.pepper.map(|_| "<redacted>"))
            .finish()
    }
}

/// How the new hash is built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RehashOptions {
    pub salt: SaltDirective,
    /// Pepper for the new token.
    pub pepper: Option<String>,
}

impl std::fmt::Debug for RehashOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RehashOptions")
            .field("salt", &self.salt)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RehashOptions {
    pub fn with_salt(mut self, salt: SaltDirective) -> Self {
        self.salt = salt;
        self
    }

    pub fn with_pepper(mut self, pepper: impl Into<String>) -> Self {
        self.pepper = Some(pepper.into());
        self
    }
}

/// Checks `credential` with `old` and, only if it verifies, hashes the
/// plaintext again with `new`.
///
/// `new` is never invoked when the check fails.
///
/// ## Errors
///
/// Returns `HashError::MalformedHash` if the token is not a valid `old`
/// token, and `HashError::InvalidParameters` if the salt directive does not
/// suit `new`.
///
/// ## Examples
///
/// ```rust
/// use rehash::{Credential, HashingFunction, RehashOptions, compose, migrate};
///
/// let old = HashingFunction::bcrypt(4).unwrap();
/// let new = HashingFunction::bcrypt(5).unwrap();
/// let token = old.hash(&compose("password", None), None).unwrap().into_token();
///
/// let update = migrate(&Credential::new("password", &token), &old, &new, &RehashOptions::default())
///     .unwrap();
/// assert!(update.is_verified());
///
/// let update = migrate(&Credential::new("guess", &token), &old, &new, &RehashOptions::default())
///     .unwrap();
/// assert!(!update.is_verified());
/// ```
#[instrument(skip_all, fields(from = %old.kind(), to = %new.kind()))]
pub fn migrate<'f>(
    credential: &Credential<'_>,
    old: &HashingFunction,
    new: &'f HashingFunction,
    options: &RehashOptions,
) -> Result<HashUpdateResult<'f>, HashError> {
    if !old.check(credential.plaintext, credential.token, credential.pepper)? {
        debug!("credential did not verify, keeping the old token");
        return Ok(HashUpdateResult::UNVERIFIED);
    }

    let salt = options.salt.resolve()?;
    let input = compose(credential.plaintext, options.pepper.as_deref());
    let hash = new.hash(&input, salt.as_deref())?;
    debug!("credential verified and rehashed");
    Ok(HashUpdateResult::verified(hash))
}

/// [`migrate`] with the old function rebuilt from the token itself.
///
/// ## Errors
///
/// Returns `HashError::UnsupportedAlgorithm` if the token's family is not
/// recognised, plus everything [`migrate`] returns.
pub fn migrate_from_token<'f>(
    credential: &Credential<'_>,
    new: &'f HashingFunction,
    options: &RehashOptions,
) -> Result<HashUpdateResult<'f>, HashError> {
    let old = HashingFunction::from_hash(credential.token)?;
    migrate(credential, &old, new, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::pbkdf2::Hmac;

    fn old() -> HashingFunction {
        HashingFunction::pbkdf2(Hmac::Sha1, 1000, 160).unwrap()
    }

    fn new() -> HashingFunction {
        HashingFunction::scrypt(16, 8, 1, 32).unwrap()
    }

    fn stored(plaintext: &str, pepper: Option<&str>) -> String {
        old().hash(&compose(plaintext, pepper), None).unwrap().into_token()
    }

    #[test]
    fn wrong_plaintext_is_unverified() {
        let token = stored("password", None);
        let new = new();
        let update = migrate(
            &Credential::new("password1", &token),
            &old(),
            &new,
            &RehashOptions::default(),
        )
        .unwrap();
        assert_eq!(update, HashUpdateResult::UNVERIFIED);
    }

    #[test]
    fn unverified_does_not_consume_the_salt_directive() {
        // Random(0) would fail if the new side ran.
        let token = stored("password", None);
        let new = new();
        let options = RehashOptions::default().with_salt(SaltDirective::Random(0));
        let update = migrate(&Credential::new("nope", &token), &old(), &new, &options).unwrap();
        assert!(!update.is_verified());

        let err = migrate(&Credential::new("password", &token), &old(), &new, &options);
        assert!(matches!(err, Err(HashError::InvalidParameters(_))));
    }

    #[test]
    fn empty_explicit_salt_is_rejected_after_verification() {
        let token = stored("password", None);
        let new = new();
        let options = RehashOptions::default().with_salt(SaltDirective::Explicit(Vec::new()));
        let result = migrate(&Credential::new("password", &token), &old(), &new, &options);
        assert!(matches!(result, Err(HashError::InvalidParameters(_))));
    }

    #[test]
    fn options_debug_hides_the_pepper() {
        let options = RehashOptions::default().with_pepper("pepper-secret");
        let rendered = format!("{options:?}");
        assert!(!rendered.contains("pepper-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn verified_migration_produces_a_new_token() {
        let token = stored("password", Some("old-pepper"));
        let new = new();
        let credential = Credential::new("password", &token).with_pepper("old-pepper");
        let options = RehashOptions::default()
            .with_salt(SaltDirective::Explicit(b"fresh salt".to_vec()))
            .with_pepper("new-pepper");

        let update = migrate(&credential, &old(), &new, &options).unwrap();
        let hash = update.hash().unwrap();
        assert!(update.is_verified());
        assert_eq!(hash.salt(), Some(&b"fresh salt"[..]));
        assert!(new.check("password", hash.token(), Some("new-pepper")).unwrap());
        assert!(!new.check("password", hash.token(), Some("old-pepper")).unwrap());
    }

    #[test]
    fn malformed_token_is_an_error() {
        let new = new();
        let result = migrate(
            &Credential::new("password", "$pbkdf2$SHA1$1000$160$c2FsdA=="),
            &old(),
            &new,
            &RehashOptions::default(),
        );
        assert!(matches!(result, Err(HashError::MalformedHash { .. })));
    }

    #[test]
    fn migrate_from_token_rebuilds_the_old_side() {
        let token = stored("password", None);
        let new = new();
        let update =
            migrate_from_token(&Credential::new("password", &token), &new, &RehashOptions::default())
                .unwrap();
        assert!(update.is_verified());

        let result =
            migrate_from_token(&Credential::new("password", "$x$y"), &new, &RehashOptions::default());
        assert!(matches!(result, Err(HashError::UnsupportedAlgorithm(_))));
    }

    #[test]
    #[tracing_test::traced_test]
    fn logs_never_contain_secrets() {
        let token = stored("hunter2-secret", Some("pepper-secret"));
        let new = new();
        let credential = Credential::new("hunter2-secret", &token).with_pepper("pepper-secret");
        migrate(&credential, &old(), &new, &RehashOptions::default()).unwrap();
        migrate(
            &Credential::new("wrong-secret", &token),
            &old(),
            &new,
            &RehashOptions::default(),
        )
        .unwrap();

        assert!(logs_contain("credential verified and rehashed"));
        assert!(logs_contain("keeping the old token"));
        assert!(!logs_contain("hunter2"));
        assert!(!logs_contain("pepper-secret"));
        assert!(!logs_contain("wrong-secret"));
    }

    #[test]
    fn debug_redacts_the_plaintext() {
        let credential = Credential::new("hunter2", "$md$SHA-1$00").with_pepper("spice");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("spice"));
    }
}
