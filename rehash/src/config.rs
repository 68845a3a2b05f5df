//! Default parameters per family, loaded from TOML.
//!
//! ```toml
//! pepper = "application secret"
//! salt-length = 32
//!
//! [pbkdf2]
//! algorithm = "SHA256"
//! iterations = 600000
//! length = 256
//!
//! [bcrypt]
//! version = "2y"
//! cost = 12
//!
//! [scrypt]
//! work-factor = 32768
//!
//! [message-digest]
//! algorithm = "SHA-256"
//! ```
//!
//! Every key is optional and falls back to the family default.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::HashError;
#[cfg(feature = "argon2")]
use crate::function::argon2::Argon2Function;
use crate::function::bcrypt::BcryptFunction;
use crate::function::digest::MessageDigestFunction;
use crate::function::pbkdf2::Pbkdf2Function;
use crate::function::scrypt::ScryptFunction;
use crate::function::HashingFunction;
use crate::kind::AlgorithmKind;
use crate::salt::DEFAULT_SALT_LENGTH;

/// Errors from loading a [`HashingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid TOML or has unknown values.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A section holds parameters outside its family's domain.
    #[error("invalid config: {0}")]
    Invalid(#[from] HashError),
}

/// Default hashing parameters, one section per family.
///
/// Compressed PBKDF2 shares the `[pbkdf2]` section.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HashingConfig {
    /// Secret prefixed to plaintexts when a request asks for the pepper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pepper: Option<String>,
    /// Length of random salts requested without an explicit length.
    pub salt_length: usize,
    pub pbkdf2: Pbkdf2Function,
    pub bcrypt: BcryptFunction,
    pub scrypt: ScryptFunction,
    pub message_digest: MessageDigestFunction,
    #[cfg(feature = "argon2")]
    pub argon2: Argon2Function,
}

impl fmt::Debug for HashingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("HashingConfig");
        debug
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .field("salt_length", &self.salt_length)
            .field("pbkdf2", &self.pbkdf2)
            .field("bcrypt", &self.bcrypt)
            .field("scrypt", &self.scrypt)
            .field("message_digest", &self.message_digest);
        #[cfg(feature = "argon2")]
        debug.field("argon2", &self.argon2);
        debug.finish()
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            salt_length: DEFAULT_SALT_LENGTH,
            pbkdf2: Pbkdf2Function::default(),
            bcrypt: BcryptFunction::default(),
            scrypt: ScryptFunction::default(),
            message_digest: MessageDigestFunction::default(),
            #[cfg(feature = "argon2")]
            argon2: Argon2Function::default(),
        }
    }
}

impl HashingConfig {
    /// Parses and validates a TOML document.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::Parse` for invalid TOML and `ConfigError::Invalid`
    /// for out-of-domain parameters.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HashingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise as
    /// [`HashingConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), HashError> {
        if self.salt_length == 0 {
            return Err(HashError::invalid("salt-length must be positive"));
        }
        for kind in AlgorithmKind::ALL {
            self.function(*kind).validate()?;
        }
        Ok(())
    }

    /// The configured function of a family.
    pub fn function(&self, kind: AlgorithmKind) -> HashingFunction {
        match kind {
            AlgorithmKind::Pbkdf2 => HashingFunction::Pbkdf2(self.pbkdf2),
            AlgorithmKind::CompressedPbkdf2 => HashingFunction::CompressedPbkdf2(self.pbkdf2),
            AlgorithmKind::Bcrypt => HashingFunction::Bcrypt(self.bcrypt),
            AlgorithmKind::Scrypt => HashingFunction::Scrypt(self.scrypt),
            AlgorithmKind::MessageDigest => HashingFunction::MessageDigest(self.message_digest),
            #[cfg(feature = "argon2")]
            AlgorithmKind::Argon2 => HashingFunction::Argon2(self.argon2),
        }
    }
}
