//! Argon2 parameter set and key derivation.
//!
//! Argon2id, the winner of the Password Hashing Competition, is the default
//! variant. It combines Argon2i (resistant to side-channel attacks) and
//! Argon2d (resistant to GPU cracking).

use std::fmt;

use ::argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::HashError;
use crate::function::MAX_MEMORY_BYTES;

/// Default memory cost in KiB (19 MiB, the OWASP recommended minimum).
pub const DEFAULT_MEMORY_COST_KIB: u32 = 19_456;

/// Default time cost (number of passes).
pub const DEFAULT_TIME_COST: u32 = 2;

/// Default parallelism (number of lanes).
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Default output length in bytes.
pub const DEFAULT_OUTPUT_LEN: u32 = 32;

/// Default salt length in bytes for generated salts.
pub const DEFAULT_SALT_LEN: usize = 16;

/// Shortest salt Argon2 accepts.
pub const MIN_SALT_LEN: usize = 8;

const VERSION_10: u32 = 0x10;
const VERSION_13: u32 = 0x13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Argon2Variant {
    Argon2d,
    Argon2i,
    #[default]
    Argon2id,
}

impl Argon2Variant {
    pub const ALL: [Argon2Variant; 3] = [
        Argon2Variant::Argon2d,
        Argon2Variant::Argon2i,
        Argon2Variant::Argon2id,
    ];

    /// The PHC identifier, e.g. `argon2id`.
    pub fn ident(self) -> &'static str {
        match self {
            Argon2Variant::Argon2d => "argon2d",
            Argon2Variant::Argon2i => "argon2i",
            Argon2Variant::Argon2id => "argon2id",
        }
    }

    pub fn from_ident(ident: &str) -> Option<Self> {
        Argon2Variant::ALL
            .into_iter()
            .find(|variant| variant.ident() == ident)
    }

    fn algorithm(self) -> Algorithm {
        match self {
            Argon2Variant::Argon2d => Algorithm::Argon2d,
            Argon2Variant::Argon2i => Algorithm::Argon2i,
            Argon2Variant::Argon2id => Algorithm::Argon2id,
        }
    }
}

impl fmt::Display for Argon2Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ident())
    }
}

/// Argon2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Argon2Function {
    variant: Argon2Variant,
    version: u32,
    memory: u32,
    iterations: u32,
    parallelism: u32,
    output_length: u32,
}

impl Default for Argon2Function {
    fn default() -> Self {
        Self {
            variant: Argon2Variant::default(),
            version: VERSION_13,
            memory: DEFAULT_MEMORY_COST_KIB,
            iterations: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
            output_length: DEFAULT_OUTPUT_LEN,
        }
    }
}

impl Argon2Function {
    /// Creates a version 0x13 Argon2 parameter set.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if the `argon2` crate rejects
    /// the memory, time or parallelism cost or the output length, or if the
    /// memory cost exceeds [`MAX_MEMORY_BYTES`].
    pub fn new(
        variant: Argon2Variant,
        memory: u32,
        iterations: u32,
        parallelism: u32,
        output_length: u32,
    ) -> Result<Self, HashError> {
        Self::with_version(variant, VERSION_13, memory, iterations, parallelism, output_length)
    }

    /// Creates an Argon2 parameter set with an explicit version (16 or 19).
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` for an unknown version or
    /// out-of-range costs.
    pub fn with_version(
        variant: Argon2Variant,
        version: u32,
        memory: u32,
        iterations: u32,
        parallelism: u32,
        output_length: u32,
    ) -> Result<Self, HashError> {
        let function = Self {
            variant,
            version,
            memory,
            iterations,
            parallelism,
            output_length,
        };
        function.validate()?;
        Ok(function)
    }

    pub fn validate(&self) -> Result<(), HashError> {
        self.argon2_version()?;
        self.params()?;
        if u64::from(self.memory) * 1024 > MAX_MEMORY_BYTES {
            return Err(HashError::invalid(format!(
                "Argon2 memory cost of {} KiB is above the {} KiB limit",
                self.memory,
                MAX_MEMORY_BYTES / 1024
            )));
        }
        Ok(())
    }

    pub fn variant(&self) -> Argon2Variant {
        self.variant
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Memory cost in KiB.
    pub fn memory(&self) -> u32 {
        self.memory
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    /// Output length in bytes.
    pub fn output_length(&self) -> u32 {
        self.output_length
    }

    fn argon2_version(&self) -> Result<Version, HashError> {
        match self.version {
            VERSION_10 => Ok(Version::V0x10),
            VERSION_13 => Ok(Version::V0x13),
            other => Err(HashError::invalid(format!("unknown Argon2 version {other}"))),
        }
    }

    fn params(&self) -> Result<Params, HashError> {
        Params::new(
            self.memory,
            self.iterations,
            self.parallelism,
            Some(self.output_length as usize),
        )
        .map_err(|e| HashError::invalid(format!("Argon2 parameters rejected: {e}")))
    }

    pub(crate) fn derive(&self, input: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, HashError> {
        if salt.len() < MIN_SALT_LEN {
            return Err(HashError::invalid(format!(
                "Argon2 salt must be at least {MIN_SALT_LEN} bytes, got {}",
                salt.len()
            )));
        }
        let argon2 = Argon2::new(self.variant.algorithm(), self.argon2_version()?, self.params()?);
        let mut out = Zeroizing::new(vec![0u8; self.output_length as usize]);
        argon2
            .hash_password_into(input, salt, &mut out)
            .map_err(|e| HashError::invalid(format!("Argon2 rejected its input: {e}")))?;
        Ok(out)
    }
}
