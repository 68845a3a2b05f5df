//! PBKDF2 parameter set and key derivation.

use std::fmt;
use std::str::FromStr;

use ::pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::error::HashError;

/// Default number of PBKDF2 iterations.
pub const DEFAULT_ITERATIONS: u32 = 310_000;

/// Default PBKDF2 key length in bits.
pub const DEFAULT_LENGTH: u32 = 512;

/// The pseudo-random function PBKDF2 iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hmac {
    #[serde(rename = "SHA1")]
    Sha1,
    #[serde(rename = "SHA224")]
    Sha224,
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA384")]
    Sha384,
    #[default]
    #[serde(rename = "SHA512")]
    Sha512,
}

impl Hmac {
    /// Every supported HMAC.
    pub const ALL: [Hmac; 5] = [
        Hmac::Sha1,
        Hmac::Sha224,
        Hmac::Sha256,
        Hmac::Sha384,
        Hmac::Sha512,
    ];

    /// Numeric code stored in compressed tokens.
    pub fn code(self) -> u16 {
        match self {
            Hmac::Sha1 => 1,
            Hmac::Sha224 => 224,
            Hmac::Sha256 => 256,
            Hmac::Sha384 => 384,
            Hmac::Sha512 => 512,
        }
    }

    /// Name stored in spelled-out tokens.
    pub fn name(self) -> &'static str {
        match self {
            Hmac::Sha1 => "SHA1",
            Hmac::Sha224 => "SHA224",
            Hmac::Sha256 => "SHA256",
            Hmac::Sha384 => "SHA384",
            Hmac::Sha512 => "SHA512",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Hmac::ALL.into_iter().find(|hmac| hmac.code() == code)
    }

    fn derive(self, input: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
        match self {
            Hmac::Sha1 => pbkdf2_hmac::<Sha1>(input, salt, iterations, out),
            Hmac::Sha224 => pbkdf2_hmac::<Sha224>(input, salt, iterations, out),
            Hmac::Sha256 => pbkdf2_hmac::<Sha256>(input, salt, iterations, out),
            Hmac::Sha384 => pbkdf2_hmac::<Sha384>(input, salt, iterations, out),
            Hmac::Sha512 => pbkdf2_hmac::<Sha512>(input, salt, iterations, out),
        }
    }
}

impl fmt::Display for Hmac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hmac {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hmac::ALL
            .into_iter()
            .find(|hmac| hmac.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| HashError::UnsupportedAlgorithm(format!("PBKDF2 HMAC {s}")))
    }
}

/// PBKDF2 parameters: HMAC, iteration count and key length in bits.
///
/// The same parameter set backs both the spelled-out and the compressed
/// token format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Pbkdf2Function {
    algorithm: Hmac,
    iterations: u32,
    length: u32,
}

impl Default for Pbkdf2Function {
    fn default() -> Self {
        Self {
            algorithm: Hmac::default(),
            iterations: DEFAULT_ITERATIONS,
            length: DEFAULT_LENGTH,
        }
    }
}

impl Pbkdf2Function {
    /// Creates a PBKDF2 parameter set.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if `iterations` is zero or
    /// `length` is not a positive multiple of 8 that fits in 16 bits.
    pub fn new(algorithm: Hmac, iterations: u32, length: u32) -> Result<Self, HashError> {
        let function = Self {
            algorithm,
            iterations,
            length,
        };
        function.validate()?;
        Ok(function)
    }

    /// Re-checks the parameter domain (used after deserialization).
    pub fn validate(&self) -> Result<(), HashError> {
        if self.iterations == 0 {
            return Err(HashError::invalid("PBKDF2 iterations must be positive"));
        }
        if self.length == 0 || self.length % 8 != 0 || self.length > u32::from(u16::MAX) {
            return Err(HashError::invalid(format!(
                "PBKDF2 key length must be a positive multiple of 8 below 65536 bits, got {}",
                self.length
            )));
        }
        Ok(())
    }

    pub fn algorithm(&self) -> Hmac {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Key length in bits.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Key length in bytes.
    pub fn length_bytes(&self) -> usize {
        (self.length / 8) as usize
    }

    pub(crate) fn derive(&self, input: &[u8], salt: &[u8]) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(vec![0u8; self.length_bytes()]);
        self.algorithm.derive(input, salt, self.iterations, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc6070_sha1_vector() {
        let function = Pbkdf2Function::new(Hmac::Sha1, 2, 160).unwrap();
        let digest = function.derive(b"password", b"salt");
        assert_eq!(
            hex::encode(digest.as_slice()),
            "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957"
        );
    }

    #[test]
    fn parameter_domain_is_enforced() {
        assert!(Pbkdf2Function::new(Hmac::Sha256, 0, 256).is_err());
        assert!(Pbkdf2Function::new(Hmac::Sha256, 1, 0).is_err());
        assert!(Pbkdf2Function::new(Hmac::Sha256, 1, 255).is_err());
        assert!(Pbkdf2Function::new(Hmac::Sha256, 1, 65_536).is_err());
        assert!(Pbkdf2Function::new(Hmac::Sha256, 1, 65_528).is_ok());
    }

    #[test]
    fn hmac_codes_and_names_round_trip() {
        for hmac in Hmac::ALL {
            assert_eq!(Hmac::from_code(hmac.code()), Some(hmac));
            assert_eq!(hmac.name().parse::<Hmac>().unwrap(), hmac);
        }
        assert_eq!(Hmac::from_code(2), None);
    }

    #[test]
    fn defaults() {
        let function = Pbkdf2Function::default();
        assert_eq!(function.algorithm(), Hmac::Sha512);
        assert_eq!(function.iterations(), 310_000);
        assert_eq!(function.length(), 512);
    }
}
