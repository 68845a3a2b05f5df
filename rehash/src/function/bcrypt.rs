//! BCrypt parameter set and key derivation.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::codec::bcrypt::{DIGEST_LEN, SALT_LEN};
use crate::error::HashError;

/// Lowest accepted cost factor.
pub const MIN_COST: u32 = 4;

/// Highest accepted cost factor.
pub const MAX_COST: u32 = 31;

/// Default cost factor.
pub const DEFAULT_COST: u32 = 10;

/// BCrypt only reads this many bytes of input, terminator included.
const MAX_INPUT: usize = 72;

/// The BCrypt version marker written into tokens.
///
/// All markers verify identically here; the marker is kept so that a token
/// re-encodes to exactly the string it was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BcryptVersion {
    #[serde(rename = "2a")]
    TwoA,
    #[default]
    #[serde(rename = "2b")]
    TwoB,
    #[serde(rename = "2x")]
    TwoX,
    #[serde(rename = "2y")]
    TwoY,
}

impl BcryptVersion {
    pub const ALL: [BcryptVersion; 4] = [
        BcryptVersion::TwoA,
        BcryptVersion::TwoB,
        BcryptVersion::TwoX,
        BcryptVersion::TwoY,
    ];

    pub fn marker(self) -> &'static str {
        match self {
            BcryptVersion::TwoA => "2a",
            BcryptVersion::TwoB => "2b",
            BcryptVersion::TwoX => "2x",
            BcryptVersion::TwoY => "2y",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        BcryptVersion::ALL
            .into_iter()
            .find(|version| version.marker() == marker)
    }
}

impl fmt::Display for BcryptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// BCrypt parameters: version marker and cost factor (log2 of the rounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BcryptFunction {
    version: BcryptVersion,
    cost: u32,
}

impl Default for BcryptFunction {
    fn default() -> Self {
        Self {
            version: BcryptVersion::default(),
            cost: DEFAULT_COST,
        }
    }
}

impl BcryptFunction {
    /// Creates a `$2b$` BCrypt parameter set.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if `cost` is outside 4..=31.
    pub fn new(cost: u32) -> Result<Self, HashError> {
        Self::with_version(BcryptVersion::default(), cost)
    }

    /// Creates a BCrypt parameter set with an explicit version marker.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if `cost` is outside 4..=31.
    pub fn with_version(version: BcryptVersion, cost: u32) -> Result<Self, HashError> {
        let function = Self { version, cost };
        function.validate()?;
        Ok(function)
    }

    pub fn validate(&self) -> Result<(), HashError> {
        if !(MIN_COST..=MAX_COST).contains(&self.cost) {
            return Err(HashError::invalid(format!(
                "BCrypt cost must be within {MIN_COST}..={MAX_COST}, got {}",
                self.cost
            )));
        }
        Ok(())
    }

    pub fn version(&self) -> BcryptVersion {
        self.version
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Runs BCrypt over the NUL-terminated input, truncated to 72 bytes.
    pub(crate) fn derive(&self, input: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, HashError> {
        let salt: [u8; SALT_LEN] = salt.try_into().map_err(|_| {
            HashError::invalid(format!(
                "BCrypt salt must be {SALT_LEN} bytes, got {}",
                salt.len()
            ))
        })?;

        let mut terminated = Zeroizing::new(Vec::with_capacity(input.len() + 1));
        terminated.extend_from_slice(input);
        terminated.push(0);
        let truncated = &terminated[..terminated.len().min(MAX_INPUT)];

        let output = Zeroizing::new(::bcrypt::bcrypt(self.cost, salt, truncated));
        Ok(Zeroizing::new(output[..DIGEST_LEN].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::bcrypt::{decode, encode};

    #[test]
    fn openbsd_vector() {
        let token = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        let decoded = decode(token).unwrap();
        let digest = decoded.params.derive(b"U*U", &decoded.salt).unwrap();
        assert_eq!(encode(&decoded.params, &decoded.salt, &digest), token);
    }

    #[test]
    fn cost_range_is_enforced() {
        assert!(BcryptFunction::new(3).is_err());
        assert!(BcryptFunction::new(32).is_err());
        assert!(BcryptFunction::new(4).is_ok());
        assert!(BcryptFunction::new(31).is_ok());
    }

    #[test]
    fn salt_must_be_sixteen_bytes() {
        let function = BcryptFunction::new(4).unwrap();
        assert!(matches!(
            function.derive(b"password", b"salt"),
            Err(HashError::InvalidParameters(_))
        ));
        assert!(function.derive(b"password", &[7u8; 16]).is_ok());
    }

    #[test]
    fn input_beyond_72_bytes_is_ignored() {
        let function = BcryptFunction::new(4).unwrap();
        let salt = [3u8; 16];
        let long = vec![b'a'; 100];
        let longer = vec![b'a'; 120];
        assert_eq!(
            function.derive(&long, &salt).unwrap(),
            function.derive(&longer, &salt).unwrap()
        );
    }

    #[test]
    fn empty_input_is_hashed() {
        let function = BcryptFunction::new(4).unwrap();
        assert_eq!(function.derive(b"", &[1u8; 16]).unwrap().len(), DIGEST_LEN);
    }
}
