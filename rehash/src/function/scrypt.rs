//! SCrypt parameter set and key derivation.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::HashError;
use crate::function::MAX_MEMORY_BYTES;

/// Default work factor N (CPU/memory cost).
pub const DEFAULT_WORK_FACTOR: u64 = 65_536;

/// Default block size r.
pub const DEFAULT_RESOURCES: u32 = 8;

/// Default parallelization p.
pub const DEFAULT_PARALLELIZATION: u32 = 1;

/// Default derived key length in bytes.
pub const DEFAULT_DERIVED_KEY_LENGTH: u32 = 64;

const MIN_DERIVED_KEY_LENGTH: u32 = 10;
const MAX_DERIVED_KEY_LENGTH: u32 = 64;

/// SCrypt parameters: work factor N, block size r, parallelization p and
/// derived key length.
///
/// `r` and `p` are limited to one byte each because the token header packs
/// them into eight bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScryptFunction {
    work_factor: u64,
    resources: u32,
    parallelization: u32,
    derived_key_length: u32,
}

impl Default for ScryptFunction {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            resources: DEFAULT_RESOURCES,
            parallelization: DEFAULT_PARALLELIZATION,
            derived_key_length: DEFAULT_DERIVED_KEY_LENGTH,
        }
    }
}

impl ScryptFunction {
    /// Creates an SCrypt parameter set.
    ///
    /// ## Errors
    ///
    /// Returns `HashError::InvalidParameters` if `work_factor` is not a power
    /// of two greater than one, `resources` or `parallelization` is outside
    /// 1..=255, `work_factor >= 2^(16 * resources)`, `128 * r * N` exceeds
    /// [`MAX_MEMORY_BYTES`], or the derived key length is outside 10..=64
    /// bytes.
    pub fn new(
        work_factor: u64,
        resources: u32,
        parallelization: u32,
        derived_key_length: u32,
    ) -> Result<Self, HashError> {
        let function = Self {
            work_factor,
            resources,
            parallelization,
            derived_key_length,
        };
        function.validate()?;
        Ok(function)
    }

    pub fn validate(&self) -> Result<(), HashError> {
        if self.work_factor < 2 || !self.work_factor.is_power_of_two() {
            return Err(HashError::invalid(format!(
                "SCrypt work factor must be a power of two greater than 1, got {}",
                self.work_factor
            )));
        }
        if !(1..=255).contains(&self.resources) || !(1..=255).contains(&self.parallelization) {
            return Err(HashError::invalid(format!(
                "SCrypt block size and parallelization must be within 1..=255, got r={} p={}",
                self.resources, self.parallelization
            )));
        }
        if self.log_n() >= 16 * self.resources {
            return Err(HashError::invalid(format!(
                "SCrypt work factor 2^{} is too large for block size {}",
                self.log_n(),
                self.resources
            )));
        }
        if self.memory_bytes() > u128::from(MAX_MEMORY_BYTES) {
            return Err(HashError::invalid(format!(
                "SCrypt needs {} bytes of memory for N={} r={}, above the {MAX_MEMORY_BYTES} byte limit",
                self.memory_bytes(),
                self.work_factor,
                self.resources
            )));
        }
        if !(MIN_DERIVED_KEY_LENGTH..=MAX_DERIVED_KEY_LENGTH).contains(&self.derived_key_length) {
            return Err(HashError::invalid(format!(
                "SCrypt derived key length must be within {MIN_DERIVED_KEY_LENGTH}..={MAX_DERIVED_KEY_LENGTH} bytes, got {}",
                self.derived_key_length
            )));
        }
        Ok(())
    }

    pub fn work_factor(&self) -> u64 {
        self.work_factor
    }

    /// `log2(N)`.
    pub fn log_n(&self) -> u32 {
        self.work_factor.trailing_zeros()
    }

    /// Working memory of one derivation, `128 * r * N` bytes.
    pub fn memory_bytes(&self) -> u128 {
        128 * u128::from(self.resources) * u128::from(self.work_factor)
    }

    pub fn resources(&self) -> u32 {
        self.resources
    }

    pub fn parallelization(&self) -> u32 {
        self.parallelization
    }

    pub fn derived_key_length(&self) -> u32 {
        self.derived_key_length
    }

    pub(crate) fn derive(&self, input: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, HashError> {
        let log_n = u8::try_from(self.log_n())
            .map_err(|_| HashError::invalid("SCrypt work factor is too large"))?;
        let params = ::scrypt::Params::new(
            log_n,
            self.resources,
            self.parallelization,
            self.derived_key_length as usize,
        )
        .map_err(|e| HashError::invalid(format!("SCrypt parameters rejected: {e}")))?;

        let mut out = Zeroizing::new(vec![0u8; self.derived_key_length as usize]);
        ::scrypt::scrypt(input, salt, &params, &mut out)
            .map_err(|e| HashError::invalid(format!("SCrypt output rejected: {e}")))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc7914_vector() {
        let function = ScryptFunction::new(1024, 8, 16, 64).unwrap();
        let digest = function.derive(b"password", b"NaCl").unwrap();
        assert_eq!(
            hex::encode(digest.as_slice()),
            "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b3731622eaf30d92e22a3886ff109279d9830dac727afb94a83ee6d8360cbdfa2cc0640"
        );
    }

    #[test]
    fn work_factor_must_be_a_power_of_two() {
        assert!(ScryptFunction::new(1000, 8, 1, 32).is_err());
        assert!(ScryptFunction::new(1, 8, 1, 32).is_err());
        assert!(ScryptFunction::new(0, 8, 1, 32).is_err());
        assert!(ScryptFunction::new(1024, 8, 1, 32).is_ok());
    }

    #[test]
    fn block_size_and_parallelization_are_bounded() {
        assert!(ScryptFunction::new(1024, 0, 1, 32).is_err());
        assert!(ScryptFunction::new(1024, 8, 0, 32).is_err());
        assert!(ScryptFunction::new(1024, 256, 1, 32).is_err());
        assert!(ScryptFunction::new(1 << 16, 1, 1, 32).is_err());
    }

    #[test]
    fn derived_key_length_is_bounded() {
        assert!(ScryptFunction::new(1024, 8, 1, 9).is_err());
        assert!(ScryptFunction::new(1024, 8, 1, 65).is_err());
    }

    #[test]
    fn defaults() {
        let function = ScryptFunction::default();
        assert_eq!(function.work_factor(), 65_536);
        assert_eq!(function.log_n(), 16);
        assert_eq!(function.resources(), 8);
        assert_eq!(function.parallelization(), 1);
        assert_eq!(function.derived_key_length(), 64);
        assert!(function.validate().is_ok());
    }
}
