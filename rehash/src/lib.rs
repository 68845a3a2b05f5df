//! Self-describing password hashes with verify-then-rehash migration.
//!
//! Every hash is stored as a single text token that carries its algorithm
//! parameters, its salt and its digest. Checking a plaintext always uses the
//! parameters embedded in the token, so stored hashes keep verifying after
//! the configured defaults change, and a verified login can be migrated to a
//! stronger function in the same step.
//!
//! ## Families
//!
//! | Family | Token prefix | Default |
//! |--------|--------------|---------|
//! | PBKDF2 | `$pbkdf2$` | HMAC-SHA512, 310000 iterations, 512 bits |
//! | Compressed PBKDF2 | `$<decimal>$` | same as PBKDF2 |
//! | BCrypt | `$2a$` `$2b$` `$2x$` `$2y$` | `2b`, cost 10 |
//! | SCrypt | `$s0$` | N=65536, r=8, p=1, 64 bytes |
//! | Message digest | `$md$` | SHA-512, unsalted |
//! | Argon2 | `$argon2id$` (PHC) | m=19456 KiB, t=2, p=1, 32 bytes |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `argon2` | Yes | Argon2d/i/id in PHC string format |
//!
//! ## Examples
//!
//! ```rust
//! use rehash::{Credential, HashingFunction, RehashOptions, compose, migrate_from_token};
//! use rehash::function::pbkdf2::Hmac;
//!
//! let legacy = HashingFunction::pbkdf2(Hmac::Sha1, 1000, 160).unwrap();
//! let stored = legacy.hash(&compose("hunter2", None), None).unwrap().into_token();
//!
//! let target = HashingFunction::bcrypt(4).unwrap();
//! let update = migrate_from_token(
//!     &Credential::new("hunter2", &stored),
//!     &target,
//!     &RehashOptions::default(),
//! )
//! .unwrap();
//!
//! let upgraded = update.hash().unwrap();
//! assert!(upgraded.token().starts_with("$2b$04$"));
//! assert!(target.check("hunter2", upgraded.token(), None).unwrap());
//! ```

pub mod codec;
pub mod compose;
pub mod config;
pub mod error;
pub mod function;
pub mod kind;
pub mod request;
pub mod result;
pub mod salt;
pub mod update;

pub use codec::identify_family;
pub use compose::{CompositeInput, compose};
pub use config::{ConfigError, HashingConfig};
pub use error::HashError;
pub use function::HashingFunction;
pub use kind::AlgorithmKind;
pub use request::{CheckRequest, HashRequest, Password, UpdateRequest};
pub use result::{HashResult, HashUpdateResult};
pub use salt::SaltDirective;
pub use update::{Credential, RehashOptions, migrate, migrate_from_token};
