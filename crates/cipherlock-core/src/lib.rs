//! # Cipherlock Core
//!
//! Checksum-gated payload unlock. The secret is never stored; only
//! indirect evidence of it is:
//!
//! ```text
//! SECRET ──► WEIGHTED CHECKSUM ──► RESIDUE FILTER ──► ROLLING XOR ──► INTEGRITY GATE ──► EXECUTOR
//!                 (base 0x7FFFFFFF)   (mod/residue)     (4-byte key)     (checksum 0x201b0f)
//!
//! SEED ──► LCG ──► SPARSE FINGERPRINT (draws 1-4, 196-197) ──► RESIDUE CROSS-CHECK
//! ```
//!
//! The scheme is deliberately weak. Byte 0 of any input never contributes to
//! the weighted checksum, and the residue filter admits every value congruent
//! to the key modulo the LCM of its moduli. Both properties are reproduced
//! as-is.

pub mod analysis;
pub mod checksum;
pub mod config;
pub mod constraints;
pub mod decoder;
pub mod executor;
pub mod fingerprint;
pub mod gate;
pub mod generator;
pub mod payload;
pub mod recover;
pub mod unlock;

pub use checksum::{WeightedChecksum, PASSWORD_CHECKSUM_BASE, PAYLOAD_CHECKSUM_BASE};
pub use config::CipherlockConfig;
pub use constraints::{ChecksumConstraintValidator, ConstraintSet, Residue};
pub use decoder::PayloadDecoder;
pub use executor::{Executor, LoginRoutine};
pub use fingerprint::{Fingerprint, FingerprintCheck, Verdict};
pub use gate::{PayloadIntegrityGate, VerifiedPayload};
pub use generator::{Seed, SequenceGenerator};
pub use recover::{CancelToken, SeedRange, SeedRecoverer};
pub use unlock::{RecoveredSeed, UnlockOrchestrator, UnlockProtocol};

/// Result type for cipherlock-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cipherlock-core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Length mismatch: expected {expected} bytes, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Checksum does not satisfy the residue constraints")]
    ChecksumConstraintFailure,

    #[error("Payload integrity mismatch: expected {expected:#010x}, got {got:#010x}")]
    IntegrityMismatch { expected: u32, got: u32 },

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Invalid constraint: residue {residue} is unreachable modulo {modulus}")]
    InvalidConstraint { modulus: u16, residue: u16 },

    #[error("Invalid seed range: [{start:#x}, {end:#x})")]
    InvalidRange { start: u64, end: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the protocol rejections (bad key, bad payload, bad framing),
    /// false for usage and environment errors.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::LengthMismatch { .. }
                | Error::ChecksumConstraintFailure
                | Error::IntegrityMismatch { .. }
        )
    }
}
