//! Unlock Orchestrator
//!
//! Two strict pipelines, each stopping at the first failed stage:
//!
//! ```text
//! unlock:   secret ─► checksum(base) ─► residue filter ─► XOR decode ─► integrity gate ─► VerifiedPayload
//!                                        └► ChecksumConstraintFailure      └► IntegrityMismatch
//!
//! recover:  range ─► fingerprint search ─► residue cross-check ─► RecoveredSeed
//! ```

use crate::checksum::{WeightedChecksum, PASSWORD_CHECKSUM_BASE};
use crate::constraints::{ChecksumConstraintValidator, ConstraintSet};
use crate::decoder::DecodeBuffer;
use crate::executor::Executor;
use crate::fingerprint::Fingerprint;
use crate::gate::{PayloadIntegrityGate, VerifiedPayload};
use crate::generator::Seed;
use crate::payload::{ENCODED_PAYLOAD, EXPECTED_PAYLOAD_CHECKSUM};
use crate::recover::{CancelToken, SearchReport, SeedRange, SeedRecoverer};
use crate::{Error, Result};

/// Everything needed to turn a candidate secret into a verified payload
#[derive(Debug, Clone)]
pub struct UnlockProtocol {
    encoded: Vec<u8>,
    constraints: ConstraintSet,
    gate: PayloadIntegrityGate,
    secret_base: u32,
}

impl UnlockProtocol {
    /// `encoded` must be exactly `payload_len` bytes
    pub fn new(
        encoded: Vec<u8>,
        payload_len: usize,
        constraints: ConstraintSet,
        expected_checksum: u32,
        secret_base: u32,
    ) -> Result<Self> {
        if encoded.len() != payload_len {
            return Err(Error::LengthMismatch {
                expected: payload_len,
                got: encoded.len(),
            });
        }
        Ok(Self {
            encoded,
            constraints,
            gate: PayloadIntegrityGate::new(expected_checksum),
            secret_base,
        })
    }

    /// The shipped login payload with its baked constants
    pub fn reference() -> Self {
        Self {
            encoded: ENCODED_PAYLOAD.to_vec(),
            constraints: ConstraintSet::reference(),
            gate: PayloadIntegrityGate::new(EXPECTED_PAYLOAD_CHECKSUM),
            secret_base: PASSWORD_CHECKSUM_BASE,
        }
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn payload_len(&self) -> usize {
        self.encoded.len()
    }

    /// Decode key a secret would produce
    pub fn key_for(&self, secret: &[u8]) -> u32 {
        WeightedChecksum::compute(secret, self.secret_base)
    }

    /// Run the unlock pipeline for `secret`
    pub fn unlock(&self, secret: &[u8]) -> Result<VerifiedPayload> {
        self.unlock_with_key(self.key_for(secret))
    }

    /// Run the pipeline from the checksum stage onward
    pub fn unlock_with_key(&self, key: u32) -> Result<VerifiedPayload> {
        if let Err(e) = ChecksumConstraintValidator::check(key, &self.constraints) {
            tracing::debug!("secret checksum rejected by residue filter");
            return Err(e);
        }

        let decoded = DecodeBuffer::decode(&self.encoded, key);
        match self.gate.admit_buffer(decoded) {
            Ok(payload) => {
                tracing::debug!(len = payload.len(), "payload passed integrity gate");
                Ok(payload)
            }
            Err(e) => {
                tracing::debug!(error = %e, "decoded payload rejected");
                Err(e)
            }
        }
    }
}

impl Default for UnlockProtocol {
    fn default() -> Self {
        Self::reference()
    }
}

/// A fingerprint match and whether it also passes the residue filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredSeed {
    pub seed: Seed,
    pub satisfies_constraints: bool,
}

pub struct UnlockOrchestrator {
    protocol: UnlockProtocol,
    recoverer: SeedRecoverer,
    workers: usize,
}

impl UnlockOrchestrator {
    pub fn new(protocol: UnlockProtocol, fingerprint: Fingerprint, workers: usize) -> Self {
        Self {
            protocol,
            recoverer: SeedRecoverer::new(fingerprint),
            workers: workers.max(1),
        }
    }

    pub fn reference() -> Self {
        Self::new(UnlockProtocol::reference(), Fingerprint::reference(), num_cpus::get())
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.recoverer = self.recoverer.with_cancel(cancel);
        self
    }

    pub fn protocol(&self) -> &UnlockProtocol {
        &self.protocol
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn cross_check(&self, seed: Seed) -> RecoveredSeed {
        let satisfies_constraints = self.protocol.constraints.accepts(seed.value());
        if !satisfies_constraints {
            tracing::warn!(seed = %seed, "fingerprint match fails residue cross-check");
        }
        RecoveredSeed {
            seed,
            satisfies_constraints,
        }
    }

    /// Lowest fingerprint match in `range`, cross-checked
    pub fn recover(&self, range: SeedRange) -> Option<RecoveredSeed> {
        self.recoverer
            .par_search(range, self.workers)
            .map(|seed| self.cross_check(seed))
    }

    /// Every fingerprint match in `range`, cross-checked. `on_found` sees
    /// each one as it arrives.
    pub fn recover_all<F>(&self, range: SeedRange, mut on_found: F) -> (Vec<RecoveredSeed>, SearchReport)
    where
        F: FnMut(&RecoveredSeed),
    {
        let mut recovered = Vec::new();
        let report = self.recoverer.par_search_all(range, self.workers, |seed| {
            let hit = self.cross_check(seed);
            on_found(&hit);
            recovered.push(hit);
        });
        recovered.sort_by_key(|r| r.seed);
        (recovered, report)
    }

    pub fn unlock(&self, secret: &[u8]) -> Result<VerifiedPayload> {
        self.protocol.unlock(secret)
    }

    /// Unlock, then hand the verified payload to `executor`
    pub fn login<E: Executor>(&self, secret: &[u8], executor: &E) -> Result<bool> {
        let payload = self.unlock(secret)?;
        executor.invoke(&payload, secret)
    }
}
