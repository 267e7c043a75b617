//! Payload Integrity Gate
//!
//! Second, independent checksum over the decoded bytes. A key that slipped
//! through the residue filter but is not the real one decodes to garbage,
//! and garbage does not reproduce the expected checksum.
//!
//! `VerifiedPayload` can only be built here, so anything that takes one has
//! been through the gate.

use zeroize::Zeroize;

use crate::checksum::WeightedChecksum;
use crate::decoder::DecodeBuffer;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct PayloadIntegrityGate {
    expected: u32,
}

impl PayloadIntegrityGate {
    pub fn new(expected: u32) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// `WeightedChecksum::payload(decoded) == expected`
    pub fn verify(decoded: &[u8], expected: u32) -> bool {
        WeightedChecksum::payload(decoded) == expected
    }

    /// Release `decoded` as a `VerifiedPayload`, or report the checksum it had
    pub fn admit(&self, mut decoded: Vec<u8>) -> Result<VerifiedPayload> {
        let got = WeightedChecksum::payload(&decoded);
        if got != self.expected {
            decoded.zeroize();
            return Err(Error::IntegrityMismatch {
                expected: self.expected,
                got,
            });
        }
        Ok(VerifiedPayload {
            bytes: decoded,
            checksum: got,
        })
    }

    pub(crate) fn admit_buffer(&self, buf: DecodeBuffer) -> Result<VerifiedPayload> {
        let got = WeightedChecksum::payload(buf.as_slice());
        if got != self.expected {
            return Err(Error::IntegrityMismatch {
                expected: self.expected,
                got,
            });
        }
        Ok(VerifiedPayload {
            bytes: buf.into_inner(),
            checksum: got,
        })
    }
}

/// Decoded bytes that passed the integrity gate
pub struct VerifiedPayload {
    bytes: Vec<u8>,
    checksum: u32,
}

impl VerifiedPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

impl Zeroize for VerifiedPayload {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl Drop for VerifiedPayload {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for VerifiedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VerifiedPayload({} bytes, checksum {:#010x}, [REDACTED])",
            self.bytes.len(),
            self.checksum
        )
    }
}
