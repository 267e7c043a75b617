//! Weighted Checksum
//!
//! `base + Σ bytes[i] * i`, all arithmetic wrapping mod 2^32. Index 0 carries
//! weight zero, so the first byte never influences the result.

/// Base used for candidate secrets
pub const PASSWORD_CHECKSUM_BASE: u32 = 0x7FFF_FFFF;

/// Base used for decoded payloads
pub const PAYLOAD_CHECKSUM_BASE: u32 = 0;

pub struct WeightedChecksum;

impl WeightedChecksum {
    /// Index-weighted sum of `bytes` on top of `base`
    pub fn compute(bytes: &[u8], base: u32) -> u32 {
        bytes.iter().enumerate().fold(base, |acc, (i, &b)| {
            acc.wrapping_add((b as u32).wrapping_mul(i as u32))
        })
    }

    /// Checksum of a candidate secret
    pub fn secret(secret: &[u8]) -> u32 {
        Self::compute(secret, PASSWORD_CHECKSUM_BASE)
    }

    /// Checksum of a decoded payload
    pub fn payload(decoded: &[u8]) -> u32 {
        Self::compute(decoded, PAYLOAD_CHECKSUM_BASE)
    }

    /// A sibling of `secret` with byte 0 replaced. Always has the same checksum.
    pub fn collide_first(secret: &[u8], first: u8) -> Vec<u8> {
        let mut forged = secret.to_vec();
        if let Some(b) = forged.first_mut() {
            *b = first;
        }
        forged
    }
}
