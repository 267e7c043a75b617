//! Rolling XOR decoder
//!
//! The 32-bit key is applied as its four little-endian bytes, cycled across
//! the buffer: `out[i] = in[i] ^ (key >> ((i % 4) * 8))`. XOR is its own
//! inverse, so the same call encodes and decodes.

use zeroize::Zeroize;

use crate::{Error, Result};

pub struct PayloadDecoder;

impl PayloadDecoder {
    /// Key byte applied at position `i`
    #[inline]
    pub fn key_byte(key: u32, i: usize) -> u8 {
        (key >> ((i % 4) * 8)) as u8
    }

    pub fn decode(encoded: &[u8], key: u32) -> Vec<u8> {
        encoded
            .iter()
            .zip(key.to_le_bytes().iter().cycle())
            .map(|(a, b)| a ^ b)
            .collect()
    }

    /// XOR symmetric
    pub fn encode(plain: &[u8], key: u32) -> Vec<u8> {
        Self::decode(plain, key)
    }

    pub fn decode_in_place(buf: &mut [u8], key: u32) {
        for (byte, k) in buf.iter_mut().zip(key.to_le_bytes().iter().cycle()) {
            *byte ^= k;
        }
    }

    /// Decode into a caller-owned buffer of exactly the same length
    pub fn decode_into(encoded: &[u8], key: u32, out: &mut [u8]) -> Result<()> {
        if out.len() != encoded.len() {
            return Err(Error::LengthMismatch {
                expected: encoded.len(),
                got: out.len(),
            });
        }
        out.copy_from_slice(encoded);
        Self::decode_in_place(out, key);
        Ok(())
    }
}

/// Scratch buffer that wipes itself, for plaintext that has not passed the gate
pub(crate) struct DecodeBuffer {
    bytes: Vec<u8>,
}

impl DecodeBuffer {
    pub(crate) fn decode(encoded: &[u8], key: u32) -> Self {
        Self {
            bytes: PayloadDecoder::decode(encoded, key),
        }
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn into_inner(mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

impl Drop for DecodeBuffer {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::ENCODED_PAYLOAD;

    #[test]
    fn test_key_bytes_little_endian() {
        let key = 0x8000_203d;
        let bytes: Vec<u8> = (0..8).map(|i| PayloadDecoder::key_byte(key, i)).collect();
        assert_eq!(bytes, vec![0x3d, 0x20, 0x00, 0x80, 0x3d, 0x20, 0x00, 0x80]);
    }

    #[test]
    fn test_decode_reference_prologue() {
        let decoded = PayloadDecoder::decode(&ENCODED_PAYLOAD, 0x8000_203d);
        assert_eq!(decoded.len(), ENCODED_PAYLOAD.len());
        // push rbp; mov rbp, rsp
        assert_eq!(&decoded[..4], &[0x55, 0x48, 0x89, 0xe5]);
        // ... pop rbp; ret
        assert_eq!(&decoded[decoded.len() - 2..], &[0x5d, 0xc3]);
    }

    #[test]
    fn test_involution() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        for len in [0usize, 1, 3, 4, 5, 197, 1000] {
            let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let key: u32 = rng.gen();
            let once = PayloadDecoder::decode(&data, key);
            assert_eq!(PayloadDecoder::decode(&once, key), data);
        }
    }

    #[test]
    fn test_in_place_matches_allocating() {
        let mut buf = ENCODED_PAYLOAD.to_vec();
        PayloadDecoder::decode_in_place(&mut buf, 0xdead_beef);
        assert_eq!(buf, PayloadDecoder::decode(&ENCODED_PAYLOAD, 0xdead_beef));
    }

    #[test]
    fn test_decode_into_checks_length() {
        let mut out = [0u8; 3];
        let err = PayloadDecoder::decode_into(&[1, 2, 3, 4], 0, &mut out).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 4, got: 3 }));

        let mut out = [0u8; 4];
        PayloadDecoder::decode_into(&[1, 2, 3, 4], 0x0101_0101, &mut out).unwrap();
        assert_eq!(out, [0, 3, 2, 5]);
    }

    #[test]
    fn test_zero_key_is_identity() {
        assert_eq!(PayloadDecoder::decode(b"abc", 0), b"abc".to_vec());
    }
}
