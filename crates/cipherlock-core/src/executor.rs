//! Executor seam
//!
//! Whatever consumes an unlocked payload implements `Executor`. It only ever
//! sees a `VerifiedPayload`, never raw decoded bytes.
//!
//! `LoginRoutine` is the reference consumer. The reference payload is a small
//! login function whose key and expected result live in its immediate
//! operands; `LoginRoutine` reads those operand tables out of the verified
//! bytes and applies the login check in Rust. Nothing is executed.
//!
//! ```text
//! offset  14..22  29..33  37..39     key       (14 bytes, movabs/mov/mov)
//! offset  41..49  56..60  64..66     expected  (14 bytes, movabs/mov/mov)
//! offset  91                         required secret length (cmp imm8)
//! ```

use zeroize::Zeroize;

use crate::gate::VerifiedPayload;
use crate::{Error, Result};

pub trait Executor {
    /// Run the unlocked payload against `secret`. `Ok(true)` means accepted.
    fn invoke(&self, payload: &VerifiedPayload, secret: &[u8]) -> Result<bool>;
}

/// Where the login routine keeps its operands
#[derive(Debug, Clone)]
pub struct LoginRoutine {
    key_spans: Vec<(usize, usize)>,
    expected_spans: Vec<(usize, usize)>,
    length_offset: usize,
}

/// Operand tables lifted from a verified payload
struct LoginTables {
    key: Vec<u8>,
    expected: Vec<u8>,
    length: usize,
}

impl Drop for LoginTables {
    fn drop(&mut self) {
        self.key.zeroize();
        self.expected.zeroize();
    }
}

impl LoginRoutine {
    /// Operand layout of the reference payload
    pub fn reference() -> Self {
        Self {
            key_spans: vec![(14, 22), (29, 33), (37, 39)],
            expected_spans: vec![(41, 49), (56, 60), (64, 66)],
            length_offset: 91,
        }
    }

    /// Smallest payload that contains every operand
    fn required_len(&self) -> usize {
        self.key_spans
            .iter()
            .chain(self.expected_spans.iter())
            .map(|&(_, end)| end)
            .chain(std::iter::once(self.length_offset + 1))
            .max()
            .unwrap_or(0)
    }

    fn gather(bytes: &[u8], spans: &[(usize, usize)]) -> Vec<u8> {
        spans
            .iter()
            .flat_map(|&(start, end)| bytes[start..end].iter().copied())
            .collect()
    }

    fn tables(&self, payload: &VerifiedPayload) -> Result<LoginTables> {
        let bytes = payload.as_bytes();
        let needed = self.required_len();
        if bytes.len() < needed {
            return Err(Error::LengthMismatch {
                expected: needed,
                got: bytes.len(),
            });
        }

        let tables = LoginTables {
            key: Self::gather(bytes, &self.key_spans),
            expected: Self::gather(bytes, &self.expected_spans),
            length: bytes[self.length_offset] as usize,
        };

        if tables.key.len() != tables.expected.len() {
            return Err(Error::LengthMismatch {
                expected: tables.expected.len(),
                got: tables.key.len(),
            });
        }
        Ok(tables)
    }
}

impl Executor for LoginRoutine {
    fn invoke(&self, payload: &VerifiedPayload, secret: &[u8]) -> Result<bool> {
        let tables = self.tables(payload)?;

        if secret.len() != tables.length || secret.len() != tables.key.len() {
            tracing::debug!(
                got = secret.len(),
                expected = tables.length,
                "login rejected secret length"
            );
            return Ok(false);
        }

        // Compare every byte; no early exit on the first difference
        let diff = secret
            .iter()
            .zip(tables.key.iter())
            .zip(tables.expected.iter())
            .fold(0u8, |acc, ((s, k), e)| acc | ((s ^ k) ^ e));

        Ok(diff == 0)
    }
}
