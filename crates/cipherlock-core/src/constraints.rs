//! Residue constraints
//!
//! The key checksum is never stored. Instead a handful of `checksum % modulus`
//! values are, and a candidate is accepted when it reproduces all of them.
//! The moduli need not be coprime, so the set is a filter rather than a
//! unique reconstruction.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// `checksum % modulus == residue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Residue {
    modulus: u16,
    residue: u16,
}

impl Residue {
    pub fn new(modulus: u16, residue: u16) -> Result<Self> {
        if modulus == 0 || residue >= modulus {
            return Err(Error::InvalidConstraint { modulus, residue });
        }
        Ok(Self { modulus, residue })
    }

    pub fn modulus(&self) -> u16 {
        self.modulus
    }

    pub fn residue(&self) -> u16 {
        self.residue
    }

    /// A zero modulus holds for nothing
    #[inline]
    pub fn holds(&self, checksum: u32) -> bool {
        checksum
            .checked_rem(self.modulus as u32)
            .map_or(false, |r| r == self.residue as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Residue>", into = "Vec<Residue>")]
pub struct ConstraintSet {
    pairs: Vec<Residue>,
}

impl ConstraintSet {
    pub fn new(pairs: Vec<Residue>) -> Result<Self> {
        for pair in &pairs {
            Residue::new(pair.modulus, pair.residue)?;
        }
        Ok(Self { pairs })
    }

    /// The six pairs baked into the reference unlock program
    pub fn reference() -> Self {
        const MODULI: [u16; 6] = [0x7b, 0x1c8, 0x315, 0x3db, 0x28e, 0x141];
        const RESIDUES: [u16; 6] = [0x5c, 0x1d, 0x17c, 0x2, 0x1f1, 0x128];

        Self {
            pairs: MODULI
                .iter()
                .zip(RESIDUES.iter())
                .map(|(&modulus, &residue)| Residue { modulus, residue })
                .collect(),
        }
    }

    /// Residues of a known checksum under the given moduli. This is how a
    /// constraint table is produced from the real key.
    pub fn derive(checksum: u32, moduli: &[u16]) -> Result<Self> {
        let pairs = moduli
            .iter()
            .map(|&m| {
                if m == 0 {
                    return Err(Error::InvalidConstraint { modulus: 0, residue: 0 });
                }
                Ok(Residue {
                    modulus: m,
                    residue: (checksum % m as u32) as u16,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[Residue] {
        &self.pairs
    }

    pub fn moduli(&self) -> impl Iterator<Item = u16> + '_ {
        self.pairs.iter().map(|p| p.modulus)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True iff every pair holds. Stops at the first failing pair.
    pub fn accepts(&self, checksum: u32) -> bool {
        self.pairs.iter().all(|p| p.holds(checksum))
    }
}

impl TryFrom<Vec<Residue>> for ConstraintSet {
    type Error = Error;

    fn try_from(pairs: Vec<Residue>) -> Result<Self> {
        ConstraintSet::new(pairs)
    }
}

impl From<ConstraintSet> for Vec<Residue> {
    fn from(set: ConstraintSet) -> Self {
        set.pairs
    }
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self::reference()
    }
}

/// Early-reject gate in front of the decoder
pub struct ChecksumConstraintValidator;

impl ChecksumConstraintValidator {
    pub fn accepts(checksum: u32, constraints: &ConstraintSet) -> bool {
        constraints.accepts(checksum)
    }

    /// `Ok(())` or `ChecksumConstraintFailure`
    pub fn check(checksum: u32, constraints: &ConstraintSet) -> Result<()> {
        if constraints.accepts(checksum) {
            Ok(())
        } else {
            Err(Error::ChecksumConstraintFailure)
        }
    }
}
