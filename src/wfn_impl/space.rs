//! Shape of a determinant space: symmetry variant, orbital count and occupations

use crate::bitdet::{self, Word, WORD_BITS};
use crate::error::{CiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wavefunction symmetry variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WfnKind {
    /// Pair-occupied (seniority zero): one string, each bit a doubly occupied spatial orbital
    Doci,
    /// Orthogonal spin-orbitals: an alpha string followed by a beta string
    Fci,
    /// Fully generalized: one string over spin-orbitals
    Genci,
}

impl WfnKind {
    /// Integer code used in persisted wavefunction files
    pub fn code(self) -> i64 {
        match self {
            WfnKind::Doci => 0,
            WfnKind::Fci => 1,
            WfnKind::Genci => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(WfnKind::Doci),
            1 => Some(WfnKind::Fci),
            2 => Some(WfnKind::Genci),
            _ => None,
        }
    }
}

impl FromStr for WfnKind {
    type Err = CiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "doci" | "pair" => Ok(WfnKind::Doci),
            "fci" | "fullci" => Ok(WfnKind::Fci),
            "genci" | "general" => Ok(WfnKind::Genci),
            _ => Err(CiError::InvalidParameter(format!(
                "unknown wavefunction kind: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for WfnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WfnKind::Doci => "DOCI",
            WfnKind::Fci => "FCI",
            WfnKind::Genci => "GenCI",
        };
        write!(f, "{}", name)
    }
}

/// Shape of every determinant in a store
///
/// For [`WfnKind::Doci`] `nocc_up == nocc_dn` is the number of occupied
/// pairs; for [`WfnKind::Genci`] `nocc_up` is the number of occupied
/// spin-orbitals and `nocc_dn` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space {
    pub kind: WfnKind,
    pub nbasis: usize,
    pub nocc_up: usize,
    pub nocc_dn: usize,
    pub nword: usize,
}

impl Space {
    pub fn new(kind: WfnKind, nbasis: usize, nocc_up: usize, nocc_dn: usize) -> Result<Self> {
        if nbasis == 0 {
            return Err(CiError::InvalidParameter(
                "number of basis functions must be positive".to_string(),
            ));
        }
        if nocc_up > nbasis || nocc_dn > nbasis {
            return Err(CiError::InvalidParameter(format!(
                "occupations ({}, {}) exceed {} orbitals",
                nocc_up, nocc_dn, nbasis
            )));
        }
        match kind {
            WfnKind::Doci if nocc_up != nocc_dn => {
                return Err(CiError::InvalidParameter(
                    "pair wavefunctions need equal alpha and beta occupations".to_string(),
                ))
            }
            WfnKind::Genci if nocc_dn != 0 => {
                return Err(CiError::InvalidParameter(
                    "generalized wavefunctions take a single occupation count".to_string(),
                ))
            }
            _ => {}
        }
        Ok(Space {
            kind,
            nbasis,
            nocc_up,
            nocc_dn,
            nword: bitdet::nword_for(nbasis),
        })
    }

    pub fn doci(nbasis: usize, nocc: usize) -> Result<Self> {
        Self::new(WfnKind::Doci, nbasis, nocc, nocc)
    }

    pub fn fci(nbasis: usize, nocc_up: usize, nocc_dn: usize) -> Result<Self> {
        Self::new(WfnKind::Fci, nbasis, nocc_up, nocc_dn)
    }

    pub fn genci(nbasis: usize, nocc: usize) -> Result<Self> {
        Self::new(WfnKind::Genci, nbasis, nocc, 0)
    }

    /// Number of strings per determinant
    #[inline]
    pub fn nstr(&self) -> usize {
        match self.kind {
            WfnKind::Fci => 2,
            _ => 1,
        }
    }

    /// Number of words per determinant
    #[inline]
    pub fn stride(&self) -> usize {
        self.nword * self.nstr()
    }

    /// Required popcount of string `s`
    #[inline]
    pub fn string_occ(&self, s: usize) -> usize {
        if s == 0 {
            self.nocc_up
        } else {
            self.nocc_dn
        }
    }

    /// Set bits per determinant
    pub fn nocc(&self) -> usize {
        match self.kind {
            WfnKind::Fci => self.nocc_up + self.nocc_dn,
            _ => self.nocc_up,
        }
    }

    /// Number of electrons described by a determinant
    pub fn nelec(&self) -> usize {
        match self.kind {
            WfnKind::Doci => 2 * self.nocc_up,
            WfnKind::Fci => self.nocc_up + self.nocc_dn,
            WfnKind::Genci => self.nocc_up,
        }
    }

    /// Width of one spin block in the flat bit numbering of a determinant
    #[inline]
    pub fn block_bits(&self) -> usize {
        self.nword * WORD_BITS
    }

    /// Number of spin-orbitals spanned by the space
    pub fn n_spin_orbitals(&self) -> usize {
        match self.kind {
            WfnKind::Genci => self.nbasis,
            _ => 2 * self.nbasis,
        }
    }

    /// Map a flat bit position of a determinant onto a spin-orbital index
    /// (`spin * nbasis + p` for [`WfnKind::Fci`]).
    #[inline]
    pub fn spin_orbital(&self, flat: usize) -> usize {
        match self.kind {
            WfnKind::Fci => {
                let block = self.block_bits();
                (flat / block) * self.nbasis + flat % block
            }
            _ => flat,
        }
    }

    /// Check that `det` is a canonical determinant of this space
    pub fn validate(&self, det: &[Word]) -> Result<()> {
        if det.len() != self.stride() {
            return Err(CiError::FormatMismatch(format!(
                "determinant has {} words, expected {}",
                det.len(),
                self.stride()
            )));
        }
        for (s, string) in det.chunks_exact(self.nword).enumerate() {
            if !bitdet::is_masked(string, self.nbasis) {
                return Err(CiError::FormatMismatch(format!(
                    "determinant occupies orbitals beyond nbasis = {}",
                    self.nbasis
                )));
            }
            let count = bitdet::popcount(string);
            if count != self.string_occ(s) {
                return Err(CiError::FormatMismatch(format!(
                    "string {} has {} occupied orbitals, expected {}",
                    s,
                    count,
                    self.string_occ(s)
                )));
            }
        }
        Ok(())
    }

    /// Determinant with the lowest orbitals filled
    pub fn hartreefock(&self) -> Vec<Word> {
        let mut det = vec![0; self.stride()];
        for s in 0..self.nstr() {
            let string = &mut det[s * self.nword..(s + 1) * self.nword];
            for p in 0..self.string_occ(s) {
                bitdet::set_bit(string, p);
            }
        }
        det
    }

    /// Pack an occupation record (alpha indices then beta indices for [`WfnKind::Fci`])
    pub fn det_from_occs(&self, occs: &[usize]) -> Result<Vec<Word>> {
        if occs.len() != self.nocc() {
            return Err(CiError::FormatMismatch(format!(
                "occupation record has {} entries, expected {}",
                occs.len(),
                self.nocc()
            )));
        }
        let mut det = vec![0; self.stride()];
        let (up, dn) = occs.split_at(self.nocc_up);
        for (s, record) in [up, dn].iter().enumerate().take(self.nstr()) {
            let string = &mut det[s * self.nword..(s + 1) * self.nword];
            for &p in record.iter() {
                if p >= self.nbasis {
                    return Err(CiError::FormatMismatch(format!(
                        "orbital index {} out of range for nbasis = {}",
                        p, self.nbasis
                    )));
                }
                if bitdet::test_bit(string, p) {
                    return Err(CiError::FormatMismatch(format!(
                        "orbital index {} repeated in occupation record",
                        p
                    )));
                }
                bitdet::set_bit(string, p);
            }
        }
        Ok(det)
    }

    /// Occupation record of `det` (inverse of [`Space::det_from_occs`])
    pub fn occs_of(&self, det: &[Word]) -> Vec<usize> {
        det.chunks_exact(self.nword)
            .flat_map(bitdet::occs)
            .collect()
    }

    /// Number of singly occupied spatial orbitals
    pub fn seniority(&self, det: &[Word]) -> Result<usize> {
        match self.kind {
            WfnKind::Doci => Ok(0),
            WfnKind::Fci => {
                let (alpha, beta) = det.split_at(self.nword);
                Ok(alpha
                    .iter()
                    .zip(beta.iter())
                    .map(|(a, b)| (a ^ b).count_ones() as usize)
                    .sum())
            }
            WfnKind::Genci => Err(CiError::InvalidParameter(
                "seniority is undefined for generalized wavefunctions".to_string(),
            )),
        }
    }

    /// Total number of determinants in the space
    pub fn ndet_full(&self) -> usize {
        match self.kind {
            WfnKind::Fci => binomial(self.nbasis, self.nocc_up)
                .saturating_mul(binomial(self.nbasis, self.nocc_dn)),
            _ => binomial(self.nbasis, self.nocc_up),
        }
    }
}

/// Binomial coefficient C(n, k), saturating on overflow
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    acc as usize
}
