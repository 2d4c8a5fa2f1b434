//! Determinant store: an append-only arena of packed determinants with a hash index

use super::space::Space;
use crate::bitdet::Word;
use crate::error::{CiError, Result};
use crate::excite_impl::{all_dets, excitations, seniority_dets};
use std::collections::HashMap;
use tracing::debug;

/// Upper bound on the capacity hint taken by bulk insertions
const MAX_RESERVE: usize = 1 << 24;

/// Ordered, duplicate-free set of determinants
///
/// Determinant `i` occupies words `i * stride .. (i + 1) * stride` of the
/// arena; insertion order defines the row and column indices of every
/// operator built over the store. Positions never move once assigned.
#[derive(Debug, Clone)]
pub struct Wavefunction {
    space: Space,
    dets: Vec<Word>,
    dict: HashMap<Vec<Word>, usize>,
}

impl Wavefunction {
    /// Create an empty store over `space`
    pub fn new(space: Space) -> Self {
        Wavefunction {
            space,
            dets: Vec::new(),
            dict: HashMap::new(),
        }
    }

    pub fn doci(nbasis: usize, nocc: usize) -> Result<Self> {
        Ok(Self::new(Space::doci(nbasis, nocc)?))
    }

    pub fn fci(nbasis: usize, nocc_up: usize, nocc_dn: usize) -> Result<Self> {
        Ok(Self::new(Space::fci(nbasis, nocc_up, nocc_dn)?))
    }

    pub fn genci(nbasis: usize, nocc: usize) -> Result<Self> {
        Ok(Self::new(Space::genci(nbasis, nocc)?))
    }

    /// Build a store from `ndet` packed determinants of `nword` words per string
    ///
    /// Fails without returning a partial store when the declared width or
    /// count does not match `space` or any record is not a valid determinant.
    pub fn from_det_array(space: Space, ndet: usize, nword: usize, words: &[Word]) -> Result<Self> {
        if nword != space.nword {
            return Err(CiError::FormatMismatch(format!(
                "records have {} words per string, nbasis = {} needs {}",
                nword, space.nbasis, space.nword
            )));
        }
        let stride = space.stride();
        let total = ndet.checked_mul(stride).ok_or_else(|| {
            CiError::FormatMismatch(format!("determinant count {} is too large", ndet))
        })?;
        if words.len() != total {
            return Err(CiError::FormatMismatch(format!(
                "expected {} words for {} determinants, got {}",
                total,
                ndet,
                words.len()
            )));
        }
        let mut wfn = Self::new(space);
        wfn.reserve(ndet.min(MAX_RESERVE));
        for (i, det) in words.chunks_exact(stride).enumerate() {
            if wfn.add(det)?.is_none() {
                return Err(CiError::FormatMismatch(format!(
                    "record {} repeats an earlier determinant",
                    i
                )));
            }
        }
        Ok(wfn)
    }

    /// Build a store from `ndet` occupation records of `space.nocc()` indices each
    pub fn from_occs_array(space: Space, ndet: usize, occs: &[usize]) -> Result<Self> {
        let nocc = space.nocc();
        let total = ndet.checked_mul(nocc).ok_or_else(|| {
            CiError::FormatMismatch(format!("determinant count {} is too large", ndet))
        })?;
        if occs.len() != total {
            return Err(CiError::FormatMismatch(format!(
                "expected {} occupation indices for {} determinants, got {}",
                total,
                ndet,
                occs.len()
            )));
        }
        let mut wfn = Self::new(space);
        wfn.reserve(ndet.min(MAX_RESERVE));
        for i in 0..ndet {
            if wfn.add_from_occs(&occs[i * nocc..(i + 1) * nocc])?.is_none() {
                return Err(CiError::FormatMismatch(format!(
                    "record {} repeats an earlier determinant",
                    i
                )));
            }
        }
        Ok(wfn)
    }

    #[inline]
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Number of determinants
    #[inline]
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// Packed words of every determinant in insertion order
    #[inline]
    pub fn to_det_array(&self) -> &[Word] {
        &self.dets
    }

    /// Occupation records of every determinant in insertion order
    pub fn to_occs_array(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len() * self.space.nocc());
        for det in self.iter() {
            out.extend(self.space.occs_of(det));
        }
        out
    }

    /// Determinants in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &[Word]> + '_ {
        self.dets.chunks_exact(self.space.stride())
    }

    /// Determinant at position `index`
    pub fn det(&self, index: usize) -> Result<&[Word]> {
        if index >= self.len() {
            return Err(CiError::OutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.det_unchecked(index))
    }

    #[inline]
    pub(crate) fn det_unchecked(&self, index: usize) -> &[Word] {
        let stride = self.space.stride();
        &self.dets[index * stride..(index + 1) * stride]
    }

    /// Copy determinant `index` into `out`
    pub fn copy_det(&self, index: usize, out: &mut [Word]) -> Result<()> {
        let det = self.det(index)?;
        if out.len() != det.len() {
            return Err(CiError::FormatMismatch(format!(
                "output buffer has {} words, expected {}",
                out.len(),
                det.len()
            )));
        }
        out.copy_from_slice(det);
        Ok(())
    }

    /// Position of `det`, if present
    #[inline]
    pub fn index_of(&self, det: &[Word]) -> Option<usize> {
        self.dict.get(det).copied()
    }

    /// Insert `det` if absent
    ///
    /// Returns `Some(position)` for a new insertion and `None` when the
    /// determinant was already present (nothing changes in that case).
    pub fn add(&mut self, det: &[Word]) -> Result<Option<usize>> {
        self.space.validate(det)?;
        Ok(self.insert_unchecked(det))
    }

    /// Insert `det`, reporting an already present determinant as [`CiError::Duplicate`]
    pub fn add_strict(&mut self, det: &[Word]) -> Result<usize> {
        self.space.validate(det)?;
        if let Some(index) = self.index_of(det) {
            return Err(CiError::Duplicate(index));
        }
        Ok(self.push(det))
    }

    /// Insert the determinant described by an occupation record
    pub fn add_from_occs(&mut self, occs: &[usize]) -> Result<Option<usize>> {
        let det = self.space.det_from_occs(occs)?;
        Ok(self.insert_unchecked(&det))
    }

    /// Insert the determinant with the lowest orbitals filled
    pub fn add_hartreefock(&mut self) -> Option<usize> {
        let det = self.space.hartreefock();
        self.insert_unchecked(&det)
    }

    /// Insert every determinant of the space; returns the number added
    pub fn add_all(&mut self) -> usize {
        let missing = self.space.ndet_full().saturating_sub(self.len());
        self.reserve(missing.min(MAX_RESERVE));
        let added = self.merge_unchecked(all_dets(&self.space));
        debug!("add_all: {} determinants added, {} total", added, self.len());
        added
    }

    /// Insert every determinant exactly `level` replacements from `reference`
    pub fn add_excited(&mut self, reference: &[Word], level: usize) -> Result<usize> {
        self.space.validate(reference)?;
        Ok(self.merge_unchecked(excitations(&self.space, reference, level)))
    }

    /// Insert every determinant at most `max_level` replacements from `reference`
    pub fn add_excited_up_to(&mut self, reference: &[Word], max_level: usize) -> Result<usize> {
        self.space.validate(reference)?;
        let mut added = 0;
        for level in 0..=max_level {
            added += self.merge_unchecked(excitations(&self.space, reference, level));
        }
        Ok(added)
    }

    /// Insert every determinant with the given seniority
    pub fn add_seniority(&mut self, seniority: usize) -> Result<usize> {
        match self.space.kind {
            super::WfnKind::Genci => Err(CiError::InvalidParameter(
                "seniority is undefined for generalized wavefunctions".to_string(),
            )),
            super::WfnKind::Doci if seniority != 0 => Ok(0),
            super::WfnKind::Doci => Ok(self.add_all()),
            super::WfnKind::Fci => Ok(self.merge_unchecked(seniority_dets(&self.space, seniority))),
        }
    }

    /// Single-writer merge of externally produced candidates; returns the number added
    ///
    /// Every candidate is validated first; if any is not a determinant of the
    /// space the whole batch is rejected with [`CiError::FormatMismatch`] and
    /// the store is left unchanged.
    pub fn merge<I, D>(&mut self, candidates: I) -> Result<usize>
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[Word]>,
    {
        let candidates: Vec<D> = candidates.into_iter().collect();
        for (i, det) in candidates.iter().enumerate() {
            self.space.validate(det.as_ref()).map_err(|err| {
                CiError::FormatMismatch(format!("candidate {}: {}", i, err))
            })?;
        }
        Ok(self.merge_unchecked(candidates))
    }

    /// Merge candidates generated from this space's own determinants
    pub(crate) fn merge_unchecked<I, D>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[Word]>,
    {
        candidates
            .into_iter()
            .filter(|det| self.insert_unchecked(det.as_ref()).is_some())
            .count()
    }

    /// Capacity hint for `additional` more determinants
    pub fn reserve(&mut self, additional: usize) {
        self.dets.reserve(additional * self.space.stride());
        self.dict.reserve(additional);
    }

    /// Release spare capacity
    pub fn squeeze(&mut self) {
        self.dets.shrink_to_fit();
        self.dict.shrink_to_fit();
    }

    /// Remove every determinant; the only operation that invalidates positions
    pub fn clear(&mut self) {
        self.dets.clear();
        self.dict.clear();
    }

    fn insert_unchecked(&mut self, det: &[Word]) -> Option<usize> {
        if self.dict.contains_key(det) {
            return None;
        }
        Some(self.push(det))
    }

    fn push(&mut self, det: &[Word]) -> usize {
        let index = self.dict.len();
        self.dets.extend_from_slice(det);
        self.dict.insert(det.to_vec(), index);
        index
    }
}
