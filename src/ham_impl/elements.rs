//! Hamiltonian matrix elements between packed determinants
//!
//! Pair determinants use the closed-form pair rules. Spin-orbital
//! determinants use the Slater-Condon rules over the flat bit numbering of
//! the determinant: for FCI the alpha block occupies bits `0..block` and the
//! beta block bits `block..2 * block`, so the fermionic phase of a
//! replacement is the parity of occupied bits strictly between hole and
//! particle in that numbering.

use super::integrals::Hamiltonian;
use crate::bitdet::{self, Word};
use crate::error::Result;
use crate::wfn_impl::{Space, WfnKind};

/// Evaluator of electronic matrix elements `<bra|H|ket>` (core energy excluded)
#[derive(Debug, Clone, Copy)]
pub struct Elements<'a> {
    space: Space,
    ham: &'a Hamiltonian,
}

impl<'a> Elements<'a> {
    pub fn new(space: &Space, ham: &'a Hamiltonian) -> Result<Self> {
        ham.check_space(space)?;
        Ok(Elements { space: *space, ham })
    }

    #[inline]
    pub fn space(&self) -> &Space {
        &self.space
    }

    #[inline]
    pub fn hamiltonian(&self) -> &'a Hamiltonian {
        self.ham
    }

    /// `<bra|H|ket>` for any two determinants of the space
    pub fn element(&self, bra: &[Word], ket: &[Word]) -> f64 {
        let (holes, parts) = bitdet::differences(ket, bra);
        match (self.space.kind, holes.len()) {
            (_, 0) => self.diagonal(ket),
            (WfnKind::Doci, 1) => self.pair_transfer(holes[0], parts[0]),
            (WfnKind::Doci, _) => 0.0,
            (_, 1) => self.single(ket, holes[0], parts[0]),
            (_, 2) => self.double(ket, holes[0], holes[1], parts[0], parts[1]),
            _ => 0.0,
        }
    }

    /// `<det|H|det>`
    pub fn diagonal(&self, det: &[Word]) -> f64 {
        let occ = bitdet::occs(det);
        match self.space.kind {
            WfnKind::Doci => {
                let pair = self.ham.pair();
                let mut energy = 0.0;
                for (k, &i) in occ.iter().enumerate() {
                    energy += pair.h[i] + pair.v[(i, i)];
                    for &j in &occ[k + 1..] {
                        energy += 2.0 * pair.w[(i, j)];
                    }
                }
                energy
            }
            WfnKind::Fci | WfnKind::Genci => {
                let mut energy = 0.0;
                for (k, &i) in occ.iter().enumerate() {
                    energy += self.so_one(i, i);
                    for &j in &occ[k + 1..] {
                        energy += self.so_two(i, i, j, j) - self.so_two(i, j, j, i);
                    }
                }
                energy
            }
        }
    }

    /// Pair transfer element between determinants differing by the pair `i -> a`
    #[inline]
    pub fn pair_transfer(&self, i: usize, a: usize) -> f64 {
        self.ham.pair().v[(i, a)]
    }

    /// `<ket_i^a|H|ket>` for the replacement `i -> a` (flat bit positions)
    pub fn single(&self, ket: &[Word], i: usize, a: usize) -> f64 {
        let mut value = self.so_one(a, i);
        let occ = bitdet::occs(ket);
        for &j in occ.iter().filter(|&&j| j != i) {
            value += self.so_two(a, i, j, j) - self.so_two(a, j, j, i);
        }
        bitdet::phase_single(ket, i, a) * value
    }

    /// `<ket_ij^ab|H|ket>` for the replacements `i -> a`, `j -> b` applied in turn
    pub fn double(&self, ket: &[Word], i: usize, j: usize, a: usize, b: usize) -> f64 {
        let mut work = ket.to_vec();
        let mut phase = bitdet::phase_single(&work, i, a);
        bitdet::excite(&mut work, i, a);
        phase *= bitdet::phase_single(&work, j, b);
        phase * (self.so_two(a, i, b, j) - self.so_two(a, j, b, i))
    }

    /// Spatial orbital and spin block of a flat bit position
    #[inline(always)]
    fn orbital(&self, flat: usize) -> (usize, usize) {
        match self.space.kind {
            WfnKind::Fci => {
                let block = self.space.block_bits();
                (flat % block, flat / block)
            }
            _ => (flat, 0),
        }
    }

    /// Spin-orbital one-body integral over flat bit positions
    #[inline]
    pub(crate) fn so_one(&self, p: usize, q: usize) -> f64 {
        let (p, sp) = self.orbital(p);
        let (q, sq) = self.orbital(q);
        if sp != sq {
            0.0
        } else {
            self.ham.one(p, q)
        }
    }

    /// Spin-orbital integral (pq|rs) over flat bit positions
    #[inline]
    pub(crate) fn so_two(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        let (p, sp) = self.orbital(p);
        let (q, sq) = self.orbital(q);
        let (r, sr) = self.orbital(r);
        let (s, ss) = self.orbital(s);
        if sp != sq || sr != ss {
            0.0
        } else {
            self.ham.two(p, q, r, s)
        }
    }
}
