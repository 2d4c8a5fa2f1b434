//! Molecular-orbital integrals and the reduced pair tensors derived from them

extern crate nalgebra as na;

use crate::error::{CiError, Result};
use crate::wfn_impl::{Space, WfnKind};
use na::{DMatrix, DVector};

/// Symmetry tolerance applied to the one-body integrals
const HERMITIAN_TOL: f64 = 1e-8;

/// Second-quantized Hamiltonian in an orthonormal orbital basis
///
/// `one_mo[(p, q)]` holds `h_pq` and `two_mo` holds the chemists'-notation
/// integrals `(pq|rs)` in row-major order. For [`WfnKind::Genci`] spaces
/// both tensors are indexed by spin-orbitals, otherwise by spatial orbitals.
#[derive(Debug, Clone)]
pub struct Hamiltonian {
    /// Number of orbitals indexing the tensors
    pub nbasis: usize,

    /// Scalar core (nuclear repulsion + frozen core) energy
    pub ecore: f64,

    /// One-body integrals h_pq
    pub one_mo: DMatrix<f64>,

    two_mo: Vec<f64>,
    max_abs_one: f64,
    max_abs_two: f64,
    two_checksum: f64,
    pair: PairIntegrals,
}

/// Reduced integrals of the pair-occupied Hamiltonian
///
/// - `h[i] = 2 h_ii`
/// - `v[(i, a)] = (ia|ia)`, the pair transfer element (`v[(i, i)] = (ii|ii)`)
/// - `w[(i, j)] = 2 (ii|jj) - (ij|ji)` for `i != j`, zero on the diagonal
#[derive(Debug, Clone)]
pub struct PairIntegrals {
    pub h: DVector<f64>,
    pub v: DMatrix<f64>,
    pub w: DMatrix<f64>,
}

impl Hamiltonian {
    /// Create a Hamiltonian from integral tensors
    ///
    /// # Arguments
    ///
    /// * `ecore` - Core energy added to every diagonal element
    /// * `one_mo` - Square, symmetric one-body integrals
    /// * `two_mo` - `n^4` two-body integrals `(pq|rs)`, row-major
    pub fn new(ecore: f64, one_mo: DMatrix<f64>, two_mo: Vec<f64>) -> Result<Self> {
        let n = one_mo.nrows();
        if n == 0 || one_mo.ncols() != n {
            return Err(CiError::FormatMismatch(format!(
                "one-body integrals must be a non-empty square matrix, got {} x {}",
                one_mo.nrows(),
                one_mo.ncols()
            )));
        }
        if two_mo.len() != n * n * n * n {
            return Err(CiError::FormatMismatch(format!(
                "two-body integrals need {} entries for {} orbitals, got {}",
                n * n * n * n,
                n,
                two_mo.len()
            )));
        }
        for p in 0..n {
            for q in 0..p {
                if (one_mo[(p, q)] - one_mo[(q, p)]).abs() > HERMITIAN_TOL {
                    return Err(CiError::FormatMismatch(format!(
                        "one-body integrals are not symmetric at ({}, {})",
                        p, q
                    )));
                }
            }
        }

        let max_abs_one = one_mo.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        let max_abs_two = two_mo.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        let pair = PairIntegrals::from_tensors(&one_mo, &two_mo, n);
        let two_checksum = weighted_sum(&two_mo);

        Ok(Hamiltonian {
            nbasis: n,
            ecore,
            one_mo,
            two_mo,
            max_abs_one,
            max_abs_two,
            two_checksum,
            pair,
        })
    }

    #[inline(always)]
    pub fn one(&self, p: usize, q: usize) -> f64 {
        self.one_mo[(p, q)]
    }

    /// Chemists'-notation integral (pq|rs)
    #[inline(always)]
    pub fn two(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        let n = self.nbasis;
        self.two_mo[((p * n + q) * n + r) * n + s]
    }

    pub fn two_mo(&self) -> &[f64] {
        &self.two_mo
    }

    /// Values that change whenever any integral or the core energy changes
    ///
    /// Two Hamiltonians with equal fingerprints are treated as the same
    /// operator by [`SparseOp::update`](crate::SparseOp::update).
    pub fn fingerprint(&self) -> [u64; 4] {
        [
            self.nbasis as u64,
            self.ecore.to_bits(),
            weighted_sum(self.one_mo.as_slice()).to_bits(),
            self.two_checksum.to_bits(),
        ]
    }

    pub fn pair(&self) -> &PairIntegrals {
        &self.pair
    }

    /// Spin-blocked integrals over `2 * nbasis` spin-orbitals
    ///
    /// Spin-orbital `p` is spatial orbital `p % nbasis` with alpha spin for
    /// `p < nbasis` and beta spin otherwise; integrals coupling different
    /// spins within a charge distribution vanish.
    pub fn to_spin_orbital(&self) -> Result<Hamiltonian> {
        let n = self.nbasis;
        let m = 2 * n;
        let one = DMatrix::from_fn(m, m, |p, q| {
            if p / n == q / n {
                self.one(p % n, q % n)
            } else {
                0.0
            }
        });
        let mut two = vec![0.0; m * m * m * m];
        for p in 0..m {
            for q in (0..m).filter(|q| q / n == p / n) {
                for r in 0..m {
                    for s in (0..m).filter(|s| s / n == r / n) {
                        two[((p * m + q) * m + r) * m + s] = self.two(p % n, q % n, r % n, s % n);
                    }
                }
            }
        }
        Hamiltonian::new(self.ecore, one, two)
    }

    /// Fail unless the tensors are indexed by the orbitals of `space`
    pub fn check_space(&self, space: &Space) -> Result<()> {
        if space.nbasis != self.nbasis {
            return Err(CiError::FormatMismatch(format!(
                "Hamiltonian has {} orbitals, wavefunction has {}",
                self.nbasis, space.nbasis
            )));
        }
        Ok(())
    }

    /// Largest magnitude any single off-diagonal element can reach in `space`
    pub fn coupling_bound(&self, space: &Space) -> f64 {
        match space.kind {
            WfnKind::Doci => {
                let v = &self.pair.v;
                let mut bound = 0.0_f64;
                for i in 0..self.nbasis {
                    for a in 0..self.nbasis {
                        if i != a {
                            bound = bound.max(v[(i, a)].abs());
                        }
                    }
                }
                bound
            }
            WfnKind::Fci | WfnKind::Genci => {
                let single = self.max_abs_one + 2.0 * space.nocc() as f64 * self.max_abs_two;
                let double = 2.0 * self.max_abs_two;
                single.max(double)
            }
        }
    }
}

/// Position-weighted sum, sensitive to both values and their placement
fn weighted_sum(values: &[f64]) -> f64 {
    values
        .iter()
        .enumerate()
        .map(|(k, x)| x * (1.0 + (k % 251) as f64 / 251.0))
        .sum()
}

impl PairIntegrals {
    fn from_tensors(one_mo: &DMatrix<f64>, two_mo: &[f64], n: usize) -> Self {
        let two = |p: usize, q: usize, r: usize, s: usize| two_mo[((p * n + q) * n + r) * n + s];

        let h = DVector::from_fn(n, |i, _| 2.0 * one_mo[(i, i)]);
        let v = DMatrix::from_fn(n, n, |i, a| two(i, a, i, a));
        let w = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.0
            } else {
                2.0 * two(i, i, j, j) - two(i, j, j, i)
            }
        });

        PairIntegrals { h, v, w }
    }
}
