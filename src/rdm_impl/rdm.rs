//! Reduced density matrices of a CI expansion and their energy contraction

extern crate nalgebra as na;

use crate::bitdet::{self, Word};
use crate::error::{CiError, Result};
use crate::excite_impl::connections;
use crate::ham_impl::Hamiltonian;
use crate::sparse_impl::SparseOp;
use crate::wfn_impl::{Space, Wavefunction, WfnKind};
use na::DMatrix;
use rayon::prelude::*;
use tracing::debug;

/// Pair density matrices of a pair-occupied wavefunction
///
/// - `d0[(i, i)]` is the occupation of pair `i`, `d0[(i, a)]` the pair
///   transfer density `sum c_k c_l` over determinants related by `i -> a`
/// - `d2[(i, j)]` is the joint occupation of pairs `i != j`
#[derive(Debug, Clone)]
pub struct PairRdms {
    pub d0: DMatrix<f64>,
    pub d2: DMatrix<f64>,
}

/// Spin-orbital density matrices
///
/// `rdm1[(p, q)] = <a+_p a_q>`, `rdm2[((p * n + q) * n + r) * n + s] =
/// <a+_p a+_q a_s a_r>` over the `n` spin-orbitals of the space.
#[derive(Debug, Clone)]
pub struct SpinRdms {
    pub n: usize,
    pub rdm1: DMatrix<f64>,
    pub rdm2: Vec<f64>,
}

/// Density matrices in the representation natural to the wavefunction variant
#[derive(Debug, Clone)]
pub enum Rdms {
    Pair(PairRdms),
    SpinOrbital(SpinRdms),
}

impl SpinRdms {
    fn zeros(n: usize) -> Self {
        SpinRdms {
            n,
            rdm1: DMatrix::zeros(n, n),
            rdm2: vec![0.0; n * n * n * n],
        }
    }

    #[inline(always)]
    fn index(&self, p: usize, q: usize, r: usize, s: usize) -> usize {
        ((p * self.n + q) * self.n + r) * self.n + s
    }

    /// `<a+_p a+_q a_s a_r>`
    #[inline]
    pub fn two(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.rdm2[self.index(p, q, r, s)]
    }

    /// Add `value` to `(p, q, r, s)` and its three antisymmetric partners
    fn add_antisymmetric(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        let pqrs = self.index(p, q, r, s);
        let qprs = self.index(q, p, r, s);
        let pqsr = self.index(p, q, s, r);
        let qpsr = self.index(q, p, s, r);
        self.rdm2[pqrs] += value;
        self.rdm2[qprs] -= value;
        self.rdm2[pqsr] -= value;
        self.rdm2[qpsr] += value;
    }

    fn merge(mut self, other: SpinRdms) -> SpinRdms {
        self.rdm1 += other.rdm1;
        for (a, b) in self.rdm2.iter_mut().zip(other.rdm2) {
            *a += b;
        }
        self
    }

    fn scale(&mut self, factor: f64) {
        self.rdm1 *= factor;
        self.rdm2.iter_mut().for_each(|x| *x *= factor);
    }
}

/// Compute the density matrices of the state `coeffs` over `wfn`
///
/// The coefficients are normalized first, so the result always describes a
/// unit-norm state.
///
/// # Errors
///
/// - [`CiError::FormatMismatch`] when `coeffs` does not have one entry per determinant
/// - [`CiError::InvalidParameter`] for a zero vector
pub fn compute_rdms(wfn: &Wavefunction, coeffs: &[f64]) -> Result<Rdms> {
    let norm2 = check_coeffs(wfn, coeffs)?;
    match wfn.space().kind {
        WfnKind::Doci => Ok(Rdms::Pair(pair_rdms(wfn, coeffs, norm2))),
        WfnKind::Fci | WfnKind::Genci => Ok(Rdms::SpinOrbital(spin_rdms(wfn, coeffs, norm2))),
    }
}

fn check_coeffs(wfn: &Wavefunction, coeffs: &[f64]) -> Result<f64> {
    if coeffs.len() != wfn.len() {
        return Err(CiError::FormatMismatch(format!(
            "coefficient vector has length {}, wavefunction has {} determinants",
            coeffs.len(),
            wfn.len()
        )));
    }
    let norm2: f64 = coeffs.iter().map(|c| c * c).sum();
    if !(norm2.is_finite() && norm2 > 0.0) {
        return Err(CiError::InvalidParameter(
            "coefficient vector must have a finite, non-zero norm".to_string(),
        ));
    }
    Ok(norm2)
}

fn pair_rdms(wfn: &Wavefunction, coeffs: &[f64], norm2: f64) -> PairRdms {
    let n = wfn.space().nbasis;
    let space = *wfn.space();
    let zeros = || (DMatrix::<f64>::zeros(n, n), DMatrix::<f64>::zeros(n, n));

    let (mut d0, mut d2) = (0..wfn.len())
        .into_par_iter()
        .fold(zeros, |(mut d0, mut d2), k| {
            let det = wfn.det_unchecked(k);
            let ck = coeffs[k];
            let occ = bitdet::occs(det);
            for &i in &occ {
                d0[(i, i)] += ck * ck;
                for &j in &occ {
                    if i != j {
                        d2[(i, j)] += ck * ck;
                    }
                }
            }
            for conn in connections(&space, det) {
                if let Some(l) = wfn.index_of(&conn) {
                    let (holes, parts) = bitdet::differences(det, &conn);
                    d0[(holes[0], parts[0])] += ck * coeffs[l];
                }
            }
            (d0, d2)
        })
        .reduce(zeros, |(a0, a2), (b0, b2)| (a0 + b0, a2 + b2));

    d0 /= norm2;
    d2 /= norm2;
    PairRdms { d0, d2 }
}

fn spin_rdms(wfn: &Wavefunction, coeffs: &[f64], norm2: f64) -> SpinRdms {
    let space = *wfn.space();
    let n = space.n_spin_orbitals();

    let mut rdms = (0..wfn.len())
        .into_par_iter()
        .fold(
            || SpinRdms::zeros(n),
            |mut acc, k| {
                accumulate_spin(&mut acc, &space, wfn, coeffs, k);
                acc
            },
        )
        .reduce(|| SpinRdms::zeros(n), SpinRdms::merge);

    rdms.scale(1.0 / norm2);
    debug!("Spin-orbital RDMs accumulated over {} determinants", wfn.len());
    rdms
}

/// All contributions with determinant `k` as the ket
fn accumulate_spin(acc: &mut SpinRdms, space: &Space, wfn: &Wavefunction, coeffs: &[f64], k: usize) {
    let det = wfn.det_unchecked(k);
    let ck = coeffs[k];
    let occ: Vec<usize> = bitdet::occs(det)
        .into_iter()
        .map(|flat| space.spin_orbital(flat))
        .collect();

    let diag = ck * ck;
    for (x, &p) in occ.iter().enumerate() {
        acc.rdm1[(p, p)] += diag;
        for &q in &occ[x + 1..] {
            acc.add_antisymmetric(p, q, p, q, diag);
        }
    }

    for conn in connections(space, det) {
        let l = match wfn.index_of(&conn) {
            Some(l) => l,
            None => continue,
        };
        let (holes, parts) = bitdet::differences(det, &conn);
        let value = ck * coeffs[l];
        match holes.len() {
            1 => {
                let (i, a) = (holes[0], parts[0]);
                let phase = bitdet::phase_single(det, i, a);
                let (si, sa) = (space.spin_orbital(i), space.spin_orbital(a));
                acc.rdm1[(sa, si)] += phase * value;
                for &j in occ.iter().filter(|&&j| j != si) {
                    acc.add_antisymmetric(sa, j, si, j, phase * value);
                }
            }
            2 => {
                let phase = double_phase(det, holes[0], holes[1], parts[0], parts[1]);
                acc.add_antisymmetric(
                    space.spin_orbital(parts[0]),
                    space.spin_orbital(parts[1]),
                    space.spin_orbital(holes[0]),
                    space.spin_orbital(holes[1]),
                    phase * value,
                );
            }
            _ => {}
        }
    }
}

/// Spin-orbital density matrices of a pair wavefunction from its pair RDMs
///
/// Spin-orbital `spin * n + p` is spatial orbital `p` with spin `spin`, as in
/// an FCI space over the same orbitals. A seniority-zero state has
///
/// - `rdm1[(p_s, p_s)] = d0[(p, p)]` for both spins, zero elsewhere
/// - `<a+_pa a+_pb a_qb a_qa> = d0[(q, p)]` (pair transfer, `p == q` included)
/// - `<a+_ps a+_qt a_qt a_ps> = d2[(p, q)]` for `p != q` and any spins `s`, `t`
///
/// together with their antisymmetric partners.
pub fn generate_rdms(pair: &PairRdms) -> SpinRdms {
    let n = pair.d0.nrows();
    let mut rdms = SpinRdms::zeros(2 * n);
    let (alpha, beta) = (|p: usize| p, |p: usize| n + p);

    for p in 0..n {
        rdms.rdm1[(alpha(p), alpha(p))] = pair.d0[(p, p)];
        rdms.rdm1[(beta(p), beta(p))] = pair.d0[(p, p)];
        for q in 0..n {
            rdms.add_antisymmetric(alpha(p), beta(p), alpha(q), beta(q), pair.d0[(q, p)]);
        }
        for q in p + 1..n {
            for sp in [alpha(p), beta(p)] {
                for sq in [alpha(q), beta(q)] {
                    rdms.add_antisymmetric(sp, sq, sp, sq, pair.d2[(p, q)]);
                }
            }
        }
    }
    rdms
}

/// Phase of `i -> a` followed by `j -> b`
fn double_phase(det: &[Word], i: usize, j: usize, a: usize, b: usize) -> f64 {
    let mut work = det.to_vec();
    let phase = bitdet::phase_single(&work, i, a);
    bitdet::excite(&mut work, i, a);
    phase * bitdet::phase_single(&work, j, b)
}

/// Total energy of a state from its density matrices
///
/// # Errors
///
/// [`CiError::FormatMismatch`] when the density matrices were not built
/// over `space` or `ham` does not match its orbitals.
pub fn rdm_energy(space: &Space, ham: &Hamiltonian, rdms: &Rdms) -> Result<f64> {
    ham.check_space(space)?;
    match (space.kind, rdms) {
        (WfnKind::Doci, Rdms::Pair(pair)) => pair_energy(ham, pair),
        (WfnKind::Fci, Rdms::SpinOrbital(so)) | (WfnKind::Genci, Rdms::SpinOrbital(so))
            if so.n == space.n_spin_orbitals() =>
        {
            Ok(spin_energy(space, ham, so))
        }
        _ => Err(CiError::FormatMismatch(format!(
            "density matrices do not describe a {} wavefunction over {} orbitals",
            space.kind, space.nbasis
        ))),
    }
}

fn pair_energy(ham: &Hamiltonian, rdms: &PairRdms) -> Result<f64> {
    let n = ham.nbasis;
    if rdms.d0.shape() != (n, n) || rdms.d2.shape() != (n, n) {
        return Err(CiError::FormatMismatch(format!(
            "pair density matrices must be {} x {}",
            n, n
        )));
    }
    let pair = ham.pair();
    let mut energy = ham.ecore;
    for i in 0..n {
        energy += pair.h[i] * rdms.d0[(i, i)];
    }
    energy += pair.v.component_mul(&rdms.d0).sum();
    energy += pair.w.component_mul(&rdms.d2).sum();
    Ok(energy)
}

fn spin_energy(space: &Space, ham: &Hamiltonian, rdms: &SpinRdms) -> f64 {
    let n = rdms.n;
    // spatial orbital and spin of a spin-orbital index
    let split = |p: usize| match space.kind {
        WfnKind::Fci => (p % space.nbasis, p / space.nbasis),
        _ => (p, 0),
    };

    let mut energy = ham.ecore;
    for p in 0..n {
        let (pp, sp) = split(p);
        for q in 0..n {
            let (qq, sq) = split(q);
            if sp == sq {
                energy += ham.one(pp, qq) * rdms.rdm1[(p, q)];
            }
        }
    }

    let two: f64 = (0..n)
        .into_par_iter()
        .map(|p| {
            let (pp, sp) = split(p);
            let mut acc = 0.0;
            for q in 0..n {
                let (qq, sq) = split(q);
                for r in 0..n {
                    let (rr, sr) = split(r);
                    if sp != sr {
                        continue;
                    }
                    for s in 0..n {
                        let (ss, ssp) = split(s);
                        if sq != ssp {
                            continue;
                        }
                        let gamma = rdms.two(p, q, r, s);
                        if gamma != 0.0 {
                            acc += ham.two(pp, rr, qq, ss) * gamma;
                        }
                    }
                }
            }
            acc
        })
        .sum();

    energy + 0.5 * two
}

/// Rayleigh quotient `<c|H|c> / <c|c>` of `coeffs` over `wfn`, core energy included
pub fn compute_energy(wfn: &Wavefunction, ham: &Hamiltonian, coeffs: &[f64]) -> Result<f64> {
    check_coeffs(wfn, coeffs)?;
    SparseOp::new(wfn, ham)?.energy(coeffs)
}
