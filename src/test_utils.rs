//! Shared fixtures for unit tests: seeded random integrals and dense references

extern crate nalgebra as na;

use crate::ham_impl::{Elements, Hamiltonian};
use crate::wfn_impl::Wavefunction;
use na::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Real orbital integrals with full 8-fold permutational symmetry
pub fn random_hamiltonian(n: usize, seed: u64) -> Hamiltonian {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut one = DMatrix::zeros(n, n);
    for p in 0..n {
        one[(p, p)] = -2.0 + 0.4 * p as f64 + rng.gen_range(-0.05..0.05);
        for q in 0..p {
            let value = rng.gen_range(-0.2..0.2);
            one[(p, q)] = value;
            one[(q, p)] = value;
        }
    }

    let mut two = vec![0.0; n * n * n * n];
    let idx = |p: usize, q: usize, r: usize, s: usize| ((p * n + q) * n + r) * n + s;
    for p in 0..n {
        for q in 0..=p {
            for r in 0..n {
                for s in 0..=r {
                    if p * (p + 1) / 2 + q < r * (r + 1) / 2 + s {
                        continue;
                    }
                    let mut value = rng.gen_range(-0.05..0.05);
                    if p == q && r == s {
                        value += 0.5;
                    }
                    for (a, b, c, d) in [
                        (p, q, r, s),
                        (q, p, r, s),
                        (p, q, s, r),
                        (q, p, s, r),
                        (r, s, p, q),
                        (s, r, p, q),
                        (r, s, q, p),
                        (s, r, q, p),
                    ] {
                        two[idx(a, b, c, d)] = value;
                    }
                }
            }
        }
    }

    Hamiltonian::new(0.75, one, two).expect("random integrals are well formed")
}

/// Open Hubbard chain with hopping `t`, on-site repulsion `u` and a site-energy gradient
pub fn hubbard_chain(n: usize, t: f64, u: f64) -> Hamiltonian {
    let mut one = DMatrix::zeros(n, n);
    for i in 0..n {
        one[(i, i)] = 0.1 * i as f64;
        if i + 1 < n {
            one[(i, i + 1)] = -t;
            one[(i + 1, i)] = -t;
        }
    }
    let mut two = vec![0.0; n * n * n * n];
    for i in 0..n {
        two[((i * n + i) * n + i) * n + i] = u;
    }
    Hamiltonian::new(0.0, one, two).expect("Hubbard integrals are well formed")
}

/// Dense `<i|H|j>` over the store, core energy included
pub fn dense_hamiltonian(wfn: &Wavefunction, ham: &Hamiltonian) -> DMatrix<f64> {
    let elements = Elements::new(wfn.space(), ham).expect("matching orbital count");
    let n = wfn.len();
    let dets: Vec<&[u64]> = wfn.iter().collect();
    DMatrix::from_fn(n, n, |i, j| {
        let value = elements.element(dets[i], dets[j]);
        if i == j {
            value + ham.ecore
        } else {
            value
        }
    })
}

/// Ascending eigenvalues of a dense symmetric matrix
pub fn sorted_eigenvalues(matrix: DMatrix<f64>) -> Vec<f64> {
    let mut values: Vec<f64> = matrix.symmetric_eigen().eigenvalues.iter().copied().collect();
    values.sort_by(|a, b| a.partial_cmp(b).expect("finite eigenvalues"));
    values
}
