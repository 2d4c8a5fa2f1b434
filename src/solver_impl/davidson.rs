//! Davidson-Liu iterative eigensolver over a matrix-free operator

extern crate nalgebra as na;

use crate::error::{CiError, Result};
use na::{DMatrix, DVector};
use std::cmp::Ordering;
use tracing::debug;

/// Smallest denominator allowed in the diagonal preconditioner
const PRECONDITIONER_FLOOR: f64 = 1e-8;

/// Correction vectors keeping less than this fraction of their norm after
/// orthogonalization are dropped
const LINEAR_DEPENDENCE_TOL: f64 = 1e-6;

/// A real symmetric operator known only through its action on vectors
pub trait LinearOperator: Sync {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    /// `y = A x`
    fn perform_op(&self, x: &[f64], y: &mut [f64]);

    /// Diagonal of the operator, used as a preconditioner when available
    fn diagonal(&self) -> Option<&[f64]> {
        None
    }
}

/// Convergence settings for [`davidson`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    /// Number of lowest eigenpairs to compute
    pub n_eigen: usize,
    /// Residual norm every requested eigenpair must reach
    pub tolerance: f64,
    /// Iteration budget
    pub max_iterations: usize,
    /// Subspace size that triggers a restart
    pub max_subspace: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            n_eigen: 1,
            tolerance: 1e-8,
            max_iterations: 500,
            max_subspace: 30,
        }
    }
}

impl SolverParams {
    pub fn new(n_eigen: usize, tolerance: f64, max_iterations: usize) -> Self {
        SolverParams {
            n_eigen,
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    pub fn with_max_subspace(mut self, max_subspace: usize) -> Self {
        self.max_subspace = max_subspace;
        self
    }

    fn validate(&self, dim: usize) -> Result<()> {
        if self.n_eigen == 0 || self.n_eigen > dim {
            return Err(CiError::InvalidParameter(format!(
                "requested {} eigenpairs of a {} x {} operator",
                self.n_eigen, dim, dim
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(CiError::InvalidParameter(format!(
                "solver tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_subspace < 2 * self.n_eigen {
            return Err(CiError::InvalidParameter(format!(
                "subspace size {} must be at least twice the number of eigenpairs ({})",
                self.max_subspace, self.n_eigen
            )));
        }
        Ok(())
    }
}

/// Lowest eigenpairs in ascending order of energy
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Eigenvalues in ascending order.
    pub energies: Vec<f64>,
    /// Normalized eigenvectors, largest component positive.
    pub states: Vec<DVector<f64>>,
    /// Iterations taken to converge.
    pub iterations: usize,
}

impl Spectrum {
    pub fn ground_energy(&self) -> f64 {
        self.energies[0]
    }

    pub fn ground_state(&self) -> &DVector<f64> {
        &self.states[0]
    }
}

/// Find the lowest `params.n_eigen` eigenpairs of `op`
///
/// The search space is seeded with `guess` (if given) and with unit vectors
/// on the smallest diagonal elements, then grown with preconditioned
/// residuals `(D - θ)^-1 r`. Without a diagonal the raw residuals are used and
/// the search space is exactly the Krylov space of the seed. When the
/// subspace reaches `params.max_subspace` it collapses onto the current Ritz
/// vectors.
///
/// # Errors
///
/// - [`CiError::InvalidParameter`] for an empty request, a bad tolerance or a
///   subspace too small to hold the requested pairs
/// - [`CiError::FormatMismatch`] for a non-square operator or a guess of the
///   wrong length
/// - [`CiError::NonConvergence`] when the iteration budget runs out or the
///   search space stops growing before every residual meets the tolerance
pub fn davidson<Op: LinearOperator + ?Sized>(
    op: &Op,
    params: &SolverParams,
    guess: Option<&[f64]>,
) -> Result<Spectrum> {
    let dim = op.rows();
    if op.cols() != dim {
        return Err(CiError::FormatMismatch(format!(
            "operator is not square: {} x {}",
            dim,
            op.cols()
        )));
    }
    params.validate(dim)?;
    let n_eigen = params.n_eigen;
    let max_subspace = params.max_subspace.min(dim);
    let diagonal = op.diagonal();

    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(max_subspace);
    let mut sigma: Vec<DVector<f64>> = Vec::with_capacity(max_subspace);

    if let Some(g) = guess {
        if g.len() != dim {
            return Err(CiError::FormatMismatch(format!(
                "guess vector has length {}, operator has dimension {}",
                g.len(),
                dim
            )));
        }
        push_orthonormal(&mut basis, DVector::from_column_slice(g));
    }
    for index in seed_order(dim, diagonal) {
        if basis.len() >= n_eigen {
            break;
        }
        let mut unit = DVector::zeros(dim);
        unit[index] = 1.0;
        push_orthonormal(&mut basis, unit);
    }

    let mut max_residual = f64::INFINITY;
    for iteration in 1..=params.max_iterations {
        for v in basis.iter().skip(sigma.len()) {
            let mut w = DVector::zeros(dim);
            op.perform_op(v.as_slice(), w.as_mut_slice());
            sigma.push(w);
        }

        let m = basis.len();
        let projected = DMatrix::from_fn(m, m, |i, j| {
            0.5 * (basis[i].dot(&sigma[j]) + basis[j].dot(&sigma[i]))
        });
        let eigen = projected.symmetric_eigen();
        let mut order: Vec<usize> = (0..m).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[a]
                .partial_cmp(&eigen.eigenvalues[b])
                .unwrap_or(Ordering::Equal)
        });

        let mut thetas = Vec::with_capacity(n_eigen);
        let mut ritz = Vec::with_capacity(n_eigen);
        let mut ritz_sigma = Vec::with_capacity(n_eigen);
        let mut residuals = Vec::with_capacity(n_eigen);
        for &col in order.iter().take(n_eigen) {
            let y = eigen.eigenvectors.column(col);
            let theta = eigen.eigenvalues[col];
            let mut x = DVector::zeros(dim);
            let mut s = DVector::zeros(dim);
            for k in 0..m {
                x.axpy(y[k], &basis[k], 1.0);
                s.axpy(y[k], &sigma[k], 1.0);
            }
            let r = &s - &x * theta;
            thetas.push(theta);
            ritz.push(x);
            ritz_sigma.push(s);
            residuals.push(r);
        }

        let norms: Vec<f64> = residuals.iter().map(|r| r.norm()).collect();
        max_residual = norms.iter().cloned().fold(0.0, f64::max);
        debug!(
            "Davidson iteration {:>4}: subspace {:>3}, lowest {:.12}, max residual {:.3e}",
            iteration, m, thetas[0], max_residual
        );

        if max_residual < params.tolerance || m == dim {
            return Ok(finish(thetas, ritz, iteration));
        }

        let unconverged: Vec<usize> = (0..n_eigen)
            .filter(|&l| norms[l] >= params.tolerance)
            .collect();
        if max_subspace < dim && m + unconverged.len() > max_subspace {
            basis.clear();
            sigma.clear();
            for (x, s) in ritz.iter().zip(ritz_sigma.iter()) {
                basis.push(x.normalize());
                sigma.push(s / x.norm());
            }
        }

        let mut grown = false;
        for &l in &unconverged {
            if basis.len() >= dim {
                break;
            }
            let correction = precondition(&residuals[l], thetas[l], diagonal);
            if push_orthonormal(&mut basis, correction) {
                grown = true;
            } else if diagonal.is_some() && push_orthonormal(&mut basis, residuals[l].clone()) {
                // preconditioned direction collapsed onto the subspace
                grown = true;
            }
        }
        if !grown {
            return Err(CiError::NonConvergence {
                iterations: iteration,
                residual: max_residual,
            });
        }
    }

    Err(CiError::NonConvergence {
        iterations: params.max_iterations,
        residual: max_residual,
    })
}

/// Unit-vector seeds: smallest diagonal elements first, else natural order
fn seed_order(dim: usize, diagonal: Option<&[f64]>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dim).collect();
    if let Some(d) = diagonal {
        order.sort_by(|&a, &b| d[a].partial_cmp(&d[b]).unwrap_or(Ordering::Equal));
    }
    order
}

fn precondition(residual: &DVector<f64>, theta: f64, diagonal: Option<&[f64]>) -> DVector<f64> {
    match diagonal {
        Some(d) => DVector::from_fn(residual.len(), |i, _| {
            let mut denom = d[i] - theta;
            if denom.abs() < PRECONDITIONER_FLOOR {
                denom = PRECONDITIONER_FLOOR.copysign(denom);
            }
            residual[i] / denom
        }),
        None => residual.clone(),
    }
}

/// Orthonormalize `v` against `basis` (two Gram-Schmidt passes) and append it
/// unless it is numerically dependent; returns whether it was appended.
fn push_orthonormal(basis: &mut Vec<DVector<f64>>, mut v: DVector<f64>) -> bool {
    let norm = v.norm();
    if !(norm.is_finite() && norm > 0.0) {
        return false;
    }
    v /= norm;
    for _ in 0..2 {
        for b in basis.iter() {
            let overlap = b.dot(&v);
            v.axpy(-overlap, b, 1.0);
        }
    }
    let remaining = v.norm();
    if remaining < LINEAR_DEPENDENCE_TOL {
        return false;
    }
    basis.push(v / remaining);
    true
}

fn finish(energies: Vec<f64>, ritz: Vec<DVector<f64>>, iterations: usize) -> Spectrum {
    let states = ritz
        .into_iter()
        .map(|x| {
            let mut x = x.normalize();
            let pivot = x.iamax();
            if x[pivot] < 0.0 {
                x.neg_mut();
            }
            x
        })
        .collect();
    Spectrum {
        energies,
        states,
        iterations,
    }
}
