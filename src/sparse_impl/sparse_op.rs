//! Compressed sparse row Hamiltonian over a determinant store

use crate::error::{CiError, Result};
use crate::excite_impl::connections;
use crate::ham_impl::{Elements, Hamiltonian};
use crate::solver_impl::{davidson, LinearOperator, SolverParams, Spectrum};
use crate::wfn_impl::{Space, Wavefunction};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

/// Upper-triangle sparse Hamiltonian, a snapshot of the store it was built from
///
/// Row `i` holds the diagonal element first and then the off-diagonal
/// elements `(i, j)` with `j > i` in ascending column order. Every stored
/// off-diagonal value acts on both `(i, j)` and `(j, i)` when the operator is
/// applied. A column table of positions into the same values lets each
/// output element of [`SparseOp::perform_op`] be gathered independently.
#[derive(Debug, Clone)]
pub struct SparseOp {
    nrow: usize,
    ncol: usize,
    space: Space,
    screen: f64,
    ecore: f64,
    ham_fingerprint: [u64; 4],
    data: Vec<f64>,
    indices: Vec<usize>,
    indptr: Vec<usize>,
    col_ptr: Vec<usize>,
    col_rows: Vec<usize>,
    col_pos: Vec<usize>,
    diag: Vec<f64>,
}

/// One row under construction
struct Row {
    diagonal: f64,
    cols: Vec<usize>,
    vals: Vec<f64>,
}

impl SparseOp {
    /// Build the operator over every determinant of `wfn`
    pub fn new(wfn: &Wavefunction, ham: &Hamiltonian) -> Result<Self> {
        Self::with_screen(wfn, ham, 0.0)
    }

    /// Build the operator, dropping off-diagonal elements with `|h| <= screen`
    pub fn with_screen(wfn: &Wavefunction, ham: &Hamiltonian, screen: f64) -> Result<Self> {
        if !(screen.is_finite() && screen >= 0.0) {
            return Err(CiError::InvalidParameter(format!(
                "screening threshold must be non-negative, got {}",
                screen
            )));
        }
        let elements = Elements::new(wfn.space(), ham)?;
        let start = Instant::now();
        let ndet = wfn.len();

        let rows: Vec<Row> = (0..ndet)
            .into_par_iter()
            .map(|i| build_row(&elements, wfn, i, screen))
            .collect();
        let op = Self::assemble(*wfn.space(), screen, ham, rows);

        info!(
            "Sparse Hamiltonian built: {} determinants, {} stored elements ({:.2?})",
            ndet,
            op.nnz(),
            start.elapsed()
        );
        Ok(op)
    }

    /// Bring the operator up to date with a store that has grown
    ///
    /// When `wfn` only appended determinants since the last build, the rows
    /// already computed are kept and only elements touching the new
    /// determinants are evaluated. Any other change, including a Hamiltonian
    /// whose [`Hamiltonian::fingerprint`] differs from the one the operator
    /// was built with, triggers a full rebuild. On error the operator keeps
    /// its previous state.
    pub fn update(&mut self, wfn: &Wavefunction, ham: &Hamiltonian) -> Result<()> {
        let nold = self.nrow;
        let ndet = wfn.len();
        if ham.fingerprint() != self.ham_fingerprint {
            warn!("Hamiltonian changed since the last build, rebuilding operator");
            *self = Self::with_screen(wfn, ham, self.screen)?;
            return Ok(());
        }
        if *wfn.space() != self.space || ndet < nold {
            warn!("Wavefunction changed shape since the last build, rebuilding operator");
            *self = Self::with_screen(wfn, ham, self.screen)?;
            return Ok(());
        }
        if ndet == nold {
            return Ok(());
        }

        let elements = Elements::new(wfn.space(), ham)?;
        let elements = &elements;
        let start = Instant::now();
        let screen = self.screen;

        let new_rows: Vec<Row> = (nold..ndet)
            .into_par_iter()
            .map(|i| build_row(elements, wfn, i, screen))
            .collect();

        let mut links: Vec<(usize, usize, f64)> = (nold..ndet)
            .into_par_iter()
            .flat_map_iter(|j| {
                let det = wfn.det_unchecked(j);
                connections(wfn.space(), det).filter_map(move |conn| {
                    let k = wfn.index_of(&conn)?;
                    if k >= nold {
                        return None;
                    }
                    let value = elements.element(&conn, det);
                    (value.abs() > screen).then_some((k, j, value))
                })
            })
            .collect();
        links.par_sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut rows = Vec::with_capacity(ndet);
        let mut link = links.into_iter().peekable();
        for i in 0..nold {
            let (s, e) = (self.indptr[i], self.indptr[i + 1]);
            let mut row = Row {
                diagonal: self.data[s],
                cols: self.indices[s + 1..e].to_vec(),
                vals: self.data[s + 1..e].to_vec(),
            };
            while let Some((_, j, value)) = link.next_if(|l| l.0 == i) {
                row.cols.push(j);
                row.vals.push(value);
            }
            rows.push(row);
        }
        rows.extend(new_rows);

        *self = Self::assemble(self.space, screen, ham, rows);
        info!(
            "Sparse Hamiltonian extended: {} -> {} determinants, {} stored elements ({:.2?})",
            nold,
            ndet,
            self.nnz(),
            start.elapsed()
        );
        Ok(())
    }

    fn assemble(space: Space, screen: f64, ham: &Hamiltonian, rows: Vec<Row>) -> Self {
        let n = rows.len();
        let nnz: usize = rows.iter().map(|r| 1 + r.cols.len()).sum();
        let mut data = Vec::with_capacity(nnz);
        let mut indices = Vec::with_capacity(nnz);
        let mut indptr = Vec::with_capacity(n + 1);
        let mut diag = Vec::with_capacity(n);
        let mut col_count = vec![0usize; n + 1];

        indptr.push(0);
        for (i, row) in rows.into_iter().enumerate() {
            data.push(row.diagonal);
            indices.push(i);
            diag.push(row.diagonal);
            for &j in &row.cols {
                col_count[j + 1] += 1;
            }
            data.extend(row.vals);
            indices.extend(row.cols);
            indptr.push(data.len());
        }

        for j in 0..n {
            col_count[j + 1] += col_count[j];
        }
        let col_ptr = col_count;
        let mut fill = col_ptr.clone();
        let offdiag = nnz - n;
        let mut col_rows = vec![0usize; offdiag];
        let mut col_pos = vec![0usize; offdiag];
        for i in 0..n {
            for pos in indptr[i] + 1..indptr[i + 1] {
                let j = indices[pos];
                col_rows[fill[j]] = i;
                col_pos[fill[j]] = pos;
                fill[j] += 1;
            }
        }

        SparseOp {
            nrow: n,
            ncol: n,
            space,
            screen,
            ecore: ham.ecore,
            ham_fingerprint: ham.fingerprint(),
            data,
            indices,
            indptr,
            col_ptr,
            col_rows,
            col_pos,
            diag,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.nrow
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.ncol
    }

    /// Number of stored elements (diagonal included, each off-diagonal pair once)
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn ecore(&self) -> f64 {
        self.ecore
    }

    /// Diagonal elements, core energy included
    pub fn diagonal(&self) -> &[f64] {
        &self.diag
    }

    /// Stored `(column, value)` entries of row `i`, diagonal first
    pub fn row(&self, i: usize) -> Result<impl Iterator<Item = (usize, f64)> + '_> {
        if i >= self.nrow {
            return Err(CiError::OutOfRange {
                index: i,
                len: self.nrow,
            });
        }
        let (s, e) = (self.indptr[i], self.indptr[i + 1]);
        Ok(self.indices[s..e]
            .iter()
            .copied()
            .zip(self.data[s..e].iter().copied()))
    }

    /// Matrix element `(i, j)` under the symmetric storage convention
    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        let len = self.nrow;
        for index in [i, j] {
            if index >= len {
                return Err(CiError::OutOfRange { index, len });
            }
        }
        let (row, col) = if i <= j { (i, j) } else { (j, i) };
        let (s, e) = (self.indptr[row], self.indptr[row + 1]);
        Ok(match self.indices[s..e].binary_search(&col) {
            Ok(k) => self.data[s + k],
            Err(_) => 0.0,
        })
    }

    /// `y = H x`
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not of length [`SparseOp::rows`].
    pub fn perform_op(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.ncol, "input vector length mismatch");
        assert_eq!(y.len(), self.nrow, "output vector length mismatch");
        y.par_iter_mut().enumerate().for_each(|(j, yj)| {
            let (s, e) = (self.indptr[j], self.indptr[j + 1]);
            let mut acc = self.data[s] * x[j];
            for pos in s + 1..e {
                acc += self.data[pos] * x[self.indices[pos]];
            }
            for t in self.col_ptr[j]..self.col_ptr[j + 1] {
                acc += self.data[self.col_pos[t]] * x[self.col_rows[t]];
            }
            *yj = acc;
        });
    }

    /// Lowest eigenpairs of the operator
    ///
    /// # Arguments
    ///
    /// * `n_eigen` - Number of eigenpairs
    /// * `tolerance` - Residual norm required of every eigenpair
    /// * `max_iterations` - Iteration budget before [`CiError::NonConvergence`]
    /// * `guess` - Optional starting vector over the store's indexing
    pub fn solve(
        &self,
        n_eigen: usize,
        tolerance: f64,
        max_iterations: usize,
        guess: Option<&[f64]>,
    ) -> Result<Spectrum> {
        self.solve_with(&SolverParams::new(n_eigen, tolerance, max_iterations), guess)
    }

    pub fn solve_with(&self, params: &SolverParams, guess: Option<&[f64]>) -> Result<Spectrum> {
        davidson(self, params, guess)
    }

    /// Rayleigh quotient `<c|H|c> / <c|c>` (core energy included)
    pub fn energy(&self, coeffs: &[f64]) -> Result<f64> {
        if coeffs.len() != self.nrow {
            return Err(CiError::FormatMismatch(format!(
                "coefficient vector has length {}, operator has dimension {}",
                coeffs.len(),
                self.nrow
            )));
        }
        let norm: f64 = coeffs.iter().map(|c| c * c).sum();
        if norm == 0.0 {
            return Err(CiError::InvalidParameter(
                "coefficient vector is zero".to_string(),
            ));
        }
        let mut sigma = vec![0.0; self.nrow];
        self.perform_op(coeffs, &mut sigma);
        let numerator: f64 = coeffs.iter().zip(sigma.iter()).map(|(c, s)| c * s).sum();
        Ok(numerator / norm)
    }
}

impl LinearOperator for SparseOp {
    fn rows(&self) -> usize {
        self.nrow
    }

    fn cols(&self) -> usize {
        self.ncol
    }

    fn perform_op(&self, x: &[f64], y: &mut [f64]) {
        SparseOp::perform_op(self, x, y)
    }

    fn diagonal(&self) -> Option<&[f64]> {
        Some(&self.diag)
    }
}

/// Diagonal and upper-triangle elements of row `i`
fn build_row(elements: &Elements<'_>, wfn: &Wavefunction, i: usize, screen: f64) -> Row {
    let det = wfn.det_unchecked(i);
    let diagonal = elements.diagonal(det) + elements.hamiltonian().ecore;

    let mut entries: Vec<(usize, f64)> = connections(wfn.space(), det)
        .filter_map(|conn| {
            let j = wfn.index_of(&conn)?;
            if j <= i {
                return None;
            }
            let value = elements.element(&conn, det);
            (value.abs() > screen).then_some((j, value))
        })
        .collect();
    entries.sort_unstable_by_key(|&(j, _)| j);

    let (cols, vals) = entries.into_iter().unzip();
    Row {
        diagonal,
        cols,
        vals,
    }
}
