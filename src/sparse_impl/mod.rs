//! Sparse Hamiltonian operator
//!
//! [`SparseOp`] restricts the Hamiltonian to the determinants of a
//! [`Wavefunction`](crate::Wavefunction) and stores it in compressed sparse
//! row form, upper triangle only. Rows are built in parallel against a frozen
//! store; connections whose partner determinant is not in the store are
//! omitted, which is what makes the matrix a variational restriction.
//!
//! # Usage
//!
//! ```rust,ignore
//! use selci::{SparseOp, Wavefunction};
//!
//! let op = SparseOp::new(&wfn, &ham)?;
//! let spectrum = op.solve(1, 1e-8, 500, None)?;
//! println!("E0 = {:.10}", spectrum.ground_energy());
//! ```

mod sparse_op;

pub use sparse_op::SparseOp;
