//! Heat-bath configuration interaction (HCI)
//!
//! Adaptive growth of a determinant store by importance screening. A round
//! expands every determinant with a non-negligible coefficient and keeps the
//! new determinants whose coupling `|c_i H_ij|` exceeds the threshold `eps`.
//! The caller rebuilds or extends the operator over the grown store,
//! re-solves, and feeds the new eigenvector into the next round; the
//! selection is converged when a round adds nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use selci::{run_hci, SparseOp, Wavefunction};
//!
//! let mut wfn = Wavefunction::doci(ham.nbasis, nocc)?;
//! wfn.add_hartreefock();
//! let mut op = SparseOp::new(&wfn, &ham)?;
//! let mut spectrum = op.solve(1, 1e-8, 500, None)?;
//! while run_hci(&mut wfn, &ham, spectrum.ground_state().as_slice(), 1e-5)? > 0 {
//!     op.update(&wfn, &ham)?;
//!     spectrum = op.solve(1, 1e-8, 500, None)?;
//! }
//! ```

mod hci;

pub use hci::{run_hci, HciDriver, HciSummary, RoundReport, SelectionState, Selector};
