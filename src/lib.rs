//! Selected configuration interaction
//!
//! Determinant stores for pair-occupied (DOCI), spin-orbital (FCI) and
//! generalized (GenCI) wavefunctions, a sparse Hamiltonian over a store with
//! a Davidson eigensolver, heat-bath selection (HCI) to grow a store
//! adaptively, and reduced density matrices of the resulting states.

pub mod bitdet;
pub mod error;
pub mod excite_impl;
pub mod ham_impl;
pub mod hci_impl;
pub mod io;
pub mod rdm_impl;
pub mod solver_impl;
pub mod sparse_impl;
pub mod wfn_impl;

#[cfg(test)]
mod test_utils;

pub use error::{CiError, Result};
pub use excite_impl::{all_dets, connections, excitations, seniority_dets};
pub use ham_impl::{Elements, Hamiltonian, PairIntegrals};
pub use hci_impl::{run_hci, HciDriver, HciSummary, RoundReport, SelectionState, Selector};
pub use rdm_impl::{compute_energy, compute_rdms, generate_rdms, rdm_energy, PairRdms, Rdms, SpinRdms};
pub use solver_impl::{davidson, LinearOperator, SolverParams, Spectrum};
pub use sparse_impl::SparseOp;
pub use wfn_impl::{Space, Wavefunction, WfnKind};
