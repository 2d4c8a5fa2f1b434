//! Reduced density matrices (RDMs)
//!
//! One- and two-particle density matrices of a CI state and the energy
//! obtained by contracting them with the integrals. Pair wavefunctions use
//! the compact pair matrices `d0` and `d2` that match the pair Hamiltonian;
//! spin-orbital wavefunctions use full spin-orbital `rdm1` and `rdm2`.
//! [`generate_rdms`] expands pair matrices into the spin-orbital form.
//!
//! # Usage
//!
//! ```rust,ignore
//! use selci::{compute_rdms, rdm_energy, Rdms};
//!
//! let rdms = compute_rdms(&wfn, spectrum.ground_state().as_slice())?;
//! let energy = rdm_energy(wfn.space(), &ham, &rdms)?;
//! if let Rdms::Pair(pair) = &rdms {
//!     println!("pair occupations: {}", pair.d0.diagonal());
//! }
//! ```

mod rdm;

pub use rdm::{compute_energy, compute_rdms, generate_rdms, rdm_energy, PairRdms, Rdms, SpinRdms};
