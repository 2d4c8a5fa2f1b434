//! Hamiltonian integrals and matrix elements
//!
//! The [`Hamiltonian`] holds the one- and two-electron integral tensors and
//! the core energy; [`Elements`] evaluates `<bra|H|ket>` between packed
//! determinants of a given space.
//!
//! # Matrix element rules
//!
//! - **DOCI**: diagonal `Σ_i (2h_ii + (ii|ii)) + Σ_{i≠j} (2(ii|jj) - (ij|ji))`,
//!   pair transfer `i → a` gives `(ia|ia)`
//! - **FCI / GenCI**: Slater-Condon rules for zero, one and two replacements

mod elements;
mod integrals;

pub use elements::Elements;
pub use integrals::{Hamiltonian, PairIntegrals};
