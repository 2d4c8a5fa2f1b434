//! Wavefunction store
//!
//! A wavefunction is the explicit, growable set of determinants a variational
//! calculation works in. This module provides the [`Space`] shape descriptor
//! (symmetry variant, orbital count, occupations) and the [`Wavefunction`]
//! store: an append-only arena of packed determinants plus a hash index from
//! bit pattern to position.
//!
//! # Supported variants
//!
//! - **DOCI**: pair-occupied determinants over spatial orbitals
//! - **FCI**: alpha and beta strings over spatial orbitals
//! - **GenCI**: one string over generalized spin-orbitals
//!
//! # Usage
//!
//! ```rust,ignore
//! use selci::Wavefunction;
//!
//! let mut wfn = Wavefunction::doci(10, 2)?;
//! wfn.add_all();
//! assert_eq!(wfn.len(), 45);
//! ```

mod space;
mod wfn;

pub use space::{binomial, Space, WfnKind};
pub use wfn::Wavefunction;

#[cfg(test)]
mod tests;
