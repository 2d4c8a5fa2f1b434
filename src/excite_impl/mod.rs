//! Excitation generator
//!
//! Stateless enumeration of the determinants reachable from a reference by a
//! fixed number of orbital replacements, plus exhaustive enumeration of a
//! whole space. Every sequence is lazy, deterministic and free of repeats;
//! the same determinant may still come out of calls on different references,
//! which is why insertion always goes through the store's index.
//!
//! # Usage
//!
//! ```rust,ignore
//! use selci::{excitations, Space};
//!
//! let space = Space::doci(10, 2)?;
//! let hf = space.hartreefock();
//! let singles: Vec<_> = excitations(&space, &hf, 1).collect();
//! assert_eq!(singles.len(), 2 * 8);
//! ```

mod excite;

pub use excite::{all_dets, connections, excitations, excited_strings, seniority_dets};

#[cfg(test)]
mod tests;
