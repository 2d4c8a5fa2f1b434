//! Iterative eigensolver
//!
//! The solver only ever sees a [`LinearOperator`]: dimension queries, a
//! matrix-vector product and an optional diagonal. The same routine therefore
//! serves freshly built and incrementally updated sparse operators, as well
//! as dense test matrices.
//!
//! # Algorithm
//!
//! Block Davidson-Liu with diagonal preconditioning and collapse-restart:
//!
//! 1. Seed the search space with the guess and the lowest diagonal unit vectors
//! 2. Project the operator onto the space and diagonalize the small matrix
//! 3. Form Ritz vectors and residuals `r = A x - θ x`
//! 4. Stop when every requested residual norm is below the tolerance
//! 5. Otherwise add the preconditioned residuals and repeat

mod davidson;

pub use davidson::{davidson, LinearOperator, SolverParams, Spectrum};

#[cfg(test)]
mod tests;
