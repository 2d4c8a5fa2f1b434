//! Error types shared by every component of the CI core

/// Failure conditions raised by the wavefunction store, the sparse operator,
/// the eigensolver and the selection driver.
#[derive(Debug, thiserror::Error)]
pub enum CiError {
    #[error("Format mismatch: {0}")]
    FormatMismatch(String),

    #[error("Index {index} out of range for {len} determinants")]
    OutOfRange { index: usize, len: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Solver did not converge after {iterations} iterations (largest residual {residual:.3e})")]
    NonConvergence { iterations: usize, residual: f64 },

    #[error("Determinant already present at index {0}")]
    Duplicate(usize),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CiError>;
