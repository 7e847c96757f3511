//! Error types for polynomial construction, algebra, solving and fitting.

use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in polynomial operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A polynomial must depend on at least one variable.
    #[error("Polynomial dimension must be at least 1")]
    ZeroDimension,

    /// Operands or arguments disagree on the number of variables.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected number of variables
        expected: usize,
        /// Actual number of variables
        got: usize,
    },

    /// Slice arguments disagree on length.
    #[error("Size mismatch: expected {expected} elements, got {got}")]
    SizeMismatch {
        /// Expected element count
        expected: usize,
        /// Actual element count
        got: usize,
    },

    /// A variable index lies outside the polynomial's dimension.
    #[error("Variable {variable} out of range for dimension {dimension}")]
    VariableOutOfRange {
        /// The requested variable index
        variable: usize,
        /// Number of variables of the polynomial
        dimension: usize,
    },

    /// The requested degree interval is empty or inverted.
    #[error("Invalid degree bounds: mindeg {mindeg} must not exceed maxdeg {maxdeg}")]
    DegreeBounds {
        /// Smallest fitted degree
        mindeg: usize,
        /// Largest fitted degree
        maxdeg: usize,
    },

    /// Root multiplicity must be at least 1.
    #[error("Root multiplicity must be at least 1")]
    ZeroMultiplicity,

    /// The operation exists but the requested mode is not covered.
    #[error("Unsupported mode: {0}")]
    Unsupported(&'static str),

    /// The normal-equation matrix is not positive definite.
    ///
    /// Usually the sample positions are collinear or the degree interval is
    /// too wide for the data.
    #[error("Normal-equation matrix is singular or not positive definite")]
    SingularMatrix,

    /// A computation degenerated into an effective division by zero.
    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    /// The iterative solver exhausted its iteration budget.
    #[error("No convergence after {iterations} iterations (last estimate {last})")]
    NoConvergence {
        /// Number of iterations performed
        iterations: usize,
        /// Last root estimate
        last: f64,
    },

    /// Fewer samples (or fewer distinct sample positions) than coefficients.
    #[error("Insufficient data: {needed} distinct samples needed, got {got}")]
    InsufficientData {
        /// Minimum number of samples required
        needed: usize,
        /// Number of samples available
        got: usize,
    },

    /// The derivative lost positivity in monotonic solving mode.
    #[error("Polynomial is not monotonically increasing at x = {x}")]
    NonMonotonic {
        /// Point at which the derivative was non-positive
        x: f64,
    },
}
