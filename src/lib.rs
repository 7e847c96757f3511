//! Sparse multivariate polynomial algebra with Horner evaluation,
//! Newton-Raphson root solving and least-squares fitting.
//! Polynomials of any dimension are stored as a recursive coefficient tree
//! holding only non-zero entries, so sparse high-degree polynomials stay
//! cheap to store, combine and evaluate.
//!
//! # Example
//! ```
//! use multipoly::Polynomial;
//! use assert_approx_eq::assert_approx_eq;
//!
//! // detector response r(x) = 1 + 2x + 3x²
//! let mut response = Polynomial::new(1).unwrap();
//! response.set_coeff(&[0], 1.0).unwrap();
//! response.set_coeff(&[1], 2.0).unwrap();
//! response.set_coeff(&[2], 3.0).unwrap();
//!
//! assert_approx_eq!(17.0, response.eval_1d(2.0).unwrap(), 1e-12);
//!
//! // invert the response: solve r(x) = 17
//! response.set_coeff(&[0], 1.0 - 17.0).unwrap();
//! let x = response.solve_1d(0.0, 1).unwrap();
//! assert_approx_eq!(2.0, x, 1e-12);
//! ```

mod error;
mod fit;
pub mod flops;
mod node;
mod polynomial;
mod solve;

pub use error::{Error, Result};
pub use polynomial::Polynomial;
