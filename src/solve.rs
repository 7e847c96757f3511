use crate::error::{Error, Result};
use crate::flops;
use crate::node;
use crate::polynomial::Polynomial;

impl Polynomial {
    /// Finds a root of a univariate polynomial by Newton-Raphson iteration
    /// starting from `first_guess`.
    ///
    /// `multiplicity` is the assumed number of coincident roots at the
    /// solution; the correction step is scaled by it, which restores fast
    /// convergence on multiple roots. Pass 1 when nothing is known.
    ///
    /// # Example
    /// ```
    /// use multipoly::Polynomial;
    ///
    /// // p(x) = x - 5
    /// let mut p = Polynomial::new(1).unwrap();
    /// p.set_coeff(&[0], -5.0).unwrap();
    /// p.set_coeff(&[1], 1.0).unwrap();
    ///
    /// assert_eq!(p.solve_1d(0.0, 1).unwrap(), 5.0);
    /// ```
    /// # Errors
    /// Error is returned when the polynomial is not univariate, when
    /// `multiplicity` is 0, when the iteration exhausts its budget without
    /// converging, or when it stalls at a point that is not a root (for
    /// example on a polynomial without real roots).
    pub fn solve_1d(&self, first_guess: f64, multiplicity: usize) -> Result<f64> {
        self.solve_newton(first_guess, multiplicity, false)
    }

    /// Like [`Polynomial::solve_1d`], but additionally requires the
    /// polynomial to be monotonically increasing along the iteration path.
    /// Dispersion relations and similar calibration curves must satisfy
    /// this; a non-positive derivative then indicates bad input rather than
    /// an unlucky starting point.
    ///
    /// # Errors
    /// In addition to the [`Polynomial::solve_1d`] failures, an error is
    /// returned as soon as the derivative is not strictly positive.
    pub fn solve_1d_monotonic(&self, first_guess: f64, multiplicity: usize) -> Result<f64> {
        self.solve_newton(first_guess, multiplicity, true)
    }

    fn solve_newton(&self, first_guess: f64, multiplicity: usize, monotonic: bool) -> Result<f64> {
        self.require_univariate()?;
        if multiplicity == 0 {
            return Err(Error::ZeroMultiplicity);
        }
        let coeffs = match self.univariate_coeffs() {
            Some(coeffs) => coeffs,
            // the zero polynomial vanishes everywhere
            None => return Ok(0.0),
        };
        if coeffs[0] == 0.0 {
            // no constant term: x = 0 is an exact root
            return Ok(0.0);
        }

        let max_iterations = 100 * coeffs.len();
        let mul = multiplicity as f64;
        let mut x = first_guess;
        let mut residual;
        let mut slope;
        let mut residual_prev = 0.0;
        let mut slope_prev = 0.0;

        let mut i = 0;
        loop {
            if i >= max_iterations {
                return Err(Error::NoConvergence {
                    iterations: i,
                    last: x,
                });
            }
            (residual, slope) = node::horner_with_derivative(coeffs, x);
            if monotonic && slope <= 0.0 {
                return Err(Error::NonMonotonic { x });
            }
            if slope == 0.0 {
                break;
            }
            // stop when the relative correction stops shrinking,
            // |r/d| >= |r_prev/d_prev|, compared without dividing
            if i > 0
                && slope * slope_prev > 0.0
                && (residual * slope_prev).abs() >= (residual_prev * slope).abs()
            {
                break;
            }
            residual_prev = residual;
            slope_prev = slope;
            let x_next = x - mul * residual / slope;
            flops::add(3);
            let step_vanished = (x_next - x).abs() <= x.abs() * f64::EPSILON;
            x = x_next;
            i += 1;
            if step_vanished {
                break;
            }
        }

        // the iteration may stop on a stationary point; accept x only when
        // the residual is small against the slope and the coefficient scale
        let scale = coeffs.iter().fold(0.0f64, |m, &c| m.max(c.abs()));
        if residual.abs() > slope.abs() + scale * coeffs.len() as f64 * f64::EPSILON {
            return Err(Error::DivisionByZero(
                "newton iteration stalled away from a root",
            ));
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn from_coeffs(coeffs: &[f64]) -> Polynomial {
        let mut p = Polynomial::new(1).unwrap();
        for (i, &c) in coeffs.iter().enumerate().rev() {
            p.set_coeff(&[i], c).unwrap();
        }
        p
    }

    #[test]
    fn linear_root_is_found_exactly() {
        // p(x) = x - 5
        let p = from_coeffs(&[-5.0, 1.0]);

        assert_eq!(p.solve_1d(0.0, 1).unwrap(), 5.0);
        assert_eq!(p.solve_1d(1000.0, 1).unwrap(), 5.0);
        assert_eq!(p.solve_1d(-273.0, 1).unwrap(), 5.0);
    }

    #[test]
    fn double_root_with_known_multiplicity() {
        // p(x) = (x - 3)^2
        let p = from_coeffs(&[9.0, -6.0, 1.0]);

        assert_eq!(p.solve_1d(1.0, 2).unwrap(), 3.0);
    }

    #[test]
    fn triple_root_with_known_multiplicity() {
        // p(x) = (x - 2)^3
        let p = from_coeffs(&[-8.0, 12.0, -6.0, 1.0]);

        assert_eq!(p.solve_1d(5.0, 3).unwrap(), 2.0);
    }

    #[test]
    fn triple_root_with_assumed_simple_multiplicity() {
        // without the multiplicity hint convergence is linear and stalls
        // in the rounding noise near the root
        let p = from_coeffs(&[-8.0, 12.0, -6.0, 1.0]);

        let root = p.solve_1d(3.0, 1).unwrap();
        assert_approx_eq!(root, 2.0, 1e-4);
    }

    #[test]
    fn zero_constant_term_short_circuits() {
        // p(x) = x^2 + 3x has the exact root 0
        let p = from_coeffs(&[0.0, 3.0, 1.0]);

        assert_eq!(p.solve_1d(17.0, 1).unwrap(), 0.0);
    }

    #[test]
    fn zero_polynomial_root_is_zero() {
        let p = Polynomial::new(1).unwrap();
        assert_eq!(p.solve_1d(4.0, 1).unwrap(), 0.0);
    }

    #[test]
    fn constant_polynomial_has_no_root() {
        let p = from_coeffs(&[7.0]);

        assert!(matches!(
            p.solve_1d(0.0, 1),
            Err(Error::DivisionByZero(_))
        ));
    }

    #[test]
    fn rootless_quadratic_is_rejected() {
        // p(x) = x^2 + 1 stalls at the stationary point
        let p = from_coeffs(&[1.0, 0.0, 1.0]);

        assert!(p.solve_1d(1.0, 1).is_err());
    }

    #[test]
    fn oscillating_iteration_reports_no_convergence() {
        // Newton's classic 2-cycle: p(x) = x^3 - 2x + 2 from x = 0
        let p = from_coeffs(&[2.0, -2.0, 0.0, 1.0]);

        assert!(matches!(
            p.solve_1d(0.0, 1),
            Err(Error::NoConvergence { .. })
        ));
    }

    #[test]
    fn monotonic_mode_accepts_increasing_polynomial() {
        // p(x) = 5 + 2x
        let p = from_coeffs(&[5.0, 2.0]);

        let root = p.solve_1d_monotonic(0.0, 1).unwrap();
        assert_approx_eq!(root, -2.5, 1e-12);
    }

    #[test]
    fn monotonic_mode_rejects_decreasing_polynomial() {
        // p(x) = 3 - x
        let p = from_coeffs(&[3.0, -1.0]);

        assert!(matches!(
            p.solve_1d_monotonic(0.0, 1),
            Err(Error::NonMonotonic { .. })
        ));
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let p = from_coeffs(&[-5.0, 1.0]);
        assert!(matches!(p.solve_1d(0.0, 0), Err(Error::ZeroMultiplicity)));

        let mut q = Polynomial::new(2).unwrap();
        q.set_coeff(&[1, 1], 1.0).unwrap();
        assert!(matches!(
            q.solve_1d(0.0, 1),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn high_degree_root_from_a_far_guess() {
        // p(x) = (x - 1.25)(x^2 + x + 10), single real root
        let mut p = from_coeffs(&[1.0, 1.0, 1.0]);
        p.set_coeff(&[0], 10.0).unwrap();
        let factor = from_coeffs(&[-1.25, 1.0]);
        p.multiply(&factor).unwrap();

        let root = p.solve_1d(50.0, 1).unwrap();
        assert_approx_eq!(root, 1.25, 1e-9);
    }
}
