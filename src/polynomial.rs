use std::fmt;

use crate::error::{Error, Result};
use crate::node::{self, CoeffNode};

/// A sparse polynomial in an arbitrary, fixed number of variables.
///
/// Coefficients live in a recursive tree with one level per variable;
/// only non-zero coefficients (and the subtrees leading to them) are
/// stored, so a high-degree polynomial with few terms stays small. The
/// identically-zero polynomial stores no tree at all.
/// - `dimension` - number of variables, at least 1, fixed at construction,
/// - `degree` - highest sum of exponents among non-zero coefficients,
/// - coefficients are addressed by a power vector with one exponent per
///   variable, e.g. `[1, 2]` for `x0 * x1^2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    pub(crate) dimension: usize,
    pub(crate) degree: usize,
    pub(crate) root: Option<CoeffNode>,
}

impl Polynomial {
    /// Creates the zero polynomial in `dimension` variables.
    ///
    /// # Example
    /// ```
    /// use multipoly::Polynomial;
    ///
    /// // p(x) = 1 + 2x + 3x^2
    /// let mut p = Polynomial::new(1).unwrap();
    /// p.set_coeff(&[2], 3.0).unwrap();
    /// p.set_coeff(&[1], 2.0).unwrap();
    /// p.set_coeff(&[0], 1.0).unwrap();
    ///
    /// assert_eq!(p.eval_1d(2.0).unwrap(), 17.0);
    /// ```
    /// # Errors
    /// Error is returned when `dimension` is 0.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::ZeroDimension);
        }
        Ok(Polynomial {
            dimension,
            degree: 0,
            root: None,
        })
    }

    pub fn get_dimension(&self) -> usize {
        self.dimension
    }

    pub fn get_degree(&self) -> usize {
        self.degree
    }

    /// True when no coefficient is set.
    pub fn is_zero(&self) -> bool {
        self.root.is_none()
    }

    /// Number of non-zero coefficients.
    pub fn coefficient_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.term_count())
    }

    /// Reads the coefficient of the monomial given by `pows`, one exponent
    /// per variable. Unset coefficients read as 0.
    ///
    /// # Errors
    /// Error is returned when `pows` does not have one entry per variable.
    pub fn get_coeff(&self, pows: &[usize]) -> Result<f64> {
        if pows.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: pows.len(),
            });
        }
        Ok(self
            .root
            .as_ref()
            .map_or(0.0, |root| root.get(pows, self.dimension - 1)))
    }

    /// Sets the coefficient of the monomial given by `pows`. Setting 0
    /// removes the coefficient. Inserting the highest-degree coefficients
    /// first avoids repeated growing of the backing storage.
    ///
    /// # Example
    /// ```
    /// use multipoly::Polynomial;
    ///
    /// // p(x0, x1) = 4 * x0 * x1^2
    /// let mut p = Polynomial::new(2).unwrap();
    /// p.set_coeff(&[1, 2], 4.0).unwrap();
    ///
    /// assert_eq!(p.get_coeff(&[1, 2]).unwrap(), 4.0);
    /// assert_eq!(p.get_degree(), 3);
    ///
    /// p.set_coeff(&[1, 2], 0.0).unwrap();
    /// assert!(p.is_zero());
    /// ```
    /// # Errors
    /// Error is returned when `pows` does not have one entry per variable.
    pub fn set_coeff(&mut self, pows: &[usize], value: f64) -> Result<()> {
        if pows.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: pows.len(),
            });
        }
        let level = self.dimension - 1;
        if value == 0.0 {
            if let Some(root) = self.root.as_mut() {
                root.clear(pows, level);
                if root.prune() {
                    self.root = None;
                }
                self.rescan_degree();
            }
            return Ok(());
        }
        self.root
            .get_or_insert_with(|| CoeffNode::new_level(level))
            .set(pows, level, value);
        self.degree = self.degree.max(pows.iter().sum());
        Ok(())
    }

    /// Compares two polynomials coefficient by coefficient with an absolute
    /// `tolerance`. Polynomials of different dimension are unequal.
    pub fn approx_eq(&self, other: &Polynomial, tolerance: f64) -> bool {
        self.dimension == other.dimension
            && node::approx_eq_nodes(self.root.as_ref(), other.root.as_ref(), tolerance)
    }

    /// Adds `other` in place.
    ///
    /// # Errors
    /// Error is returned when the dimensions differ.
    pub fn add(&mut self, other: &Polynomial) -> Result<()> {
        self.combine(other, 1.0)
    }

    /// Subtracts `other` in place.
    ///
    /// # Errors
    /// Error is returned when the dimensions differ.
    pub fn subtract(&mut self, other: &Polynomial) -> Result<()> {
        self.combine(other, -1.0)
    }

    /// Multiplies every coefficient by `factor` in place. A zero factor
    /// empties the polynomial.
    pub fn multiply_scalar(&mut self, factor: f64) {
        if factor == 0.0 {
            self.root = None;
            self.degree = 0;
            return;
        }
        if let Some(root) = self.root.as_mut() {
            root.scale(factor);
            // products can underflow to exact zero
            if root.prune() {
                self.root = None;
            }
            self.rescan_degree();
        }
    }

    /// Multiplies by `other` in place. Every non-zero monomial of `other`
    /// contributes one scaled, power-shifted copy of `self` to the product,
    /// which is built in a fresh tree and swapped in. Squaring a polynomial
    /// therefore requires a clone: `p.multiply(&q)` where `q = p.clone()`.
    ///
    /// # Errors
    /// Error is returned when the dimensions differ.
    pub fn multiply(&mut self, other: &Polynomial) -> Result<()> {
        if other.dimension != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: other.dimension,
            });
        }
        let level = self.dimension - 1;
        let product = match (self.root.as_ref(), other.root.as_ref()) {
            (Some(a), Some(b)) => {
                let mut result = CoeffNode::new_level(level);
                let mut pows = vec![0usize; self.dimension];
                b.walk(&mut pows, level, &mut |offset, factor| {
                    result.accumulate_scaled(a, offset, level, factor);
                });
                Some(result)
            }
            _ => None,
        };
        self.root = match product {
            Some(mut node) => {
                // partial products may cancel, e.g. (x + 1)(x - 1)
                if node.prune() {
                    None
                } else {
                    Some(node)
                }
            }
            None => None,
        };
        self.rescan_degree();
        Ok(())
    }

    /// Differentiates in place with respect to variable `var`.
    ///
    /// # Example
    /// ```
    /// use multipoly::Polynomial;
    ///
    /// // d/dx (x^3) = 3x^2
    /// let mut p = Polynomial::new(1).unwrap();
    /// p.set_coeff(&[3], 1.0).unwrap();
    /// p.derivative(0).unwrap();
    ///
    /// assert_eq!(p.get_coeff(&[2]).unwrap(), 3.0);
    /// assert_eq!(p.get_degree(), 2);
    /// ```
    /// # Errors
    /// Error is returned when `var` is not a variable of the polynomial.
    pub fn derivative(&mut self, var: usize) -> Result<()> {
        if var >= self.dimension {
            return Err(Error::VariableOutOfRange {
                variable: var,
                dimension: self.dimension,
            });
        }
        if let Some(root) = self.root.as_mut() {
            if root.derivative(var, self.dimension - 1) {
                self.root = None;
            }
            self.rescan_degree();
        }
        Ok(())
    }

    /// Collapses variable `var` to the constant polynomial `substitute`,
    /// returning a polynomial in one variable less. Variables above `var`
    /// move down one index.
    ///
    /// # Errors
    /// Error is returned when the polynomial has fewer than two variables,
    /// when `var` is out of range, or when `substitute` is not constant.
    /// Substituting a non-constant polynomial is not supported.
    pub fn extract(&self, var: usize, substitute: &Polynomial) -> Result<Polynomial> {
        if self.dimension < 2 {
            return Err(Error::Unsupported(
                "extraction needs a polynomial in at least two variables",
            ));
        }
        if var >= self.dimension {
            return Err(Error::VariableOutOfRange {
                variable: var,
                dimension: self.dimension,
            });
        }
        if substitute.degree != 0 {
            return Err(Error::Unsupported(
                "extraction substitutes constant polynomials only",
            ));
        }
        let c = substitute.root.as_ref().map_or(0.0, |r| r.constant_term());
        let mut collapsed = Polynomial {
            dimension: self.dimension - 1,
            degree: 0,
            root: None,
        };
        if let Some(root) = self.root.as_ref() {
            let zeros = vec![0usize; self.dimension];
            collapsed.root = root.extract(var, self.dimension - 1, c, &zeros);
            if let Some(node) = collapsed.root.as_mut() {
                if node.prune() {
                    collapsed.root = None;
                }
            }
            collapsed.rescan_degree();
        }
        Ok(collapsed)
    }

    /// Replaces `p(.., x_var, ..)` by `p(.., x_var + offset, ..)` in place.
    /// The transformation is exact in the coefficients up to rounding; the
    /// degree never changes.
    ///
    /// # Errors
    /// Error is returned when `var` is not a variable of the polynomial.
    pub fn shift(&mut self, var: usize, offset: f64) -> Result<()> {
        if var >= self.dimension {
            return Err(Error::VariableOutOfRange {
                variable: var,
                dimension: self.dimension,
            });
        }
        if offset == 0.0 {
            return Ok(());
        }
        if let Some(root) = self.root.as_mut() {
            let zeros = vec![0usize; self.dimension];
            root.shift(var, self.dimension - 1, offset, &zeros);
            if root.prune() {
                self.root = None;
            }
            self.rescan_degree();
        }
        Ok(())
    }

    /// Evaluates the polynomial at `point`, one value per variable, by
    /// Horner's rule applied from the highest variable down.
    ///
    /// # Errors
    /// Error is returned when `point` does not have one value per variable.
    pub fn eval(&self, point: &[f64]) -> Result<f64> {
        if point.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: point.len(),
            });
        }
        Ok(self
            .root
            .as_ref()
            .map_or(0.0, |root| root.eval(point, self.dimension - 1)))
    }

    /// Evaluates a univariate polynomial at `x`.
    ///
    /// # Errors
    /// Error is returned when the polynomial is not univariate.
    pub fn eval_1d(&self, x: f64) -> Result<f64> {
        self.require_univariate()?;
        Ok(self
            .univariate_coeffs()
            .map_or(0.0, |coeffs| node::horner(coeffs, x)))
    }

    /// Evaluates a univariate polynomial and its first derivative at `x` in
    /// a single pass.
    ///
    /// # Errors
    /// Error is returned when the polynomial is not univariate.
    pub fn eval_1d_with_derivative(&self, x: f64) -> Result<(f64, f64)> {
        self.require_univariate()?;
        Ok(self
            .univariate_coeffs()
            .map_or((0.0, 0.0), |coeffs| node::horner_with_derivative(coeffs, x)))
    }

    /// Evaluates `(p(a) - p(b), p(a))` for a univariate polynomial. The
    /// difference is computed exactly rather than as a difference of two
    /// rounded evaluations, which matters when `a` and `b` are close.
    ///
    /// # Errors
    /// Error is returned when the polynomial is not univariate.
    pub fn eval_1d_diff(&self, a: f64, b: f64) -> Result<(f64, f64)> {
        self.require_univariate()?;
        Ok(self
            .univariate_coeffs()
            .map_or((0.0, 0.0), |coeffs| node::horner_diff(coeffs, a, b)))
    }

    /// Dense coefficient slice of a univariate polynomial, lowest power
    /// first. `None` for the zero polynomial.
    pub(crate) fn univariate_coeffs(&self) -> Option<&[f64]> {
        match self.root.as_ref() {
            Some(CoeffNode::Leaf(coeffs)) => Some(coeffs),
            _ => None,
        }
    }

    pub(crate) fn require_univariate(&self) -> Result<()> {
        if self.dimension != 1 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                got: self.dimension,
            });
        }
        Ok(())
    }

    fn combine(&mut self, other: &Polynomial, sign: f64) -> Result<()> {
        if other.dimension != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: other.dimension,
            });
        }
        if let Some(src) = other.root.as_ref() {
            let level = self.dimension - 1;
            let offset = vec![0usize; self.dimension];
            let dst = self
                .root
                .get_or_insert_with(|| CoeffNode::new_level(level));
            dst.accumulate_scaled(src, &offset, level, sign);
            if dst.prune() {
                self.root = None;
            }
            self.rescan_degree();
        }
        Ok(())
    }

    fn rescan_degree(&mut self) {
        self.degree = self.root.as_ref().map_or(0, |root| root.total_degree());
    }
}

/// Diagnostic dump: one line per non-zero coefficient with the exponent of
/// each variable followed by the coefficient value.
impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# {}-dimensional polynomial of degree {}",
            self.dimension, self.degree
        )?;
        let mut rows: Vec<(Vec<usize>, f64)> = Vec::new();
        if let Some(root) = self.root.as_ref() {
            let mut pows = vec![0usize; self.dimension];
            root.walk(&mut pows, self.dimension - 1, &mut |p, v| {
                rows.push((p.to_vec(), v));
            });
        }
        for (pows, value) in rows.iter() {
            for p in pows {
                write!(f, "{} ", p)?;
            }
            writeln!(f, " {}", value)?;
        }
        writeln!(f, "# {} non-zero coefficients", rows.len())
    }
}
