use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::flops;
use crate::polynomial::Polynomial;

impl Polynomial {
    /// Fits a polynomial to sample values in the least-squares sense,
    /// dispatching on the number of position slices in `positions` (one
    /// slice per variable, each holding one coordinate per sample).
    ///
    /// `symmetric` optionally asserts, per variable, that the sample
    /// positions are symmetric about their mean; see
    /// [`Polynomial::fit_1d`]. It is only consulted by the 1-D path.
    /// `per_axis_degree` selects the monomial set of the 2-D path; see
    /// [`Polynomial::fit_2d`].
    ///
    /// # Errors
    /// Error is returned when `positions` is empty, holds more than two
    /// slices, or disagrees with `symmetric` in length, and on any failure
    /// of the dispatched fit.
    pub fn fit(
        positions: &[&[f64]],
        values: &[f64],
        symmetric: Option<&[bool]>,
        per_axis_degree: bool,
        mindeg: usize,
        maxdeg: usize,
    ) -> Result<Polynomial> {
        if positions.is_empty() {
            return Err(Error::ZeroDimension);
        }
        if let Some(flags) = symmetric {
            if flags.len() != positions.len() {
                return Err(Error::SizeMismatch {
                    expected: positions.len(),
                    got: flags.len(),
                });
            }
        }
        match positions.len() {
            1 => Self::fit_1d(
                positions[0],
                values,
                mindeg,
                maxdeg,
                symmetric.map(|flags| flags[0]),
            ),
            2 => Self::fit_2d(
                positions[0],
                positions[1],
                values,
                per_axis_degree,
                mindeg,
                maxdeg,
            ),
            _ => Err(Error::Unsupported(
                "least-squares fitting covers 1 and 2 dimensions",
            )),
        }
    }

    /// Fits a univariate polynomial with degrees `mindeg..=maxdeg` to the
    /// samples `(positions[i], values[i])` in the least-squares sense.
    ///
    /// The normal equations are accumulated directly as power sums, without
    /// materializing the Vandermonde matrix, and solved by Cholesky
    /// factorization. When `mindeg` is 0 the positions are centered on
    /// their mean first and the result is shifted back, which keeps the
    /// system well conditioned. `symmetric` asserts that the positions are
    /// symmetric about their mean (`None` detects equidistant sampling
    /// instead); the odd-order power sums are then exactly zero and their
    /// accumulated round-off is discarded.
    ///
    /// # Example
    /// ```
    /// use multipoly::Polynomial;
    ///
    /// // samples of y = 2x + 5
    /// let xs = [-1.0, 0.0, 1.0, 2.0];
    /// let ys = [3.0, 5.0, 7.0, 9.0];
    /// let line = Polynomial::fit_1d(&xs, &ys, 0, 1, None).unwrap();
    ///
    /// assert!((line.get_coeff(&[0]).unwrap() - 5.0).abs() < 1e-12);
    /// assert!((line.get_coeff(&[1]).unwrap() - 2.0).abs() < 1e-12);
    /// ```
    /// # Errors
    /// Error is returned when `positions` and `values` differ in length,
    /// when `mindeg > maxdeg`, when fewer distinct positions than
    /// coefficients are sampled, when the normal matrix is not positive
    /// definite, or when a fitted coefficient comes out NaN.
    pub fn fit_1d(
        positions: &[f64],
        values: &[f64],
        mindeg: usize,
        maxdeg: usize,
        symmetric: Option<bool>,
    ) -> Result<Polynomial> {
        if positions.len() != values.len() {
            return Err(Error::SizeMismatch {
                expected: positions.len(),
                got: values.len(),
            });
        }
        if mindeg > maxdeg {
            return Err(Error::DegreeBounds { mindeg, maxdeg });
        }

        let np = positions.len();
        let nc = maxdeg - mindeg + 1;
        if np < nc {
            return Err(Error::InsufficientData { needed: nc, got: np });
        }
        // A normal matrix built from coincident samples can still pass the
        // factorization on round-off alone, so rank is checked up front.
        let distinct = count_distinct(positions);
        if distinct < nc {
            return Err(Error::InsufficientData {
                needed: nc,
                got: distinct,
            });
        }

        let mut fitted = Polynomial::new(1)?;

        if nc == 1 {
            // Single coefficient: the normal equations collapse to one
            // division, a = Σy·xᵐ / Σx²ᵐ.
            let mut num = 0.0;
            let mut den = 0.0;
            for (&x, &y) in positions.iter().zip(values) {
                let base = x.powi(mindeg as i32);
                num += y * base;
                den += base * base;
            }
            flops::add(4 * np as u64);
            if den == 0.0 {
                return Err(Error::SingularMatrix);
            }
            let coefficient = num / den;
            if coefficient.is_nan() {
                return Err(Error::DivisionByZero("fitted coefficient is NaN"));
            }
            fitted.set_coeff(&[mindeg], coefficient)?;
            return Ok(fitted);
        }

        // Centering is skipped when mindeg > 0, the shift back would
        // reintroduce the lower degrees the caller excluded.
        let mean = if mindeg == 0 {
            Some(positions.iter().sum::<f64>() / np as f64)
        } else {
            None
        };
        let centered;
        let xs = match mean {
            Some(m) => {
                centered = positions.iter().map(|x| x - m).collect::<Vec<f64>>();
                centered.as_slice()
            }
            None => positions,
        };

        // H[(i, j)] only depends on i + j, so the whole Hankel matrix is
        // accumulated as 2nc - 1 running power sums.
        let nsums = 2 * nc - 1;
        let mut hsums = vec![0.0; nsums];
        let mut rhs = DVector::<f64>::zeros(nc);
        for (&x, &y) in xs.iter().zip(values) {
            let base = x.powi(mindeg as i32);
            let mut power = base * base;
            let mut weighted = base * y;
            hsums[0] += power;
            rhs[0] += weighted;
            for k in 1..nsums {
                power *= x;
                hsums[k] += power;
                if k < nc {
                    weighted *= x;
                    rhs[k] += weighted;
                }
            }
        }
        flops::add(np as u64 * (6 * nc as u64 - 3));

        // For samples symmetric about the mean the odd power sums are zero
        // in exact arithmetic; drop their accumulated noise.
        if mean.is_some() && symmetric.unwrap_or_else(|| is_equidistant(positions)) {
            for k in (1..nsums).step_by(2) {
                hsums[k] = 0.0;
            }
        }

        let mut normal = DMatrix::<f64>::zeros(nc, nc);
        for i in 0..nc {
            for j in 0..nc {
                normal[(i, j)] = hsums[i + j];
            }
        }

        let solution = match normal.cholesky() {
            Some(cholesky) => cholesky.solve(&rhs),
            None => return Err(Error::SingularMatrix),
        };
        flops::add((nc * nc * nc) as u64 / 3);
        if solution.iter().any(|coefficient| coefficient.is_nan()) {
            return Err(Error::DivisionByZero("fitted coefficient is NaN"));
        }

        for (j, &coefficient) in solution.iter().enumerate() {
            fitted.set_coeff(&[mindeg + j], coefficient)?;
        }
        if let Some(m) = mean {
            fitted.shift(0, -m)?;
        }
        Ok(fitted)
    }

    /// Fits a bivariate polynomial to the samples
    /// `(x_positions[i], y_positions[i], values[i])` in the least-squares
    /// sense.
    ///
    /// With `per_axis_degree` the fitted monomials `x^i·y^j` are those with
    /// both `i` and `j` in `mindeg..=maxdeg` (a rectangular set); without it
    /// those with `i + j` in `mindeg..=maxdeg` (a triangular set). The
    /// Vandermonde matrix is built explicitly, the normal equations are
    /// formed by its self-product and solved by Cholesky factorization.
    /// When `mindeg` is 0 both coordinates are centered on their means and
    /// the result is shifted back.
    ///
    /// # Errors
    /// Error is returned when the three slices differ in length, when
    /// `mindeg > maxdeg`, when fewer distinct sample points than
    /// coefficients are given, when the normal matrix is not positive
    /// definite, or when a fitted coefficient comes out NaN.
    pub fn fit_2d(
        x_positions: &[f64],
        y_positions: &[f64],
        values: &[f64],
        per_axis_degree: bool,
        mindeg: usize,
        maxdeg: usize,
    ) -> Result<Polynomial> {
        if x_positions.len() != y_positions.len() {
            return Err(Error::SizeMismatch {
                expected: x_positions.len(),
                got: y_positions.len(),
            });
        }
        if x_positions.len() != values.len() {
            return Err(Error::SizeMismatch {
                expected: x_positions.len(),
                got: values.len(),
            });
        }
        if mindeg > maxdeg {
            return Err(Error::DegreeBounds { mindeg, maxdeg });
        }

        let mut monomials: Vec<(usize, usize)> = Vec::new();
        if per_axis_degree {
            for i in mindeg..=maxdeg {
                for j in mindeg..=maxdeg {
                    monomials.push((i, j));
                }
            }
        } else {
            for total in mindeg..=maxdeg {
                for i in 0..=total {
                    monomials.push((i, total - i));
                }
            }
        }
        let nc = monomials.len();
        let np = values.len();
        if np < nc {
            return Err(Error::InsufficientData { needed: nc, got: np });
        }
        let distinct = count_distinct_pairs(x_positions, y_positions);
        if distinct < nc {
            return Err(Error::InsufficientData {
                needed: nc,
                got: distinct,
            });
        }

        let mut fitted = Polynomial::new(2)?;

        if nc == 1 {
            let (i, j) = monomials[0];
            let mut num = 0.0;
            let mut den = 0.0;
            for p in 0..np {
                let base = x_positions[p].powi(i as i32) * y_positions[p].powi(j as i32);
                num += values[p] * base;
                den += base * base;
            }
            flops::add(5 * np as u64);
            if den == 0.0 {
                return Err(Error::SingularMatrix);
            }
            let coefficient = num / den;
            if coefficient.is_nan() {
                return Err(Error::DivisionByZero("fitted coefficient is NaN"));
            }
            fitted.set_coeff(&[i, j], coefficient)?;
            return Ok(fitted);
        }

        let means = if mindeg == 0 {
            let mx = x_positions.iter().sum::<f64>() / np as f64;
            let my = y_positions.iter().sum::<f64>() / np as f64;
            Some((mx, my))
        } else {
            None
        };

        let mut vandermonde = DMatrix::<f64>::zeros(np, nc);
        let mut xpow = vec![1.0; maxdeg + 1];
        let mut ypow = vec![1.0; maxdeg + 1];
        for p in 0..np {
            let (u, v) = match means {
                Some((mx, my)) => (x_positions[p] - mx, y_positions[p] - my),
                None => (x_positions[p], y_positions[p]),
            };
            for d in 1..=maxdeg {
                xpow[d] = xpow[d - 1] * u;
                ypow[d] = ypow[d - 1] * v;
            }
            for (c, &(i, j)) in monomials.iter().enumerate() {
                vandermonde[(p, c)] = xpow[i] * ypow[j];
            }
        }
        flops::add(np as u64 * (2 * maxdeg as u64 + nc as u64));

        let normal = vandermonde.tr_mul(&vandermonde);
        let rhs = vandermonde.tr_mul(&DVector::from_column_slice(values));
        flops::add(2 * np as u64 * (nc as u64 + 1) * nc as u64);

        let solution = match normal.cholesky() {
            Some(cholesky) => cholesky.solve(&rhs),
            None => return Err(Error::SingularMatrix),
        };
        flops::add((nc * nc * nc) as u64 / 3);
        if solution.iter().any(|coefficient| coefficient.is_nan()) {
            return Err(Error::DivisionByZero("fitted coefficient is NaN"));
        }

        for (c, &(i, j)) in monomials.iter().enumerate() {
            fitted.set_coeff(&[i, j], solution[c])?;
        }
        if let Some((mx, my)) = means {
            fitted.shift(0, -mx)?;
            fitted.shift(1, -my)?;
        }
        Ok(fitted)
    }

    /// Returns `values[i] - p(positions…[i])` for every sample, the
    /// residuals left by this polynomial as a fit of the samples.
    ///
    /// # Errors
    /// Error is returned when the number of position slices differs from
    /// the polynomial dimension or any slice differs from `values` in
    /// length.
    pub fn residuals(&self, positions: &[&[f64]], values: &[f64]) -> Result<Vec<f64>> {
        if positions.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: positions.len(),
            });
        }
        for coordinates in positions {
            if coordinates.len() != values.len() {
                return Err(Error::SizeMismatch {
                    expected: values.len(),
                    got: coordinates.len(),
                });
            }
        }

        let mut point = vec![0.0; positions.len()];
        let mut residuals = Vec::with_capacity(values.len());
        for (p, &value) in values.iter().enumerate() {
            for (axis, coordinates) in positions.iter().enumerate() {
                point[axis] = coordinates[p];
            }
            residuals.push(value - self.eval(&point)?);
        }
        flops::add(values.len() as u64);
        Ok(residuals)
    }
}

fn count_distinct(values: &[f64]) -> usize {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    1 + sorted.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

fn count_distinct_pairs(xs: &[f64], ys: &[f64]) -> usize {
    if xs.is_empty() {
        return 0;
    }
    let mut sorted: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    1 + sorted.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

/// Samples on a uniform grid are symmetric about their mean, which the
/// 1-D fit exploits. The tolerance scales with the sample count to absorb
/// the rounding of an inexact grid stride.
fn is_equidistant(positions: &[f64]) -> bool {
    if positions.len() < 3 {
        return true;
    }
    let step = (positions[positions.len() - 1] - positions[0]) / (positions.len() - 1) as f64;
    let tolerance = step.abs() * f64::EPSILON * positions.len() as f64;
    positions
        .windows(2)
        .all(|pair| ((pair[1] - pair[0]) - step).abs() <= tolerance)
}

#[cfg(test)]
mod tests {

    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::Rng;
    use std::time::Instant;

    #[test]
    fn linear_fit_recovers_slope_and_intercept() {
        let xs = [-1.0, 0.0, 1.0, 2.0];
        let ys = [3.0, 5.0, 7.0, 9.0];

        let fitted = Polynomial::fit_1d(&xs, &ys, 0, 1, None).unwrap();

        let eps = 1e-12;
        assert_eq!(fitted.get_dimension(), 1);
        assert_eq!(fitted.get_degree(), 1);
        assert_approx_eq!(fitted.get_coeff(&[0]).unwrap(), 5.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[1]).unwrap(), 2.0, eps);
    }

    #[test]
    fn residuals_of_an_exact_fit_vanish() {
        let xs = [-1.0, 0.0, 1.0, 2.0];
        let ys = [3.0, 5.0, 7.0, 9.0];

        let fitted = Polynomial::fit_1d(&xs, &ys, 0, 1, None).unwrap();
        let residuals = fitted.residuals(&[&xs], &ys).unwrap();

        assert_eq!(residuals.len(), 4);
        for residual in residuals {
            assert_approx_eq!(residual, 0.0, 1e-12);
        }
    }

    #[test]
    fn quadratic_fit_reproduces_exact_samples() {
        // y = 1 - 2x + 0.5x²
        let xs: Vec<f64> = (0..7).map(|i| i as f64 - 3.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 1.0 - 2.0 * x + 0.5 * x * x).collect();

        let fitted = Polynomial::fit_1d(&xs, &ys, 0, 2, None).unwrap();

        let eps = 1e-12;
        assert_eq!(fitted.get_degree(), 2);
        assert_approx_eq!(fitted.get_coeff(&[0]).unwrap(), 1.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[1]).unwrap(), -2.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[2]).unwrap(), 0.5, eps);
    }

    #[test]
    fn fit_with_positive_mindeg_skips_lower_degrees() {
        // y = 2x + 4x³ is odd, so the even coefficient must come out zero.
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 4.0 * x * x * x).collect();

        let fitted = Polynomial::fit_1d(&xs, &ys, 1, 3, None).unwrap();

        let eps = 1e-12;
        assert_approx_eq!(fitted.get_coeff(&[1]).unwrap(), 2.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[3]).unwrap(), 4.0, eps);
        assert_eq!(fitted.get_coeff(&[0]).unwrap(), 0.0);
        assert_eq!(fitted.get_coeff(&[2]).unwrap(), 0.0);
        assert_eq!(fitted.coefficient_count(), 2);
    }

    #[test]
    fn single_coefficient_fit_is_solved_in_closed_form() {
        // y = 2x² sampled exactly: a = Σy·x² / Σx⁴ = 196 / 98.
        let xs = [1.0, 2.0, 3.0];
        let ys = [2.0, 8.0, 18.0];

        let fitted = Polynomial::fit_1d(&xs, &ys, 2, 2, None).unwrap();

        assert_eq!(fitted.coefficient_count(), 1);
        assert_approx_eq!(fitted.get_coeff(&[2]).unwrap(), 2.0, 1e-14);
    }

    #[test]
    fn symmetric_flag_matches_detection_on_an_even_grid() {
        let xs: Vec<f64> = (0..8).map(|i| 0.5 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| -1.0 + 0.25 * x - x * x).collect();

        let asserted = Polynomial::fit_1d(&xs, &ys, 0, 2, Some(true)).unwrap();
        let detected = Polynomial::fit_1d(&xs, &ys, 0, 2, None).unwrap();

        assert!(asserted.approx_eq(&detected, 1e-14));
    }

    #[test]
    fn coincident_samples_are_rejected() {
        let xs = [2.0, 2.0, 2.0, 5.0];
        let ys = [1.0, 1.0, 1.0, 4.0];
        assert_eq!(
            Polynomial::fit_1d(&xs, &ys, 0, 2, None),
            Err(Error::InsufficientData { needed: 3, got: 2 })
        );

        // Too few samples altogether.
        assert_eq!(
            Polynomial::fit_1d(&[0.0, 1.0], &[1.0, 2.0], 0, 2, None),
            Err(Error::InsufficientData { needed: 3, got: 2 })
        );
    }

    #[test]
    fn degenerate_positions_make_the_system_singular() {
        // x = 0 throughout while fitting x² only.
        let result = Polynomial::fit_1d(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0], 2, 2, None);
        assert_eq!(result, Err(Error::SingularMatrix));
    }

    #[test]
    fn nan_sample_values_are_reported() {
        let xs = [-1.0, 0.0, 1.0, 2.0];
        let ys = [3.0, f64::NAN, 7.0, 9.0];
        let result = Polynomial::fit_1d(&xs, &ys, 0, 1, None);
        assert_eq!(result, Err(Error::DivisionByZero("fitted coefficient is NaN")));
    }

    #[test]
    fn rectangular_surface_fit_recovers_bilinear_coefficients() {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut zs = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                let (xf, yf) = (x as f64, y as f64);
                xs.push(xf);
                ys.push(yf);
                zs.push(1.0 + 2.0 * xf + 3.0 * yf + 0.5 * xf * yf);
            }
        }

        let fitted = Polynomial::fit_2d(&xs, &ys, &zs, true, 0, 1).unwrap();

        let eps = 1e-12;
        assert_eq!(fitted.get_dimension(), 2);
        assert_approx_eq!(fitted.get_coeff(&[0, 0]).unwrap(), 1.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[1, 0]).unwrap(), 2.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[0, 1]).unwrap(), 3.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[1, 1]).unwrap(), 0.5, eps);

        let residuals = fitted.residuals(&[&xs, &ys], &zs).unwrap();
        for residual in residuals {
            assert_approx_eq!(residual, 0.0, 1e-12);
        }
    }

    #[test]
    fn triangular_surface_fit_recovers_a_paraboloid() {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut zs = Vec::new();
        for x in -1..=1 {
            for y in -1..=1 {
                let (xf, yf) = (x as f64, y as f64);
                xs.push(xf);
                ys.push(yf);
                zs.push(xf * xf + yf * yf);
            }
        }

        let fitted = Polynomial::fit_2d(&xs, &ys, &zs, false, 0, 2).unwrap();

        let eps = 1e-12;
        assert_eq!(fitted.get_degree(), 2);
        assert_approx_eq!(fitted.get_coeff(&[2, 0]).unwrap(), 1.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[0, 2]).unwrap(), 1.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[0, 0]).unwrap(), 0.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[1, 1]).unwrap(), 0.0, eps);
        assert_approx_eq!(fitted.eval(&[2.0, 3.0]).unwrap(), 13.0, 1e-10);
    }

    #[test]
    fn triangular_fit_with_positive_mindeg_keeps_the_form() {
        // z = 2x + 3y fitted without a constant term.
        let xs = [1.0, 0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 1.0, 1.0];
        let zs = [2.0, 3.0, 5.0, 7.0];

        let fitted = Polynomial::fit_2d(&xs, &ys, &zs, false, 1, 1).unwrap();

        let eps = 1e-12;
        assert_approx_eq!(fitted.get_coeff(&[1, 0]).unwrap(), 2.0, eps);
        assert_approx_eq!(fitted.get_coeff(&[0, 1]).unwrap(), 3.0, eps);
        assert_eq!(fitted.get_coeff(&[0, 0]).unwrap(), 0.0);
        assert_eq!(fitted.coefficient_count(), 2);
    }

    #[test]
    fn rectangular_fit_with_positive_mindeg() {
        // z = 4xy, the only monomial with both powers in 1..=1.
        let xs = [1.0, 1.0, 2.0, 2.0];
        let ys = [1.0, 2.0, 1.0, 2.0];
        let zs = [4.0, 8.0, 8.0, 16.0];

        let fitted = Polynomial::fit_2d(&xs, &ys, &zs, true, 1, 1).unwrap();

        assert_eq!(fitted.coefficient_count(), 1);
        assert_eq!(fitted.get_degree(), 2);
        assert_eq!(fitted.get_coeff(&[1, 1]).unwrap(), 4.0);
    }

    #[test]
    fn samples_on_one_axis_make_the_system_singular() {
        // Every fitted monomial contains x, so sampling the x = 0 line
        // yields an exactly zero normal matrix.
        let xs = [0.0; 5];
        let ys = [0.0, 1.0, 2.0, 3.0, 4.0];
        let zs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let result = Polynomial::fit_2d(&xs, &ys, &zs, true, 1, 2);
        assert_eq!(result, Err(Error::SingularMatrix));
    }

    #[test]
    fn surface_fit_needs_enough_distinct_samples() {
        // Four coefficients from three samples.
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 2.0];
        let zs = [1.0, 2.0, 3.0];
        assert_eq!(
            Polynomial::fit_2d(&xs, &ys, &zs, true, 0, 1),
            Err(Error::InsufficientData { needed: 4, got: 3 })
        );

        // Enough samples but only three distinct positions.
        let xs = [0.0, 1.0, 2.0, 0.0, 1.0];
        let ys = [0.0, 1.0, 2.0, 0.0, 1.0];
        let zs = [1.0, 2.0, 3.0, 1.0, 2.0];
        assert_eq!(
            Polynomial::fit_2d(&xs, &ys, &zs, true, 0, 1),
            Err(Error::InsufficientData { needed: 4, got: 3 })
        );
    }

    #[test]
    fn fit_dispatcher_routes_by_dimension() {
        let xs = [-1.0, 0.0, 1.0, 2.0];
        let ys = [3.0, 5.0, 7.0, 9.0];
        let via_dispatch = Polynomial::fit(&[&xs], &ys, None, false, 0, 1).unwrap();
        let direct = Polynomial::fit_1d(&xs, &ys, 0, 1, None).unwrap();
        assert_eq!(via_dispatch, direct);

        let xs = [1.0, 1.0, 2.0, 2.0];
        let ys = [1.0, 2.0, 1.0, 2.0];
        let zs = [4.0, 8.0, 8.0, 16.0];
        let via_dispatch = Polynomial::fit(&[&xs, &ys], &zs, None, true, 1, 1).unwrap();
        let direct = Polynomial::fit_2d(&xs, &ys, &zs, true, 1, 1).unwrap();
        assert_eq!(via_dispatch, direct);
    }

    #[test]
    fn fit_dispatcher_validates_its_arguments() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [1.0, 3.0, 5.0];

        assert_eq!(
            Polynomial::fit(&[], &ys, None, false, 0, 1),
            Err(Error::ZeroDimension)
        );
        assert_eq!(
            Polynomial::fit(&[&xs], &ys, Some(&[true, false]), false, 0, 1),
            Err(Error::SizeMismatch { expected: 1, got: 2 })
        );

        let three_axes = [&xs[..], &xs[..], &xs[..]];
        assert_eq!(
            Polynomial::fit(&three_axes, &ys, None, false, 0, 1),
            Err(Error::Unsupported(
                "least-squares fitting covers 1 and 2 dimensions"
            ))
        );
        assert_eq!(
            Polynomial::fit(&[&xs], &ys, None, false, 3, 1),
            Err(Error::DegreeBounds { mindeg: 3, maxdeg: 1 })
        );
    }

    #[test]
    fn residuals_validate_dimensions_and_sizes() {
        let mut line = Polynomial::new(1).unwrap();
        line.set_coeff(&[1], 2.0).unwrap();

        let xs = [0.0, 1.0];
        let values = [0.0, 2.0, 4.0];
        assert_eq!(
            line.residuals(&[&xs, &xs], &values),
            Err(Error::DimensionMismatch { expected: 1, got: 2 })
        );
        assert_eq!(
            line.residuals(&[&xs], &values),
            Err(Error::SizeMismatch { expected: 3, got: 2 })
        );
    }

    #[test]
    fn equidistance_detection_tolerates_grid_rounding() {
        assert!(!is_equidistant(&[0.0, 1.0, 2.5, 3.0]));
        assert!(is_equidistant(&[1.0, 2.0]));

        let grid: Vec<f64> = (0..10).map(|i| 0.1 * i as f64).collect();
        assert!(is_equidistant(&grid));
    }

    #[test]
    fn distinct_count_ignores_ordering_and_duplicates() {
        assert_eq!(count_distinct(&[3.0, 1.0, 3.0, 2.0, 1.0]), 3);
        assert_eq!(count_distinct(&[]), 0);
        assert_eq!(count_distinct_pairs(&[0.0, 0.0, 1.0], &[1.0, 1.0, 1.0]), 2);
    }

    #[test]
    #[ignore]
    fn fit_performance() {
        let number_of_samples = 10_000;
        let mut rng = rand::thread_rng();

        let mut xs: Vec<f64> = Vec::with_capacity(number_of_samples);
        let mut ys: Vec<f64> = Vec::with_capacity(number_of_samples);
        for _ in 0..number_of_samples {
            let x: f64 = rng.gen_range(-1.0..1.0);
            let noise: f64 = rng.gen_range(-1e-6..1e-6);
            xs.push(x);
            ys.push(0.5 - 1.5 * x + 0.25 * x * x * x + noise);
        }

        let start = Instant::now();
        let fitted = Polynomial::fit_1d(&xs, &ys, 0, 3, None).unwrap();
        let duration = start.elapsed();
        println!("fit of {} samples: {:?}", number_of_samples, duration);

        assert_approx_eq!(fitted.get_coeff(&[0]).unwrap(), 0.5, 1e-3);
        assert_approx_eq!(fitted.get_coeff(&[1]).unwrap(), -1.5, 1e-3);
        assert_approx_eq!(fitted.get_coeff(&[3]).unwrap(), 0.25, 1e-3);
    }
}
