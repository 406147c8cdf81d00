//! Real polynomial arithmetic and root extraction.
//!
//! Coefficients are ordered highest power first, as in numpy: `[1.0, 2.0, 3.0]`
//! represents s² + 2s + 3.

use std::f64::consts::PI;
use log::debug;
use nalgebra::{DMatrix, Schur};
use num_complex::{Complex, Complex64};
use num_traits::Zero;
use crate::errors::Error;
use crate::errors::Error::{DegenerateInput, InternalError};

/// QR sweeps allowed per eigenvalue before the Schur decomposition gives up.
const SCHUR_SWEEPS_PER_ROOT: usize = 30;

/// Iterations allowed for the simultaneous (Aberth) root refinement.
const ABERTH_MAX_ITER: usize = 500;

/// Remove the leading (highest power) zero coefficients.
///
/// Returns an empty slice if every coefficient is zero.
pub fn trim_leading_zeros(coeffs: &[f64]) -> &[f64] {
    match coeffs.iter().position(|c| *c != 0.0) {
        Some(first) => &coeffs[first..],
        None => &[],
    }
}

/// Return the roots of a polynomial with real coefficients.
///
/// A polynomial of degree `n` has exactly `n` roots, counted with multiplicity.
/// The roots are the eigenvalues of the companion matrix of the monic polynomial,
/// except for trailing zero coefficients which contribute roots at the origin.
/// Companion matrices on which the QR iteration stalls, e.g. for s⁴ + 1, are
/// solved by Aberth iteration instead.
///
/// # Arguments
///
/// * `coeffs` - The coefficients, highest power first. Leading zeros are ignored.
///
/// # Errors
///
/// * [`Error::DegenerateInput`] when `coeffs` is empty or all zero.
/// * [`Error::InternalError`] if neither method converges.
///
/// # Example
///
/// ```rust
/// use lti_analysis::polynomial::roots;
///
/// // s² + 3s + 2 = (s + 1)(s + 2)
/// let r = roots(&[1.0, 3.0, 2.0]).unwrap();
///
/// assert_eq!(r.len(), 2);
/// assert!(r.iter().all(|x| (x.re + 1.0).abs() < 1E-12 || (x.re + 2.0).abs() < 1E-12));
/// ```
pub fn roots(coeffs: &[f64]) -> Result<Vec<Complex64>, Error> {
    let p = trim_leading_zeros(coeffs);

    if p.is_empty() {
        return Err(DegenerateInput("Polynomial coefficients must not all be zero.".to_string()));
    }

    // Trailing zeros factor out as powers of s.
    let trailing = p.iter().rev().take_while(|c| **c == 0.0).count();
    let p = &p[..p.len() - trailing];

    let mut r: Vec<Complex64> = vec![Complex64::zero(); trailing];

    let n = p.len() - 1;
    match n {
        0 => {}
        1 => r.push(Complex::new(-p[1] / p[0], 0.0)),
        _ => {
            let mut companion = DMatrix::<f64>::zeros(n, n);

            for j in 0..n {
                companion[(0, j)] = -p[j + 1] / p[0];
            }

            for i in 1..n {
                companion[(i, i - 1)] = 1.0;
            }

            match Schur::try_new(companion, f64::EPSILON, SCHUR_SWEEPS_PER_ROOT * n) {
                Some(schur) => r.extend(schur.complex_eigenvalues().iter().map(|x| Complex::new(x.re, x.im))),
                None => {
                    debug!("roots: Schur decomposition did not converge for degree {}, using Aberth iteration", n);

                    let refined = aberth(p, ABERTH_MAX_ITER)
                        .ok_or_else(|| InternalError(format!("Root finding did not converge for a polynomial of degree {}.", n)))?;

                    r.extend(refined);
                }
            }
        }
    }

    Ok(r)
}

/// Find all roots of `p` simultaneously by Aberth-Ehrlich iteration.
///
/// `p` must have a non-zero leading and constant coefficient. Returns `None`
/// if the estimates neither settle within `max_iter` sweeps nor solve `p`
/// to a small backward error.
pub(crate) fn aberth(p: &[f64], max_iter: usize) -> Option<Vec<Complex64>> {
    let n = p.len().checked_sub(1)?;
    if n == 0 {
        return Some(vec![]);
    }

    let dp: Vec<f64> = p[..n].iter().enumerate().map(|(i, c)| c * (n - i) as f64).collect();

    // Start on the circle of the geometric mean root magnitude, rotated off any symmetry axis.
    let radius = (p[n] / p[0]).abs().powf(1.0 / n as f64).max(f64::MIN_POSITIVE);
    let mut z: Vec<Complex64> = (0..n)
        .map(|k| Complex::from_polar(radius, 2.0 * PI * k as f64 / n as f64 + 0.4))
        .collect();

    for _ in 0..max_iter {
        let mut largest_step = 0.0_f64;

        for k in 0..n {
            let pk = polyval(p, z[k]);
            if pk.norm() == 0.0 {
                continue;
            }

            let ratio = pk / polyval(&dp, z[k]);
            let repulsion: Complex64 = (0..n)
                .filter(|j| *j != k)
                .map(|j| (z[k] - z[j]).inv())
                .sum();

            let step = ratio / (Complex64::new(1.0, 0.0) - ratio * repulsion);
            if !(step.re.is_finite() && step.im.is_finite()) {
                // Derivative vanished: nudge the estimate and retry on the next sweep.
                z[k] += Complex::new(radius * 1E-3, radius * 1E-3);
                largest_step = f64::INFINITY;
                continue;
            }

            z[k] -= step;
            largest_step = largest_step.max(step.norm() / z[k].norm().max(1.0));
        }

        if largest_step <= 1E-14 {
            return Some(z);
        }
    }

    // Multiple roots only converge to about sqrt(ϵ); accept them on a small backward error.
    let settled = z.iter().all(|x| {
        let scale = p.iter().rev().enumerate().map(|(i, c)| c.abs() * x.norm().powi(i as i32)).sum::<f64>();

        x.re.is_finite() && x.im.is_finite() && polyval(p, *x).norm() <= 1E-8 * scale
    });

    if settled { Some(z) } else { None }
}

/// Evaluate a real polynomial at the complex point `x` by Horner's rule.
///
/// An empty coefficient slice evaluates to zero.
pub fn polyval(coeffs: &[f64], x: Complex64) -> Complex64 {
    coeffs
        .iter()
        .fold(Complex64::zero(), |acc, c| acc * x + *c)
}

/// Polynomial long division.
///
/// Returns `(quotient, remainder)` such that `num = quotient * den + remainder`.
/// The remainder always has `len(den) - 1` coefficients (or fewer for a constant
/// divisor), the quotient `max(len(num) - len(den) + 1, 1)`.
///
/// # Errors
///
/// [`Error::DegenerateInput`] when `den` is all zero.
pub fn polydiv(num: &[f64], den: &[f64]) -> Result<(Vec<f64>, Vec<f64>), Error> {
    let den = trim_leading_zeros(den);

    if den.is_empty() {
        return Err(DegenerateInput("Division by the zero polynomial.".to_string()));
    }

    let m = den.len() - 1;

    if num.len() < den.len() {
        let mut remainder = vec![0.0; m - num.len()];
        remainder.extend_from_slice(num);

        return Ok((vec![0.0], remainder));
    }

    let mut work = num.to_vec();
    let q_len = num.len() - m;
    let mut quotient = vec![0.0; q_len];

    for i in 0..q_len {
        let q = work[i] / den[0];
        quotient[i] = q;

        for (j, d) in den.iter().enumerate() {
            work[i + j] -= q * d;
        }
    }

    Ok((quotient, work[q_len..].to_vec()))
}
