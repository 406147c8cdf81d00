use num_complex::Complex;
use crate::errors::Error;
use crate::errors::Error::IllegalArgument;
use crate::util::{is_real, poly, sort_lex};
use crate::util::Keys::{Im, Re};

/// Real transfer function coefficients, highest power first.
pub(crate) struct BACoeffs {
    pub(crate) b: Vec<f64>,
    pub(crate) a: Vec<f64>,
}

/// Relative tolerance used when matching a root with its conjugate.
const CONJUGATE_TOL: f64 = 1E-9;

/// Expand zeros, poles and gain into real numerator and denominator coefficients.
///
/// Both root sets must be closed under conjugation, otherwise the expanded
/// polynomials would have complex coefficients.
pub(crate) fn zpk2tf(z: &[Complex<f64>], p: &[Complex<f64>], k: f64) -> Result<BACoeffs, Error> {
    if !all_conjugates(z)? {
        return Err(IllegalArgument("Zeros contain a complex value with no matching conjugate.".to_string()));
    }

    if !all_conjugates(p)? {
        return Err(IllegalArgument("Poles contain a complex value with no matching conjugate.".to_string()));
    }

    let b: Vec<f64> = poly(z).iter().map(|x| k * x.re).collect();
    let a: Vec<f64> = poly(p).iter().map(|x| x.re).collect();

    Ok(BACoeffs { b, a })
}

// Returns true if every root off the real axis is matched by its conjugate.
fn all_conjugates(roots: &[Complex<f64>]) -> Result<bool, Error> {
    let tol = |x: &Complex<f64>| CONJUGATE_TOL * x.norm().max(1.0);

    let mut pos_roots: Vec<Complex<f64>> = roots
        .iter()
        .copied()
        .filter(|x| !is_real(*x) && x.im.abs() > tol(x) && x.im > 0.0)
        .collect();

    let mut neg_roots: Vec<Complex<f64>> = roots
        .iter()
        .filter(|x| !is_real(**x) && x.im.abs() > tol(x) && x.im < 0.0)
        .map(|x| x.conj())
        .collect();

    if pos_roots.len() != neg_roots.len() {
        return Ok(false);
    }

    sort_lex(&mut pos_roots, &[Re, Im])?;
    sort_lex(&mut neg_roots, &[Re, Im])?;

    Ok(pos_roots.iter().zip(&neg_roots).all(|(p, n)| (p - n).norm() <= tol(p)))
}
