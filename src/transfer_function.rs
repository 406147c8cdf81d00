//! Continuous-time transfer functions and their zero-pole-gain form.

use std::fmt;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use crate::errors::Error;
use crate::errors::Error::{DegenerateInput, IllegalArgument, InternalError};
use crate::polynomial::{polyval, roots, trim_leading_zeros};
use crate::zpk2tf::zpk2tf;

/// A rational transfer function `H(s) = num(s) / den(s)` with real coefficients.
///
/// Coefficients are stored highest power first with leading zeros removed,
/// so `den[0]` is never zero. [`num_ascending`][TransferFunction::num_ascending]
/// and [`den_ascending`][TransferFunction::den_ascending] give the
/// constant-term-first view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransferFunction")]
pub struct TransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
}

// Deserialized coefficients go through `TransferFunction::new`.
#[derive(Deserialize)]
struct RawTransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
}

impl TryFrom<RawTransferFunction> for TransferFunction {
    type Error = Error;

    fn try_from(raw: RawTransferFunction) -> Result<Self, Self::Error> {
        TransferFunction::new(&raw.num, &raw.den)
    }
}

/// Zero, pole, gain representation of a system.
///
/// Zeros and poles are unordered multisets.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroPoleGain {
    /// Zeros
    pub z: Vec<Complex64>,
    /// Poles
    pub p: Vec<Complex64>,
    /// Gain
    pub k: f64,
}

impl TransferFunction {
    /// Create a transfer function from coefficients ordered highest power first.
    ///
    /// # Errors
    ///
    /// * [`Error::DegenerateInput`] if `den` is empty or all zero.
    /// * [`Error::IllegalArgument`] if any coefficient is not finite.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lti_analysis::transfer_function::TransferFunction;
    ///
    /// // H(s) = 1 / (s² + 2s + 1)
    /// let tf = TransferFunction::new(&[1.0], &[1.0, 2.0, 1.0]).unwrap();
    ///
    /// assert_eq!(tf.order(), 2);
    /// assert_eq!(tf.den_ascending(), vec![1.0, 2.0, 1.0]);
    /// ```
    pub fn new(num: &[f64], den: &[f64]) -> Result<Self, Error> {
        if num.iter().chain(den).any(|c| !c.is_finite()) {
            return Err(IllegalArgument("Transfer function coefficients must be finite.".to_string()));
        }

        let den = trim_leading_zeros(den);
        if den.is_empty() {
            return Err(DegenerateInput("The denominator must have a non-zero coefficient.".to_string()));
        }

        let num = match trim_leading_zeros(num) {
            [] => vec![0.0],
            num => num.to_vec(),
        };

        Ok(TransferFunction { num, den: den.to_vec() })
    }

    /// Create a transfer function from coefficients ordered constant term first.
    pub fn from_ascending(num: &[f64], den: &[f64]) -> Result<Self, Error> {
        let num: Vec<f64> = num.iter().rev().copied().collect();
        let den: Vec<f64> = den.iter().rev().copied().collect();

        TransferFunction::new(&num, &den)
    }

    /// Numerator coefficients, highest power first.
    pub fn num(&self) -> &[f64] {
        &self.num
    }

    /// Denominator coefficients, highest power first.
    pub fn den(&self) -> &[f64] {
        &self.den
    }

    /// Numerator coefficients, constant term first.
    pub fn num_ascending(&self) -> Vec<f64> {
        self.num.iter().rev().copied().collect()
    }

    /// Denominator coefficients, constant term first.
    pub fn den_ascending(&self) -> Vec<f64> {
        self.den.iter().rev().copied().collect()
    }

    /// The order of the system, i.e. the degree of the denominator.
    pub fn order(&self) -> usize {
        self.den.len() - 1
    }

    /// `len(den) - len(num)`. Negative for an improper system.
    pub fn relative_degree(&self) -> isize {
        self.den.len() as isize - self.num.len() as isize
    }

    /// True if the numerator degree does not exceed the denominator degree.
    pub fn is_proper(&self) -> bool {
        self.relative_degree() >= 0
    }

    /// True if the numerator is identically zero.
    pub fn is_zero(&self) -> bool {
        self.num.iter().all(|c| *c == 0.0)
    }

    /// The same system scaled so the leading denominator coefficient is one.
    pub fn normalized(&self) -> TransferFunction {
        let lead = self.den[0];

        TransferFunction {
            num: self.num.iter().map(|c| c / lead).collect(),
            den: self.den.iter().map(|c| c / lead).collect(),
        }
    }

    /// Compare two systems after normalizing both to a monic denominator.
    ///
    /// Each coefficient must agree within `rtol` relative to the largest
    /// coefficient magnitude of its polynomial.
    pub fn approx_eq(&self, other: &TransferFunction, rtol: f64) -> bool {
        fn close(a: &[f64], b: &[f64], rtol: f64) -> bool {
            let scale = a.iter().chain(b).fold(0.0_f64, |m, c| m.max(c.abs()));

            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= rtol * scale)
        }

        let (lhs, rhs) = (self.normalized(), other.normalized());

        close(&lhs.num, &rhs.num, rtol) && close(&lhs.den, &rhs.den, rtol)
    }

    /// Evaluate `num(s) / den(s)` at the complex point `s`.
    ///
    /// # Errors
    ///
    /// [`Error::InternalError`] if the denominator vanishes at `s`; callers which
    /// know the frequency report their own error.
    pub fn evaluate(&self, s: Complex64) -> Result<Complex64, Error> {
        let d = polyval(&self.den, s);

        if d.norm() == 0.0 {
            return Err(InternalError(format!("Denominator vanishes at s = {}", s)));
        }

        Ok(polyval(&self.num, s) / d)
    }

    /// Roots of the numerator.
    pub fn zeros(&self) -> Result<Vec<Complex64>, Error> {
        roots(&self.num)
    }

    /// Roots of the denominator.
    pub fn poles(&self) -> Result<Vec<Complex64>, Error> {
        roots(&self.den)
    }

    /// Convert to zero, pole, gain form.
    ///
    /// The gain is the ratio of the leading numerator and denominator coefficients.
    ///
    /// # Errors
    ///
    /// [`Error::DegenerateInput`] if the numerator is identically zero.
    pub fn to_zpk(&self) -> Result<ZeroPoleGain, Error> {
        let z = self.zeros()?;
        let p = self.poles()?;
        let k = self.num[0] / self.den[0];

        Ok(ZeroPoleGain { z, p, k })
    }
}

impl ZeroPoleGain {
    /// Expand the factored form back into a transfer function.
    ///
    /// The denominator of the result is monic.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalArgument`] if the zeros or the poles are not closed under conjugation.
    pub fn to_tf(&self) -> Result<TransferFunction, Error> {
        let ba = zpk2tf(&self.z, &self.p, self.k)?;

        TransferFunction::new(&ba.b, &ba.a)
    }

    /// Return relative degree of transfer function from zeros and poles.
    ///
    /// # Errors
    ///
    /// [`Error::InternalError`] for an improper system, with more zeros than poles.
    pub fn relative_degree(&self) -> Result<usize, Error> {
        let degree = self.p.len() as i64 - self.z.len() as i64;
        if degree < 0 {
            return Err(InternalError("Improper transfer function. Must have at least as many poles as zeros.".to_string()));
        }

        Ok(degree as usize)
    }
}

// Formats a polynomial in s, e.g. "2s^2 - s + 0.5".
fn fmt_poly(coeffs: &[f64]) -> String {
    let degree = coeffs.len() - 1;
    let mut out = String::new();

    for (i, c) in coeffs.iter().enumerate() {
        if *c == 0.0 && coeffs.len() > 1 {
            continue;
        }

        let power = degree - i;
        let sign = if *c < 0.0 { "-" } else { "+" };

        if out.is_empty() {
            if *c < 0.0 {
                out.push('-');
            }
        } else {
            out.push_str(&format!(" {} ", sign));
        }

        let magnitude = c.abs();
        if magnitude != 1.0 || power == 0 {
            out.push_str(&format!("{}", magnitude));
        }

        match power {
            0 => {}
            1 => out.push('s'),
            _ => out.push_str(&format!("s^{}", power)),
        }
    }

    if out.is_empty() { "0".to_string() } else { out }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H(s) = ({}) / ({})", fmt_poly(&self.num), fmt_poly(&self.den))
    }
}
