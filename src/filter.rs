//! Filter input using the Direct Form 2 Transposed representation.
//!
//! The filter runs the full `(b, a)` difference equation one sample at a time.
//!
//! See: [scipy.signal: lfilter()](https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.lfilter.html)

use nalgebra::{DMatrix, DVector};
use crate::errors::Error;
use crate::errors::Error::{IllegalArgument, InternalError};
use crate::filter_design::DigitalFilterCoeffs;

/// Internal states and coefficients of the Direct Form 2 Transposed form.
#[derive(Debug)]
pub struct DirectForm2Transposed {
    z: Vec<f64>,
    b: Vec<f64>,
    a: Vec<f64>,
}

/// The required functions of a filter implementation
pub trait Filter {
    /// Applies the filtering on the input.
    fn filter(&mut self, input: f64) -> f64;
}

// b and a zero-padded to a common length.
fn padded(coeffs: &DigitalFilterCoeffs) -> (Vec<f64>, Vec<f64>) {
    let n = coeffs.b().len().max(coeffs.a().len());

    let mut b = coeffs.b().to_vec();
    let mut a = coeffs.a().to_vec();
    b.resize(n, 0.0);
    a.resize(n, 0.0);

    (b, a)
}

impl DirectForm2Transposed {
    /// Creates a Direct Form 2 Transposed filter at rest.
    pub fn new(coeffs: &DigitalFilterCoeffs) -> Self {
        let (b, a) = padded(coeffs);

        DirectForm2Transposed {
            z: vec![0.0; b.len() - 1],
            b,
            a,
        }
    }

    /// Creates a Direct Form 2 Transposed filter with the initial delay state `zi`.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalArgument`] if `zi` does not have `max(len(a), len(b)) - 1` entries.
    pub fn with_state(coeffs: &DigitalFilterCoeffs, zi: &[f64]) -> Result<Self, Error> {
        let mut filter = DirectForm2Transposed::new(coeffs);

        if zi.len() != filter.z.len() {
            return Err(IllegalArgument(format!(
                "Initial state must have {} entries, got {}.", filter.z.len(), zi.len())));
        }

        filter.z.copy_from_slice(zi);

        Ok(filter)
    }
}

impl Filter for DirectForm2Transposed {
    fn filter(&mut self, input: f64) -> f64 {
        let output = self.b[0] * input + self.z.first().copied().unwrap_or(0.0);

        let n = self.z.len();
        for i in 0..n {
            let next = if i + 1 < n { self.z[i + 1] } else { 0.0 };
            self.z[i] = self.b[i + 1] * input - self.a[i + 1] * output + next;
        }

        output
    }
}

/// Filter `x` with the difference equation given by `coeffs`.
///
/// `zi` is the initial delay state of the transposed direct form; `None` starts at rest.
///
/// # Errors
///
/// [`Error::IllegalArgument`] if `zi` has the wrong length.
pub fn lfilter(coeffs: &DigitalFilterCoeffs, x: &[f64], zi: Option<&[f64]>) -> Result<Vec<f64>, Error> {
    let mut filter = match zi {
        Some(zi) => DirectForm2Transposed::with_state(coeffs, zi)?,
        None => DirectForm2Transposed::new(coeffs),
    };

    Ok(x.iter().map(|v| filter.filter(*v)).collect())
}

/// The initial state which makes the step response start in steady state.
///
/// Solves `(I - companion(a)ᵀ) zi = b[1..] - a[1..]·b[0]`.
///
/// # Errors
///
/// [`Error::InternalError`] if the system is singular, i.e. the filter has a pole at z = 1.
pub fn lfilter_zi(coeffs: &DigitalFilterCoeffs) -> Result<Vec<f64>, Error> {
    let (b, a) = padded(coeffs);
    let n = b.len() - 1;

    if n == 0 {
        return Ok(vec![]);
    }

    let mut m = DMatrix::<f64>::identity(n, n);
    for i in 0..n {
        m[(i, 0)] += a[i + 1];
        if i + 1 < n {
            m[(i, i + 1)] -= 1.0;
        }
    }

    let rhs = DVector::from_iterator(n, (1..=n).map(|i| b[i] - a[i] * b[0]));

    let zi = m
        .lu()
        .solve(&rhs)
        .ok_or_else(|| InternalError("Steady state does not exist: the filter has a pole at z = 1.".to_string()))?;

    Ok(zi.iter().copied().collect())
}
