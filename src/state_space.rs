//! Time-domain simulation of a transfer function through a state-space realization.
//!
//! The impulse response is the free response of `x' = Ax` from `x(t0) = B`,
//! propagated exactly between grid points with the matrix exponential.
//!
//! See: [scipy.signal: impulse()](https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.impulse.html)

use log::{debug, warn};
use nalgebra::{DMatrix, DVector, RowDVector};
use serde::{Deserialize, Serialize};
use crate::errors::{Error, Warning};
use crate::errors::Error::IllegalArgument;
use crate::polynomial::polydiv;
use crate::transfer_function::TransferFunction;

/// A single-input single-output state-space model `x' = Ax + Bu`, `y = Cx + Du`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpaceModel {
    /// State matrix, n×n.
    pub a: DMatrix<f64>,
    /// Input matrix, n×1.
    pub b: DVector<f64>,
    /// Output matrix, 1×n.
    pub c: RowDVector<f64>,
    /// Feedthrough.
    pub d: f64,
}

/// Samples `y(t)` on a time axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Sample times, non-decreasing.
    pub t: Vec<f64>,
    /// Sample values, same length as `t`.
    pub y: Vec<f64>,
}

impl TimeSeries {
    /// The samples as `(t, y)` pairs.
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.t.iter().copied().zip(self.y.iter().copied()).collect()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// The result of [impulse]: the response together with any non-fatal findings.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    #[allow(missing_docs)]
    pub series: TimeSeries,
    #[allow(missing_docs)]
    pub warnings: Vec<Warning>,
}

impl StateSpaceModel {
    /// Controllable canonical realization of `tf`.
    ///
    /// The first row of `A` holds `-den[1..]/den[0]`, the sub-diagonal is one
    /// and `B` is the first unit vector.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalArgument`] if the numerator degree exceeds the denominator degree.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lti_analysis::state_space::StateSpaceModel;
    /// use lti_analysis::transfer_function::TransferFunction;
    ///
    /// let tf = TransferFunction::new(&[1.0, 3.0], &[1.0, 2.0, 5.0]).unwrap();
    /// let ss = StateSpaceModel::from_tf(&tf).unwrap();
    ///
    /// assert_eq!(ss.a[(0, 1)], -5.0);
    /// assert_eq!(ss.d, 0.0);
    /// ```
    pub fn from_tf(tf: &TransferFunction) -> Result<Self, Error> {
        if !tf.is_proper() {
            return Err(IllegalArgument(format!(
                "Improper transfer function: numerator degree {} exceeds denominator degree {}.",
                tf.num().len() - 1, tf.order())));
        }

        let n = tf.order();
        let den0 = tf.den()[0];
        let den: Vec<f64> = tf.den().iter().map(|x| x / den0).collect();
        let num: Vec<f64> = tf.num().iter().map(|x| x / den0).collect();

        // num / den = D + rem / den, with deg(rem) < n.
        let (quotient, rem) = polydiv(&num, &den)?;
        let d = quotient[0];

        let mut a = DMatrix::<f64>::zeros(n, n);
        for j in 0..n {
            a[(0, j)] = -den[j + 1];
        }
        for i in 1..n {
            a[(i, i - 1)] = 1.0;
        }

        let mut b = DVector::<f64>::zeros(n);
        if n > 0 {
            b[0] = 1.0;
        }

        let c = RowDVector::from_vec(rem);

        Ok(StateSpaceModel { a, b, c, d })
    }

    /// The number of states.
    pub fn order(&self) -> usize {
        self.b.len()
    }
}

/// `n` evenly spaced samples from `start` to `stop`, both included.
///
/// # Errors
///
/// [`Error::IllegalArgument`] if an end point is not finite.
pub fn linspace(start: f64, stop: f64, n: usize) -> Result<Vec<f64>, Error> {
    if !(start.is_finite() && stop.is_finite()) {
        return Err(IllegalArgument("linspace end points must be finite.".to_string()));
    }

    let grid = match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut t: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            t[n - 1] = stop;
            t
        }
    };

    Ok(grid)
}

/// A time grid from zero covering about seven time constants of the slowest pole.
///
/// Poles on the imaginary axis and systems without poles use a time constant of one.
pub fn default_response_times(tf: &TransferFunction, n: usize) -> Result<Vec<f64>, Error> {
    let r = tf
        .poles()?
        .iter()
        .map(|p| if is_marginal(p.re, p.norm()) { 0.0 } else { p.re.abs() })
        .fold(f64::INFINITY, f64::min);

    let r = if r == 0.0 || !r.is_finite() { 1.0 } else { r };

    linspace(0.0, 7.0 / r, n)
}

fn validate_grid(t: &[f64]) -> Result<(), Error> {
    if t.is_empty() {
        return Err(IllegalArgument("The time grid must not be empty.".to_string()));
    }

    if let Some(i) = t.iter().position(|x| !x.is_finite()) {
        return Err(IllegalArgument(format!("Time sample at index {} is not finite.", i)));
    }

    if let Some(i) = t.windows(2).position(|w| w[1] < w[0]) {
        return Err(IllegalArgument(format!("The time grid decreases at index {}.", i + 1)));
    }

    Ok(())
}

// Real parts this close to zero are on the imaginary axis up to rounding.
fn is_marginal(re: f64, norm: f64) -> bool {
    re.abs() <= 1E-9 * norm.max(1.0)
}

fn unstable_poles(tf: &TransferFunction) -> Result<Vec<(f64, f64)>, Error> {
    Ok(tf
        .poles()?
        .iter()
        .filter(|p| p.re > 0.0 && !is_marginal(p.re, p.norm()))
        .map(|p| (p.re, p.im))
        .collect())
}

/// Impulse response of `tf` sampled at the times `t`.
///
/// The impulse is applied at `t[0]`. The feedthrough `D` contributes to the
/// first sample only. A system with poles in the right half-plane still gets
/// its complete, diverging response along with [`Warning::UnstableSystem`].
///
/// # Errors
///
/// * [`Error::IllegalArgument`] for an improper system, or a time grid which is
///   empty, not finite or decreasing.
///
/// # Example
///
/// ```rust
/// use lti_analysis::state_space::{impulse, linspace};
/// use lti_analysis::transfer_function::TransferFunction;
///
/// // 1 / (s + 1) responds with e^-t.
/// let tf = TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap();
/// let t = linspace(0.0, 1.0, 11).unwrap();
///
/// let response = impulse(&tf, &t).unwrap();
///
/// assert!((response.series.y[10] - (-1.0_f64).exp()).abs() < 1E-9);
/// assert!(response.warnings.is_empty());
/// ```
pub fn impulse(tf: &TransferFunction, t: &[f64]) -> Result<ImpulseResponse, Error> {
    validate_grid(t)?;

    let ss = StateSpaceModel::from_tf(tf)?;

    debug!("impulse: order {}, {} samples over [{}, {}]", ss.order(), t.len(), t[0], t[t.len() - 1]);

    let mut warnings = vec![];
    let unstable = unstable_poles(tf)?;
    if !unstable.is_empty() {
        warn!("impulse: {} pole(s) in the right half-plane, the response diverges", unstable.len());
        warnings.push(Warning::UnstableSystem { poles: unstable });
    }

    let mut y = Vec::with_capacity(t.len());

    if ss.order() == 0 {
        y.push(ss.d);
        y.resize(t.len(), 0.0);
    } else {
        let mut x = ss.b.clone();
        let mut step: Option<(f64, DMatrix<f64>)> = None;

        y.push(ss.c.tr_dot(&x) + ss.d);

        for w in t.windows(2) {
            let dt = w[1] - w[0];

            let reuse = matches!(&step, Some((h, _)) if (h - dt).abs() <= 1E-12 * dt.abs().max(1.0));
            if !reuse {
                step = Some((dt, (&ss.a * dt).exp()));
            }

            if let Some((_, phi)) = &step {
                x = phi * &x;
            }

            y.push(ss.c.tr_dot(&x));
        }
    }

    Ok(ImpulseResponse {
        series: TimeSeries { t: t.to_vec(), y },
        warnings,
    })
}
