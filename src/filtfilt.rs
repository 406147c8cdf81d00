//! Zero-phase forward-backward filtering.
//!
//! The signal is extended at both ends by odd reflection, filtered forwards,
//! reversed, filtered again and reversed back. Each pass starts from the
//! steady state of [lfilter_zi] scaled to the first sample it sees, so the
//! output has no phase shift and small edge transients.
//!
//! See: [scipy.signal: filtfilt()](https://docs.scipy.org/doc/scipy/reference/generated/scipy.signal.filtfilt.html)

use log::debug;
use crate::errors::Error;
use crate::errors::Error::InsufficientLength;
use crate::filter::{lfilter, lfilter_zi};
use crate::filter_design::DigitalFilterCoeffs;
use crate::state_space::TimeSeries;

/// Number of samples added at each end, `3·max(len(a), len(b))`.
pub fn padlen(coeffs: &DigitalFilterCoeffs) -> usize {
    3 * coeffs.a().len().max(coeffs.b().len())
}

// 2·x[0] - x[n..0] at the front, 2·x[last] - x[last-1..last-n] at the back.
fn odd_ext(x: &[f64], n: usize) -> Vec<f64> {
    let first = x[0];
    let last = x[x.len() - 1];

    let mut ext = Vec::with_capacity(x.len() + 2 * n);
    ext.extend((1..=n).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=n).map(|i| 2.0 * last - x[x.len() - 1 - i]));

    ext
}

/// Apply the filter forwards and backwards, cancelling its phase response.
///
/// The magnitude response is squared. The output has the length of `x`.
///
/// # Errors
///
/// * [`Error::InsufficientLength`] if `x` is not longer than [padlen] samples.
/// * [`Error::InternalError`] if the filter has no steady state.
///
/// # Example
///
/// ```rust
/// use lti_analysis::filter_design::{butter, FilterType};
/// use lti_analysis::filtfilt::filtfilt;
///
/// let coeffs = butter(3, FilterType::LowPass(5.0), 100.0).unwrap();
/// let x = vec![2.0; 40];
///
/// let y = filtfilt(&coeffs, &x).unwrap();
///
/// assert_eq!(y.len(), x.len());
/// assert!(y.iter().all(|v| (v - 2.0).abs() < 1E-9));
/// ```
pub fn filtfilt(coeffs: &DigitalFilterCoeffs, x: &[f64]) -> Result<Vec<f64>, Error> {
    let edge = padlen(coeffs);

    if x.len() <= edge {
        return Err(InsufficientLength { len: x.len(), padlen: edge });
    }

    debug!("filtfilt: order {}, {} samples, padlen {}", coeffs.order(), x.len(), edge);

    let ext = odd_ext(x, edge);
    let zi = lfilter_zi(coeffs)?;

    let scaled = |x0: f64| -> Vec<f64> { zi.iter().map(|z| z * x0).collect() };

    let zi_forward = scaled(ext[0]);
    let forward = lfilter(coeffs, &ext, Some(&zi_forward[..]))?;

    let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
    let zi_backward = scaled(reversed[0]);
    let backward = lfilter(coeffs, &reversed, Some(&zi_backward[..]))?;

    reversed = backward.into_iter().rev().collect();

    Ok(reversed[edge..reversed.len() - edge].to_vec())
}

/// [filtfilt] the values of a time series, keeping its time axis.
pub fn filtfilt_series(coeffs: &DigitalFilterCoeffs, series: &TimeSeries) -> Result<TimeSeries, Error> {
    Ok(TimeSeries {
        t: series.t.clone(),
        y: filtfilt(coeffs, &series.y)?,
    })
}
