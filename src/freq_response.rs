//! Frequency response (Bode) of continuous-time systems and digital filters.
//!
//! Magnitudes are in dB, phases in degrees and unwrapped along the sweep.

use std::f64::consts::PI;
use log::debug;
use num_complex::{Complex, Complex64};
use serde::{Deserialize, Serialize};
use crate::errors::Error;
use crate::errors::Error::{IllegalArgument, SingularDenominator};
use crate::filter_design::DigitalFilterCoeffs;
use crate::polynomial::polyval;
use crate::transfer_function::TransferFunction;

/// Magnitudes below this level, including exact zeros, are reported at this level.
pub const MAGNITUDE_FLOOR_DB: f64 = -400.0;

/// Number of frequencies in an automatically selected sweep.
pub const DEFAULT_BODE_POINTS: usize = 100;

/// The sweep used when a system has neither poles nor zeros: `10^-2 ..= 10^2` rad/s.
const FALLBACK_DECADES: (f64, f64) = (-2.0, 2.0);

/// The frequencies at which to evaluate a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frequencies {
    /// Derive a log-spaced sweep from the natural frequencies of the poles and zeros.
    Auto,
    /// A log-spaced sweep between two positive angular frequencies (rad/s).
    Range(f64, f64),
    /// Explicit angular frequencies (rad/s), in increasing order.
    Explicit(Vec<f64>),
}

/// Options for [bode].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodeOptions {
    /// Where to evaluate the response.
    pub frequencies: Frequencies,
    /// Number of points for [Frequencies::Auto] and [Frequencies::Range].
    pub n: usize,
}

impl Default for BodeOptions {
    fn default() -> Self {
        BodeOptions { frequencies: Frequencies::Auto, n: DEFAULT_BODE_POINTS }
    }
}

/// A frequency response sampled at increasing frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponse {
    /// Frequencies: rad/s for [bode], Hz for [freqz].
    pub w: Vec<f64>,
    /// Magnitude in dB, never below [MAGNITUDE_FLOOR_DB].
    pub mag_db: Vec<f64>,
    /// Unwrapped phase in degrees.
    pub phase_deg: Vec<f64>,
}

impl FrequencyResponse {
    /// Number of frequencies.
    pub fn len(&self) -> usize {
        self.w.len()
    }

    /// True if the response holds no frequencies.
    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    /// The response as `(frequency, magnitude dB, phase degrees)` triples.
    pub fn samples(&self) -> Vec<(f64, f64, f64)> {
        self.w.iter()
            .zip(&self.mag_db)
            .zip(&self.phase_deg)
            .map(|((w, m), p)| (*w, *m, *p))
            .collect()
    }

    fn from_complex(w: Vec<f64>, h: &[Complex64]) -> FrequencyResponse {
        let mag_db = h.iter().map(|x| magnitude_db(*x)).collect();
        let phase: Vec<f64> = h.iter().map(|x| x.im.atan2(x.re).to_degrees()).collect();

        FrequencyResponse { w, mag_db, phase_deg: unwrap_degrees(&phase) }
    }
}

/// Compute the Bode magnitude and phase of a continuous-time system.
///
/// `H(jω)` is evaluated by Horner's rule on numerator and denominator.
///
/// # Errors
///
/// * [`Error::SingularDenominator`] if `den(jω)` vanishes at one of the frequencies.
/// * [`Error::IllegalArgument`] for an empty or malformed set of frequencies.
///
/// # Example
///
/// ```rust
/// use lti_analysis::freq_response::{bode, BodeOptions, Frequencies};
/// use lti_analysis::transfer_function::TransferFunction;
///
/// let tf = TransferFunction::new(&[1.0], &[1.0, 1.0]).unwrap();
/// let options = BodeOptions { frequencies: Frequencies::Explicit(vec![1.0]), n: 1 };
///
/// let response = bode(&tf, &options).unwrap();
///
/// // One pole at -1: -3 dB and -45° at 1 rad/s.
/// assert!((response.mag_db[0] + 3.0103).abs() < 1E-4);
/// assert!((response.phase_deg[0] + 45.0).abs() < 1E-12);
/// ```
pub fn bode(tf: &TransferFunction, options: &BodeOptions) -> Result<FrequencyResponse, Error> {
    let w = match &options.frequencies {
        Frequencies::Auto => findfreqs(tf, options.n)?,
        Frequencies::Range(lo, hi) => {
            if !(lo.is_finite() && hi.is_finite() && *lo > 0.0 && lo < hi) {
                return Err(IllegalArgument(format!("Frequency range must satisfy 0 < lo < hi, got ({}, {}).", lo, hi)));
            }
            logspace(lo.log10(), hi.log10(), options.n)?
        }
        Frequencies::Explicit(w) => {
            validate_frequencies(w)?;
            w.clone()
        }
    };

    debug!("Evaluating H(jω) at {} frequencies in [{:e}, {:e}] rad/s",
        w.len(), w.first().copied().unwrap_or(0.0), w.last().copied().unwrap_or(0.0));

    let mut h: Vec<Complex64> = Vec::with_capacity(w.len());

    for omega in &w {
        let s = Complex::new(0.0, *omega);
        let d = polyval(tf.den(), s);

        if d.norm() == 0.0 {
            return Err(SingularDenominator { omega: *omega });
        }

        let value = polyval(tf.num(), s) / d;

        if !(value.re.is_finite() && value.im.is_finite()) {
            return Err(SingularDenominator { omega: *omega });
        }

        h.push(value);
    }

    Ok(FrequencyResponse::from_complex(w, &h))
}

/// Compute the frequency response of a digital filter.
///
/// # Arguments
///
/// * `coeffs` - The filter, in powers of z⁻¹.
/// * `freqs` - Frequencies in Hz, in increasing order, at most `fs/2` for a meaningful result.
/// * `fs` - The sample rate in Hz.
pub fn freqz(coeffs: &DigitalFilterCoeffs, freqs: &[f64], fs: f64) -> Result<FrequencyResponse, Error> {
    if !(fs.is_finite() && fs > 0.0) {
        return Err(IllegalArgument(format!("Sample rate must be positive, got {}.", fs)));
    }

    validate_frequencies(freqs)?;

    // Σ c[k] z^-k is the ascending polynomial evaluated at z^-1.
    let b: Vec<f64> = coeffs.b().iter().rev().copied().collect();
    let a: Vec<f64> = coeffs.a().iter().rev().copied().collect();

    let mut h: Vec<Complex64> = Vec::with_capacity(freqs.len());

    for f in freqs {
        let z_inv = Complex::new(0.0, -2.0 * PI * f / fs).exp();
        let d = polyval(&a, z_inv);

        if d.norm() == 0.0 {
            return Err(SingularDenominator { omega: 2.0 * PI * f / fs });
        }

        h.push(polyval(&b, z_inv) / d);
    }

    Ok(FrequencyResponse::from_complex(freqs.to_vec(), &h))
}

/// Choose a log-spaced sweep of `n` angular frequencies covering the
/// interesting part of the response of `tf`.
///
/// The sweep spans from a decade below the slowest to half a decade above the
/// fastest natural frequency of the upper-half-plane poles and zeros.
/// Zeros with magnitude above 1e5 are ignored; poles and zeros at the
/// origin count as having unit real part.
/// A system with neither poles nor zeros gets `10^-2 ..= 10^2` rad/s.
pub fn findfreqs(tf: &TransferFunction, n: usize) -> Result<Vec<f64>, Error> {
    let mut ep = tf.poles()?;
    let tz = if tf.is_zero() { vec![] } else { tf.zeros()? };

    if ep.is_empty() && tz.is_empty() {
        return logspace(FALLBACK_DECADES.0, FALLBACK_DECADES.1, n);
    }

    if ep.is_empty() {
        ep.push(Complex::new(-1000.0, 0.0));
    }

    let ez: Vec<Complex64> = ep.iter()
        .filter(|x| x.im >= 0.0)
        .chain(tz.iter().filter(|x| x.norm() < 1E5 && x.im >= 0.0))
        .copied()
        .collect();

    if ez.is_empty() {
        return logspace(FALLBACK_DECADES.0, FALLBACK_DECADES.1, n);
    }

    let shifted_re = |x: &Complex64| {
        let integ = if x.norm() < 1E-10 { 1.0 } else { 0.0 };
        (x.re + integ).abs()
    };

    let high = ez.iter().map(|x| 3.0 * shifted_re(x) + 1.5 * x.im).fold(f64::MIN, f64::max);
    let low = ez.iter().map(|x| shifted_re(x) + 2.0 * x.im).fold(f64::MAX, f64::min);

    // numpy rounds half to even.
    let hfreq = (high.log10() + 0.5).round_ties_even();
    let lfreq = ((0.1 * low).log10() - 0.5).round_ties_even();

    debug!("Automatic sweep 10^{} ..= 10^{} rad/s", lfreq, hfreq);

    logspace(lfreq, hfreq, n)
}

/// `n` points from `10^start` to `10^stop`, evenly spaced on a log scale.
pub fn logspace(start: f64, stop: f64, n: usize) -> Result<Vec<f64>, Error> {
    if n == 0 {
        return Err(IllegalArgument("Number of frequencies must be at least one.".to_string()));
    }

    if n == 1 {
        return Ok(vec![10f64.powf(start)]);
    }

    let step = (stop - start) / (n - 1) as f64;

    Ok((0..n).map(|i| 10f64.powf(start + step * i as f64)).collect())
}

/// `20·log10|h|`, floored at [MAGNITUDE_FLOOR_DB].
pub fn magnitude_db(h: Complex64) -> f64 {
    let magnitude = h.norm();

    if magnitude == 0.0 {
        return MAGNITUDE_FLOOR_DB;
    }

    (20.0 * magnitude.log10()).max(MAGNITUDE_FLOOR_DB)
}

/// Unwrap a phase sequence in degrees.
///
/// Whenever two consecutive samples differ by 180° or more, the remainder of the
/// sequence is shifted by the multiple of 360° which brings the step into [-180°, 180°].
///
/// A step of exactly ±180° cannot be made smaller by whole turns and is kept as it
/// is, like numpy `unwrap`. Any larger step ends up strictly below 180° unless it is an
/// odd multiple of 180°, which becomes +180°.
pub fn unwrap_degrees(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut correction = 0.0;

    for (i, p) in phase.iter().enumerate() {
        if i > 0 {
            let dd = p - phase[i - 1];
            let mut ddmod = (dd + 180.0).rem_euclid(360.0) - 180.0;

            if ddmod == -180.0 && dd > 0.0 {
                ddmod = 180.0;
            }

            if dd.abs() >= 180.0 {
                correction += ddmod - dd;
            }
        }

        out.push(p + correction);
    }

    out
}

fn validate_frequencies(w: &[f64]) -> Result<(), Error> {
    if w.is_empty() {
        return Err(IllegalArgument("At least one frequency is required.".to_string()));
    }

    if w.iter().any(|x| !x.is_finite() || *x < 0.0) {
        return Err(IllegalArgument("Frequencies must be finite and non-negative.".to_string()));
    }

    if w.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(IllegalArgument("Frequencies must be in increasing order.".to_string()));
    }

    Ok(())
}
