//! The end-to-end analysis of one system.
//!
//! A request names a transfer function and a Butterworth filter. [analyze]
//! computes the zeros and poles, the Bode response and the impulse response of
//! the system, then runs the impulse response through the filter forwards and
//! backwards.

use log::debug;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use crate::errors::{Error, Warning};
use crate::errors::Error::{IllegalArgument, InvalidCutoff};
use crate::filter_design::{butter, DigitalFilterCoeffs, FilterKind, DEFAULT_ORDER};
use crate::filtfilt::filtfilt_series;
use crate::freq_response::{bode, BodeOptions, Frequencies, DEFAULT_BODE_POINTS};
use crate::state_space::{impulse, linspace};
use crate::transfer_function::TransferFunction;

/// The inputs of an analysis, validated on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest")]
pub struct AnalysisRequest {
    den: Vec<f64>,
    num: Vec<f64>,
    cutoff_hz: f64,
    sample_rate_hz: f64,
    filter_type: FilterKind,
}

#[derive(Deserialize)]
struct RawRequest {
    den: Vec<f64>,
    num: Vec<f64>,
    cutoff_hz: f64,
    sample_rate_hz: f64,
    filter_type: FilterKind,
}

impl TryFrom<RawRequest> for AnalysisRequest {
    type Error = Error;

    fn try_from(raw: RawRequest) -> Result<Self, Self::Error> {
        AnalysisRequest::new(&raw.den, &raw.num, raw.cutoff_hz, raw.sample_rate_hz, raw.filter_type)
    }
}

/// Fixed parameters of an analysis.
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Order of the Butterworth filter.
    pub filter_order: u32,
    /// Number of Bode frequencies.
    pub bode_points: usize,
    /// Bode sweep in rad/s. `None` selects the sweep from the poles and zeros.
    pub bode_range: Option<(f64, f64)>,
    #[allow(missing_docs)]
    pub time_start: f64,
    #[allow(missing_docs)]
    pub time_stop: f64,
    /// Number of impulse response samples.
    pub time_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            filter_order: DEFAULT_ORDER,
            bode_points: DEFAULT_BODE_POINTS,
            bode_range: None,
            time_start: 0.0,
            time_stop: 10.0,
            time_points: 500,
        }
    }
}

/// Everything [analyze] computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The system in readable form.
    pub system: String,
    /// Zeros as `(re, im)`.
    pub zeros: Vec<(f64, f64)>,
    /// Poles as `(re, im)`.
    pub poles: Vec<(f64, f64)>,
    /// `(ω rad/s, magnitude dB, phase degrees)`.
    pub bode: Vec<(f64, f64, f64)>,
    /// Impulse response `(t, y)`.
    pub impulse: Vec<(f64, f64)>,
    /// The impulse response after zero-phase filtering, `(t, y)`.
    pub filtered: Vec<(f64, f64)>,
    /// The designed filter.
    pub filter: DigitalFilterCoeffs,
    #[allow(missing_docs)]
    pub warnings: Vec<Warning>,
}

fn parse_list(name: &str, text: &str) -> Result<Vec<f64>, Error> {
    if text.trim().is_empty() {
        return Ok(vec![]);
    }

    text.split(',')
        .map(|x| x.trim().parse::<f64>().map_err(|e| IllegalArgument(format!("{}: '{}' is not a number ({})", name, x.trim(), e))))
        .collect()
}

fn parse_value(name: &str, text: &str) -> Result<f64, Error> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| IllegalArgument(format!("{}: '{}' is not a number ({})", name, text.trim(), e)))
}

impl AnalysisRequest {
    /// Create a request. Coefficients are ordered highest power first.
    ///
    /// # Errors
    ///
    /// * [`Error::DegenerateInput`] for an all-zero denominator.
    /// * [`Error::IllegalArgument`] for non-finite values or a non-positive rate or cutoff.
    /// * [`Error::InvalidCutoff`] unless the cutoff lies below half the sample rate.
    pub fn new(den: &[f64], num: &[f64], cutoff_hz: f64, sample_rate_hz: f64, filter_type: FilterKind) -> Result<Self, Error> {
        TransferFunction::new(num, den)?;

        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(IllegalArgument(format!("The sample rate must be positive, got {}.", sample_rate_hz)));
        }

        if !(cutoff_hz.is_finite() && cutoff_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0) {
            return Err(InvalidCutoff { cutoff: cutoff_hz, nyquist: sample_rate_hz / 2.0 });
        }

        Ok(AnalysisRequest {
            den: den.to_vec(),
            num: num.to_vec(),
            cutoff_hz,
            sample_rate_hz,
            filter_type,
        })
    }

    /// Create a request from text fields, coefficients separated by commas.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lti_analysis::analysis::AnalysisRequest;
    ///
    /// let request = AnalysisRequest::parse("1, 3, 2", "1", "10", "100", "lowpass").unwrap();
    ///
    /// assert_eq!(request.den(), &[1.0, 3.0, 2.0]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::IllegalArgument`] for text which is not a number or an unknown
    /// filter type, and everything [AnalysisRequest::new] rejects.
    pub fn parse(den: &str, num: &str, cutoff_hz: &str, sample_rate_hz: &str, filter_type: &str) -> Result<Self, Error> {
        AnalysisRequest::new(
            &parse_list("denominator", den)?,
            &parse_list("numerator", num)?,
            parse_value("cutoff", cutoff_hz)?,
            parse_value("sample rate", sample_rate_hz)?,
            filter_type.parse()?,
        )
    }

    /// Denominator coefficients, highest power first.
    pub fn den(&self) -> &[f64] {
        &self.den
    }

    /// Numerator coefficients, highest power first.
    pub fn num(&self) -> &[f64] {
        &self.num
    }

    #[allow(missing_docs)]
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    #[allow(missing_docs)]
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    #[allow(missing_docs)]
    pub fn filter_type(&self) -> FilterKind {
        self.filter_type
    }
}

fn pairs(roots: &[Complex64]) -> Vec<(f64, f64)> {
    roots.iter().map(|r| (r.re, r.im)).collect()
}

/// Run every stage of the analysis.
///
/// # Errors
///
/// Any error of the stages: an improper system cannot be simulated, a
/// denominator with roots on the imaginary axis may be singular at a Bode
/// frequency, and a time grid no longer than the filter padding cannot be filtered.
///
/// # Example
///
/// ```rust
/// use lti_analysis::analysis::{analyze, AnalysisConfig, AnalysisRequest};
///
/// let request = AnalysisRequest::parse("1, 3, 2", "1", "10", "100", "lowpass").unwrap();
/// let report = analyze(&request, &AnalysisConfig::default()).unwrap();
///
/// assert_eq!(report.poles.len(), 2);
/// assert_eq!(report.bode.len(), 100);
/// assert_eq!(report.filtered.len(), 500);
/// ```
pub fn analyze(request: &AnalysisRequest, config: &AnalysisConfig) -> Result<AnalysisReport, Error> {
    let tf = TransferFunction::new(&request.num, &request.den)?;

    debug!("analyze: {}, {} filter at {} Hz, fs = {} Hz", tf, request.filter_type, request.cutoff_hz, request.sample_rate_hz);

    let zeros = if tf.is_zero() { vec![] } else { tf.zeros()? };
    let poles = tf.poles()?;

    let options = BodeOptions {
        frequencies: match config.bode_range {
            Some((lo, hi)) => Frequencies::Range(lo, hi),
            None => Frequencies::Auto,
        },
        n: config.bode_points,
    };
    let response = bode(&tf, &options)?;

    let t = linspace(config.time_start, config.time_stop, config.time_points)?;
    let impulse_response = impulse(&tf, &t)?;

    let filter = butter(
        config.filter_order,
        request.filter_type.with_cutoff(request.cutoff_hz),
        request.sample_rate_hz,
    )?;
    let filtered = filtfilt_series(&filter, &impulse_response.series)?;

    Ok(AnalysisReport {
        system: tf.to_string(),
        zeros: pairs(&zeros),
        poles: pairs(&poles),
        bode: response.samples(),
        impulse: impulse_response.series.pairs(),
        filtered: filtered.pairs(),
        filter,
        warnings: impulse_response.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use crate::assert_approx_eq;
    use crate::errors::Error::DegenerateInput;

    fn run(den: &str, num: &str) -> AnalysisReport {
        let request = AnalysisRequest::parse(den, num, "10", "100", "lowpass").expect("parse failed");

        analyze(&request, &AnalysisConfig::default()).expect("analyze failed")
    }

    #[test]
    fn test_second_order_system() {
        let report = run("1, 3, 2", "1");

        assert!(report.zeros.is_empty());
        assert!(report.warnings.is_empty());

        let mut poles = report.poles.clone();
        poles.sort_by(|a, b| a.0.total_cmp(&b.0));
        assert_approx_eq!(poles[0].0, -2.0, 1E-12);
        assert_approx_eq!(poles[1].0, -1.0, 1E-12);

        assert_eq!(report.bode.len(), 100);
        assert_eq!(report.impulse.len(), 500);
        assert_eq!(report.filtered.len(), 500);
        assert_eq!(report.filter.b().len(), 6);

        // e^-t - e^-2t
        for (t, y) in &report.impulse {
            assert_approx_eq!(*y, (-t).exp() - (-2.0 * t).exp(), 1E-9);
        }

        for ((t1, _), (t2, _)) in report.impulse.iter().zip(&report.filtered) {
            assert_eq!(t1, t2);
        }
    }

    #[test]
    fn test_identity_system() {
        let report = run("1", "1");

        assert!(report.zeros.is_empty());
        assert!(report.poles.is_empty());
        assert!(report.bode.iter().all(|(_, mag, phase)| mag.abs() < 1E-12 && phase.abs() < 1E-12));
        assert_eq!(report.impulse[0], (0.0, 1.0));
        assert!(report.impulse[1..].iter().all(|(_, y)| *y == 0.0));
        assert_eq!(report.system, "H(s) = (1) / (1)");
    }

    #[test]
    fn test_oscillator_is_not_flagged() {
        let report = run("1, 0, 1", "1");

        assert!(report.warnings.is_empty());
        assert!(report.impulse.iter().all(|(_, y)| y.abs() <= 1.0 + 1E-9));
    }

    #[test]
    fn test_unstable_system_is_reported() {
        let report = run("1, -1", "1");

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.impulse.len(), 500);
    }

    #[test]
    fn test_zero_numerator() {
        let report = run("1, 1", "0");

        assert!(report.zeros.is_empty());
        assert!(report.impulse.iter().all(|(_, y)| *y == 0.0));
    }

    #[test]
    fn test_bode_range_from_config() {
        let request = AnalysisRequest::parse("1, 1", "1", "10", "100", "highpass").expect("parse failed");
        let config = AnalysisConfig { bode_range: Some((0.1, 10.0)), bode_points: 3, ..AnalysisConfig::default() };

        let report = analyze(&request, &config).expect("analyze failed");

        assert_eq!(report.bode.len(), 3);
        assert_approx_eq!(report.bode[0].0, 0.1, 1E-12);
        assert_approx_eq!(report.bode[1].0, 1.0, 1E-12);
        assert_approx_eq!(report.bode[2].0, 10.0, 1E-12);
    }

    #[test]
    fn test_improper_system_fails() {
        let request = AnalysisRequest::parse("1, 1", "1, 0, 0", "10", "100", "lowpass").expect("parse failed");

        assert!(matches!(analyze(&request, &AnalysisConfig::default()), Err(IllegalArgument(_))));
    }

    #[rstest]
    #[case("1, x", "1", "10", "100", "lowpass")]
    #[case("1, 2", "1,,2", "10", "100", "lowpass")]
    #[case("1, 2", "1", "ten", "100", "lowpass")]
    #[case("1, 2", "1", "10", "", "lowpass")]
    #[case("1, 2", "1", "10", "100", "bandpass")]
    #[case("1, 2", "1", "10", "-100", "lowpass")]
    fn test_parse_rejects_illegal_input(#[case] den: &str, #[case] num: &str, #[case] cutoff: &str, #[case] fs: &str, #[case] filter_type: &str) {
        let result = AnalysisRequest::parse(den, num, cutoff, fs, filter_type);

        assert!(matches!(result, Err(IllegalArgument(_))), "{:?}", result);
    }

    #[rstest]
    #[case("50")]
    #[case("60")]
    #[case("0")]
    fn test_parse_rejects_invalid_cutoff(#[case] cutoff: &str) {
        let result = AnalysisRequest::parse("1, 2", "1", cutoff, "100", "lowpass");

        assert!(matches!(result, Err(InvalidCutoff { .. })));
    }

    #[test]
    fn test_parse_rejects_zero_denominator() {
        assert!(matches!(AnalysisRequest::parse("0, 0", "1", "10", "100", "lowpass"), Err(DegenerateInput(_))));
        assert!(matches!(AnalysisRequest::parse("", "1", "10", "100", "lowpass"), Err(DegenerateInput(_))));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"filter_order": 3}"#).expect("from_str failed");

        assert_eq!(config, AnalysisConfig { filter_order: 3, ..AnalysisConfig::default() });
        assert_eq!(AnalysisConfig::default().time_points, 500);
    }

    #[test]
    fn test_request_and_report_serialize() {
        let request = AnalysisRequest::parse("1, 1", "1", "5", "50", "HighPass").expect("parse failed");

        let json = serde_json::to_string(&request).expect("to_string failed");
        assert!(json.contains(r#""filter_type":"highpass""#));
        assert_eq!(serde_json::from_str::<AnalysisRequest>(&json).expect("from_str failed"), request);

        let report = analyze(&request, &AnalysisConfig::default()).expect("analyze failed");
        let json = serde_json::to_value(&report).expect("to_value failed");

        assert_eq!(json["filter"]["a"][0], 1.0);
        assert_eq!(json["impulse"].as_array().map(|v| v.len()), Some(500));
    }

    #[rstest]
    #[case(r#"{"den": [], "num": [1.0], "cutoff_hz": 10.0, "sample_rate_hz": 100.0, "filter_type": "lowpass"}"#)]
    #[case(r#"{"den": [0.0, 0.0], "num": [1.0], "cutoff_hz": 10.0, "sample_rate_hz": 100.0, "filter_type": "lowpass"}"#)]
    #[case(r#"{"den": [1.0, 1.0], "num": [1.0], "cutoff_hz": 60.0, "sample_rate_hz": 100.0, "filter_type": "lowpass"}"#)]
    #[case(r#"{"den": [1.0, 1.0], "num": [1.0], "cutoff_hz": 10.0, "sample_rate_hz": -100.0, "filter_type": "highpass"}"#)]
    fn test_invalid_request_is_not_deserialized(#[case] json: &str) {
        assert!(serde_json::from_str::<AnalysisRequest>(json).is_err());
    }

    #[test]
    fn test_deserialized_request_is_validated() {
        let json = r#"{"den": [1.0, 3.0, 2.0], "num": [1.0], "cutoff_hz": 10.0, "sample_rate_hz": 100.0, "filter_type": "lowpass"}"#;

        let request: AnalysisRequest = serde_json::from_str(json).expect("from_str failed");

        assert_eq!(request, AnalysisRequest::new(&[1.0, 3.0, 2.0], &[1.0], 10.0, 100.0, FilterKind::LowPass).expect("new failed"));
    }
}
