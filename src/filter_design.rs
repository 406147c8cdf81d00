//! Design of digital Butterworth filters.
//!
//! The analog prototype is moved to the requested cutoff with a lowpass or
//! highpass transform and mapped to the z-plane with the bilinear transform,
//! after prewarping the cutoff.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use log::debug;
use num_complex::{Complex, Complex64};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use crate::errors::Error;
use crate::errors::Error::{IllegalArgument, InvalidCutoff};
use crate::transfer_function::ZeroPoleGain;
use crate::zpk2tf::zpk2tf;

/// The order used by the reference analysis.
pub const DEFAULT_ORDER: u32 = 5;

#[derive(Debug, PartialEq, Clone, Copy)]
/// The type of filter to design together with its cutoff frequency.
///
/// The cutoff is in Hz when a sample rate is supplied to [butter].
#[allow(missing_docs)]
pub enum FilterType {
    LowPass(f64),
    HighPass(f64),
}

/// The filter response shape without a cutoff, as selected by a user.
///
/// Parses from `"lowpass"`/`"low"` and `"highpass"`/`"high"`, case-insensitively.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

impl FilterKind {
    /// Attach a cutoff frequency.
    pub fn with_cutoff(self, cutoff: f64) -> FilterType {
        match self {
            FilterKind::LowPass => FilterType::LowPass(cutoff),
            FilterKind::HighPass => FilterType::HighPass(cutoff),
        }
    }
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" | "low" => Ok(FilterKind::LowPass),
            "highpass" | "high" => Ok(FilterKind::HighPass),
            other => Err(IllegalArgument(format!("Unsupported filter type '{}'. Choose 'lowpass' or 'highpass'.", other))),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::LowPass => write!(f, "lowpass"),
            FilterKind::HighPass => write!(f, "highpass"),
        }
    }
}

/// Digital filter coefficients in powers of z⁻¹.
///
/// `a[0]` is always one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoeffs")]
pub struct DigitalFilterCoeffs {
    b: Vec<f64>,
    a: Vec<f64>,
}

// Deserialized coefficients go through `DigitalFilterCoeffs::new`.
#[derive(Deserialize)]
struct RawCoeffs {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl TryFrom<RawCoeffs> for DigitalFilterCoeffs {
    type Error = Error;

    fn try_from(raw: RawCoeffs) -> Result<Self, Self::Error> {
        DigitalFilterCoeffs::new(&raw.b, &raw.a)
    }
}

impl DigitalFilterCoeffs {
    /// Create filter coefficients, normalizing so `a[0] = 1`.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalArgument`] if either sequence is empty, `a[0]` is zero,
    /// or a coefficient is not finite.
    pub fn new(b: &[f64], a: &[f64]) -> Result<Self, Error> {
        if b.is_empty() || a.is_empty() {
            return Err(IllegalArgument("Filter coefficients must not be empty.".to_string()));
        }

        if b.iter().chain(a).any(|c| !c.is_finite()) {
            return Err(IllegalArgument("Filter coefficients must be finite.".to_string()));
        }

        let a0 = a[0];
        if a0 == 0.0 {
            return Err(IllegalArgument("The leading feedback coefficient a[0] must not be zero.".to_string()));
        }

        Ok(DigitalFilterCoeffs {
            b: b.iter().map(|x| x / a0).collect(),
            a: a.iter().map(|x| x / a0).collect(),
        })
    }

    /// Feedforward coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Feedback coefficients, `a[0] = 1`.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// The filter order, `max(len(a), len(b)) - 1`.
    pub fn order(&self) -> usize {
        self.a.len().max(self.b.len()) - 1
    }
}

/// Designs an Nth-order digital Butterworth filter.
///
/// # Arguments
///
/// * `N` - The order of the filter, at least 1.
/// * `filter_type` - Low pass or high pass, with the cutoff frequency in Hz.
/// * `fs` - The sampling frequency in Hz.
///
/// # Returns
///
/// The filter coefficients `(b, a)`, both of length `N + 1`.
///
/// # Errors
///
/// * [`Error::InvalidCutoff`] unless `0 < cutoff < fs/2`.
/// * [`Error::IllegalArgument`] for a zero order or a non-positive sample rate.
///
/// # Example
///```rust
/// use lti_analysis::filter_design::{butter, FilterType};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let order = 5;
///     let cutoff = 10.0;
///     let fs = 100.0;
///
///     let coeffs = butter(order, FilterType::LowPass(cutoff), fs)?;
///
///     assert_eq!(coeffs.b().len(), 6);
///     assert_eq!(coeffs.a()[0], 1.0);
///
///     return Ok( () );
///  }
/// ```
pub fn butter(N: u32, filter_type: FilterType, fs: f64) -> Result<DigitalFilterCoeffs, Error> {
    let zpk = butter_zpk(N, filter_type, fs)?;

    zpk_to_coeffs(&zpk)
}

/// Designs an Nth-order digital Butterworth filter in zero-pole-gain form.
///
/// See [butter] for the arguments.
pub fn butter_zpk(N: u32, filter_type: FilterType, fs: f64) -> Result<ZeroPoleGain, Error> {
    if !(fs.is_finite() && fs > 0.0) {
        return Err(IllegalArgument(format!("The sampling frequency must be positive, got {}.", fs)));
    }

    iirfilter(N, filter_type, Some(fs))
}

fn butter_internal(N: u32, filter_type: FilterType, fs: Option<f64>) -> Result<ZeroPoleGain, Error> {
    iirfilter(N, filter_type, fs)
}

fn zpk_to_coeffs(zpk: &ZeroPoleGain) -> Result<DigitalFilterCoeffs, Error> {
    let ba = zpk2tf(&zpk.z, &zpk.p, zpk.k)?;

    DigitalFilterCoeffs::new(&ba.b, &ba.a)
}

/// Designs an Nth-order digital Butterworth filter.
///
/// Without `fs` the cutoff is already normalized to the Nyquist frequency.
fn iirfilter(N: u32, filter_type: FilterType, fs: Option<f64>) -> Result<ZeroPoleGain, Error> {
    if N == 0 {
        return Err(IllegalArgument("The filter order must be at least 1.".to_string()));
    }

    let cutoff = match filter_type {
        FilterType::LowPass(cutoff) | FilterType::HighPass(cutoff) => cutoff,
    };

    let nyquist = fs.map_or(1.0, |fs| fs / 2.0);

    // Normalize the cutoff to the Nyquist frequency.
    let Wn = cutoff / nyquist;

    if !(Wn > 0.0 && Wn < 1.0) {
        return Err(InvalidCutoff { cutoff, nyquist });
    }

    debug!("Designing an order {} Butterworth {:?} filter, Wn = {}", N, filter_type, Wn);

    // Prewarp for the bilinear transform at fs = 2.
    let fs = 2.0;
    let warped = 2.0 * fs * f64::tan(PI * Wn / fs);

    let zpk = butterap(N);

    let zpk = match filter_type {
        FilterType::LowPass(_) => lp2lp_zpk(&zpk, warped)?,
        FilterType::HighPass(_) => lp2hp_zpk(&zpk, warped)?,
    };

    bilinear_zpk(&zpk, fs)
}

/// Return the analog prototype of an Nth-order Butterworth filter.
/// The filter will have an angular (e.g., rad/s) cutoff frequency of 1.
fn butterap(N: u32) -> ZeroPoleGain {
    let N = N as i32;
    let i = Complex64::i();

    // Middle value is 0 to ensure an exactly real pole
    let p: Vec<Complex64> = (-N + 1..N)
        .step_by(2)
        .map(|m| -((i * PI * f64::from(m) / (2.0 * f64::from(N))).exp()))
        .collect();

    ZeroPoleGain { z: vec![], p, k: 1.0 }
}

// Lowpass
fn lp2lp_zpk(zpk: &ZeroPoleGain, wo: f64) -> Result<ZeroPoleGain, Error> {
    let degree = zpk.relative_degree()?;

    // Scale all points radially from origin to shift cutoff frequency
    let z_lp: Vec<Complex64> = zpk.z.iter().map(|x| wo * x).collect();
    let p_lp: Vec<Complex64> = zpk.p.iter().map(|x| wo * x).collect();

    // Each shifted pole decreases gain by wo, each shifted zero increases it.
    let k_lp = zpk.k * wo.powi(degree as i32);

    Ok(ZeroPoleGain { z: z_lp, p: p_lp, k: k_lp })
}

// Highpass
fn lp2hp_zpk(zpk: &ZeroPoleGain, wo: f64) -> Result<ZeroPoleGain, Error> {
    let degree = zpk.relative_degree()?;

    // Invert all points about the unit circle and scale to the cutoff
    let mut z_hp: Vec<Complex64> = zpk.z.iter().map(|x| wo / x).collect();
    let p_hp: Vec<Complex64> = zpk.p.iter().map(|x| wo / x).collect();

    // If lowpass had zeros at infinity, inverting moves them to origin.
    z_hp.extend(std::iter::repeat(Complex64::zero()).take(degree));

    // Cancel out gain change caused by inversion
    let k_hp = zpk.k * (prod_negated(&zpk.z) / prod_negated(&zpk.p)).re;

    Ok(ZeroPoleGain { z: z_hp, p: p_hp, k: k_hp })
}

fn bilinear_zpk(zpk: &ZeroPoleGain, fs: f64) -> Result<ZeroPoleGain, Error> {
    let degree = zpk.relative_degree()?;

    let fs2 = Complex64::new(2.0 * fs, 0.0);

    // Bilinear transform the poles and zeros
    let mut z_z: Vec<Complex64> = zpk.z.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
    let p_z: Vec<Complex64> = zpk.p.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();

    // Any zeros that were at infinity get moved to the Nyquist frequency
    z_z.extend(std::iter::repeat(-Complex64::one()).take(degree));

    // Compensate for gain change
    let k_z = zpk.k * (
        zpk.z.iter().map(|z| fs2 - z).product::<Complex64>() /
            zpk.p.iter().map(|p| fs2 - p).product::<Complex64>()
    ).re;

    Ok(ZeroPoleGain { z: z_z, p: p_z, k: k_z })
}

// Product of the negated elements, one for an empty list.
fn prod_negated(list: &[Complex64]) -> Complex64 {
    list.iter().fold(Complex::one(), |acc, x| acc * -x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use crate::vec_cplx;
    use crate::cplx;
    use crate::assert_approx_eq;
    use crate::filter_design::FilterType::{HighPass, LowPass};
    use crate::util::Keys;

    #[test]
    fn test_butterap() {
        let zpk_expected = ZeroPoleGain {
            z: vec_cplx![],
            p: vec_cplx![
            (-0.30901699437494745, 0.951_056_516_295_153_5),
            (-0.809_016_994_374_947_5, 0.587_785_252_292_473_1),
            ( -1.0, 0.0),
            (-0.809_016_994_374_947_5, -0.587_785_252_292_473_1),
            (-0.30901699437494745, -0.951_056_516_295_153_5)],
            k: 1.0,
        };

        butterap(5).assert_approx_equal_to(&zpk_expected, 1E-12);
    }

    #[test]
    fn test_butter_highpass_digital_z_plane() {
        for N in 1..25 {
            let zpk = butter_internal(N, HighPass(0.01), None).expect("Call to butter failed");

            assert_eq!(zpk.z.len(), N as usize);

            // All zeros exactly at DC
            for e in zpk.z.iter() {
                assert_eq!(*e, Complex64::one());
            }

            // No poles outside unit circle
            for e in zpk.p.iter() {
                assert!(e.norm() <= 1.0);
            }
        }
    }

    #[test]
    fn test_butter_lowpass_zeros_at_nyquist() {
        for N in 1..12 {
            let zpk = butter_internal(N, LowPass(0.3), None).expect("Call to butter failed");

            assert_eq!(zpk.z, vec![-Complex64::one(); N as usize]);
        }
    }

    #[test]
    fn test_butter_second_order_half_band() {
        let lp = butter(2, LowPass(25.0), 100.0).expect("Call to butter failed");
        let hp = butter(2, HighPass(25.0), 100.0).expect("Call to butter failed");

        let b_lp = [0.29289321881345254, 0.5857864376269051, 0.29289321881345254];
        let b_hp = [0.29289321881345254, -0.5857864376269051, 0.29289321881345254];
        let a = [1.0, 0.0, 0.1715728752538099];

        for i in 0..3 {
            assert_approx_eq!(lp.b()[i], b_lp[i], 1E-12);
            assert_approx_eq!(hp.b()[i], b_hp[i], 1E-12);
            assert_approx_eq!(lp.a()[i], a[i], 1E-12);
            assert_approx_eq!(hp.a()[i], a[i], 1E-12);
        }
    }

    #[test]
    fn test_butter_first_order_half_band() {
        let coeffs = butter(1, LowPass(0.5), 2.0).expect("Call to butter failed");

        assert_approx_eq!(coeffs.b()[0], 0.5, 1E-12);
        assert_approx_eq!(coeffs.b()[1], 0.5, 1E-12);
        assert_approx_eq!(coeffs.a()[1], 0.0, 1E-12);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    #[case(8)]
    fn test_coefficient_lengths(#[case] order: u32) {
        for filter_type in [LowPass(3.0), HighPass(3.0)] {
            let coeffs = butter(order, filter_type, 50.0).expect("Call to butter failed");

            assert_eq!(coeffs.b().len(), order as usize + 1);
            assert_eq!(coeffs.a().len(), order as usize + 1);
            assert_eq!(coeffs.a()[0], 1.0);
            assert_eq!(coeffs.order(), order as usize);
        }
    }

    #[test]
    fn test_unity_gain_in_passband() {
        // Lowpass passes DC: sum(b) / sum(a) = 1.
        let lp = butter(5, LowPass(5.0), 100.0).expect("Call to butter failed");
        assert_approx_eq!(lp.b().iter().sum::<f64>() / lp.a().iter().sum::<f64>(), 1.0, 1E-9);

        // Highpass passes Nyquist: alternating sums, z = -1.
        let hp = butter(5, HighPass(5.0), 100.0).expect("Call to butter failed");
        let alt = |c: &[f64]| c.iter().enumerate().map(|(i, x)| if i % 2 == 0 { *x } else { -x }).sum::<f64>();
        assert_approx_eq!(alt(hp.b()) / alt(hp.a()), 1.0, 1E-9);
    }

    #[rstest]
    #[case(LowPass(50.0))]
    #[case(LowPass(60.0))]
    #[case(HighPass(0.0))]
    #[case(HighPass(-1.0))]
    #[case(LowPass(f64::NAN))]
    fn test_invalid_cutoff(#[case] filter_type: FilterType) {
        assert!(matches!(butter(5, filter_type, 100.0), Err(InvalidCutoff { nyquist, .. }) if nyquist == 50.0));
    }

    #[test]
    fn test_invalid_order_and_rate() {
        assert!(matches!(butter(0, LowPass(1.0), 100.0), Err(IllegalArgument(_))));
        assert!(matches!(butter(5, LowPass(1.0), 0.0), Err(IllegalArgument(_))));
    }

    #[test]
    fn test_filter_kind_parsing() {
        assert_eq!("lowpass".parse::<FilterKind>(), Ok(FilterKind::LowPass));
        assert_eq!(" HighPass ".parse::<FilterKind>(), Ok(FilterKind::HighPass));
        assert_eq!("high".parse::<FilterKind>(), Ok(FilterKind::HighPass));
        assert!("bandpass".parse::<FilterKind>().is_err());

        assert_eq!(FilterKind::HighPass.with_cutoff(3.0), HighPass(3.0));
        assert_eq!(FilterKind::LowPass.to_string(), "lowpass");
    }

    #[test]
    fn test_coeffs_are_normalized() {
        let coeffs = DigitalFilterCoeffs::new(&[2.0, 4.0], &[2.0, 1.0]).expect("new failed");

        assert_eq!(coeffs.b(), &[1.0, 2.0]);
        assert_eq!(coeffs.a(), &[1.0, 0.5]);
        assert!(DigitalFilterCoeffs::new(&[1.0], &[0.0, 1.0]).is_err());
        assert!(DigitalFilterCoeffs::new(&[], &[1.0]).is_err());
    }

    #[test]
    fn test_coeffs_deserialize_through_validation() {
        let coeffs: DigitalFilterCoeffs = serde_json::from_str(r#"{"b": [2.0, 4.0], "a": [2.0, 1.0]}"#).expect("from_str failed");

        coeffs.assert_approx_equal_to(&DigitalFilterCoeffs::new(&[1.0, 2.0], &[1.0, 0.5]).expect("new failed"), 1E-15);
        assert!(serde_json::from_str::<DigitalFilterCoeffs>(r#"{"b": [1.0], "a": [0.0]}"#).is_err());
    }

    #[test]
    fn test_butter_highpass_high_odd_order() {
        let zpk_out = butter_internal(27, HighPass(0.56), None).expect("Call to butter failed");

        let zpk_expected = ZeroPoleGain {
            z: vec![Complex64::one(); 27],
            p: vec_cplx![
                (-1.772572785680147e-01, 9.276431102995948e-01),
                (-1.772572785680147e-01, -9.276431102995948e-01),
                (-1.600766565322114e-01, 8.264026279893268e-01),
                (-1.600766565322114e-01, -8.264026279893268e-01),
                (-1.461948419016121e-01, 7.341841939120078e-01),
                (-1.461948419016121e-01, -7.341841939120078e-01),
                (-1.348975284762046e-01, 6.493235066053785e-01),
                (-1.348975284762046e-01, -6.493235066053785e-01),
                (-1.256628210712206e-01, 5.704921366889227e-01),
                (-1.256628210712206e-01, -5.704921366889227e-01),
                (-1.181038235962314e-01, 4.966120551231630e-01),
                (-1.181038235962314e-01, -4.966120551231630e-01),
                (-1.119304913239356e-01, 4.267938916403775e-01),
                (-1.119304913239356e-01, -4.267938916403775e-01),
                (-1.069237739782691e-01, 3.602914879527338e-01),
                (-1.069237739782691e-01, -3.602914879527338e-01),
                (-1.029178030691416e-01, 2.964677964142126e-01),
                (-1.029178030691416e-01, -2.964677964142126e-01),
                (-9.978747500816100e-02, 2.347687643085738e-01),
                (-9.978747500816100e-02, -2.347687643085738e-01),
                (-9.743974496324025e-02, 1.747028739092479e-01),
                (-9.743974496324025e-02, -1.747028739092479e-01),
                (-9.580754551625957e-02, 1.158246860771989e-01),
                (-9.580754551625957e-02, -1.158246860771989e-01),
                (-9.484562207782568e-02, 5.772118357151691e-02),
                (-9.484562207782568e-02, -5.772118357151691e-02),
                (-9.452783117928215e-02, 0.0)
            ],
            k: 9.585686688851069e-09,
        };

        zpk_out.assert_approx_equal_to_with_sort(&zpk_expected, 1E-8, &[Keys::Im], &[Keys::Im]);
    }

    #[test]
    fn test_lp2lp_zpk_basic1() {
        let i = Complex64::i();

        let zpk_input = ZeroPoleGain {
            z: vec_cplx![],
            p: vec![(-1.0+i)/f64::sqrt(2.0), (-1.0-i)/f64::sqrt(2.0) ],
            k: 1.0,
        };

        let zpk_out = lp2lp_zpk(&zpk_input, 5.0).expect("lp2lp_zpk() failed");

        let zpk_expected = ZeroPoleGain {
            z: vec_cplx![],
            p: zpk_input.p.iter().map(|x| 5.0 * x).collect(),
            k: 25.0,
        };

        zpk_out.assert_approx_equal_to(&zpk_expected, 1E-12);
    }

    #[test]
    fn test_lp2lp_zpk_pseudo_chebyshev() {
        let zpk_input = ZeroPoleGain {
            z: vec_cplx![(0.0, -2.0) , (0.0, 2.0)],
            p: vec_cplx![(-0.75, 0.0), (-0.5, -0.5), (-0.5, 0.5) ],
            k: 3.0,
        };

        let zpk_out = lp2lp_zpk(&zpk_input, 20.0).expect("lp2lp_zpk() failed");

        let zpk_expected = ZeroPoleGain {
            z: vec_cplx![(0.0, -40.0), (0.0, 40.0)],
            p: vec_cplx![(-15.0, 0.0), (-10.0, -10.0), (-10.0, 10.0)],
            k: 60.0,
        };

        zpk_out.assert_approx_equal_to(&zpk_expected, 1E-12);
    }

    #[test]
    fn test_lp2hp_zpk_basic1() {
        let i = Complex64::i();

        let zpk_input = ZeroPoleGain {
            z: vec_cplx![],
            p: vec![(-1.0+i)/f64::sqrt(2.0), (-1.0-i)/f64::sqrt(2.0) ],
            k: 1.0,
        };

        let zpk_out = lp2hp_zpk(&zpk_input, 5.0).expect("lp2hp_zpk() failed");

        let zpk_expected= ZeroPoleGain {
            z: vec_cplx![(0.0, 0.0), (0.0, 0.0)],
            p: zpk_input.p.iter().rev().map(|x| 5.0 * x).collect(),
            k: 1.0,
        };

        zpk_out.assert_approx_equal_to(&zpk_expected, 1E-12);
    }

    #[test]
    fn test_lp2hp_zpk2() {
        let zpk_input = ZeroPoleGain {
            z: vec_cplx![(0.0, -2.0) , (0.0, 2.0)],
            p: vec_cplx![(-0.75, 0.0), (-0.5, -0.5), (-0.5, 0.5) ],
            k: 3.0,
        };

        let zpk_out = lp2hp_zpk(&zpk_input, 6.0).expect("lp2hp_zpk() failed");

        let zpk_expected = ZeroPoleGain {
            z: vec_cplx![(0.0, 3.0), (0.0, -3.0), (0.0, 0.0)],
            p: vec_cplx![(-8.0, 0.0), (-6.0, 6.0), (-6.0, -6.0)],
            k: 32.0,
        };

        zpk_out.assert_approx_equal_to(&zpk_expected, 1E-12);
    }

    #[test]
    fn test_bilinear() {
        let zpk_input = ZeroPoleGain {
            z: vec_cplx![(0.0, -2.0) , (0.0, 2.0)],
            p: vec_cplx![(-0.75, 0.0), (-0.5, -0.5), (-0.5, 0.5) ],
            k: 3.0,
        };

        let zpk_out = bilinear_zpk(&zpk_input, 10.0).expect("bilinear_zpk() failed");

        let zpk_expected = ZeroPoleGain {
            z: vec![
                cplx!( 20.0, -2.0) / cplx!( 20.0, 2.0),
                cplx!( 20.0, 2.0) / cplx!( 20.0, -2.0),
                cplx!( -1.0, 0.0),
            ],
            p: vec![
                cplx!(77.0/83.0, 0.0),
                cplx!(39.0/2.0, -1.0/2.0) / cplx!(41.0/2.0, 1.0/2.0 ),
                cplx!(39.0/2.0, 1.0/2.0) / cplx!(41.0/2.0, -1.0/2.0),
            ],
            k: 9696.0 / 69803.0,
        };

        zpk_out.assert_approx_equal_to(&zpk_expected, 1E-12);
    }
}
