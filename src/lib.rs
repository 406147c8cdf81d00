//! Analysis of continuous-time LTI systems given as transfer functions, and
//! zero-phase Butterworth filtering of their responses, following scipy.signal.
//!
//! # Example
//!
//! ```rust
//! use lti_analysis::transfer_function::TransferFunction;
//! use lti_analysis::freq_response::{bode, BodeOptions};
//! use lti_analysis::state_space::{impulse, linspace};
//! use lti_analysis::filter_design::{butter, FilterType};
//! use lti_analysis::filtfilt::filtfilt_series;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // H(s) = 1 / (s² + 0.4s + 1)
//!     let tf = TransferFunction::new(&[1.0], &[1.0, 0.4, 1.0])?;
//!
//!     let zpk = tf.to_zpk()?;
//!     let response = bode(&tf, &BodeOptions::default())?;
//!
//!     let t = linspace(0.0, 10.0, 500)?;
//!     let h = impulse(&tf, &t)?;
//!
//!     let coeffs = butter(5, FilterType::LowPass(10.0), 100.0)?;
//!     let smoothed = filtfilt_series(&coeffs, &h.series)?;
//!
//!     assert_eq!(zpk.p.len(), 2);
//!     assert_eq!(response.len(), 100);
//!     assert_eq!(smoothed.len(), 500);
//!
//!     return Ok( () );
//! }
//! ```
//!
//! [analysis::analyze] runs all of the above from one [analysis::AnalysisRequest].
//!
//! # Notes
//!
//! See: [scipy.signal](https://docs.scipy.org/doc/scipy/reference/signal.html)
//!
//! ⚠️ Only lowpass and highpass Butterworth filters are designed.
//!

#![ cfg_attr( nightly, feature(doc_auto_cfg) ) ]

#![allow(dead_code)]
#![allow(non_snake_case)]
#![allow(clippy::needless_return)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod errors;

#[doc(hidden)]
pub mod macros;

mod util;
mod zpk2tf;
pub mod polynomial;
pub mod transfer_function;
pub mod freq_response;
pub mod state_space;
pub mod filter_design;
pub mod filter;
pub mod filtfilt;
pub mod analysis;
mod test_util;
