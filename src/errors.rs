//! Errors which originate in this library.
use crate::errors::Error::IllegalArgument;
use std::num::ParseFloatError;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq)]
/// A custom error type for errors which can occur in this library.
pub enum Error {
    /// Errors caused the user providing an illegal argument to a function.
    #[error("Illegal Argument: {0}")]
    IllegalArgument(String),

    /// Errors resulting from logic errors in the code. Not recoverable by the user.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// A polynomial whose coefficients are all zero, or which has no coefficients at all.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// The denominator of a transfer function vanished at an evaluated frequency.
    #[error("Singular denominator at ω = {omega} rad/s")]
    SingularDenominator {
        /// The offending angular frequency.
        omega: f64
    },

    /// A filter cutoff outside of the open interval (0, fs/2).
    #[error("Invalid cutoff: {cutoff} Hz must satisfy 0 < cutoff < fs/2 = {nyquist} Hz")]
    InvalidCutoff {
        /// The requested cutoff in Hz.
        cutoff: f64,
        /// Half the sample rate in Hz.
        nyquist: f64,
    },

    /// The signal is too short for the edge padding the filter requires.
    #[error("Insufficient length: the input has {len} samples, it must be longer than padlen = {padlen}")]
    InsufficientLength {
        /// Length of the input signal.
        len: usize,
        /// Number of padding samples required at each end.
        padlen: usize,
    },
}

impl From<ParseFloatError> for Error {
    fn from(err: ParseFloatError) -> Self {
        IllegalArgument(err.to_string())
    }
}

/// Non-fatal conditions detected while computing a result.
///
/// The result is still returned, warnings travel alongside it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Warning {
    /// The system has poles in the right half-plane; its impulse response diverges.
    /// The offending poles are listed as `(re, im)` pairs.
    UnstableSystem {
        #[allow(missing_docs)]
        poles: Vec<(f64, f64)>
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnstableSystem { poles } => {
                write!(f, "Unstable system: {} pole(s) in the right half-plane", poles.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_illegal_argument() {
        let err: Error = "1,5".parse::<f64>().unwrap_err().into();

        assert!(matches!(err, Error::IllegalArgument(_)));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::InvalidCutoff { cutoff: 60.0, nyquist: 50.0 }.to_string(),
            "Invalid cutoff: 60 Hz must satisfy 0 < cutoff < fs/2 = 50 Hz");
        assert_eq!(
            Error::InsufficientLength { len: 10, padlen: 18 }.to_string(),
            "Insufficient length: the input has 10 samples, it must be longer than padlen = 18");
        assert_eq!(
            Warning::UnstableSystem { poles: vec![(1.0, 0.0)] }.to_string(),
            "Unstable system: 1 pole(s) in the right half-plane");
    }
}
