#[macro_export]
/// Creates a [`Vec`] of [Complex](num_complex::Complex) numbers from `(re, im)` tuples.
///
/// # Example
///
/// ```
/// use lti_analysis::vec_cplx;
/// use num_complex::Complex;
///
/// let poles: Vec<Complex<f64>> = vec_cplx![(-1.0, 1.0), (-1.0, -1.0)];
/// assert_eq!(poles.len(), 2);
/// ```
#[doc(hidden)]
macro_rules! vec_cplx {
    ($(($re:expr, $im:expr)),*) => {
        vec![$(Complex::new($re, $im)),*]
    }
}

/// A shorthand for declaring a [Complex](num_complex::Complex) number.
///
/// # Example
///
/// ```
/// use lti_analysis::cplx;
/// use num_complex::Complex;
///
/// let j: Complex<f64> = cplx!(0.0, 1.0);
/// assert_eq!(j * j, cplx!(-1.0, 0.0));
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! cplx {
    ($re:expr, $im:expr) => {
        Complex::new($re, $im)
    }
}
