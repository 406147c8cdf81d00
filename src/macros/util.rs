use num_complex::ComplexFloat;

/// True when `a` and `b` lie strictly closer than `eps`, for real and complex floats alike.
pub fn eq_within_epsilon<F: ComplexFloat>(a: F, b: F, eps: F::Real) -> bool {
    F::abs(a - b) < eps
}
