/// Asserts that two real or complex expressions are equal to within an epsilon.
///
/// An optional message can be specified with format arguments.
///
/// # Example
///
/// ```should_panic
/// use lti_analysis::assert_approx_eq;
/// let gain_db = -2.2;
///
/// assert_approx_eq!(gain_db, -3.0103, 0.5, "gain at cutoff is {} dB", gain_db);
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => ({
        match (&$left, &$right, &$epsilon) {
            (left_val, right_val, epsilon) => {
                if !$crate::macros::util::eq_within_epsilon(*left_val, *right_val, *epsilon) {
                    panic!(r#"assertion failed: `(left ≈ right)`
  left: `{:?}`,
 right: `{:?}`
   eps: `{:?}`"#, &*left_val, &*right_val, &*epsilon)
                }
            }
        }
    });
    ($left:expr, $right:expr, $epsilon:expr, $($arg:tt)+) => ({
        match (&($left), &($right), &($epsilon)) {
            (left_val, right_val, epsilon) => {
                if !$crate::macros::util::eq_within_epsilon(*left_val, *right_val, *epsilon) {
                    panic!(r#"assertion failed: `(left ≈ right)`
  left: `{:?}`,
 right: `{:?}`
   eps: `{:?}`: {}"#, &*left_val, &*right_val, &*epsilon, format_args!($($arg)+))
                }
            }
        }
    });
}
