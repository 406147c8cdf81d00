// Sorting and expanding complex root sets.

use std::cmp::Ordering;
use num_complex::Complex;
use num_traits::{One, Zero};
use crate::errors::Error;
use crate::errors::Error::IllegalArgument;

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Keys {
    Re,
    Im,
}

pub(crate) fn real_array_to_cplx(reals: &[f64]) -> Vec<Complex<f64>> {
    reals.iter().map(|x| Complex::new(*x, 0.0)).collect()
}

/// Sort complex numbers lexicographically by the given keys, e.g. `[Re, Im]`.
pub(crate) fn sort_lex(list: &mut [Complex<f64>], keys: &[Keys]) -> Result<(), Error> {
    sort_lex_with_map(list, keys, |a| *a)
}

pub(crate) fn sort_lex_with_map<MAP>(list: &mut [Complex<f64>], keys: &[Keys], m: MAP) -> Result<(), Error>
    where
        MAP: Fn(&Complex<f64>) -> Complex<f64>,
{
    if keys.is_empty() || keys.len() > 2 {
        return Err(IllegalArgument("Keys must be an non empty array of at most two elements.".to_string()));
    }

    if keys.len() == 2 && keys[0] == keys[1] {
        return Err(IllegalArgument("Keys must not repeat.".to_string()));
    }

    for (i, e) in list.iter().enumerate() {
        if !(e.re.is_finite() && e.im.is_finite()) {
            return Err(IllegalArgument(format!("Cannot sort because element at index {} is not finite.", i)));
        }
    }

    let key = |c: &Complex<f64>, k: Keys| match k {
        Keys::Re => c.re,
        Keys::Im => c.im,
    };

    list.sort_by(|a, b| {
        let (a, b) = (m(a), m(b));

        keys.iter().fold(Ordering::Equal, |acc, k| {
            acc.then(key(&a, *k).total_cmp(&key(&b, *k)))
        })
    });

    Ok(())
}

/// Find the coefficients of a polynomial with the given sequence of roots.
///
/// Returns the coefficients, highest power first, of the monic polynomial
/// whose zeros are `roots` (multiple roots must be repeated as many times as
/// their multiplicity). An empty root list gives the constant polynomial `[1]`.
///
/// Example: `[-1.0, 0.0, 1.0]` represents (x+1)(x-0)(x-1) and expands to
/// `[1.0, 0.0, -1.0, 0.0]`, i.e. x³ - x.
pub(crate) fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut p = Vec::with_capacity(roots.len() + 1);
    p.push(Complex::<f64>::one());

    // p(x) * (x - r): shift left by one power, then subtract r * p.
    for r in roots {
        p.push(Complex::<f64>::zero());

        for i in (1..p.len()).rev() {
            p[i] = p[i] - r * p[i - 1];
        }
    }

    p
}

pub(crate) fn is_real(x: Complex<f64>) -> bool {
    x.im == 0.0
}

#[cfg(test)]
mod tests {
    use num_complex::{Complex, Complex64};
    use crate::util::Keys::{Im, Re};
    use crate::util::{poly, sort_lex};
    use crate::vec_cplx;
    use crate::assert_approx_eq;
    use crate::errors::Error::IllegalArgument;

    fn unsorted() -> [Complex<f64>; 6] {
        [
            Complex64::new(2.0, 1.0),
            Complex64::new(1.0, 7.0),
            Complex64::new(2.0, 14.0),
            Complex64::new(2.0, 0.0),
            Complex64::new(9.0, 0.02),
            Complex64::new(8.0, 43.0),
        ]
    }

    #[test]
    fn test_sorting_re_im() {
        let mut list = unsorted();

        let expected = vec_cplx![(1.0, 7.0), (2.0, 0.0), (2.0, 1.0), (2.0, 14.0), (8.0, 43.0), (9.0, 0.02)];

        sort_lex(&mut list, &[Re, Im]).expect("sort_lex crashed.");

        assert_eq!(list.to_vec(), expected);
    }

    #[test]
    fn test_sorting_im_only() {
        let mut list = unsorted();

        let expected = vec_cplx![(2.0, 0.0), (9.0, 0.02), (2.0, 1.0), (1.0, 7.0), (2.0, 14.0), (8.0, 43.0)];

        sort_lex(&mut list, &[Im]).expect("sort_lex crashed.");

        assert_eq!(list.to_vec(), expected);
    }

    #[test]
    fn test_sorting_rejects_bad_keys_and_nan() {
        let mut list = unsorted();
        assert_eq!(sort_lex(&mut list, &[]), Err(IllegalArgument("Keys must be an non empty array of at most two elements.".to_string())));
        assert_eq!(sort_lex(&mut list, &[Re, Re]), Err(IllegalArgument("Keys must not repeat.".to_string())));

        let mut list = vec_cplx![(1.0, 0.0), (f64::NAN, 0.0)];
        assert!(sort_lex(&mut list, &[Re]).is_err());
    }

    #[test]
    fn test_poly_symmetric_roots() {
        let coeff = poly(&vec_cplx![(-1.0, 0.0), (0.0, 0.0), (1.0, 0.0)]);
        let expected_coeff = vec_cplx![(1.0, 0.0), (0.0, 0.0), (-1.0, 0.0), (0.0, 0.0)];

        assert_eq!(coeff.len(), expected_coeff.len());

        for (c, e) in coeff.iter().zip(&expected_coeff) {
            assert_approx_eq!(*c, *e, 1E-12);
        }
    }

    #[test]
    fn test_poly_repeated_roots() {
        let coeff = poly(&vec_cplx![(2.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        let expected_coeff = vec_cplx![(1.0, 0.0), (-11.0, 0.0), (44.0, 0.0), (-76.0, 0.0), (48.0, 0.0)];

        assert_eq!(coeff.len(), expected_coeff.len());

        for (c, e) in coeff.iter().zip(&expected_coeff) {
            assert_approx_eq!(*c, *e, 1E-12);
        }
    }

    #[test]
    fn test_poly_conjugate_pair() {
        // (s + 1 - j)(s + 1 + j) = s² + 2s + 2
        let coeff = poly(&vec_cplx![(-1.0, 1.0), (-1.0, -1.0)]);

        assert_approx_eq!(coeff[0], Complex::new(1.0, 0.0), 1E-12);
        assert_approx_eq!(coeff[1], Complex::new(2.0, 0.0), 1E-12);
        assert_approx_eq!(coeff[2], Complex::new(2.0, 0.0), 1E-12);
    }

    #[test]
    fn test_poly_no_roots() {
        assert_eq!(poly(&[]), vec_cplx![(1.0, 0.0)]);
    }
}
