use num_complex::Complex64;
use ndarray::Array2;

use crate::linalg;

/// Asserts that `actual` equals `desired` up to a global phase
///
/// # Panics
///
/// Panics with both matrices (after phase matching) when they differ
/// beyond `|actual - desired| <= atol + rtol·|desired|` entrywise.
pub fn assert_allclose_up_to_global_phase(
    actual: &Array2<Complex64>,
    desired: &Array2<Complex64>,
    rtol: f64,
    atol: f64
) {
    let (actual, desired) = linalg::match_global_phase(actual, desired);
    assert!(
        linalg::allclose(&actual, &desired, rtol, atol),
        "Matrices differ up to global phase (rtol={}, atol={}).\n\
         \n\
         actual:\n{}\n\
         \n\
         desired:\n{}\n",
        rtol,
        atol,
        actual,
        desired
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accepts_global_phase() {
        let m = array![
            [Complex64::new(0.0, 1.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)]
        ];
        let phased = m.mapv(|v| v * Complex64::from_polar(1.0, -2.5));
        assert_allclose_up_to_global_phase(&phased, &m, 1e-5, 1e-8);
    }

    #[test]
    #[should_panic(expected = "Matrices differ up to global phase")]
    fn test_rejects_relative_phase() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let identity = array![[one, zero], [zero, one]];
        let z = array![[one, zero], [zero, -one]];
        assert_allclose_up_to_global_phase(&z, &identity, 1e-5, 1e-8);
    }
}
