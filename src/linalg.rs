//! Matrix comparisons used by the equivalence check

use num_complex::Complex64;
use ndarray::Array2;

/// Whether `m` is square and `m · m†` is the identity within `atol`
pub fn is_unitary(m: &Array2<Complex64>, atol: f64) -> bool {
    let (rows, cols) = m.dim();
    if rows != cols {
        return false;
    }

    let product = m.dot(&m.t().mapv(|v| v.conj()));
    product.indexed_iter().all(|((i, j), v)| {
        let expected = if i == j { 1.0 } else { 0.0 };
        (v - Complex64::new(expected, 0.0)).norm() <= atol
    })
}

/// The unit factor that rotates `v` onto the non-negative real axis
///
/// Exact for values on the real or imaginary axes.
pub fn dephase(v: Complex64) -> Complex64 {
    if v.im == 0.0 {
        return if v.re < 0.0 { Complex64::new(-1.0, 0.0) } else { Complex64::new(1.0, 0.0) };
    }
    if v.re == 0.0 {
        return if v.im < 0.0 { Complex64::new(0.0, 1.0) } else { Complex64::new(0.0, -1.0) };
    }
    Complex64::from_polar(1.0, -v.arg())
}

/// Index of the first entry of largest magnitude
fn largest_entry(m: &Array2<Complex64>) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f64)> = None;
    for (index, v) in m.indexed_iter() {
        let magnitude = v.norm();
        if best.map_or(true, |(_, top)| magnitude > top) {
            best = Some((index, magnitude));
        }
    }
    best.map(|(index, _)| index)
}

/// Phases `a` and `b` so that their entries at the largest entry of `b` are real and non-negative
///
/// Matrices of different shape are returned unchanged.
pub fn match_global_phase(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>
) -> (Array2<Complex64>, Array2<Complex64>) {
    if a.shape() != b.shape() {
        return (a.clone(), b.clone());
    }
    match largest_entry(b) {
        Some(k) => {
            let (da, db) = (dephase(a[k]), dephase(b[k]));
            (a.mapv(|v| v * da), b.mapv(|v| v * db))
        }
        None => (a.clone(), b.clone()),
    }
}

/// Entrywise `|a - b| <= atol + rtol·|b|`
pub fn allclose(a: &Array2<Complex64>, b: &Array2<Complex64>, rtol: f64, atol: f64) -> bool {
    a.shape() == b.shape()
        && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= atol + rtol * y.norm())
}

/// Whether `a` equals `b` times some unit complex number, within tolerance
pub fn allclose_up_to_global_phase(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
    rtol: f64,
    atol: f64
) -> bool {
    let (a, b) = match_global_phase(a, b);
    allclose(&a, &b, rtol, atol)
}

/// Largest entrywise deviation after matching global phase; infinite on shape mismatch
pub fn max_deviation_up_to_global_phase(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    if a.shape() != b.shape() {
        return f64::INFINITY;
    }
    let (a, b) = match_global_phase(a, b);
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_dephase_axes_are_exact() {
        assert_eq!(dephase(c(-2.0, 0.0)), c(-1.0, 0.0));
        assert_eq!(dephase(c(0.0, 0.0)), c(1.0, 0.0));
        assert_eq!(dephase(c(0.0, 3.0)), c(0.0, -1.0));
        assert_eq!(dephase(c(0.0, -3.0)), c(0.0, 1.0));

        let v = c(1.0, 1.0);
        let rotated = v * dephase(v);
        assert_abs_diff_eq!(rotated.im, 0.0, epsilon = 1e-12);
        assert!(rotated.re > 0.0);
    }

    #[test]
    fn test_allclose_up_to_global_phase() {
        let a = array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.0, 1.0)]];
        let phase = Complex64::from_polar(1.0, 1.234);
        let b = a.mapv(|v| v * phase);
        assert!(allclose_up_to_global_phase(&a, &b, 1e-5, 1e-8));
        assert!(!allclose(&a, &b, 1e-5, 1e-8));
        assert_abs_diff_eq!(max_deviation_up_to_global_phase(&a, &b), 0.0, epsilon = 1e-12);

        let z = array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]];
        assert!(!allclose_up_to_global_phase(&a, &z, 1e-5, 1e-8));
        assert_abs_diff_eq!(max_deviation_up_to_global_phase(&a, &z), 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<Complex64>::zeros((2, 2));
        let b = Array2::<Complex64>::zeros((4, 4));
        assert!(!allclose_up_to_global_phase(&a, &b, 1e-5, 1e-8));
        assert!(max_deviation_up_to_global_phase(&a, &b).is_infinite());
    }

    #[test]
    fn test_is_unitary() {
        let h = c(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        assert!(is_unitary(&array![[h, h], [h, -h]], 1e-10));
        assert!(!is_unitary(&array![[c(1.0, 0.0), c(1.0, 0.0)], [c(0.0, 0.0), c(1.0, 0.0)]], 1e-10));
        assert!(!is_unitary(&Array2::<Complex64>::zeros((2, 3)), 1e-10));
    }
}
