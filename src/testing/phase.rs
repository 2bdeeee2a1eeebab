//! Phase-cancellation solver
//!
//! Two unitaries that differ only by phase on measured outcomes should become
//! equal once each free phase is undone. The solver sets up one real linear
//! equation per row of the matrices. For a three-qubit system where every qubit
//! is free (`p0`, `p1`, `p2`) plus a global phase `g`:
//!
//! ```text
//!     g + p0 + p1 + p2 = d_000
//!     g      + p1 + p2 = d_001
//!     g + p0      + p2 = d_010
//!     g           + p2 = d_011
//!     g + p0 + p1      = d_100
//!     g      + p1      = d_101
//!     g + p0           = d_110
//!     g                = d_111
//! ```
//!
//! where `d_r` is the phase difference of row `r`'s dominant entry, and `p_k`
//! appears in every row whose bit `k` is clear. The system is reduced by
//! Gauss-Jordan elimination on the phase columns, and each solved phase is
//! then applied to the rows whose bit is set.
//!
//! A phase whose column has no usable pivot row stays unresolved and no
//! correction is applied for it. This is an accuracy limitation, not an error:
//! the caller's final tolerance check is what decides equivalence.

use num_complex::Complex64;
use ndarray::Array2;
use rayon::prelude::*;
use log::{trace, warn};

/// The solved correction for one phase degree of freedom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseCorrection {
    /// The degree of freedom: a bit index, or an out-of-range index for global phase
    pub dof: usize,

    /// Angle applied to the rows with bit `dof` set, `None` when unresolved
    pub angle: Option<f64>,
}

/// What one `cancel_phase` call solved for, in the order the DOFs were given
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhaseCancellation {
    corrections: Vec<PhaseCorrection>,
}

impl PhaseCancellation {
    pub fn corrections(&self) -> &[PhaseCorrection] {
        &self.corrections
    }

    /// The angle solved for the DOF at `position` in the input list
    pub fn angle(&self, position: usize) -> Option<f64> {
        self.corrections.get(position).and_then(|c| c.angle)
    }

    /// DOFs for which no correction could be computed
    pub fn unresolved(&self) -> Vec<usize> {
        self.corrections
            .iter()
            .filter(|c| c.angle.is_none())
            .map(|c| c.dof)
            .collect()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.corrections.iter().all(|c| c.angle.is_some())
    }
}

/// Whether bit `k` of `row` is set; bits past the word width never are
fn bit_is_set(row: usize, k: usize) -> bool {
    k < usize::BITS as usize && (row >> k) & 1 == 1
}

/// For each row, the phase difference at the entry least likely to be noise in either matrix
fn dominant_phase_differences(m1: &Array2<Complex64>, m2: &Array2<Complex64>) -> Vec<f64> {
    (0..m1.nrows())
        .into_par_iter()
        .map(|row| {
            let mut best_col = 0;
            let mut best = f64::NEG_INFINITY;
            for col in 0..m1.ncols() {
                let weight = m1[[row, col]].norm().min(m2[[row, col]].norm());
                if weight > best {
                    best = weight;
                    best_col = col;
                }
            }
            m1[[row, best_col]].arg() - m2[[row, best_col]].arg()
        })
        .collect()
}

/// Incidence columns for each DOF followed by the target column
fn build_system(dofs: &[usize], targets: &[f64]) -> Array2<f64> {
    let rows = targets.len();
    let mut system = Array2::zeros((rows, dofs.len() + 1));

    for (col, &k) in dofs.iter().enumerate() {
        for row in 0..rows {
            system[[row, col]] = if bit_is_set(row, k) { 0.0 } else { 1.0 };
        }
    }
    for (row, &target) in targets.iter().enumerate() {
        system[[row, dofs.len()]] = target;
    }

    system
}

/// Reduces the first `columns` columns to unit vectors, returning each column's pivot row
fn eliminate(system: &mut Array2<f64>, columns: usize) -> Vec<Option<usize>> {
    let rows = system.nrows();
    let mut used = vec![false; rows];
    let mut pivots = Vec::with_capacity(columns);

    for col in 0..columns {
        let pivot = match (0..rows).find(|&row| !used[row] && system[[row, col]] != 0.0) {
            Some(pivot) => pivot,
            None => {
                pivots.push(None);
                continue;
            }
        };
        used[pivot] = true;

        let scale = system[[pivot, col]];
        system.row_mut(pivot).mapv_inplace(|v| v / scale);
        let pivot_row = system.row(pivot).to_owned();

        for row in (0..rows).filter(|&row| row != pivot) {
            let factor = system[[row, col]];
            system.row_mut(row).scaled_add(-factor, &pivot_row);
        }
        pivots.push(Some(pivot));
    }

    pivots
}

/// Index of the first maximum of column `col`
fn column_argmax(system: &Array2<f64>, col: usize) -> usize {
    let mut best_row = 0;
    for row in 1..system.nrows() {
        if system[[row, col]] > system[[best_row, col]] {
            best_row = row;
        }
    }
    best_row
}

/// Phases the rows of `m1` so that it matches `m2` as closely as the free phases allow
///
/// `dofs` lists the phase degrees of freedom. An index `k` below the qubit count
/// frees the phase of every row with bit `k` set; any larger index stands for the
/// global phase. The order of `dofs` only affects tie-breaking.
///
/// `m1` is overwritten with the corrected matrix; pass a copy if the original
/// is still needed. `m2` is only read.
///
/// # Panics
///
/// Panics if the matrices are not square or differ in shape.
pub fn cancel_phase(
    m1: &mut Array2<Complex64>,
    m2: &Array2<Complex64>,
    dofs: &[usize]
) -> PhaseCancellation {
    assert_eq!(m1.dim(), m2.dim(), "cancel_phase requires matrices of equal shape");
    assert_eq!(m1.nrows(), m1.ncols(), "cancel_phase requires square matrices");

    let rows = m1.nrows();
    let targets = dominant_phase_differences(m1, m2);
    let mut system = build_system(dofs, &targets);
    let pivots = eliminate(&mut system, dofs.len());
    trace!("solved phase system for dofs {:?}:\n{}", dofs, system);

    let last = dofs.len();
    let mut corrections = Vec::with_capacity(dofs.len());
    for (col, (&dof, pivot)) in dofs.iter().zip(&pivots).enumerate() {
        if pivot.is_none() {
            warn!("phase freedom {} has no pivot row; leaving it uncorrected", dof);
            corrections.push(PhaseCorrection { dof, angle: None });
            continue;
        }

        let theta = system[[column_argmax(&system, col), last]];
        let adjust = Complex64::from_polar(1.0, theta);
        for row in (0..rows).filter(|&row| bit_is_set(row, dof)) {
            m1.row_mut(row).mapv_inplace(|v| v * adjust);
        }
        corrections.push(PhaseCorrection { dof, angle: Some(theta) });
    }

    PhaseCancellation { corrections }
}
