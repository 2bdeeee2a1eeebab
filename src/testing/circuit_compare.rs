//! Equivalence checks for circuits whose measurements all come last
//!
//! Circuits are equivalent if, for every input, their outputs are
//! indistinguishable: both the classical results of the measurements and the
//! quantum state left on the unmeasured qubits. An extra Z on an unmeasured
//! qubit changes a circuit's effect. The same Z just before a measurement of
//! that qubit does not.

use std::cmp::max;
use num_complex::Complex64;
use ndarray::Array2;
use log::debug;

use crate::error::{EquivalenceError, EquivalenceResult};
use crate::linalg;
use crate::quantum::{Circuit, Operation, Qubit};
use crate::testing::config::CompareConfig;
use crate::testing::phase::{cancel_phase, PhaseCancellation};

/// Both circuits' unitaries, with the first phased to match the second on measured outcomes
///
/// The unitaries span the union of both circuits' qubits. The returned report
/// tells which phase freedoms the solver could resolve.
pub fn canonicalize_up_to_terminal_measurement_phase(
    circuit1: &Circuit,
    circuit2: &Circuit
) -> EquivalenceResult<(Array2<Complex64>, Array2<Complex64>, PhaseCancellation)> {
    for circuit in [circuit1, circuit2] {
        if !circuit.are_all_measurements_terminal() {
            return Err(EquivalenceError::NonTerminalMeasurement {
                diagram: circuit.text_diagram(),
            });
        }
    }

    let measured_1 = circuit1.measured_qubits();
    let measured_2 = circuit2.measured_qubits();
    if measured_1 != measured_2 {
        return Err(EquivalenceError::MeasuredQubitsDiffer {
            actual: measured_1.into_iter().collect(),
            reference: measured_2.into_iter().collect(),
        });
    }

    // The extractor makes the first qubit most significant, so the reversed
    // list puts the qubit for bit k of a row index at position k.
    let ascending: Vec<Qubit> = circuit1
        .all_qubits()
        .union(&circuit2.all_qubits())
        .cloned()
        .collect();
    let order: Vec<&Qubit> = ascending.iter().rev().collect();

    let mut matrix1 = circuit1.unitary(&ascending)?;
    let matrix2 = circuit2.unitary(&ascending)?;

    let mut dofs = vec![order.len()];
    dofs.extend(
        measured_1
            .iter()
            .filter_map(|q| order.iter().position(|o| *o == q))
    );
    debug!(
        "cancelling measurement phase over {} qubits with phase freedoms {:?}",
        order.len(),
        dofs
    );

    let report = cancel_phase(&mut matrix1, &matrix2, &dofs);
    Ok((matrix1, matrix2, report))
}

/// Checks that `actual` has the same effect as `reference` under `config`
pub fn verify_equivalent_with(
    actual: &Circuit,
    reference: &Circuit,
    config: &CompareConfig
) -> EquivalenceResult<()> {
    let (m1, m2, report) = canonicalize_up_to_terminal_measurement_phase(actual, reference)?;

    if config.fail_on_unresolved_phase && !report.is_fully_resolved() {
        return Err(EquivalenceError::UnresolvedPhase(report.unresolved()));
    }

    if linalg::allclose_up_to_global_phase(&m1, &m2, config.rtol, config.atol) {
        return Ok(());
    }

    let max_deviation = linalg::max_deviation_up_to_global_phase(&m1, &m2);
    debug!("circuits differ by up to {:e} after phase cancellation", max_deviation);
    Err(EquivalenceError::Mismatch {
        max_deviation,
        actual_diagram: actual.text_diagram(),
        reference_diagram: reference.text_diagram(),
    })
}

/// Checks that `actual` has the same effect as `reference` within tolerance `atol`
///
/// Entries are compared as `|a - b| <= atol + rtol·|b|` with the default
/// relative tolerance of 1e-5, so a tiny `atol` alone does not make the check
/// exact. Use [`verify_equivalent_with`] and set `rtol` to 0.0 for a purely
/// absolute bound.
pub fn verify_equivalent(actual: &Circuit, reference: &Circuit, atol: f64) -> EquivalenceResult<()> {
    verify_equivalent_with(actual, reference, &CompareConfig::with_atol(atol))
}

/// Asserts that two circuits with terminal measurements have equivalent effects
///
/// Tolerances are those of [`verify_equivalent`], including its relative term.
///
/// # Panics
///
/// Panics with both circuit diagrams when the effects differ, and when the
/// circuits cannot be compared (a non-terminal measurement, or different
/// measured qubits).
pub fn assert_equivalent(actual: &Circuit, reference: &Circuit, atol: f64) {
    if let Err(err) = verify_equivalent(actual, reference, atol) {
        panic!("{}", err);
    }
}

/// Whether two moments hold the same operations, in any order
fn same_moment(ops1: Option<Vec<&Operation>>, ops2: Option<Vec<&Operation>>) -> bool {
    let (ops1, mut ops2) = match (ops1, ops2) {
        (Some(ops1), Some(ops2)) if ops1.len() == ops2.len() => (ops1, ops2),
        (None, None) => return true,
        _ => return false,
    };
    ops1.iter().all(|op| match ops2.iter().position(|other| other == op) {
        Some(found) => {
            ops2.swap_remove(found);
            true
        }
        None => false,
    })
}

fn first_differing_moment_index(circuit1: &Circuit, circuit2: &Circuit) -> Option<usize> {
    let moments = max(circuit1.moments().len(), circuit2.moments().len());
    (0..moments).find(|&i| !same_moment(circuit1.moment(i), circuit2.moment(i)))
}

/// Asserts that two circuits are identical moment by moment, with a descriptive failure message
///
/// Operations within one moment act on disjoint qubits, so their order inside
/// the moment does not matter.
pub fn assert_same_circuits(actual: &Circuit, expected: &Circuit) {
    assert!(
        first_differing_moment_index(actual, expected).is_none(),
        "Actual circuit differs from expected circuit.\n\
         \n\
         Diagram of actual circuit:\n\
         {}\n\
         \n\
         Diagram of expected circuit:\n\
         {}\n\
         \n\
         Index of first differing moment:\n\
         {:?}\n\
         \n\
         Full repr of actual circuit:\n\
         {:?}\n\
         \n\
         Full repr of expected circuit:\n\
         {:?}\n",
        actual,
        expected,
        first_differing_moment_index(actual, expected),
        actual,
        expected
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::CircuitBuilder;

    #[test]
    fn test_dof_order_follows_reversed_qubit_order() {
        // Only qubit 0 is measured; in the reversed order it sits at position 1
        let circuit = CircuitBuilder::new()
            .h(0).unwrap()
            .cnot(0, 1).unwrap()
            .measure(&[0], "m").unwrap()
            .build();
        let (_, _, report) = canonicalize_up_to_terminal_measurement_phase(&circuit, &circuit).unwrap();
        let dofs: Vec<usize> = report.corrections().iter().map(|c| c.dof).collect();
        assert_eq!(dofs, vec![2, 1]);
    }

    #[test]
    fn test_first_differing_moment_index() {
        let a = CircuitBuilder::new().h(0).unwrap().x(0).unwrap().build();
        let b = CircuitBuilder::new().h(0).unwrap().z(0).unwrap().build();
        let c = CircuitBuilder::new().h(0).unwrap().build();
        assert_eq!(first_differing_moment_index(&a, &b), Some(1));
        assert_eq!(first_differing_moment_index(&a, &c), Some(1));
        assert_eq!(first_differing_moment_index(&a, &a), None);
    }

    #[test]
    #[should_panic(expected = "Index of first differing moment:\nSome(1)")]
    fn test_assert_same_circuits_reports_moment() {
        let a = CircuitBuilder::new().h(0).unwrap().x(0).unwrap().build();
        let b = CircuitBuilder::new().h(0).unwrap().z(0).unwrap().build();
        assert_same_circuits(&a, &b);
    }

    #[test]
    fn test_operation_order_within_moment_is_ignored() {
        let a = CircuitBuilder::new().h(0).unwrap().h(1).unwrap().build();
        let b = CircuitBuilder::new().h(1).unwrap().h(0).unwrap().build();
        assert_eq!(first_differing_moment_index(&a, &b), None);
        assert_same_circuits(&a, &b);

        let c = CircuitBuilder::new().h(0).unwrap().x(1).unwrap().build();
        assert_eq!(first_differing_moment_index(&a, &c), Some(0));
    }

    #[test]
    fn test_tiny_atol_still_allows_relative_slack() {
        let reference = CircuitBuilder::new()
            .h(0).unwrap()
            .h(1).unwrap()
            .measure(&[0], "m").unwrap()
            .build();
        let actual = CircuitBuilder::new()
            .h(0).unwrap()
            .h(1).unwrap()
            .rz(1, 5e-6).unwrap()
            .measure(&[0], "m").unwrap()
            .build();

        assert!(verify_equivalent(&actual, &reference, 1e-12).is_ok());

        let absolute = CompareConfig { atol: 1e-12, rtol: 0.0, ..CompareConfig::default() };
        assert!(verify_equivalent_with(&actual, &reference, &absolute).is_err());
    }

    #[test]
    fn test_mismatch_carries_both_diagrams() {
        let actual = CircuitBuilder::new().x(0).unwrap().build();
        let reference = CircuitBuilder::new().h(0).unwrap().build();

        match verify_equivalent(&actual, &reference, 1e-8) {
            Err(EquivalenceError::Mismatch { max_deviation, actual_diagram, reference_diagram }) => {
                assert!(max_deviation > 0.1);
                assert_eq!(actual_diagram, "0: ───X───");
                assert_eq!(reference_diagram, "0: ───H───");
            }
            other => panic!("expected a mismatch, got {:?}", other),
        }
    }
}
