use ndarray::{array, Array2};
use num_complex::Complex64;

use qcompare::prelude::*;
use qcompare::CircuitError;

fn real(rows: Vec<Vec<f64>>) -> Array2<Complex64> {
    let n = rows.len();
    let flat: Vec<Complex64> = rows
        .into_iter()
        .flatten()
        .map(|v| Complex64::new(v, 0.0))
        .collect();
    Array2::from_shape_vec((n, n), flat).unwrap()
}

#[cfg(test)]
mod unitary_tests {
    use super::*;

    #[test]
    fn test_first_qubit_in_order_is_most_significant() {
        let circuit = CircuitBuilder::new().cnot(0, 1).unwrap().build();

        let forward = circuit.unitary(&Qubit::range(2)).unwrap();
        assert_eq!(forward, real(vec![
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0, 0.0],
        ]));

        let reversed = circuit.unitary(&[Qubit::line(1), Qubit::line(0)]).unwrap();
        assert_eq!(reversed, real(vec![
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
        ]));
    }

    #[test]
    fn test_terminal_measurements_do_not_change_unitary() {
        let plain = CircuitBuilder::new().h(0).unwrap().cnot(0, 1).unwrap().build();
        let measured = CircuitBuilder::new()
            .h(0).unwrap()
            .cnot(0, 1).unwrap()
            .measure(&[0, 1], "m").unwrap()
            .build();

        let order = Qubit::range(2);
        assert_eq!(plain.unitary(&order).unwrap(), measured.unitary(&order).unwrap());
    }

    #[test]
    fn test_unitary_with_extra_qubits() {
        let circuit = CircuitBuilder::new().x(1).unwrap().build();
        let u = circuit.unitary_with_qubits(vec![Qubit::line(0)]).unwrap();
        // Order is [0, 1]; X on the least significant qubit
        assert_eq!(u.dim(), (4, 4));
        assert_eq!(u[[0, 1]], Complex64::new(1.0, 0.0));
        assert_eq!(u[[2, 3]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_non_unitary_custom_gate_is_rejected() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let flip = CustomMatrixGate::new(array![[zero, one], [one, zero]], "flip").unwrap();
        let leak = CustomMatrixGate::new(array![[one, one], [zero, one]], "leak").unwrap();

        let circuit = CircuitBuilder::new().gate(flip, &[0]).unwrap().build();
        assert_eq!(
            circuit.unitary(&Qubit::range(1)).unwrap(),
            StandardGate::X.matrix()
        );

        let circuit = CircuitBuilder::new().gate(leak, &[0]).unwrap().build();
        assert_eq!(
            circuit.unitary(&Qubit::range(1)),
            Err(CircuitError::NonUnitaryGate("leak".to_string()))
        );
    }
}

#[cfg(test)]
mod diagram_tests {
    use super::*;

    #[test]
    fn test_display_matches_text_diagram() {
        let circuit = CircuitBuilder::new()
            .h(0).unwrap()
            .cnot(0, 1).unwrap()
            .measure(&[0, 1], "m").unwrap()
            .build();
        assert_eq!(circuit.to_string(), circuit.text_diagram());
        assert_eq!(circuit.text_diagram().lines().count(), 3);
    }

    #[test]
    fn test_empty_circuit_has_empty_diagram() {
        assert_eq!(Circuit::new().text_diagram(), "");
    }
}
