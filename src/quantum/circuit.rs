use std::collections::{BTreeSet, HashMap};
use std::fmt;
use num_complex::Complex64;
use ndarray::{Array1, Array2};
use log::trace;

use crate::error::{CircuitError, CircuitResult};
use crate::linalg;
use crate::quantum::diagram;
use crate::quantum::gate::{ParametrizedGate, QuantumGate, StandardGate};
use crate::quantum::qubit::Qubit;

/// Gates whose matrix deviates from unitarity by more than this are rejected
const UNITARY_TOLERANCE: f64 = 1e-8;

/// A single step of a circuit
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A unitary gate applied to `qubits`, in the gate's own qubit order
    Gate {
        gate: Box<dyn QuantumGate>,
        qubits: Vec<Qubit>,
    },

    /// A computational-basis measurement of `qubits`, recorded under `key`
    Measure {
        qubits: Vec<Qubit>,
        key: String,
    },
}

impl Operation {
    /// The qubits this operation touches
    pub fn qubits(&self) -> &[Qubit] {
        match self {
            Operation::Gate { qubits, .. } | Operation::Measure { qubits, .. } => qubits,
        }
    }

    /// Number of qubits this operation acts on
    pub fn qubit_count(&self) -> usize {
        match self {
            Operation::Gate { gate, .. } => gate.qubit_count(),
            Operation::Measure { qubits, .. } => qubits.len(),
        }
    }

    pub fn is_measurement(&self) -> bool {
        matches!(self, Operation::Measure { .. })
    }

    /// The symbol drawn on each touched wire, aligned with `qubits()`
    pub fn wire_symbols(&self) -> Vec<String> {
        match self {
            Operation::Gate { gate, .. } => gate.wire_symbols(),
            Operation::Measure { qubits, .. } => vec!["M".to_string(); qubits.len()],
        }
    }
}

fn check_distinct(qubits: &[Qubit]) -> CircuitResult<()> {
    let mut seen = BTreeSet::new();
    for q in qubits {
        if !seen.insert(q) {
            return Err(CircuitError::DuplicateQubit(q.clone()));
        }
    }
    Ok(())
}

/// A quantum circuit: an ordered sequence of gates and measurements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    operations: Vec<Operation>,
}

impl Circuit {
    /// Create a new empty circuit
    pub fn new() -> Self {
        Circuit {
            operations: Vec::new(),
        }
    }

    /// Append a gate acting on `qubits`
    pub fn append<G: QuantumGate + 'static>(&mut self, gate: G, qubits: &[Qubit]) -> CircuitResult<()> {
        self.append_boxed(Box::new(gate), qubits)
    }

    pub fn append_boxed(&mut self, gate: Box<dyn QuantumGate>, qubits: &[Qubit]) -> CircuitResult<()> {
        if gate.qubit_count() != qubits.len() {
            return Err(CircuitError::QubitCountMismatch {
                gate: gate.name(),
                expected: gate.qubit_count(),
                actual: qubits.len(),
            });
        }
        check_distinct(qubits)?;

        self.operations.push(Operation::Gate {
            gate,
            qubits: qubits.to_vec(),
        });
        Ok(())
    }

    /// Append a measurement of `qubits` under `key`
    pub fn measure(&mut self, qubits: &[Qubit], key: impl Into<String>) -> CircuitResult<()> {
        if qubits.is_empty() {
            return Err(CircuitError::EmptyMeasurement);
        }
        check_distinct(qubits)?;

        self.operations.push(Operation::Measure {
            qubits: qubits.to_vec(),
            key: key.into(),
        });
        Ok(())
    }

    /// Get the number of operations in the circuit
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn all_operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    /// Every qubit touched by some operation
    pub fn all_qubits(&self) -> BTreeSet<Qubit> {
        self.operations
            .iter()
            .flat_map(|op| op.qubits().iter().cloned())
            .collect()
    }

    /// Groups operations into moments by greedy packing
    ///
    /// Each operation lands in the moment right after the last moment that
    /// touches any of its qubits. Moments hold operation indices in insertion order.
    pub fn moments(&self) -> Vec<Vec<usize>> {
        let mut next_free: HashMap<&Qubit, usize> = HashMap::new();
        let mut moments: Vec<Vec<usize>> = Vec::new();

        for (index, op) in self.operations.iter().enumerate() {
            let slot = op
                .qubits()
                .iter()
                .filter_map(|q| next_free.get(q).copied())
                .max()
                .unwrap_or(0);

            if slot == moments.len() {
                moments.push(Vec::new());
            }
            moments[slot].push(index);

            for q in op.qubits() {
                next_free.insert(q, slot + 1);
            }
        }

        moments
    }

    /// The operations of moment `index`, if it exists
    pub fn moment(&self, index: usize) -> Option<Vec<&Operation>> {
        self.moments()
            .get(index)
            .map(|ops| ops.iter().map(|&i| &self.operations[i]).collect())
    }

    /// Finds the first measurement followed by another operation on one of its qubits
    fn first_non_terminal_measurement(&self) -> Option<(&str, &Qubit)> {
        self.operations.iter().enumerate().find_map(|(index, op)| match op {
            Operation::Measure { qubits, key } => qubits
                .iter()
                .find(|q| {
                    self.operations[index + 1..]
                        .iter()
                        .any(|later| later.qubits().contains(*q))
                })
                .map(|q| (key.as_str(), q)),
            Operation::Gate { .. } => None,
        })
    }

    /// Whether no operation follows a measurement on the same qubit
    pub fn are_all_measurements_terminal(&self) -> bool {
        self.first_non_terminal_measurement().is_none()
    }

    /// Qubits carrying a measurement
    pub fn measured_qubits(&self) -> BTreeSet<Qubit> {
        self.operations
            .iter()
            .filter(|op| op.is_measurement())
            .flat_map(|op| op.qubits().iter().cloned())
            .collect()
    }

    /// The unitary matrix of this circuit over `qubit_order`
    ///
    /// `qubit_order[0]` is the most significant bit of the row index. Qubits in
    /// the order that the circuit never touches act as identity. Terminal
    /// measurements are ignored; any other measurement is an error.
    pub fn unitary(&self, qubit_order: &[Qubit]) -> CircuitResult<Array2<Complex64>> {
        let mut positions: HashMap<&Qubit, usize> = HashMap::new();
        for (position, q) in qubit_order.iter().enumerate() {
            if positions.insert(q, position).is_some() {
                return Err(CircuitError::DuplicateInOrder(q.clone()));
            }
        }
        if let Some(q) = self.all_qubits().into_iter().find(|q| !positions.contains_key(q)) {
            return Err(CircuitError::QubitNotInOrder(q));
        }
        if let Some((key, qubit)) = self.first_non_terminal_measurement() {
            return Err(CircuitError::NonTerminalMeasurement {
                key: key.to_string(),
                qubit: qubit.clone(),
            });
        }

        let n = qubit_order.len();
        let mut result = Array2::from_diag(&Array1::from_elem(1usize << n, Complex64::new(1.0, 0.0)));

        for op in &self.operations {
            let (gate, qubits) = match op {
                Operation::Gate { gate, qubits } => (gate, qubits),
                Operation::Measure { .. } => continue,
            };
            if !linalg::is_unitary(&gate.matrix(), UNITARY_TOLERANCE) {
                return Err(CircuitError::NonUnitaryGate(gate.name()));
            }

            let targets: Vec<usize> = qubits.iter().map(|q| positions[q]).collect();
            trace!("applying {} at positions {:?} of {}", gate.name(), targets, n);
            result = gate.tensor_to_full_system(n, &targets).dot(&result);
        }

        Ok(result)
    }

    /// The unitary over all of this circuit's qubits plus `extra`, sorted ascending
    pub fn unitary_with_qubits<I>(&self, extra: I) -> CircuitResult<Array2<Complex64>>
    where
        I: IntoIterator<Item = Qubit>,
    {
        let mut qubits = self.all_qubits();
        qubits.extend(extra);
        let order: Vec<Qubit> = qubits.into_iter().collect();
        self.unitary(&order)
    }

    /// Render the circuit as a text diagram
    pub fn text_diagram(&self) -> String {
        diagram::render(self)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_diagram())
    }
}

/// A builder for circuits on line qubits
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Create a new circuit builder
    pub fn new() -> Self {
        CircuitBuilder {
            circuit: Circuit::new(),
        }
    }

    /// Build the circuit
    pub fn build(self) -> Circuit {
        self.circuit
    }

    /// Add a gate on line qubits
    pub fn gate<G: QuantumGate + 'static>(mut self, gate: G, qubits: &[i64]) -> CircuitResult<Self> {
        let qubits: Vec<Qubit> = qubits.iter().map(|&i| Qubit::line(i)).collect();
        self.circuit.append(gate, &qubits)?;
        Ok(self)
    }

    /// Add a Hadamard gate
    pub fn h(self, qubit: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::H, &[qubit])
    }

    /// Add a Pauli-X gate
    pub fn x(self, qubit: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::X, &[qubit])
    }

    /// Add a Pauli-Y gate
    pub fn y(self, qubit: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::Y, &[qubit])
    }

    /// Add a Pauli-Z gate
    pub fn z(self, qubit: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::Z, &[qubit])
    }

    /// Add a CNOT gate
    pub fn cnot(self, control: i64, target: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::CNOT, &[control, target])
    }

    /// Add a CZ gate
    pub fn cz(self, control: i64, target: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::CZ, &[control, target])
    }

    /// Add a SWAP gate
    pub fn swap(self, qubit1: i64, qubit2: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::SWAP, &[qubit1, qubit2])
    }

    /// Add a Toffoli gate (CCNOT)
    pub fn toffoli(self, control1: i64, control2: i64, target: i64) -> CircuitResult<Self> {
        self.gate(StandardGate::Toffoli, &[control1, control2, target])
    }

    /// Add an Rx gate
    pub fn rx(self, qubit: i64, theta: f64) -> CircuitResult<Self> {
        self.gate(ParametrizedGate::Rx(theta), &[qubit])
    }

    /// Add an Ry gate
    pub fn ry(self, qubit: i64, theta: f64) -> CircuitResult<Self> {
        self.gate(ParametrizedGate::Ry(theta), &[qubit])
    }

    /// Add an Rz gate
    pub fn rz(self, qubit: i64, theta: f64) -> CircuitResult<Self> {
        self.gate(ParametrizedGate::Rz(theta), &[qubit])
    }

    /// Add a phase gate
    pub fn phase(self, qubit: i64, theta: f64) -> CircuitResult<Self> {
        self.gate(ParametrizedGate::Phase(theta), &[qubit])
    }

    /// Measure line qubits under `key`
    pub fn measure(mut self, qubits: &[i64], key: &str) -> CircuitResult<Self> {
        let qubits: Vec<Qubit> = qubits.iter().map(|&i| Qubit::line(i)).collect();
        self.circuit.measure(&qubits, key)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(i: i64) -> Qubit {
        Qubit::line(i)
    }

    #[test]
    fn test_append_validates_arity_and_duplicates() {
        let mut circuit = Circuit::new();
        assert_eq!(
            circuit.append(StandardGate::CNOT, &[q(0)]),
            Err(CircuitError::QubitCountMismatch {
                gate: "CNOT".to_string(),
                expected: 2,
                actual: 1,
            })
        );
        assert_eq!(
            circuit.append(StandardGate::CNOT, &[q(0), q(0)]),
            Err(CircuitError::DuplicateQubit(q(0)))
        );
        assert_eq!(circuit.measure(&[], "m"), Err(CircuitError::EmptyMeasurement));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_moments_pack_disjoint_operations() {
        let circuit = CircuitBuilder::new()
            .h(0).unwrap()
            .h(1).unwrap()
            .cnot(0, 1).unwrap()
            .x(2).unwrap()
            .build();

        assert_eq!(circuit.moments(), vec![vec![0, 1, 3], vec![2]]);
        assert_eq!(circuit.moment(1).unwrap().len(), 1);
        assert!(circuit.moment(2).is_none());
    }

    #[test]
    fn test_terminal_measurement_detection() {
        let terminal = CircuitBuilder::new()
            .h(0).unwrap()
            .measure(&[0], "m").unwrap()
            .x(1).unwrap()
            .build();
        assert!(terminal.are_all_measurements_terminal());
        assert_eq!(terminal.measured_qubits().into_iter().collect::<Vec<_>>(), vec![q(0)]);

        let non_terminal = CircuitBuilder::new()
            .measure(&[0], "m").unwrap()
            .x(0).unwrap()
            .build();
        assert!(!non_terminal.are_all_measurements_terminal());
        assert_eq!(
            non_terminal.unitary(&[q(0)]),
            Err(CircuitError::NonTerminalMeasurement { key: "m".to_string(), qubit: q(0) })
        );
    }

    #[test]
    fn test_unitary_pads_missing_qubits_with_identity() {
        let circuit = CircuitBuilder::new().x(0).unwrap().build();
        let u = circuit.unitary(&[q(0), q(1)]).unwrap();
        let expected = StandardGate::X.tensor_to_full_system(2, &[0]);
        assert_eq!(u, expected);

        assert_eq!(circuit.unitary(&[q(1)]), Err(CircuitError::QubitNotInOrder(q(0))));
        assert_eq!(
            circuit.unitary(&[q(0), q(0)]),
            Err(CircuitError::DuplicateInOrder(q(0)))
        );
    }

    #[test]
    fn test_unitary_applies_gates_in_order() {
        // X then H differs from H then X
        let xh = CircuitBuilder::new().x(0).unwrap().h(0).unwrap().build();
        let expected = StandardGate::H.matrix().dot(&StandardGate::X.matrix());
        let actual = xh.unitary(&[q(0)]).unwrap();
        assert!(actual.iter().zip(expected.iter()).all(|(a, b)| (a - b).norm() < 1e-12));
    }

    #[test]
    fn test_unitary_rejects_non_unitary_gate() {
        use crate::quantum::gate::CustomMatrixGate;

        let projector = Array2::from_diag(&Array1::from(vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
        ]));
        let mut circuit = Circuit::new();
        circuit.append(CustomMatrixGate::new(projector, "P0").unwrap(), &[q(0)]).unwrap();

        assert_eq!(
            circuit.unitary(&[q(0)]),
            Err(CircuitError::NonUnitaryGate("P0".to_string()))
        );
    }
}
